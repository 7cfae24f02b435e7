//! 体数据几何信息.

use crate::{Idx2d, Idx3d};

/// 3D 体数据的几何描述: 形状, 体素间距与物理原点.
///
/// 三分量数组均按照 `[z, h, w]` 顺序存储, 其中 z 为切片堆叠方向
/// (勾画稀疏的方向), h/w 为切片平面内的高与宽. 间距与原点以毫米为单位.
///
/// 该结构是只读的. 若要修改几何参数, 你应该创建新的实例.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    shape: Idx3d,
    spacing: [f64; 3],
    origin: [f64; 3],
}

impl Geometry {
    /// 构建几何描述.
    ///
    /// `spacing` 的三个分量必须为正且有限, 否则程序 panic.
    pub fn new(shape: Idx3d, spacing: [f64; 3], origin: [f64; 3]) -> Self {
        assert!(
            spacing.iter().all(|s| s.is_finite() && *s > 0.0),
            "体素间距必须为正"
        );
        assert!(origin.iter().all(|o| o.is_finite()), "原点必须有限");
        Self {
            shape,
            spacing,
            origin,
        }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.shape
    }

    /// 获取体素间距, 格式为 `[z, h, w]`, 以毫米为单位.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 获取物理原点, 格式为 `[z, h, w]`, 以毫米为单位.
    #[inline]
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape.0
    }

    /// 获取水平切片形状大小.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape;
        (h, w)
    }

    /// 获取体素总个数. 若个数在 `usize` 下溢出则返回 `None`.
    #[inline]
    pub fn checked_size(&self) -> Option<usize> {
        let (z, h, w) = self.shape;
        z.checked_mul(h)?.checked_mul(w)
    }

    /// 获取空间方向 (相邻 2D 切片的方向) 体素间距, 以毫米为单位.
    #[inline]
    pub fn z_mm(&self) -> f64 {
        self.spacing[0]
    }

    /// 获取空间方向物理原点分量, 以毫米为单位.
    #[inline]
    pub fn z_origin(&self) -> f64 {
        self.origin[0]
    }

    /// 求第 `z_index` 层切片的物理位置, 以毫米为单位.
    #[inline]
    pub fn z_position(&self, z_index: usize) -> f64 {
        self.origin[0] + self.spacing[0] * z_index as f64
    }

    /// 求物理位置 `pos` (毫米) 在本几何下对应的连续 z 索引.
    ///
    /// 结果可以为负或超出 `len_z - 1`, 越界语义由调用者决定.
    #[inline]
    pub fn z_continuous_index(&self, pos: f64) -> f64 {
        (pos - self.origin[0]) / self.spacing[0]
    }
}

/// 体数据几何信息的共用属性.
///
/// [`crate::LabelVolume`] 和 [`crate::DistVolume`] 通过该 trait
/// 共享几何相关的只读操作.
pub trait VolumeGeometry {
    /// 获取几何描述.
    fn geometry(&self) -> &Geometry;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        self.geometry().shape()
    }

    /// 获取水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        self.geometry().slice_shape()
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.geometry().len_z()
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }
}
