//! 体数据基础数据结构与 nii 文件读写.

use std::ops::{Index, IndexMut};
use std::path::Path;

use ndarray::{Array3, ArrayView, ArrayView2, ArrayViewMut, Axis, Ix3};
use nifti::error::NiftiError;
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use thiserror::Error;

use crate::Idx3d;

mod geometry;

pub use geometry::{Geometry, VolumeGeometry};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 体数据读写错误.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// nii 文件读写失败.
    #[error("nii 文件读写失败: {0}")]
    Nifti(#[from] NiftiError),

    /// header 的 `pixdim` 字段非法: 存在非正或非有限分量.
    #[error("header 体素间距非法: {spacing:?}")]
    BadSpacing {
        /// 按 `[z, h, w]` 顺序排列的间距.
        spacing: [f64; 3],
    },

    /// header 的 `qoffset` 字段非法: 存在非有限分量.
    #[error("header 物理原点非法: {origin:?}")]
    BadOrigin {
        /// 按 `[z, h, w]` 顺序排列的原点.
        origin: [f64; 3],
    },
}

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 从 nii header 中提取几何描述.
///
/// 间距来源于 `pixdim`, 原点来源于 `qoffset_{x, y, z}`.
/// 两者均转换为 `[z, h, w]` 顺序. 字段非法时返回对应的 [`VolumeError`].
fn geometry_from_header(h: &NiftiHeader) -> Result<Geometry, VolumeError> {
    let [_, w_mm, h_mm, z_mm, ..] = h.pixdim;
    let spacing = [z_mm as f64, h_mm as f64, w_mm as f64];
    if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
        return Err(VolumeError::BadSpacing { spacing });
    }

    let origin = [h.quatern_z as f64, h.quatern_y as f64, h.quatern_x as f64];
    if !origin.iter().all(|o| o.is_finite()) {
        return Err(VolumeError::BadOrigin { origin });
    }

    Ok(Geometry::new(get_shape_from_header(h), spacing, origin))
}

/// nii 格式 3D 二值标注, 包括 header, 几何描述和标签数据.
/// 标签值以 `u8` 保存, 0 为背景, 非零为前景.
#[derive(Debug, Clone)]
pub struct LabelVolume {
    header: BoxedHeader,
    geom: Geometry,
    data: Array3<u8>,
}

impl VolumeGeometry for LabelVolume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geom
    }
}

impl Index<Idx3d> for LabelVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for LabelVolume {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl LabelVolume {
    /// 打开 nii 文件格式的 3D 标注. `path` 为 nii 文件的本地路径.
    ///
    /// 文件读取失败, 或 header 的几何字段非法 (如 `pixdim` 为零)
    /// 时返回对应的 [`VolumeError`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VolumeError> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<u8>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<u8>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        let geom = geometry_from_header(&header)?;
        Ok(Self { header, geom, data })
    }

    /// 将标注以 nii 文件格式写入 `path`, 元信息沿用本结构的 header.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VolumeError> {
        // [z, H, W] -> [W, H, z], 恢复 nifti 惯用布局.
        let view = self.data.view().permuted_axes([2, 1, 0]);
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&view)?;
        Ok(())
    }

    /// 根据裸标签数据和基础几何信息直接创建 `LabelVolume` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 `(z, h, w)` 格式存储, 0 为背景, 非零为前景;
    /// 2. `spacing` 与 `origin` 按照 `[z, h, w]` 格式存储, 以毫米为单位.
    ///
    /// # 注意
    ///
    /// 该方法生成的 header 仅保证几何字段一致, 因此你应仅将其用于实验目的.
    pub fn fake(data: Array3<u8>, spacing: [f64; 3], origin: [f64; 3]) -> Self {
        let (z, h, w) = data.dim();
        let geom = Geometry::new((z, h, w), spacing, origin);

        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
        header.pixdim = [
            1.0,
            spacing[2] as f32,
            spacing[1] as f32,
            spacing[0] as f32,
            1.0,
            1.0,
            1.0,
            1.0,
        ];
        (header.quatern_x, header.quatern_y, header.quatern_z) =
            (origin[2] as f32, origin[1] as f32, origin[0] as f32);
        header.intent_name[..4].copy_from_slice(b"fake");

        Self { header, geom, data }
    }

    /// 判断该结构是否是由 [`Self::fake`] 手动拼接的.
    pub fn is_faked(&self) -> bool {
        self.header.intent_name.starts_with(b"fake")
    }

    /// 沿用 `header` 元信息和 `geom` 几何描述, 装配新的标签数据.
    ///
    /// `data` 的形状必须与 `geom` 一致, 否则程序 panic.
    pub(crate) fn assemble(header: &NiftiHeader, geom: Geometry, data: Array3<u8>) -> Self {
        assert_eq!(data.dim(), geom.shape(), "标签数据与几何描述形状不一致");
        Self {
            header: Box::new(header.clone()),
            geom,
            data,
        }
    }

    /// 获取 header 部分.
    #[inline]
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// 获取 3D 标注 z 空间的第 `z_index` 层不可变切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取能按升序迭代 3D 标注水平不可变切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, u8>> {
        self.data.axis_iter(Axis(0))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, u8, Ix3> {
        self.data.view_mut()
    }

    /// 获取 3D 标注中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }
}

/// 连续值 (符号距离) 3D 体数据, 含自身的几何描述.
///
/// 该结构仅在插值流水线内部产生和消费: 中间体经逐切片距离变换后
/// 以该形式进入重采样阶段.
#[derive(Debug, Clone)]
pub struct DistVolume {
    geom: Geometry,
    data: Array3<f64>,
}

impl VolumeGeometry for DistVolume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geom
    }
}

impl Index<Idx3d> for DistVolume {
    type Output = f64;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl DistVolume {
    /// 以 `geom` 指定的形状装配距离数据.
    ///
    /// `data` 的形状必须与 `geom` 一致, 否则程序 panic.
    pub fn from_array(geom: Geometry, data: Array3<f64>) -> Self {
        assert_eq!(data.dim(), geom.shape(), "距离数据与几何描述形状不一致");
        Self { geom, data }
    }

    /// 获取距离体 z 空间的第 `z_index` 层不可变切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f64, Ix3> {
        self.data.view()
    }
}
