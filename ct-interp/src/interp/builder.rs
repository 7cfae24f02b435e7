//! 中间体构建.
//!
//! 流水线第二, 三阶段: 先根据输入几何, 配置与勾画切片集合推导
//! 中间体的几何描述, 再把勾画切片的标签数据按序拷贝进去.
//!
//! 中间体把物理上稀疏的勾画切片紧凑堆叠起来, 并用放大后的层间距
//! 编码原始的物理间隔. 这样后续的连续重采样才能跨越真实物理距离
//! 插值, 而不是假想的均匀间隔.

use ndarray::{Array3, Axis};

use super::error::{InterpError, InterpResult};
use super::scan::DelineationSet;
use crate::{Geometry, LabelVolume, VolumeGeometry};

/// 推导中间体的几何描述.
///
/// 几何规则:
///
/// - 切片平面内的大小与间距保持不变;
/// - 堆叠方向层数 = 勾画切片个数;
/// - 堆叠方向间距 = 勾画比率 × 输入堆叠方向间距;
/// - 堆叠方向原点 = 输入原点 + 输入堆叠方向间距 × 第一张勾画切片索引,
///   平面内原点不变.
///
/// `ratio` 必须已通过配置校验 (为正). 若推导出的形状体素个数溢出,
/// 返回 [`InterpError::Allocation`].
pub fn intermediate_geometry(
    input: &Geometry,
    set: &DelineationSet,
    ratio: u32,
) -> InterpResult<Geometry> {
    debug_assert!(ratio >= 1);

    let (_, h, w) = input.shape();
    let shape = (set.len(), h, w);

    let [z_mm, h_mm, w_mm] = input.spacing();
    let spacing = [ratio as f64 * z_mm, h_mm, w_mm];

    let mut origin = input.origin();
    origin[0] = input.z_position(set.first());

    let geom = Geometry::new(shape, spacing, origin);
    if geom.checked_size().is_none() {
        return Err(InterpError::Allocation { shape });
    }
    Ok(geom)
}

/// 把 `vol` 中的勾画切片按 z 升序逐层拷贝进形状为 `geom` 的新标签数组.
///
/// 对输入做一次显式遍历, 以 O(1) 集合成员判定筛选勾画切片;
/// 切片内部整块赋值, 行优先顺序天然保持.
pub fn collect_delineated(
    vol: &LabelVolume,
    set: &DelineationSet,
    geom: &Geometry,
) -> Array3<u8> {
    debug_assert_eq!(geom.len_z(), set.len());
    debug_assert_eq!(geom.slice_shape(), vol.slice_shape());

    let mut stack = Array3::<u8>::zeros(geom.shape());
    let mut dst_it = stack.axis_iter_mut(Axis(0));
    for (_, src) in vol
        .slice_iter()
        .enumerate()
        .filter(|(z, _)| set.contains(*z))
    {
        // 勾画切片个数恰为 `set.len()`, 该迭代器不会提前耗尽.
        dst_it.next().unwrap().assign(&src);
    }
    debug_assert!(dst_it.next().is_none());

    stack
}
