//! 重新二值化.
//!
//! 流水线最后阶段: 把重采样得到的连续距离场按零阈值规则转换回
//! 二值标签体, 几何与元信息沿用输入体.
//!
//! 阈值规则带有一个不对称的容差带: 参考实现把正距离值截断到一位
//! 小数 (`floor(10 d) / 10`) 之后才与零比较, 于是 `(0, 0.1]` 区间内
//! 的值仍被判为前景, 相当于把前景边界向外扩张至多 0.1 个距离单位.
//! 该行为被原样保留以保证兼容性; 它究竟是有意的边界平滑还是遗留的
//! 舍入产物, 见 DESIGN.md 中的讨论.

use ndarray::Array3;

use crate::consts::gray::{BACKGROUND, FOREGROUND};
use crate::consts::FOREGROUND_TOLERANCE;
use crate::{LabelVolume, VolumeGeometry};

/// 对单个连续距离值 `d` 做阈值判定.
///
/// - `d <= 0`: 前景 (零水平集及其内部);
/// - `0 < d <= 0.1`: 仍为前景 (一位小数截断容差带);
/// - 其余: 背景.
#[inline]
pub fn binarize_value(d: f64) -> u8 {
    if d <= FOREGROUND_TOLERANCE {
        FOREGROUND
    } else {
        BACKGROUND
    }
}

/// 把重采样后的连续距离数组 `resampled` 二值化为标签体.
///
/// `resampled` 的形状必须与 `reference` 一致 (重采样目标几何即输入
/// 几何), 输出沿用 `reference` 的 header 与几何描述.
pub fn binarize_volume(resampled: &Array3<f64>, reference: &LabelVolume) -> LabelVolume {
    assert_eq!(
        resampled.dim(),
        reference.shape(),
        "重采样结果与输入体形状不一致"
    );
    LabelVolume::assemble(
        reference.header(),
        reference.geometry().clone(),
        resampled.mapv(binarize_value),
    )
}
