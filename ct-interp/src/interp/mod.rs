//! 形状插值流水线.
//!
//! 各阶段以纯函数显式串联: 每个阶段接受上一阶段的不可变输出与配置,
//! 返回新的自有值, 不存在共享可变的流水线状态, 也没有隐式的
//! "拉取" 触发. 入口为 [`interpolate`].

mod binarize;
mod builder;
mod distance;
mod error;
mod resample;
mod scan;

pub use binarize::binarize_value;
pub use distance::signed_distance_slice;
pub use error::{InterpError, InterpResult};
pub use resample::Interpolator;
pub use scan::{delineated_slices, DelineationSet};

#[cfg(feature = "rayon")]
pub use {distance::par_signed_distance_stack, scan::par_delineated_slices};

use crate::{LabelVolume, VolumeGeometry};

/// 形状插值流水线配置.
///
/// 在一次运行期间只读; 构建时即完成全部校验, 先于一切计算.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpConfig {
    delineation_ratio: u32,
    interpolator: Interpolator,
}

impl Default for InterpConfig {
    /// 默认配置: 勾画比率 3, 线性插值核.
    #[inline]
    fn default() -> Self {
        Self {
            delineation_ratio: 3,
            interpolator: Interpolator::default(),
        }
    }
}

impl InterpConfig {
    /// 构建配置.
    ///
    /// `delineation_ratio` 为相邻人工勾画之间假定的切片间隔数,
    /// 必须为正整数, 否则返回 [`InterpError::InvalidRatio`].
    pub fn new(delineation_ratio: u32, interpolator: Interpolator) -> InterpResult<Self> {
        if delineation_ratio == 0 {
            return Err(InterpError::InvalidRatio(delineation_ratio));
        }
        Ok(Self {
            delineation_ratio,
            interpolator,
        })
    }

    /// 获取勾画比率.
    #[inline]
    pub fn delineation_ratio(&self) -> u32 {
        self.delineation_ratio
    }

    /// 获取插值核.
    #[inline]
    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }
}

/// 对稀疏标注的二值体数据 `input` 做形状插值, 返回同几何的稠密标注.
///
/// 同步运行到完成, 不可中途取消; 任一阶段失败都返回 `Err`,
/// 不产生部分结果. `input` 只读, 输出为新分配的体数据.
///
/// # 错误
///
/// - [`InterpError::EmptyDelineation`]: 输入不含任何前景体素;
/// - [`InterpError::Allocation`]: 中间体体素个数溢出.
pub fn interpolate(input: &LabelVolume, config: &InterpConfig) -> InterpResult<LabelVolume> {
    #[cfg(feature = "rayon")]
    let set = scan::par_delineated_slices(input)?;
    #[cfg(not(feature = "rayon"))]
    let set = scan::delineated_slices(input)?;

    log::debug!(
        "勾画切片 {} 张, 首/末 z = {}/{}",
        set.len(),
        set.first(),
        set.last()
    );

    let geom = builder::intermediate_geometry(input.geometry(), &set, config.delineation_ratio())?;
    let stack = builder::collect_delineated(input, &set, &geom);
    log::debug!(
        "中间体: 形状 {:?}, 层间距 {} mm, z 原点 {} mm",
        geom.shape(),
        geom.z_mm(),
        geom.z_origin()
    );

    #[cfg(feature = "rayon")]
    let dist = distance::par_signed_distance_stack(geom, &stack);
    #[cfg(not(feature = "rayon"))]
    let dist = distance::signed_distance_stack(geom, &stack);

    let resampled = resample::resample_to(&dist, input.geometry(), config.interpolator());
    Ok(binarize::binarize_volume(&resampled, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    const KERNELS: [Interpolator; 3] = [
        Interpolator::Nearest,
        Interpolator::Linear,
        Interpolator::Cubic,
    ];

    /// 在 `marks` 指定的切片上放置以切片中心为中心的 `half * 2` 见方前景块.
    fn square_volume(len_z: usize, marks: &[(usize, usize)]) -> LabelVolume {
        let mut data = Array3::<u8>::zeros((len_z, 10, 10));
        for &(z, half) in marks {
            data.slice_mut(s![z, 5 - half..5 + half, 5 - half..5 + half])
                .fill(1);
        }
        LabelVolume::fake(data, [1.0; 3], [0.0; 3])
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            InterpConfig::new(0, Interpolator::Linear).unwrap_err(),
            InterpError::InvalidRatio(0)
        );

        let cfg = InterpConfig::default();
        assert_eq!(cfg.delineation_ratio(), 3);
        assert_eq!(cfg.interpolator(), Interpolator::Linear);
    }

    #[test]
    fn test_empty_volume_aborts_before_anything() {
        let vol = square_volume(6, &[]);
        let cfg = InterpConfig::default();
        assert_eq!(
            interpolate(&vol, &cfg).unwrap_err(),
            InterpError::EmptyDelineation
        );
    }

    #[test]
    fn test_dense_input_round_trips_to_identity() {
        // 每一层都被勾画 (勾画比率 1) 时, 插值退化为恒等变换.
        let marks: Vec<(usize, usize)> = (0..6).map(|z| (z, 1 + z % 3)).collect();
        let vol = square_volume(6, &marks);

        for kernel in KERNELS {
            let cfg = InterpConfig::new(1, kernel).unwrap();
            let out = interpolate(&vol, &cfg).unwrap();
            assert_eq!(out.data(), vol.data(), "kernel = {kernel:?}");
            assert_eq!(out.geometry(), vol.geometry());
        }
    }

    #[test]
    fn test_midpoint_slice_reconstruction() {
        // 切片 0, 2 勾画了相同的前景块, 切片 1 缺失; 比率 2 下
        // 中间层恰为两张相同距离场的均值, 应复原出同样的前景块.
        let vol = square_volume(3, &[(0, 2), (2, 2)]);
        let cfg = InterpConfig::new(2, Interpolator::Linear).unwrap();
        let out = interpolate(&vol, &cfg).unwrap();

        assert_eq!(out.slice_at(0), vol.slice_at(0));
        assert_eq!(out.slice_at(1), vol.slice_at(0));
        assert_eq!(out.slice_at(2), vol.slice_at(2));
    }

    #[test]
    fn test_single_delineated_slice() {
        // 仅切片 2 被勾画: 中间体层数为 1, 其余输出层全部落在
        // 范围外, 以背景填充而非报错.
        let vol = square_volume(5, &[(2, 2)]);
        for kernel in KERNELS {
            let cfg = InterpConfig::new(3, kernel).unwrap();
            let out = interpolate(&vol, &cfg).unwrap();

            assert_eq!(out.slice_at(2), vol.slice_at(2));
            for z in [0usize, 1, 3, 4] {
                assert!(
                    out.slice_at(z).iter().all(|&p| p == 0),
                    "kernel = {kernel:?}, z = {z}"
                );
            }
        }
    }

    #[test]
    fn test_interpolated_region_is_bounded_by_neighbours() {
        // 切片 0 勾画小块, 切片 2 勾画大块: 中间层的前景应介于两者
        // 之间 (包含小块, 不超出大块).
        let vol = square_volume(3, &[(0, 1), (2, 3)]);
        let cfg = InterpConfig::new(2, Interpolator::Linear).unwrap();
        let out = interpolate(&vol, &cfg).unwrap();

        let mid = out.slice_at(1);
        for ((small, large), got) in vol
            .slice_at(0)
            .iter()
            .zip(vol.slice_at(2).iter())
            .zip(mid.iter())
        {
            if *small != 0 {
                assert_eq!(*got, 1, "中间层应包含两侧公共前景");
            }
            if *large == 0 {
                assert_eq!(*got, 0, "中间层前景不应超出外侧轮廓");
            }
        }
        // 且确实插出了介于两者之间的前景面积.
        let area: usize = mid.iter().filter(|&&p| p != 0).count();
        assert!(area > vol.slice_at(0).iter().filter(|&&p| p != 0).count());
        assert!(area < vol.slice_at(2).iter().filter(|&&p| p != 0).count());
    }
}
