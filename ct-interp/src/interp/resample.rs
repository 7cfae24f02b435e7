//! 连续重采样.
//!
//! 流水线第五阶段: 把距离体按物理坐标采样回输出网格 (与输入体同
//! 大小/间距/原点). 切片平面内两套网格逐点重合, 恒等映射; 堆叠方向
//! 则把输出层的物理位置换算为距离体的连续 z 索引, 交给可切换的
//! 插值核求值.
//!
//! 落在距离体物理范围之外的输出层 (第一张勾画切片之前, 最后一张
//! 之后) 统一填充 [`OUTSIDE_DISTANCE`], 二值化后即为背景, 而非报错.

use ndarray::{Array3, Axis};

use crate::consts::OUTSIDE_DISTANCE;
use crate::{DistVolume, Geometry, VolumeGeometry};

/// 堆叠方向插值核.
///
/// 封闭的策略集合, 在配置期选定一次, 之后整条流水线只通过
/// [`Interpolator::stencil`] 这一个操作与之交互.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolator {
    /// 最近邻.
    Nearest,

    /// 线性插值. 默认选择.
    #[default]
    Linear,

    /// 三次插值 (Catmull-Rom 三次卷积核).
    Cubic,
}

/// 插值核的最大支撑宽度 (三次核为 4).
const MAX_TAPS: usize = 4;

/// 一组插值系数: (源切片索引, 权重).
type Stencil = ([(usize, f64); MAX_TAPS], usize);

impl Interpolator {
    /// 按命令行惯用名解析插值核: `nn`, `linear`, `bspline`.
    /// 未知名称返回 `None`, 由调用方决定回退行为.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nn" => Some(Self::Nearest),
            "linear" => Some(Self::Linear),
            "bspline" => Some(Self::Cubic),
            _ => None,
        }
    }

    /// 在连续索引 `c` 处求插值系数.
    ///
    /// 要求 `0 <= c <= len - 1` 且 `len >= 1` (越界由调用方先行处理).
    /// 返回的索引均在 `[0, len)` 内 (边缘复制), 权重之和为 1.
    fn stencil(self, c: f64, len: usize) -> Stencil {
        debug_assert!(len >= 1);
        debug_assert!((0.0..=(len - 1) as f64).contains(&c));

        let mut taps = [(0usize, 0.0f64); MAX_TAPS];
        match self {
            Self::Nearest => {
                taps[0] = (c.round() as usize, 1.0);
                (taps, 1)
            }
            Self::Linear => {
                let i0 = c.floor() as usize;
                let t = c - i0 as f64;
                if t == 0.0 {
                    taps[0] = (i0, 1.0);
                    (taps, 1)
                } else {
                    taps[0] = (i0, 1.0 - t);
                    taps[1] = (i0 + 1, t);
                    (taps, 2)
                }
            }
            Self::Cubic => {
                let i1 = c.floor() as usize;
                let t = c - i1 as f64;
                let (t2, t3) = (t * t, t * t * t);

                // Catmull-Rom 核在 [i1 - 1, i1 + 2] 上的四个权重.
                let w = [
                    0.5 * (-t3 + 2.0 * t2 - t),
                    0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
                    0.5 * (-3.0 * t3 + 4.0 * t2 + t),
                    0.5 * (t3 - t2),
                ];
                let clamp = |i: isize| i.clamp(0, len as isize - 1) as usize;
                for (k, (tap, wgt)) in taps.iter_mut().zip(w).enumerate() {
                    *tap = (clamp(i1 as isize + k as isize - 1), wgt);
                }
                (taps, 4)
            }
        }
    }
}

/// 把距离体 `dist` 重采样到 `target` 几何的网格上, 返回连续距离数组.
///
/// 对每个输出层: 物理位置 -> 距离体连续 z 索引 -> 插值核求值.
/// 切片平面内对整层做向量化线性组合. 越界层填充 [`OUTSIDE_DISTANCE`].
pub fn resample_to(dist: &DistVolume, target: &Geometry, kernel: Interpolator) -> Array3<f64> {
    debug_assert_eq!(dist.slice_shape(), target.slice_shape());

    let nz = dist.len_z();
    let mut out = Array3::<f64>::from_elem(target.shape(), OUTSIDE_DISTANCE);

    for (k, mut out_slice) in out.axis_iter_mut(Axis(0)).enumerate() {
        let c = dist.geometry().z_continuous_index(target.z_position(k));
        if c < 0.0 || c > (nz - 1) as f64 {
            // 距离体范围之外, 保持默认背景填充.
            continue;
        }

        let (taps, cnt) = kernel.stencil(c, nz);
        out_slice.fill(0.0);
        for &(i, wgt) in &taps[..cnt] {
            out_slice.scaled_add(wgt, &dist.slice_at(i));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn weights_sum(taps: &Stencil) -> f64 {
        taps.0[..taps.1].iter().map(|(_, w)| w).sum()
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Interpolator::from_name("nn"), Some(Interpolator::Nearest));
        assert_eq!(
            Interpolator::from_name("linear"),
            Some(Interpolator::Linear)
        );
        assert_eq!(
            Interpolator::from_name("bspline"),
            Some(Interpolator::Cubic)
        );
        assert_eq!(Interpolator::from_name("cubic?"), None);
        assert_eq!(Interpolator::default(), Interpolator::Linear);
    }

    #[test]
    fn test_linear_stencil() {
        let (taps, cnt) = Interpolator::Linear.stencil(1.5, 4);
        assert_eq!(cnt, 2);
        assert_eq!(taps[0].0, 1);
        assert_eq!(taps[1].0, 2);
        assert!(float_eq(taps[0].1, 0.5));
        assert!(float_eq(taps[1].1, 0.5));

        // 恰在节点上退化为单点.
        let (taps, cnt) = Interpolator::Linear.stencil(3.0, 4);
        assert_eq!((cnt, taps[0].0), (1, 3));
        assert!(float_eq(taps[0].1, 1.0));
    }

    #[test]
    fn test_nearest_stencil() {
        let (taps, cnt) = Interpolator::Nearest.stencil(1.2, 4);
        assert_eq!((cnt, taps[0].0), (1, 1));
        let (taps, _) = Interpolator::Nearest.stencil(1.8, 4);
        assert_eq!(taps[0].0, 2);
    }

    #[test]
    fn test_cubic_stencil_properties() {
        // 节点处精确插值.
        let s = Interpolator::Cubic.stencil(2.0, 5);
        assert!(float_eq(weights_sum(&s), 1.0));
        let (taps, _) = s;
        assert!(float_eq(taps[1].1, 1.0));
        assert_eq!(taps[1].0, 2);

        // 任意位置权重归一; 边缘索引被复制进范围内.
        for &c in &[0.25, 0.5, 1.75, 3.9] {
            let s = Interpolator::Cubic.stencil(c, 5);
            assert!(float_eq(weights_sum(&s), 1.0), "c = {c}");
            assert!(s.0[..s.1].iter().all(|&(i, _)| i < 5));
        }
    }

    /// 以常数切片搭起 `n` 层距离体, 第 `k` 层全为 `vals[k]`.
    fn const_stack(vals: &[f64], z_mm: f64, z0: f64) -> DistVolume {
        let mut data = Array3::<f64>::zeros((vals.len(), 2, 2));
        for (k, &v) in vals.iter().enumerate() {
            data.index_axis_mut(Axis(0), k).fill(v);
        }
        let geom = Geometry::new(
            (vals.len(), 2, 2),
            [z_mm, 1.0, 1.0],
            [z0, 0.0, 0.0],
        );
        DistVolume::from_array(geom, data)
    }

    #[test]
    fn test_resample_linear_midpoint() {
        // 两层距离体, 层间距 2; 输出网格间距 1, 中间层恰为两层均值.
        let dist = const_stack(&[-2.0, 4.0], 2.0, 0.0);
        let target = Geometry::new((3, 2, 2), [1.0; 3], [0.0; 3]);
        let out = resample_to(&dist, &target, Interpolator::Linear);

        assert!(out.index_axis(Axis(0), 0).iter().all(|&v| float_eq(v, -2.0)));
        assert!(out.index_axis(Axis(0), 1).iter().all(|&v| float_eq(v, 1.0)));
        assert!(out.index_axis(Axis(0), 2).iter().all(|&v| float_eq(v, 4.0)));
    }

    #[test]
    fn test_resample_out_of_bounds_fills_background() {
        // 单层距离体位于物理位置 1; 输出 0, 2 层落在范围外.
        let dist = const_stack(&[-3.0], 1.0, 1.0);
        let target = Geometry::new((3, 2, 2), [1.0; 3], [0.0; 3]);

        for kernel in [
            Interpolator::Nearest,
            Interpolator::Linear,
            Interpolator::Cubic,
        ] {
            let out = resample_to(&dist, &target, kernel);
            assert!(out
                .index_axis(Axis(0), 0)
                .iter()
                .all(|&v| float_eq(v, crate::consts::OUTSIDE_DISTANCE)));
            assert!(out.index_axis(Axis(0), 1).iter().all(|&v| float_eq(v, -3.0)));
            assert!(out
                .index_axis(Axis(0), 2)
                .iter()
                .all(|&v| float_eq(v, crate::consts::OUTSIDE_DISTANCE)));
        }
    }
}
