//! 逐切片符号距离变换.
//!
//! 流水线第四阶段: 把中间体的每一张 2D 标签切片独立地变换为连续的
//! 符号距离场. 前景内部为负, 背景为正, 零水平集落在前景/背景交界处.
//! 任何计算都不跨越切片边界.
//!
//! 距离采用精确欧氏距离 (Felzenszwalb & Huttenlocher 下包络算法,
//! 逐维可分离), 以像素为单位. 符号场定义为
//! `d(到最近前景) - d(到最近背景)`: 对背景像素第二项为 0,
//! 对前景像素第一项为 0, 两者合成即所需的符号距离.

use ndarray::{Array2, Array3, ArrayView2, Axis};
use num::Float;

use crate::consts::gray::is_foreground;
use crate::{DistVolume, Geometry, Idx2d};

/// 一维平方欧氏距离变换.
///
/// `f` 为各格点的初始代价 (采样点处为 0, 其余为足够大的有限值),
/// 结果写入 `d`. 两个 slice 长度必须一致且非零.
///
/// 实现为下包络抛物线扫描, O(n).
fn squared_edt_1d<T: Float>(f: &[T], d: &mut [T]) {
    let n = f.len();
    debug_assert!(n >= 1);
    debug_assert_eq!(d.len(), n);

    // v: 下包络抛物线的顶点位置; z: 相邻抛物线的分界点.
    let mut v = vec![0usize; n];
    let mut z = vec![T::infinity(); n + 1];
    z[0] = T::neg_infinity();

    let two = T::from(2.0).unwrap();
    let at = |i: usize| T::from(i).unwrap();
    // 顶点为 p 的抛物线与顶点为 q 的抛物线的交点横坐标.
    let cross = |p: usize, q: usize| {
        ((f[q] + at(q) * at(q)) - (f[p] + at(p) * at(p))) / (two * (at(q) - at(p)))
    };

    let mut k = 0usize;
    for q in 1..n {
        let mut s = cross(v[k], q);
        while s <= z[k] {
            k -= 1;
            s = cross(v[k], q);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = T::infinity();
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < at(q) {
            k += 1;
        }
        let dq = at(q) - at(v[k]);
        *out = dq * dq + f[v[k]];
    }
}

/// 二维平方欧氏距离变换: 每个格点到最近 `true` 格点的平方距离.
///
/// 对行, 列各做一次一维变换. `sites` 必须至少含一个 `true`,
/// 否则结果无意义 (由调用者预先过滤退化情形).
fn squared_edt_2d(sites: &Array2<bool>) -> Array2<f64> {
    let (h, w) = sites.dim();
    // 大于切片内任何可达平方距离的有限哨兵值.
    let big = (h * h + w * w) as f64 + 1.0;

    let mut g = Array2::from_shape_fn((h, w), |p| if sites[p] { 0.0 } else { big });
    let mut buf = vec![0.0f64; h.max(w)];

    // 先沿行 (宽方向), 再沿列 (高方向).
    for mut row in g.axis_iter_mut(Axis(0)) {
        squared_edt_1d(&row.to_vec(), &mut buf[..w]);
        row.assign(&ndarray::ArrayView1::from(&buf[..w]));
    }
    for mut col in g.axis_iter_mut(Axis(1)) {
        squared_edt_1d(&col.to_vec(), &mut buf[..h]);
        col.assign(&ndarray::ArrayView1::from(&buf[..h]));
    }
    g
}

/// 退化切片 (全前景或全背景) 的距离幅值.
///
/// 取 `h + w`, 严格大于切片内任何可能的欧氏距离,
/// 以表达 "无边界可言, 距离任意远".
#[inline]
fn degenerate_magnitude((h, w): Idx2d) -> f64 {
    (h + w) as f64
}

/// 对单张 2D 标签切片计算符号距离场.
///
/// 前景像素取负值 (幅值为到最近背景像素的距离), 背景像素取正值
/// (幅值为到最近前景像素的距离), 单位为像素. 全前景/全背景的
/// 退化切片产出常数符号场, 是合法输出而非错误.
pub fn signed_distance_slice(labels: &ArrayView2<'_, u8>) -> Array2<f64> {
    let dim = labels.dim();
    let fg = labels.mapv(is_foreground);

    let fg_cnt = fg.iter().filter(|&&p| p).count();
    if fg_cnt == 0 {
        return Array2::from_elem(dim, degenerate_magnitude(dim));
    }
    if fg_cnt == fg.len() {
        return Array2::from_elem(dim, -degenerate_magnitude(dim));
    }

    let to_fg = squared_edt_2d(&fg);
    let bg = fg.mapv(|p| !p);
    let to_bg = squared_edt_2d(&bg);

    Array2::from_shape_fn(dim, |p| {
        if fg[p] {
            -to_bg[p].sqrt()
        } else {
            to_fg[p].sqrt()
        }
    })
}

/// 串行地对标签堆叠 `stack` 的每张切片计算符号距离场,
/// 装配为与 `geom` 同几何的距离体.
pub fn signed_distance_stack(geom: Geometry, stack: &Array3<u8>) -> DistVolume {
    debug_assert_eq!(stack.dim(), geom.shape());

    let mut dist = Array3::<f64>::zeros(stack.dim());
    for (src, mut dst) in stack
        .axis_iter(Axis(0))
        .zip(dist.axis_iter_mut(Axis(0)))
    {
        dst.assign(&signed_distance_slice(&src));
    }
    DistVolume::from_array(geom, dist)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行地逐切片计算符号距离场.
        ///
        /// 各切片只读自身数据, 只写自身输出区域, 除最终汇合外无需同步.
        /// 结果与 [`signed_distance_stack`] 完全一致.
        pub fn par_signed_distance_stack(geom: Geometry, stack: &Array3<u8>) -> DistVolume {
            debug_assert_eq!(stack.dim(), geom.shape());

            let mut dist = Array3::<f64>::zeros(stack.dim());
            dist.axis_iter_mut(Axis(0))
                .into_par_iter()
                .zip(stack.axis_iter(Axis(0)).into_par_iter())
                .for_each(|(mut dst, src)| {
                    dst.assign(&signed_distance_slice(&src));
                });
            DistVolume::from_array(geom, dist)
        }
    }
}
