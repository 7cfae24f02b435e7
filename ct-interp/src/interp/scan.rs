//! 勾画切片扫描.
//!
//! 流水线第一阶段: 遍历输入体数据, 找出所有包含前景像素的切片
//! (即被人工勾画过的切片), 产出 [`DelineationSet`].

use std::collections::HashSet;

use itertools::Itertools;

use super::error::{InterpError, InterpResult};
use crate::consts::gray::is_foreground;
use crate::LabelVolume;

/// 勾画切片索引集合.
///
/// 同时维护两种视图: 严格递增的有序序列 (供中间体构建按序堆叠)
/// 和哈希集合 (供逐体素拷贝做 O(1) 成员判定). 保证非空.
#[derive(Debug, Clone)]
pub struct DelineationSet {
    indices: Vec<usize>,
    members: HashSet<usize>,
}

impl DelineationSet {
    /// 由严格递增的索引序列构建. 空序列返回 [`InterpError::EmptyDelineation`].
    fn new(indices: Vec<usize>) -> InterpResult<Self> {
        if indices.is_empty() {
            return Err(InterpError::EmptyDelineation);
        }
        debug_assert!(
            indices.iter().tuple_windows().all(|(a, b)| a < b),
            "勾画切片索引必须严格递增"
        );
        let members = indices.iter().copied().collect();
        Ok(Self { indices, members })
    }

    /// 获取勾画切片个数. 构建时保证非空, 故结果恒为正.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// 获取第一张勾画切片的 z 索引.
    #[inline]
    pub fn first(&self) -> usize {
        self.indices[0]
    }

    /// 获取最后一张勾画切片的 z 索引.
    #[inline]
    pub fn last(&self) -> usize {
        // 构建时保证非空.
        *self.indices.last().unwrap()
    }

    /// 判断 `z_index` 是否为勾画切片. O(1).
    #[inline]
    pub fn contains(&self, z_index: usize) -> bool {
        self.members.contains(&z_index)
    }

    /// 获取能按升序迭代勾画切片索引的迭代器.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// 获取底层有序索引序列.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// 一张切片是否被勾画过?
///
/// 即切片上是否存在至少一个前景像素. 对非负标签值而言,
/// 该判定与 "像素值之和严格大于零" 等价.
#[inline]
fn is_delineated(slice: &ndarray::ArrayView2<'_, u8>) -> bool {
    slice.iter().copied().any(is_foreground)
}

/// 串行扫描 `vol` 的全部切片, 产出勾画切片索引集合.
///
/// 若不存在任何勾画切片则返回 [`InterpError::EmptyDelineation`].
/// 不修改输入, 不做任何分配之外的副作用.
pub fn delineated_slices(vol: &LabelVolume) -> InterpResult<DelineationSet> {
    DelineationSet::new(vol.slice_iter().positions(|s| is_delineated(&s)).collect())
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::Axis;
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        /// 借助 `rayon`, 并行扫描 `vol` 的全部切片, 产出勾画切片索引集合.
        ///
        /// 各切片的判定相互独立, 仅在最终收集时汇合.
        /// 结果与 [`delineated_slices`] 完全一致.
        pub fn par_delineated_slices(vol: &LabelVolume) -> InterpResult<DelineationSet> {
            let flags: Vec<bool> = vol
                .data()
                .axis_iter(Axis(0))
                .into_par_iter()
                .map(|s| is_delineated(&s))
                .collect();
            DelineationSet::new(
                flags
                    .into_iter()
                    .positions(|delineated| delineated)
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 构造 12 层 4x4 的体数据, 仅在 `marks` 给出的切片上放置前景.
    fn marked_volume(marks: &[usize]) -> LabelVolume {
        let mut data = Array3::<u8>::zeros((12, 4, 4));
        for &z in marks {
            data[(z, 1, 2)] = 1;
        }
        LabelVolume::fake(data, [1.0; 3], [0.0; 3])
    }

    #[test]
    fn test_delineation_detection() {
        let vol = marked_volume(&[2, 5, 9]);
        let set = delineated_slices(&vol).unwrap();

        assert_eq!(set.indices(), [2, 5, 9]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.first(), 2);

        assert!(set.contains(5));
        assert!(!set.contains(3));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
    }

    #[test]
    fn test_empty_volume_is_an_error() {
        let vol = marked_volume(&[]);
        assert_eq!(
            delineated_slices(&vol).unwrap_err(),
            InterpError::EmptyDelineation
        );
    }

    #[test]
    fn test_any_nonzero_value_is_foreground() {
        let mut data = Array3::<u8>::zeros((3, 2, 2));
        data[(1, 0, 0)] = 255;
        let vol = LabelVolume::fake(data, [1.0; 3], [0.0; 3]);
        assert_eq!(delineated_slices(&vol).unwrap().indices(), [1]);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_scan_agrees_with_serial() {
        let vol = marked_volume(&[0, 3, 7, 11]);
        let serial = delineated_slices(&vol).unwrap();
        let par = par_delineated_slices(&vol).unwrap();
        assert_eq!(serial.indices(), par.indices());
    }
}
