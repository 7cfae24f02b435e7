//! 通用常量.

/// 单通道标签值.
pub mod gray {
    /// 二值标注中, 背景的像素值.
    pub const BACKGROUND: u8 = 0;

    /// 二值标注中, 前景 (勾画目标) 的像素值.
    pub const FOREGROUND: u8 = 1;

    /// 像素是否是前景?
    ///
    /// 输入标注允许任何非零值代表前景, 因此该判断不与
    /// [`FOREGROUND`] 严格比较.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != BACKGROUND
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }
}

/// 越界重采样时使用的默认距离值.
///
/// 正号代表背景. 第一张勾画切片之前与最后一张之后的输出区域
/// 均以该值填充, 二值化后即为背景.
pub const OUTSIDE_DISTANCE: f64 = 1.0;

/// 正值距离场的前景容差上界.
///
/// 参考实现把正距离值截断到一位小数后再做阈值判断, 使 `(0, 0.1]`
/// 区间内的值仍被判为前景, 相当于把前景边界向外扩张至多 0.1
/// 个距离单位. 详见 `interp::binarize`.
pub const FOREGROUND_TOLERANCE: f64 = 0.1;
