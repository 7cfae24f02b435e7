//! 运行时错误.

use crate::Idx3d;
use thiserror::Error;

/// 形状插值流水线的运行时错误.
///
/// 任一阶段失败都会中止整条流水线, 不返回部分结果.
/// 所有阶段对确定的输入都是纯的, 因此不存在重试语义.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterpError {
    /// 输入体数据中不存在任何前景体素.
    ///
    /// 中间体的几何 (原点与层数) 依赖于非空的勾画切片集合,
    /// 因此流水线无法继续. 该错误在任何分配发生之前抛出.
    #[error("输入体数据中不存在任何勾画切片 (无前景体素)")]
    EmptyDelineation,

    /// 中间体或输出体的体素个数在寻址范围内溢出, 无法分配.
    #[error("无法分配形状为 {shape:?} 的体数据 (体素个数溢出)")]
    Allocation {
        /// 请求分配的形状, 格式为 `(z, h, w)`.
        shape: Idx3d,
    },

    /// 配置的勾画比率非正.
    ///
    /// 勾画比率代表相邻人工勾画之间的切片间隔数, 必须为正整数.
    /// 该错误在配置构建时检出, 先于一切计算.
    #[error("勾画比率必须为正整数, 实际为 {0}")]
    InvalidRatio(u32),
}

/// 形状插值流水线运行结果.
pub type InterpResult<T> = Result<T, InterpError>;
