#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对稀疏人工标注的 3D 二值分割体数据做形状插值
//! (shape-based interpolation), 补全缺失的横断面切片.
//!
//! 临床上医生往往只在每 N 层切片上勾画一次目标结构. 直接对 0/1
//! 标签做最近邻或线性插值会在边界产生阶梯/糊化伪影. 本库改为在连续的
//! **符号距离场** 表示下插值, 再重新二值化, 得到边界平滑的稠密标注.
//!
//! # 流水线
//!
//! 各阶段严格串行, 前一阶段的输出是后一阶段的输入:
//!
//! 1. 勾画切片扫描 (`interp::scan`): 找出所有含前景像素的切片索引;
//! 2. 中间体构建 (`interp::builder`): 把勾画切片紧凑堆叠成合成体数据,
//!    其层间距按勾画比率放大, 以编码真实的物理间隔;
//! 3. 逐切片符号距离变换 (`interp::distance`): 每层独立计算, 层间无信息流动;
//! 4. 连续重采样 (`interp::resample`): 按物理坐标把距离场采样回原网格,
//!    堆叠方向插值核可在 {最近邻, 线性, 三次} 中切换;
//! 5. 重新二值化 (`interp::binarize`): 零阈值加一位小数截断容差.
//!
//! 入口为 [`interp::interpolate`].
//!
//! # 注意
//!
//! 1. 该 crate 目前仅提供 `safe` 接口.
//! 2. 仅支持二值标签 (0 为背景, 非零为前景), 不支持多标签;
//!    仅沿切片堆叠方向 (z) 插值.
//! 3. 在违反接口约定的情况下, 程序会直接 panic, 而不会导致内存错误.
//!    As what Rust promises. 运行期可恢复的失败以 [`interp::InterpError`]
//!    的形式返回.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体数据基础数据结构与 nii 文件读写.
mod data;

pub use data::{DistVolume, Geometry, LabelVolume, VolumeError, VolumeGeometry};

pub mod consts;

pub mod interp;

pub mod prelude;
