//! # Param Stats
//!
//! 在训练循环中以扩展（extension）的形式周期性地统计模型参数值与梯度的
//! 汇总量（均值、标准差、最值、零元素个数等），用于观察梯度消失/爆炸、死权重等训练动态，
//! 而无需在模型代码中手动埋点。
//!
//! - [`tensor`]: 基于`ndarray`的张量及其归约统计
//! - [`nn`]: 参数句柄与 `Module` trait
//! - [`training`]: 扩展管理器、触发器、上报汇总器与 [`ParameterStatistics`]
//!

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod training;

pub use training::ParameterStatistics;
