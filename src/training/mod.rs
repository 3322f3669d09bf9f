//! 训练循环的扩展机制
//!
//! # 主要组件
//!
//! - [`ExtensionsManager`]: 驱动迭代计数、依优先级调用各扩展、判断停止条件
//! - [`Extension`]: 扩展 trait（由管理器按自身触发器周期性调用）
//! - [`triggers`]: 触发器（按间隔触发、早停）
//! - [`reporting`]: 上报的观测值与按键求均值的汇总器
//! - [`extensions`]: 内置扩展，目前为 [`ParameterStatistics`]
//!
//! # 使用示例
//!
//! ```ignore
//! use std::rc::Rc;
//! use param_stats::training::{ExtensionsManager, ParameterStatistics};
//!
//! let model = Rc::new(build_model());
//! let mut manager = ExtensionsManager::new(10, 100)?;
//! manager.extend(ParameterStatistics::new(model.clone()).prefix("main"));
//!
//! while !manager.is_stopped() {
//!     manager.run_iteration(|observation| {
//!         let loss = train_step(&model)?;
//!         observation.insert("main/loss".to_string(), loss);
//!         Ok(())
//!     })?;
//! }
//! ```

pub mod error;
pub mod extension;
pub mod extensions;
pub mod manager;
pub mod reporting;
pub mod triggers;

#[cfg(test)]
mod tests;

pub use error::TrainingError;
pub use extension::{Extension, PRIORITY_EDITOR, PRIORITY_READER, PRIORITY_WRITER};
pub use extensions::{
    DEFAULT_PERCENTILES, IntoLinks, ParamAttr, ParameterStatistics, ParameterStatisticsConfig,
    StatisticFn, Statistics, StatisticsConfig, builtin_statistic, default_statistics, percentile,
};
pub use manager::{ExtensionsManager, ManagerProtocol};
pub use reporting::{DictSummary, Observation, Summary};
pub use triggers::{
    EarlyStoppingTrigger, IntervalTrigger, Mode, Trigger, TriggerLike, UnitLiteral, get_trigger,
};
