//! 内置扩展

mod parameter_statistics;

pub use parameter_statistics::{
    DEFAULT_PERCENTILES, IntoLinks, ParamAttr, ParameterStatistics, ParameterStatisticsConfig,
    StatisticFn, Statistics, StatisticsConfig, builtin_statistic, default_statistics, percentile,
};
