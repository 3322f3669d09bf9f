//! 训练扩展相关错误类型定义

use thiserror::Error;

use crate::errors::TensorError;

/// 训练扩展相关错误
#[derive(Debug, Error)]
pub enum TrainingError {
    /// 统计函数内部的张量运算错误（如对空张量求均值）
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// 触发器时间单位不合法
    #[error("未知的时间单位`{0}`，仅支持`epoch`或`iteration`")]
    UnknownUnit(String),

    /// 配置中引用了不存在的内置统计量
    #[error("未知的内置统计量`{0}`")]
    UnknownStatistic(String),

    /// 统计函数返回了不含任何元素的张量
    #[error("统计量`{function}`的输出为空（上报键：{key}）")]
    EmptyStatistic { key: String, function: String },

    /// 配置解析失败
    #[error("配置解析失败: {0}")]
    Config(#[from] serde_json::Error),

    /// 参数不合法
    #[error("参数不合法: {0}")]
    InvalidArgument(String),
}
