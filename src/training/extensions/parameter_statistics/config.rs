/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : ParameterStatistics 的可序列化配置
 *
 * 自定义统计函数无法序列化，配置中只能引用内置统计量的名称。
 * JSON 示例：
 * {"statistics": ["mean", "percentile"], "report_grads": false,
 *  "prefix": "main", "trigger": [100, "iteration"], "skip_nan_params": true}
 */

use serde::Deserialize;

use crate::training::{TrainingError, UnitLiteral};

/// `statistics`字段：`"default"` 或内置统计量名称列表；JSON `null` 表示不计算任何统计量
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StatisticsConfig {
    Preset(String),
    Names(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParameterStatisticsConfig {
    pub statistics: Option<StatisticsConfig>,
    pub report_params: bool,
    pub report_grads: bool,
    pub prefix: Option<String>,
    pub trigger: (u64, UnitLiteral),
    pub skip_nan_params: bool,
}

impl Default for ParameterStatisticsConfig {
    fn default() -> Self {
        Self {
            statistics: Some(StatisticsConfig::Preset("default".to_string())),
            report_params: true,
            report_grads: true,
            prefix: None,
            trigger: (1, UnitLiteral::Epoch),
            skip_nan_params: false,
        }
    }
}

impl ParameterStatisticsConfig {
    pub fn from_json(json: &str) -> Result<Self, TrainingError> {
        Ok(serde_json::from_str(json)?)
    }
}
