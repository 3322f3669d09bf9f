/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 参数统计扩展：周期性地统计模型参数值与梯度并上报
 *
 * 每次被调用时遍历各模块的具名参数，对其值（data）和/或梯度（grad）展平后
 * 逐一套用已注册的统计函数，得到一次扁平的上报映射并累积进汇总器；
 * 自身的触发器触发时，把累积的均值上报给管理器并清空汇总器。
 *
 * 上报键：`{prefix}/{param_name}/{attr_name}/{function_name}`，
 * 未设置前缀时省略`{prefix}/`；统计函数输出多个值时再追加`/{下标}`。
 */

mod config;
mod statistics;

use std::rc::Rc;

use log::{debug, trace};

pub use config::{ParameterStatisticsConfig, StatisticsConfig};
pub use statistics::{
    DEFAULT_PERCENTILES, StatisticFn, builtin_statistic, default_statistics, percentile,
};

use crate::nn::{Module, Parameter};
use crate::tensor::Tensor;
use crate::training::{
    DictSummary, Extension, ManagerProtocol, Observation, PRIORITY_WRITER, TrainingError,
    Trigger, TriggerLike, UnitLiteral, get_trigger,
};

/// 统计参数的哪个属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamAttr {
    Data,
    Grad,
}

impl ParamAttr {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Grad => "grad",
        }
    }

    /// 取出该属性并展平；梯度尚不存在时返回 `None`
    fn flattened(self, param: &Parameter) -> Option<Tensor> {
        match self {
            Self::Data => Some(param.data().flatten()),
            Self::Grad => param.grad().map(|grad| grad.flatten()),
        }
    }
}

/// 统计函数集合的选择方式
pub enum Statistics {
    /// 内置默认统计量，见 [`default_statistics`]
    Default,
    /// 不计算任何统计量
    None,
    /// 自定义的 (名称, 统计函数) 列表，顺序即上报顺序
    Custom(Vec<(String, StatisticFn)>),
}

impl Statistics {
    fn into_registry(self) -> Vec<(String, StatisticFn)> {
        match self {
            Self::Default => default_statistics(),
            Self::None => Vec::new(),
            Self::Custom(functions) => {
                let mut registry = Vec::with_capacity(functions.len());
                for (name, function) in functions {
                    insert_or_replace(&mut registry, name, function);
                }
                registry
            }
        }
    }
}

// 同名覆盖时保留原有位置
fn insert_or_replace(
    registry: &mut Vec<(String, StatisticFn)>,
    name: String,
    function: StatisticFn,
) {
    match registry.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = function,
        None => registry.push((name, function)),
    }
}

/// 可作为 [`ParameterStatistics`] 观测对象的模块（单个或多个）
pub trait IntoLinks {
    fn into_links(self) -> Vec<Rc<dyn Module>>;
}

impl IntoLinks for Rc<dyn Module> {
    fn into_links(self) -> Vec<Rc<dyn Module>> {
        vec![self]
    }
}

impl<M: Module + 'static> IntoLinks for Rc<M> {
    fn into_links(self) -> Vec<Rc<dyn Module>> {
        vec![self as Rc<dyn Module>]
    }
}

impl IntoLinks for Vec<Rc<dyn Module>> {
    fn into_links(self) -> Vec<Rc<dyn Module>> {
        self
    }
}

impl<M: Module + 'static> IntoLinks for Vec<Rc<M>> {
    fn into_links(self) -> Vec<Rc<dyn Module>> {
        self.into_iter()
            .map(|link| link as Rc<dyn Module>)
            .collect()
    }
}

/// 参数统计扩展
///
/// 模块以 `Rc` 共享：训练循环更新参数后，本扩展下一次调用即可读到最新值。
/// 本扩展只读参数，从不修改参数值或梯度。
///
/// # 使用示例
/// ```ignore
/// let mut stats = ParameterStatistics::new(model.clone())
///     .report_grads(false)
///     .prefix("main")
///     .trigger((100, UnitLiteral::Iteration).into());
/// stats.register_statistics("l2", |x| Ok(Tensor::scalar(x.to_vec().iter().map(|v| v * v).sum::<f32>().sqrt())));
/// manager.extend(stats);
/// ```
pub struct ParameterStatistics {
    links: Vec<Rc<dyn Module>>,
    statistics: Vec<(String, StatisticFn)>,
    report_params: bool,
    report_grads: bool,
    prefix: Option<String>,
    trigger: Box<dyn Trigger>,
    summary: DictSummary,
    skip_nan_params: bool,
}

impl ParameterStatistics {
    pub const DEFAULT_NAME: &'static str = "parameter_statistics";
    pub const PRIORITY: i32 = PRIORITY_WRITER;
    pub const REPORT_KEY_TEMPLATE: &'static str =
        "{prefix}{param_name}/{attr_name}/{function_name}";

    /// 默认配置：默认统计量、同时统计参数值与梯度、无前缀、每1个epoch上报一次、不跳过NaN
    pub fn new(links: impl IntoLinks) -> Self {
        Self {
            links: links.into_links(),
            statistics: default_statistics(),
            report_params: true,
            report_grads: true,
            prefix: None,
            trigger: get_trigger(Self::default_trigger()),
            summary: DictSummary::new(),
            skip_nan_params: false,
        }
    }

    /// 按配置构造；配置中引用了未知的内置统计量时返回错误
    pub fn from_config(
        links: impl IntoLinks,
        config: &ParameterStatisticsConfig,
    ) -> Result<Self, TrainingError> {
        let statistics = match &config.statistics {
            None => Statistics::None,
            Some(StatisticsConfig::Preset(preset)) if preset == "default" => Statistics::Default,
            Some(StatisticsConfig::Preset(other)) => {
                return Err(TrainingError::UnknownStatistic(other.clone()));
            }
            Some(StatisticsConfig::Names(names)) => Statistics::Custom(
                names
                    .iter()
                    .map(|name| Ok((name.clone(), builtin_statistic(name)?)))
                    .collect::<Result<Vec<_>, TrainingError>>()?,
            ),
        };

        let mut extension = Self::new(links)
            .statistics(statistics)
            .report_params(config.report_params)
            .report_grads(config.report_grads)
            .trigger(config.trigger.into())
            .skip_nan_params(config.skip_nan_params);
        if let Some(prefix) = &config.prefix {
            extension = extension.prefix(prefix);
        }
        Ok(extension)
    }

    /// 默认每1个epoch汇总上报一次
    pub const fn default_trigger() -> TriggerLike {
        TriggerLike::Interval(1, UnitLiteral::Epoch)
    }

    pub fn statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics.into_registry();
        self
    }

    pub fn report_params(mut self, report_params: bool) -> Self {
        self.report_params = report_params;
        self
    }

    pub fn report_grads(mut self, report_grads: bool) -> Self {
        self.report_grads = report_grads;
        self
    }

    /// 上报键的前缀；空字符串等同于不设前缀
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// 决定何时上报累积结果的触发器（构造时即解析）
    pub fn trigger(mut self, trigger: TriggerLike) -> Self {
        self.trigger = get_trigger(trigger);
        self
    }

    /// 为 `true` 时，含NaN的参数不再计算统计量，而是对每个统计量直接上报一个NaN
    pub fn skip_nan_params(mut self, skip_nan_params: bool) -> Self {
        self.skip_nan_params = skip_nan_params;
        self
    }

    /// 注册（或覆盖同名的）统计函数，自下一次调用起生效
    pub fn register_statistics<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&Tensor) -> Result<Tensor, TrainingError> + 'static,
    {
        insert_or_replace(&mut self.statistics, name.to_string(), Box::new(function));
    }

    /// 已注册的统计量名称（按上报顺序）
    pub fn statistic_names(&self) -> Vec<&str> {
        self.statistics.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// 待统计的参数属性
    pub fn attrs(&self) -> Vec<ParamAttr> {
        let mut attrs = Vec::with_capacity(2);
        if self.report_params {
            attrs.push(ParamAttr::Data);
        }
        if self.report_grads {
            attrs.push(ParamAttr::Grad);
        }
        attrs
    }

    /// 尚未上报的累积汇总
    pub const fn summary(&self) -> &DictSummary {
        &self.summary
    }

    fn report_key(&self, param_name: &str, attr: ParamAttr, function_name: &str) -> String {
        let prefix = self
            .prefix
            .as_deref()
            .map(|p| format!("{p}/"))
            .unwrap_or_default();
        format!("{prefix}{param_name}/{}/{function_name}", attr.as_str())
    }

    /// 对当前参数状态做一次统计，返回本次的扁平上报映射（不改动汇总器）
    ///
    /// 遍历顺序：模块 → 参数 → 属性 → 统计函数；键冲突时后写覆盖先写。
    pub fn collect(&self) -> Result<Observation, TrainingError> {
        let mut statistics = Observation::new();

        for link in &self.links {
            for (param_name, param) in link.named_parameters() {
                for attr in self.attrs() {
                    // 统计函数不应对张量的维度做任何假设，故统一展平为一维
                    let Some(values) = attr.flattened(&param) else {
                        trace!("参数`{param_name}`尚无梯度，跳过");
                        continue;
                    };
                    let skip_as_nan = self.skip_nan_params && values.has_nan();
                    if skip_as_nan {
                        trace!("参数`{param_name}`的{}含NaN，统计量一律记为NaN", attr.as_str());
                    }

                    for (function_name, function) in &self.statistics {
                        let key = self.report_key(&param_name, attr, function_name);
                        if skip_as_nan {
                            statistics.insert(key, f64::NAN);
                            continue;
                        }

                        let output = function(&values)?.to_vec();
                        match output.as_slice() {
                            [] => {
                                return Err(TrainingError::EmptyStatistic {
                                    key,
                                    function: function_name.clone(),
                                });
                            }
                            [single] => {
                                statistics.insert(key, f64::from(*single));
                            }
                            many => {
                                for (i, v) in many.iter().enumerate() {
                                    statistics.insert(format!("{key}/{i}"), f64::from(*v));
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(statistics)
    }
}

impl Extension for ParameterStatistics {
    fn name(&self) -> &str {
        Self::DEFAULT_NAME
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn call(&mut self, manager: &mut dyn ManagerProtocol) -> Result<(), TrainingError> {
        let statistics = self.collect()?;
        self.summary.add(&statistics);

        if self.trigger.fire(&*manager) {
            let means = self.summary.compute_mean();
            debug!(
                "第{}次迭代：上报{}项参数统计",
                manager.iteration(),
                means.len()
            );
            manager.report(means);
            self.summary = DictSummary::new();
        }
        Ok(())
    }
}
