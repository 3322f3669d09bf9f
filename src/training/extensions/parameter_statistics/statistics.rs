/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 统计函数的类型定义与内置统计函数
 */

use crate::errors::TensorError;
use crate::tensor::Tensor;
use crate::training::TrainingError;

/// 统计函数：输入为展平后的一维张量，输出为标量或若干个标量组成的张量
pub type StatisticFn = Box<dyn Fn(&Tensor) -> Result<Tensor, TrainingError>>;

/// `percentile`统计量默认计算的百分位（正态分布下 ±3σ、±2σ、±1σ 及中位数对应的位置）
pub const DEFAULT_PERCENTILES: [f32; 7] = [0.13, 2.28, 15.87, 50.0, 84.13, 97.72, 99.87];

/// 默认统计量：`mean`、`std`、`min`、`max`、`zeros`（按此顺序）
pub fn default_statistics() -> Vec<(String, StatisticFn)> {
    let zeros: StatisticFn = scalar_statistic(|x: &Tensor| Ok(x.count_zeros() as f32));
    vec![
        ("mean".to_string(), scalar_statistic(Tensor::mean)),
        ("std".to_string(), scalar_statistic(Tensor::std)),
        ("min".to_string(), scalar_statistic(Tensor::min)),
        ("max".to_string(), scalar_statistic(Tensor::max)),
        ("zeros".to_string(), zeros),
    ]
}

/// 按名称取得内置统计函数；`percentile`使用 [`DEFAULT_PERCENTILES`]
pub fn builtin_statistic(name: &str) -> Result<StatisticFn, TrainingError> {
    let function: StatisticFn = match name {
        "mean" => scalar_statistic(Tensor::mean),
        "std" => scalar_statistic(Tensor::std),
        "min" => scalar_statistic(Tensor::min),
        "max" => scalar_statistic(Tensor::max),
        "zeros" => scalar_statistic(|x: &Tensor| Ok(x.count_zeros() as f32)),
        "percentile" => percentile(DEFAULT_PERCENTILES.to_vec()),
        other => return Err(TrainingError::UnknownStatistic(other.to_string())),
    };
    Ok(function)
}

/// 构造一个计算给定百分位的统计函数，每个百分位对应输出中的一个元素
pub fn percentile(qs: Vec<f32>) -> StatisticFn {
    Box::new(move |x: &Tensor| -> Result<Tensor, TrainingError> { Ok(x.percentile(&qs)?) })
}

fn scalar_statistic(reduce: fn(&Tensor) -> Result<f32, TensorError>) -> StatisticFn {
    Box::new(move |x: &Tensor| -> Result<Tensor, TrainingError> {
        Ok(Tensor::scalar(reduce(x)?))
    })
}
