/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Module trait 定义
 */

use super::Parameter;

/// 模块 trait
///
/// # 设计原则
/// - `named_parameters()` 是唯一必须实现的方法，返回 (参数名, 参数句柄) 列表
/// - 参数名在同一模块内应唯一；子模块参数名以 `.` 连接（如 `fc1.weight`）
/// - 返回的是句柄（Rc clone），调用方读取到的永远是参数的最新值/梯度
///
/// # 使用示例
///
/// ```ignore
/// use param_stats::nn::{Module, Parameter};
///
/// struct Affine {
///     weight: Parameter,
///     bias: Parameter,
/// }
///
/// impl Module for Affine {
///     fn named_parameters(&self) -> Vec<(String, Parameter)> {
///         vec![
///             ("weight".to_string(), self.weight.clone()),
///             ("bias".to_string(), self.bias.clone()),
///         ]
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有参数及其名称（顺序即遍历顺序）
    fn named_parameters(&self) -> Vec<(String, Parameter)>;

    /// 获取所有参数（不含名称）
    fn parameters(&self) -> Vec<Parameter> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.named_parameters().len()
    }
}
