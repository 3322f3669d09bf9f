/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 扩展 trait 及调用优先级
 */

use super::{ManagerProtocol, TrainingError, TriggerLike, UnitLiteral};

/// 会上报/写入观测值的扩展，最先执行
pub const PRIORITY_WRITER: i32 = 300;
/// 会修改观测值的扩展
pub const PRIORITY_EDITOR: i32 = 200;
/// 只读取观测值的扩展，最后执行
pub const PRIORITY_READER: i32 = 100;

/// 扩展 trait
///
/// 管理器每次迭代结束时先评估扩展的 `trigger()`，触发时才调用 `call()`；
/// 同一迭代内多个扩展按 `priority()` 从高到低依次执行。
pub trait Extension {
    /// 注册到管理器时使用的默认名称
    fn name(&self) -> &str;

    fn priority(&self) -> i32 {
        PRIORITY_READER
    }

    /// 管理器调用该扩展的频率，默认每个 iteration 一次
    fn trigger(&self) -> TriggerLike {
        TriggerLike::Interval(1, UnitLiteral::Iteration)
    }

    fn call(&mut self, manager: &mut dyn ManagerProtocol) -> Result<(), TrainingError>;
}
