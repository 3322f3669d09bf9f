/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 触发器：根据管理器的迭代进度（及观测值）决定某动作本次是否执行
 */

mod early_stopping;
mod interval;

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::Deserialize;

pub use early_stopping::{EarlyStoppingTrigger, Mode};
pub use interval::IntervalTrigger;

use super::{ManagerProtocol, TrainingError};

/// 触发器 trait
///
/// 触发器是有状态的：每次调用 `fire()` 都可能更新其内部状态（如早停的计数），
/// 因此同一个触发器实例只应服务于一个调用方。
pub trait Trigger {
    /// 本次是否触发
    fn fire(&mut self, manager: &dyn ManagerProtocol) -> bool;

    /// 在给定迭代处是否有可能触发（不改变状态）；无法预知时返回 `true`
    fn may_fire(&self, _iteration: u64, _epoch_length: u64) -> bool {
        true
    }

    /// 若该触发器隐含了训练总长度，返回 `(数量, 单位)`
    fn training_length(&self) -> Option<(u64, UnitLiteral)> {
        None
    }
}

/// 任意 `FnMut(&dyn ManagerProtocol) -> bool` 闭包都可直接作为触发器
impl<F> Trigger for F
where
    F: FnMut(&dyn ManagerProtocol) -> bool,
{
    fn fire(&mut self, manager: &dyn ManagerProtocol) -> bool {
        self(manager)
    }
}

/// 触发器的时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitLiteral {
    Epoch,
    Iteration,
}

impl Display for UnitLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self {
            Self::Epoch => "epoch",
            Self::Iteration => "iteration",
        };
        write!(f, "{unit}")
    }
}

impl FromStr for UnitLiteral {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epoch" => Ok(Self::Epoch),
            "iteration" => Ok(Self::Iteration),
            other => Err(TrainingError::UnknownUnit(other.to_string())),
        }
    }
}

/// 触发器的各种描述方式，由 [`get_trigger`] 统一解析为触发器对象
pub enum TriggerLike {
    /// 从不触发
    Never,
    /// 每 `period` 个 `unit` 触发一次
    Interval(u64, UnitLiteral),
    /// 自定义触发器
    Custom(Box<dyn Trigger>),
}

impl TriggerLike {
    pub fn custom(trigger: impl Trigger + 'static) -> Self {
        Self::Custom(Box::new(trigger))
    }
}

impl From<(u64, UnitLiteral)> for TriggerLike {
    fn from((period, unit): (u64, UnitLiteral)) -> Self {
        Self::Interval(period, unit)
    }
}

impl TryFrom<(u64, &str)> for TriggerLike {
    type Error = TrainingError;

    fn try_from((period, unit): (u64, &str)) -> Result<Self, Self::Error> {
        Ok(Self::Interval(period, unit.parse()?))
    }
}

impl From<IntervalTrigger> for TriggerLike {
    fn from(trigger: IntervalTrigger) -> Self {
        Self::custom(trigger)
    }
}

impl From<EarlyStoppingTrigger> for TriggerLike {
    fn from(trigger: EarlyStoppingTrigger) -> Self {
        Self::custom(trigger)
    }
}

struct NeverFireTrigger;

impl Trigger for NeverFireTrigger {
    fn fire(&mut self, _manager: &dyn ManagerProtocol) -> bool {
        false
    }

    fn may_fire(&self, _iteration: u64, _epoch_length: u64) -> bool {
        false
    }
}

/// 将触发器描述解析为（有状态的）触发器对象
pub fn get_trigger(trigger: TriggerLike) -> Box<dyn Trigger> {
    match trigger {
        TriggerLike::Never => Box::new(NeverFireTrigger),
        TriggerLike::Interval(period, unit) => Box::new(IntervalTrigger::new(period, unit)),
        TriggerLike::Custom(trigger) => trigger,
    }
}
