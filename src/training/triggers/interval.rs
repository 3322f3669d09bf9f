use super::{Trigger, UnitLiteral};
use crate::training::ManagerProtocol;

/// 按固定间隔触发：每 `period` 个 iteration（或 epoch）的末尾触发一次
///
/// 第0次迭代（训练开始前）永不触发；`period`为0时同样永不触发。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTrigger {
    period: u64,
    unit: UnitLiteral,
}

impl IntervalTrigger {
    pub const fn new(period: u64, unit: UnitLiteral) -> Self {
        Self { period, unit }
    }

    pub const fn period(&self) -> u64 {
        self.period
    }

    pub const fn unit(&self) -> UnitLiteral {
        self.unit
    }
}

impl Trigger for IntervalTrigger {
    fn fire(&mut self, manager: &dyn ManagerProtocol) -> bool {
        self.may_fire(manager.iteration(), manager.iters_per_epoch())
    }

    fn may_fire(&self, iteration: u64, epoch_length: u64) -> bool {
        if iteration == 0 || self.period == 0 {
            return false;
        }
        match self.unit {
            // 跨度溢出时永不触发
            UnitLiteral::Epoch => self
                .period
                .checked_mul(epoch_length)
                .is_some_and(|span| span != 0 && iteration % span == 0),
            UnitLiteral::Iteration => iteration % self.period == 0,
        }
    }

    fn training_length(&self) -> Option<(u64, UnitLiteral)> {
        Some((self.period, self.unit))
    }
}
