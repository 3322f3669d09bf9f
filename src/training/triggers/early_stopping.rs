/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 早停触发器
 *
 * 每个检查区间内累积被监控的观测值；区间结束时取其均值与历史最优比较，
 * 连续`patience`次未刷新最优即触发。另设最大训练长度作为兜底。
 */

use log::{info, warn};

use super::{IntervalTrigger, Trigger, TriggerLike, UnitLiteral, get_trigger};
use crate::training::{DictSummary, ManagerProtocol};

/// 比较方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// 监控名含`accuracy`时按越大越好，否则按越小越好
    #[default]
    Auto,
    Min,
    Max,
}

pub struct EarlyStoppingTrigger {
    monitor: String,
    patience: u32,
    mode: Mode,
    verbose: bool,
    count: u32,
    best: Option<f64>,
    interval_trigger: Box<dyn Trigger>,
    max_trigger: IntervalTrigger,
    summary: DictSummary,
}

impl Default for EarlyStoppingTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl EarlyStoppingTrigger {
    /// 默认配置：每1个epoch检查一次`main/loss`，`patience`为3，最长100个epoch
    pub fn new() -> Self {
        Self {
            monitor: "main/loss".to_string(),
            patience: 3,
            mode: Mode::Auto,
            verbose: false,
            count: 0,
            best: None,
            interval_trigger: get_trigger(TriggerLike::Interval(1, UnitLiteral::Epoch)),
            max_trigger: IntervalTrigger::new(100, UnitLiteral::Epoch),
            summary: DictSummary::new(),
        }
    }

    pub fn monitor(mut self, monitor: &str) -> Self {
        self.monitor = monitor.to_string();
        self
    }

    pub fn patience(mut self, patience: u32) -> Self {
        self.patience = patience;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 比较当前值与最优值的区间
    pub fn check_trigger(mut self, trigger: TriggerLike) -> Self {
        self.interval_trigger = get_trigger(trigger);
        self
    }

    /// 训练长度上限
    pub fn max_trigger(mut self, period: u64, unit: UnitLiteral) -> Self {
        self.max_trigger = IntervalTrigger::new(period, unit);
        self
    }

    /// 当前最优值（尚未比较过时为 `None`）
    pub const fn best(&self) -> Option<f64> {
        self.best
    }

    /// 连续未刷新最优的检查次数
    pub const fn count(&self) -> u32 {
        self.count
    }

    fn greater_is_better(&self) -> bool {
        match self.mode {
            Mode::Max => true,
            Mode::Min => false,
            Mode::Auto => self.monitor.contains("accuracy"),
        }
    }

    fn is_improved(&self, current: f64) -> bool {
        if self.greater_is_better() {
            current > self.best.unwrap_or(f64::NEG_INFINITY)
        } else {
            current < self.best.unwrap_or(f64::INFINITY)
        }
    }
}

impl Trigger for EarlyStoppingTrigger {
    fn fire(&mut self, manager: &dyn ManagerProtocol) -> bool {
        let observed = manager.observation().get(&self.monitor).copied();
        if let Some(value) = observed {
            self.summary.add_scalar(&self.monitor, value);
        }

        if self.max_trigger.fire(manager) {
            return true;
        }

        if !self.interval_trigger.fire(manager) {
            return false;
        }

        if observed.is_none() {
            warn!("早停：观测值中没有`{}`", self.monitor);
            return false;
        }

        let current = self
            .summary
            .compute_mean()
            .get(&self.monitor)
            .copied()
            .unwrap_or(f64::NAN);
        self.summary = DictSummary::new();

        if self.is_improved(current) {
            self.best = Some(current);
            self.count = 0;
        } else {
            self.count += 1;
        }

        if self.count >= self.patience {
            if self.verbose {
                info!("Epoch {}: 早停", manager.epoch());
            }
            return true;
        }
        false
    }

    fn may_fire(&self, iteration: u64, epoch_length: u64) -> bool {
        self.interval_trigger.may_fire(iteration, epoch_length)
    }

    fn training_length(&self) -> Option<(u64, UnitLiteral)> {
        self.max_trigger.training_length()
    }
}
