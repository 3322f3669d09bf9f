/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练扩展模块单元测试
 *
 * 测试按功能分组：
 * - reporting: Summary / DictSummary
 * - triggers: IntervalTrigger、get_trigger、UnitLiteral
 * - early_stopping: EarlyStoppingTrigger
 * - manager: ExtensionsManager 的调度顺序与停止条件
 * - parameter_statistics: 参数统计扩展
 * - config: 参数统计扩展的 JSON 配置
 */

mod parameter_statistics;

use crate::training::{ManagerProtocol, Observation};

/// 仅用于测试的管理器：手动设置迭代数与观测值
struct MockManager {
    iteration: u64,
    iters_per_epoch: u64,
    observation: Observation,
    reported: Vec<Observation>,
}

impl MockManager {
    fn new(iters_per_epoch: u64) -> Self {
        Self {
            iteration: 0,
            iters_per_epoch,
            observation: Observation::new(),
            reported: Vec::new(),
        }
    }

    /// 进入下一次迭代（清空观测值）
    fn step(&mut self) {
        self.iteration += 1;
        self.observation = Observation::new();
    }

    fn observe(&mut self, key: &str, value: f64) {
        self.observation.insert(key.to_string(), value);
    }
}

impl ManagerProtocol for MockManager {
    fn iteration(&self) -> u64 {
        self.iteration
    }

    fn iters_per_epoch(&self) -> u64 {
        self.iters_per_epoch
    }

    fn observation(&self) -> &Observation {
        &self.observation
    }

    fn report(&mut self, values: Observation) {
        self.observation.extend(values.clone());
        self.reported.push(values);
    }
}
