/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 扩展管理器：维护迭代进度与观测值，并在每次迭代后调度各扩展
 */

use log::{debug, trace};

use super::{
    Extension, Observation, TrainingError, Trigger, TriggerLike, UnitLiteral, get_trigger,
};

/// 扩展与触发器所能看到的管理器接口
pub trait ManagerProtocol {
    /// 已完成的迭代数（训练开始前为0）
    fn iteration(&self) -> u64;

    /// 每个 epoch 包含的迭代数
    fn iters_per_epoch(&self) -> u64;

    /// 已完成的 epoch 数
    fn epoch(&self) -> u64 {
        self.iteration() / self.iters_per_epoch().max(1)
    }

    /// 以小数表示的 epoch 进度
    fn epoch_detail(&self) -> f64 {
        self.iteration() as f64 / self.iters_per_epoch().max(1) as f64
    }

    /// 当前迭代的观测值
    fn observation(&self) -> &Observation;

    /// 将一组值并入当前迭代的观测值（同名键后写覆盖先写）
    fn report(&mut self, values: Observation);
}

struct ExtensionEntry {
    name: String,
    trigger: Box<dyn Trigger>,
    extension: Box<dyn Extension>,
}

/// 扩展管理器
///
/// 每次 `run_iteration()`：
/// 1. 迭代数加1，清空观测值；
/// 2. 执行用户的训练步（可向观测值写入 loss 等）；
/// 3. 按优先级从高到低，调用自身触发器触发了的扩展。
pub struct ExtensionsManager {
    iteration: u64,
    iters_per_epoch: u64,
    observation: Observation,
    stop_trigger: Box<dyn Trigger>,
    extensions: Vec<ExtensionEntry>,
}

impl ExtensionsManager {
    /// 训练`max_epochs`个epoch后停止，每个epoch含`iters_per_epoch`次迭代
    pub fn new(max_epochs: u64, iters_per_epoch: u64) -> Result<Self, TrainingError> {
        if iters_per_epoch == 0 {
            return Err(TrainingError::InvalidArgument(
                "iters_per_epoch须大于0".to_string(),
            ));
        }
        Ok(Self {
            iteration: 0,
            iters_per_epoch,
            observation: Observation::new(),
            stop_trigger: get_trigger(TriggerLike::Interval(max_epochs, UnitLiteral::Epoch)),
            extensions: Vec::new(),
        })
    }

    /// 替换停止条件（如改用早停触发器）
    pub fn set_stop_trigger(&mut self, trigger: TriggerLike) -> &mut Self {
        self.stop_trigger = get_trigger(trigger);
        self
    }

    /// 注册扩展，返回实际使用的名称（重名时追加`_1`、`_2`...后缀）
    pub fn extend(&mut self, extension: impl Extension + 'static) -> String {
        let base = extension.name().to_string();
        let mut name = base.clone();
        let mut suffix = 1;
        while self.extensions.iter().any(|e| e.name == name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }

        let entry = ExtensionEntry {
            name: name.clone(),
            trigger: get_trigger(extension.trigger()),
            extension: Box::new(extension),
        };
        self.extensions.push(entry);
        // 稳定排序：同优先级保持注册顺序
        self.extensions
            .sort_by_key(|e| std::cmp::Reverse(e.extension.priority()));
        debug!("注册扩展`{name}`");
        name
    }

    /// 已注册扩展的名称（按执行顺序）
    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name.as_str()).collect()
    }

    /// 执行一次迭代：用户训练步 + 扩展调度
    pub fn run_iteration<F>(&mut self, step: F) -> Result<(), TrainingError>
    where
        F: FnOnce(&mut Observation) -> Result<(), TrainingError>,
    {
        self.iteration += 1;
        self.observation = Observation::new();
        step(&mut self.observation)?;
        trace!("第{}次迭代完成，开始调度扩展", self.iteration);

        let mut entries = std::mem::take(&mut self.extensions);
        let result = self.run_extensions(&mut entries);
        self.extensions = entries;
        result
    }

    fn run_extensions(&mut self, entries: &mut [ExtensionEntry]) -> Result<(), TrainingError> {
        for entry in entries.iter_mut() {
            if entry.trigger.fire(&*self) {
                trace!("调用扩展`{}`", entry.name);
                entry.extension.call(self)?;
            }
        }
        Ok(())
    }

    /// 评估停止条件（会推进有状态停止触发器的内部状态，每次迭代后调用一次即可）
    pub fn is_stopped(&mut self) -> bool {
        let mut trigger = std::mem::replace(
            &mut self.stop_trigger,
            get_trigger(TriggerLike::Never),
        );
        let stopped = trigger.fire(&*self);
        self.stop_trigger = trigger;
        stopped
    }

    /// 停止触发器隐含的训练长度
    pub fn training_length(&self) -> Option<(u64, UnitLiteral)> {
        self.stop_trigger.training_length()
    }
}

impl ManagerProtocol for ExtensionsManager {
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
        self.observation.extend(values);
    }
}
