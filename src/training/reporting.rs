/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 上报值的容器与按键累积均值的汇总器
 */

use std::collections::BTreeMap;

/// 一次上报的扁平映射：上报键 → 数值
pub type Observation = BTreeMap<String, f64>;

/// 单个标量的在线汇总：累积加权和、加权平方和与总权重
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    x: f64,
    x2: f64,
    n: f64,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        self.add_weighted(value, 1.0);
    }

    pub fn add_weighted(&mut self, value: f64, weight: f64) {
        self.x += value * weight;
        self.x2 += value * value * weight;
        self.n += weight;
    }

    /// 加权均值；尚未加入任何值时为 `None`
    pub fn compute_mean(&self) -> Option<f64> {
        (self.n > 0.0).then(|| self.x / self.n)
    }

    /// (均值, 总体标准差)
    pub fn make_statistics(&self) -> Option<(f64, f64)> {
        let mean = self.compute_mean()?;
        let var = self.x2 / self.n - mean * mean;
        Some((mean, var.max(0.0).sqrt()))
    }
}

/// 按键分别汇总的字典
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictSummary {
    summaries: BTreeMap<String, Summary>,
}

impl DictSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将一次上报中的每个键值并入对应的汇总
    pub fn add(&mut self, observation: &Observation) {
        for (key, &value) in observation {
            self.add_scalar(key, value);
        }
    }

    pub fn add_scalar(&mut self, key: &str, value: f64) {
        self.summaries
            .entry(key.to_string())
            .or_default()
            .add(value);
    }

    /// 每个键的累积均值
    pub fn compute_mean(&self) -> Observation {
        self.summaries
            .iter()
            .filter_map(|(key, s)| s.compute_mean().map(|mean| (key.clone(), mean)))
            .collect()
    }

    /// 每个键的均值，外加`{键}.std`形式的标准差
    pub fn make_statistics(&self) -> Observation {
        let mut stats = Observation::new();
        for (key, summary) in &self.summaries {
            if let Some((mean, std)) = summary.make_statistics() {
                stats.insert(key.clone(), mean);
                stats.insert(format!("{key}.std"), std);
            }
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
