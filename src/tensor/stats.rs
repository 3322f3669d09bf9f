/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量的归约统计量（均值、标准差、最值、零元素个数、百分位数）
 *
 * 除`count_zeros`外，对空张量的归约一律返回`TensorError::EmptyTensor`。
 * 累加在f64中进行，结果再转回f32。
 */

use super::Tensor;
use crate::errors::TensorError;

impl Tensor {
    fn ensure_not_empty(&self, operation: &'static str) -> Result<(), TensorError> {
        if self.is_empty() {
            Err(TensorError::EmptyTensor { operation })
        } else {
            Ok(())
        }
    }

    /// 所有元素的算术平均
    pub fn mean(&self) -> Result<f32, TensorError> {
        self.ensure_not_empty("mean")?;
        let sum: f64 = self.data.iter().map(|&x| f64::from(x)).sum();
        Ok((sum / self.size() as f64) as f32)
    }

    /// 无偏（分母为n-1）样本标准差；仅含1个元素时结果为NaN
    pub fn std(&self) -> Result<f32, TensorError> {
        let mean = f64::from(self.mean()?);
        let n = self.size() as f64;
        let squared: f64 = self
            .data
            .iter()
            .map(|&x| (f64::from(x) - mean).powi(2))
            .sum();
        Ok((squared / (n - 1.0)).sqrt() as f32)
    }

    /// 最小值；含NaN时结果为NaN
    pub fn min(&self) -> Result<f32, TensorError> {
        self.ensure_not_empty("min")?;
        Ok(self.fold_nan_aware(f32::INFINITY, f32::min))
    }

    /// 最大值；含NaN时结果为NaN
    pub fn max(&self) -> Result<f32, TensorError> {
        self.ensure_not_empty("max")?;
        Ok(self.fold_nan_aware(f32::NEG_INFINITY, f32::max))
    }

    /// 值恰为0的元素个数
    pub fn count_zeros(&self) -> usize {
        self.data.iter().filter(|&&x| x == 0.).count()
    }

    /// 按线性插值计算百分位数（`qs`中每项须在[0, 100]内），返回形状为`[qs.len()]`的向量
    pub fn percentile(&self, qs: &[f32]) -> Result<Self, TensorError> {
        self.ensure_not_empty("percentile")?;
        if let Some(&q) = qs.iter().find(|q| !(0.0..=100.0).contains(*q)) {
            return Err(TensorError::PercentileOutOfRange(q));
        }

        let mut sorted = self.to_vec();
        sorted.sort_by(f32::total_cmp);
        let last = (sorted.len() - 1) as f64;

        let values = qs
            .iter()
            .map(|&q| {
                let rank = f64::from(q) / 100.0 * last;
                let lower = rank.floor() as usize;
                let upper = rank.ceil() as usize;
                let weight = rank - lower as f64;
                let (a, b) = (f64::from(sorted[lower]), f64::from(sorted[upper]));
                (a + (b - a) * weight) as f32
            })
            .collect::<Vec<_>>();
        Ok(Self::from(values))
    }

    // `f32::min/max`会忽略NaN，这里需要让NaN传播出去
    fn fold_nan_aware(&self, init: f32, pick: fn(f32, f32) -> f32) -> f32 {
        self.data.iter().fold(init, |acc, &x| {
            if acc.is_nan() || x.is_nan() {
                f32::NAN
            } else {
                pick(acc, x)
            }
        })
    }
}
