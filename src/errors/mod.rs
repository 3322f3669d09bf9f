/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量层面的错误类型
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    #[error("数据长度{data_len}与形状{shape:?}不匹配（形状元素乘积为{expected}）")]
    ShapeDataMismatch {
        data_len: usize,
        shape: Vec<usize>,
        expected: usize,
    },
    // 归约运算（mean、min等）作用于空张量
    #[error("无法对空张量执行`{operation}`")]
    EmptyTensor { operation: &'static str },
    #[error("百分位数须在[0, 100]范围内，实际为{0}")]
    PercentileOutOfRange(f32),
}
