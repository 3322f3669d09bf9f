/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Parameter - 可训练参数句柄（值 + 可选梯度）
 *
 * 与训练循环、统计扩展等多方共享同一份参数，故采用 Rc<RefCell<..>> 句柄：
 * clone 只增加引用计数，任何一方写入的值/梯度其余各方立即可见。
 */

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::tensor::Tensor;

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        let fan_in = shape.first().copied().unwrap_or(1).max(1);
        match self {
            Self::Constant(v) => {
                let len = shape.iter().product::<usize>();
                Tensor::new(&vec![*v; len], shape)
            }
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::new_normal(*mean, *std, shape),
            Self::Kaiming => Tensor::new_normal(0.0, (2.0 / fan_in as f32).sqrt(), shape),
            Self::Xavier => {
                let fan_out = shape.get(1).copied().unwrap_or(1);
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::new_normal(0.0, std, shape)
            }
        }
    }
}

#[derive(Debug)]
struct ParameterInner {
    data: Tensor,
    grad: Option<Tensor>,
}

/// 可训练参数句柄
///
/// - `data`：参数值，始终存在
/// - `grad`：梯度，反向传播之前（或被清空之后）为 `None`
#[derive(Clone)]
pub struct Parameter {
    inner: Rc<RefCell<ParameterInner>>,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Parameter")
            .field("shape", &inner.data.shape())
            .field("has_grad", &inner.grad.is_some())
            .finish()
    }
}

impl Parameter {
    pub fn new(data: Tensor) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ParameterInner { data, grad: None })),
        }
    }

    /// 按初始化策略创建指定形状的参数
    pub fn with_init(shape: &[usize], init: &Init) -> Self {
        Self::new(init.generate(shape))
    }

    /// 参数值（借用期间不可写入）
    pub fn data(&self) -> Ref<'_, Tensor> {
        Ref::map(self.inner.borrow(), |inner| &inner.data)
    }

    /// 参数梯度；尚未计算时为 `None`
    pub fn grad(&self) -> Option<Ref<'_, Tensor>> {
        Ref::filter_map(self.inner.borrow(), |inner| inner.grad.as_ref()).ok()
    }

    pub fn set_data(&self, data: Tensor) {
        self.inner.borrow_mut().data = data;
    }

    pub fn set_grad(&self, grad: Tensor) {
        self.inner.borrow_mut().grad = Some(grad);
    }

    /// 将梯度置为与参数同形状的全零张量
    pub fn zero_grad(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.grad = Some(Tensor::zeros(inner.data.shape()));
    }

    /// 丢弃梯度（回到未计算状态）
    pub fn clear_grad(&self) {
        self.inner.borrow_mut().grad = None;
    }

    pub fn shape(&self) -> Vec<usize> {
        self.inner.borrow().data.shape().to_vec()
    }

    pub fn size(&self) -> usize {
        self.inner.borrow().data.size()
    }

    /// 两个句柄是否指向同一个参数
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
