/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : ModuleDict - 按插入顺序保存自有参数与具名子模块的通用容器
 */

use std::rc::Rc;

use super::{Module, Parameter};

/// 通用模块容器
///
/// 遍历顺序：先自有参数（按注册顺序），再依次深度优先遍历子模块。
/// 子模块参数名形如 `{子模块名}.{参数名}`。
#[derive(Default)]
pub struct ModuleDict {
    params: Vec<(String, Parameter)>,
    children: Vec<(String, Rc<dyn Module>)>,
}

impl ModuleDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册自有参数；同名参数会被替换（保留原位置）
    pub fn add_parameter(&mut self, name: &str, param: Parameter) -> &mut Self {
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = param,
            None => self.params.push((name.to_string(), param)),
        }
        self
    }

    /// 注册子模块；同名子模块会被替换（保留原位置）
    pub fn add_module(&mut self, name: &str, module: Rc<dyn Module>) -> &mut Self {
        match self.children.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = module,
            None => self.children.push((name.to_string(), module)),
        }
        self
    }

    pub fn get_parameter(&self, name: &str) -> Option<Parameter> {
        self.named_parameters()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }
}

impl Module for ModuleDict {
    fn named_parameters(&self) -> Vec<(String, Parameter)> {
        let mut named = self.params.clone();
        for (child_name, child) in &self.children {
            named.extend(
                child
                    .named_parameters()
                    .into_iter()
                    .map(|(name, p)| (format!("{child_name}.{name}"), p)),
            );
        }
        named
    }
}
