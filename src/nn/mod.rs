/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 模型容器抽象：参数句柄与 Module trait
 */

mod module;
mod module_dict;
mod parameter;

pub use module::Module;
pub use module_dict::ModuleDict;
pub use parameter::{Init, Parameter};
