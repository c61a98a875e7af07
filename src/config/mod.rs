// 配置管理模块
// 处理注册中心配置和环境变量

pub mod settings;
pub mod loader;
pub mod validator;

#[cfg(test)]
mod tests;

pub use settings::*;
pub use loader::*;
pub use validator::*;
