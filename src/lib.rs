// Extena 扩展点注册中心
// 导出主要模块供宿主应用和测试使用

pub mod config;
pub mod errors;
pub mod extensions;
pub mod logging;

pub use extensions::*;
