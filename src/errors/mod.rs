// 错误处理模块
// 定义统一的错误类型和处理逻辑

pub mod types;


pub use types::*;
