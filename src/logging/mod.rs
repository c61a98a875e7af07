// 日志模块
// 基于 tracing 的结构化日志

pub mod setup;


pub use setup::*;
