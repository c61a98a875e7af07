// 通用错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通用错误类型
/// 跨包传递的最小错误载体，上层包负责转换为各自的错误枚举
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct CommonError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl CommonError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: &str, message: &str, details: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    /// 验证错误
    pub fn validation(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// 配置错误
    pub fn configuration(message: &str) -> Self {
        Self::new("CONFIGURATION_ERROR", message)
    }

    /// 内部错误
    pub fn internal(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
