// 统一错误类型定义

use extena_common::CommonError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extena 统一错误类型
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error_type", content = "details")]
pub enum ExtensionError {
    /// 扩展点重复注册
    /// 两个插件声明了同名扩展点，属于插件打包错误，绝不静默解决
    #[error("扩展点重复注册: '{point}' 首次注册于 {first_plugin}，再次注册于 {second_plugin}")]
    DuplicateRegistration {
        point: String,
        first_plugin: String,
        second_plugin: String,
    },

    /// 扩展点不存在
    /// 按名称查找失败，默认视为调用方代码错误
    #[error("扩展点不存在: '{point}'（容器: {area}）")]
    MissingExtensionPoint { point: String, area: String },

    /// 贡献实例化失败
    /// 单个贡献无法解析为可用实例，局部恢复，不中断整体查询
    #[error("扩展实例化失败: 扩展点 '{point}' 的实现 '{implementation}' - {message}")]
    ResolutionFailure {
        point: String,
        implementation: String,
        message: String,
    },

    /// 声明验证错误
    #[error("声明验证错误: {field} - {message}")]
    Validation { field: String, message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal { message: String },
}

impl ExtensionError {
    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
            Self::MissingExtensionPoint { .. } => "MISSING_EXTENSION_POINT",
            Self::ResolutionFailure { .. } => "RESOLUTION_FAILURE",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// 是否为致命错误
    /// 致命错误表示插件打包或调用方代码问题，注册操作必须整体失败
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::DuplicateRegistration { .. } => true,
            Self::MissingExtensionPoint { .. } => true,
            Self::ResolutionFailure { .. } => false,
            Self::Validation { .. } => true,
            Self::Configuration { .. } => true,
            Self::Internal { .. } => true,
        }
    }

    /// 是否应该记录错误日志
    pub fn should_log(&self) -> bool {
        match self {
            Self::Validation { .. } => false,
            _ => true,
        }
    }

    /// 创建重复注册错误
    pub fn duplicate_registration(
        point: impl Into<String>,
        first_plugin: impl Into<String>,
        second_plugin: impl Into<String>,
    ) -> Self {
        Self::DuplicateRegistration {
            point: point.into(),
            first_plugin: first_plugin.into(),
            second_plugin: second_plugin.into(),
        }
    }

    /// 创建扩展点缺失错误
    pub fn missing_extension_point(point: impl Into<String>, area: impl Into<String>) -> Self {
        Self::MissingExtensionPoint {
            point: point.into(),
            area: area.into(),
        }
    }

    /// 创建实例化失败错误
    pub fn resolution_failure(
        point: impl Into<String>,
        implementation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ResolutionFailure {
            point: point.into(),
            implementation: implementation.into(),
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<CommonError> for ExtensionError {
    fn from(error: CommonError) -> Self {
        match error.code.as_str() {
            "VALIDATION_ERROR" => Self::Validation {
                field: "common".to_string(),
                message: error.message,
            },
            "CONFIGURATION_ERROR" => Self::Configuration {
                message: error.message,
            },
            _ => Self::Internal {
                message: error.message,
            },
        }
    }
}
