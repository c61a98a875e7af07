// 注册中心设置和配置
// 定义配置结构体和加载逻辑

use config::{Config, ConfigError, Environment, File};
use extena_common::CommonError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 注册中心配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub registry: RegistrySettings,
    pub logging: LoggingConfig,
}

/// 注册表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// 是否记录注册调用栈快照
    /// 仅用于调试重复注册问题，生产模式必须关闭（每次注册都会产生开销）
    pub debug_registration: bool,
    /// 类匹配是否启用严格模式
    pub strict_class_check: bool,
    /// 单个区域允许的最大扩展点数量
    pub max_points: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 日志格式: json / pretty / compact / full
    pub format: String,
    /// 是否启用文件日志
    pub file_enabled: bool,
    /// 日志文件路径
    pub file_path: Option<String>,
}

impl ExtensionConfig {
    /// 加载配置
    /// 优先级: 环境变量 > 配置文件 > 默认值
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::builder();

        // 1. 加载默认配置
        config = config.add_source(Config::try_from(&ExtensionConfig::default())?);

        // 2. 尝试加载配置文件
        if Path::new("extena.toml").exists() {
            config = config.add_source(File::with_name("extena"));
        }

        // 3. 加载环境变量（优先级最高）
        config = config.add_source(
            Environment::with_prefix("EXTENA")
                .prefix_separator("_")
                .separator("__"),
        );

        // 4. 构建并反序列化
        let config = config.build()?;
        config.try_deserialize()
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), CommonError> {
        use crate::config::ConfigValidator;

        match ConfigValidator::validate_all(self) {
            Ok(()) => Ok(()),
            Err(errors) => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Err(CommonError::configuration(&format!(
                    "配置验证失败: {}",
                    messages.join("; ")
                )))
            }
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            registry: RegistrySettings {
                debug_registration: false,
                strict_class_check: true,
                max_points: 4096,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "full".to_string(),
                file_enabled: false,
                file_path: None,
            },
        }
    }
}
