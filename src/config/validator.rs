// 配置验证器
// 提供详细的配置验证逻辑

use crate::config::{ExtensionConfig, LoggingConfig, RegistrySettings};
use extena_common::CommonError;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证完整配置
    pub fn validate_all(config: &ExtensionConfig) -> Result<(), Vec<CommonError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_registry(&config.registry) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// 验证注册表配置
    pub fn validate_registry(settings: &RegistrySettings) -> Result<(), CommonError> {
        if settings.max_points == 0 {
            return Err(CommonError::validation("max_points 必须大于 0"));
        }

        Ok(())
    }

    /// 验证日志配置
    pub fn validate_logging(logging: &LoggingConfig) -> Result<(), CommonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&logging.level.as_str()) {
            return Err(CommonError::validation(&format!(
                "无效的日志级别: {}",
                logging.level
            )));
        }

        let valid_formats = ["json", "pretty", "compact", "full"];
        if !valid_formats.contains(&logging.format.as_str()) {
            return Err(CommonError::validation(&format!(
                "无效的日志格式: {}",
                logging.format
            )));
        }

        if logging.file_enabled && logging.file_path.is_none() {
            return Err(CommonError::validation("启用文件日志时必须指定 file_path"));
        }

        Ok(())
    }
}
