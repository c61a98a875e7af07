// 配置系统测试

#[cfg(test)]
mod tests {
    use crate::config::*;

    #[test]
    fn test_default_config() {
        let config = ExtensionConfig::default();

        assert!(!config.registry.debug_registration);
        assert!(config.registry.strict_class_check);
        assert_eq!(config.registry.max_points, 4096);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "full");
    }

    #[test]
    fn test_config_validation() {
        let config = ExtensionConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = ExtensionConfig::default();

        // 测试无效的扩展点上限
        config.registry.max_points = 0;
        assert!(config.validate().is_err());

        // 重置上限，测试无效的日志级别
        config.registry.max_points = 4096;
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        // 重置级别，测试无效的日志格式
        config.logging.level = "debug".to_string();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_logging_requires_path() {
        let mut config = ExtensionConfig::default();
        config.logging.file_enabled = true;
        config.logging.file_path = None;
        assert!(config.validate().is_err());

        config.logging.file_path = Some("extena.log".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_or_default_without_init() {
        // 未初始化时返回默认配置而不是 panic
        let config = ConfigLoader::get_or_default();
        assert!(!config.registry.debug_registration);
    }
}
