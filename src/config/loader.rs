// 配置加载器
// 处理配置文件加载和环境变量解析

use crate::config::ExtensionConfig;
use config::ConfigError;
use dotenvy::dotenv;
use extena_common::CommonError;
use std::sync::OnceLock;
use tracing::{info, warn};

/// 全局配置实例
static CONFIG: OnceLock<ExtensionConfig> = OnceLock::new();

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 初始化配置
    pub fn init() -> Result<&'static ExtensionConfig, CommonError> {
        // 加载 .env 文件
        if let Err(e) = dotenv() {
            warn!("无法加载 .env 文件: {}", e);
        }

        // 加载配置
        let config = ExtensionConfig::load().map_err(convert_config_error)?;

        // 验证配置
        config.validate()?;

        // 存储到全局变量
        CONFIG
            .set(config)
            .map_err(|_| CommonError::internal("配置已经初始化"))?;

        let config = CONFIG.get().expect("配置刚刚完成初始化");

        info!("配置加载成功");
        info!("注册调试模式: {}", config.registry.debug_registration);
        info!("日志级别: {}", config.logging.level);

        Ok(config)
    }

    /// 获取配置
    /// 未初始化时返回默认配置，便于库模式下按需使用
    pub fn get_or_default() -> ExtensionConfig {
        CONFIG.get().cloned().unwrap_or_default()
    }

    /// 获取配置
    pub fn get() -> &'static ExtensionConfig {
        CONFIG
            .get()
            .expect("配置未初始化，请先调用 ConfigLoader::init()")
    }
}

/// 转换 config 库错误
fn convert_config_error(error: ConfigError) -> CommonError {
    CommonError::configuration(&format!("配置加载失败: {}", error))
}
