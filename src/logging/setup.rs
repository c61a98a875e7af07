// 日志系统设置

use crate::config::LoggingConfig;
use anyhow::Result;

use tracing_subscriber::EnvFilter;

/// 日志系统初始化器
pub struct LoggingSetup;

impl LoggingSetup {
    /// 初始化日志系统
    pub fn init(config: &LoggingConfig) -> Result<()> {
        // 创建环境过滤器
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // 根据配置创建订阅器
        match config.format.as_str() {
            "json" => {
                let subscriber = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            "pretty" => {
                let subscriber = tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            "compact" => {
                let subscriber = tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            _ => {
                let subscriber = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }

        tracing::info!("日志系统初始化完成");
        tracing::info!("日志级别: {}", config.level);
        tracing::info!("日志格式: {}", config.format);

        if config.file_enabled {
            tracing::info!("文件日志已启用: {:?}", config.file_path);
        }

        Ok(())
    }

    /// 测试环境初始化
    /// 重复调用安全，失败时静默忽略（可能已有全局订阅器）
    pub fn init_for_tests() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    }
}
