// 通用类型定义

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 插件 ID
/// 插件的全局唯一标识符，通常来自插件清单中声明的 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 插件描述符
/// 由外部加载器在解析插件清单后构造，注册中心只读取其身份信息
#[derive(Debug, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// 插件 ID
    pub id: PluginId,
    /// 插件版本
    pub version: String,
    /// 插件安装路径
    pub path: Option<PathBuf>,
    /// 加载时间
    pub loaded_at: DateTime<Utc>,
}

impl PluginDescriptor {
    /// 创建新的插件描述符
    pub fn new(id: impl Into<PluginId>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            version: "0.0.0".to_string(),
            path: None,
            loaded_at: Utc::now(),
        })
    }

    /// 创建带版本和路径的插件描述符
    pub fn with_source(
        id: impl Into<PluginId>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            version: version.into(),
            path: Some(path.into()),
            loaded_at: Utc::now(),
        })
    }

    /// 诊断信息中使用的插件来源描述（ID 加安装路径）
    pub fn source_label(&self) -> String {
        match &self.path {
            Some(path) => format!("{} ({})", self.id, path.display()),
            None => self.id.to_string(),
        }
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// 区域实例 ID
/// 每个容器区域实例在创建时分配，区域替换后新旧实例可区分
pub type AreaInstanceId = Uuid;

/// 扩展点名称类型
pub type ExtensionPointName = String;
