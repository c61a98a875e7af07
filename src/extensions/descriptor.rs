// 扩展点声明和贡献描述符
// 由外部清单加载器解析产出，注册中心只消费这些结构体

use serde::{Deserialize, Serialize};

use crate::errors::ExtensionError;

/// 扩展点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionPointKind {
    /// 声明式数据 Bean，无多态行为
    Data,
    /// 多态接口实现，支持按类查找和实例缓存
    Interface,
}

/// 扩展点声明
/// 插件清单中一条扩展点定义的加载结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionPointDescriptor {
    /// 扩展点唯一名称（通常为插件 ID 加限定名）
    pub name: String,
    /// 贡献必须符合的类型名称
    pub declared_type: String,
    /// 扩展点种类
    pub kind: ExtensionPointKind,
    /// 是否为动态扩展点
    /// 动态扩展点允许在插件正常装卸流程之外注册和注销
    #[serde(default)]
    pub dynamic: bool,
}

impl ExtensionPointDescriptor {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        kind: ExtensionPointKind,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            kind,
            dynamic: false,
        }
    }

    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// 验证声明完整性
    pub fn validate(&self) -> Result<(), ExtensionError> {
        if self.name.is_empty() {
            return Err(ExtensionError::validation("name", "扩展点名称不能为空"));
        }

        if self.declared_type.is_empty() {
            return Err(ExtensionError::validation(
                "declared_type",
                format!("扩展点 '{}' 未指定贡献类型", self.name),
            ));
        }

        Ok(())
    }
}

/// 贡献描述符
/// 一个插件向某个扩展点提交的一条具体贡献
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// 实现类名称（INTERFACE 扩展点）或 Bean 类名称（DATA 扩展点）
    pub implementation: String,
    /// 加载器已解析的优先级元数据，注册中心不再重排
    #[serde(default)]
    pub ordering: i32,
    /// 声明式属性载荷
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ExtensionDescriptor {
    pub fn new(implementation: impl Into<String>) -> Self {
        Self {
            implementation: implementation.into(),
            ordering: 0,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_ordering(mut self, ordering: i32) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_validation() {
        let descriptor =
            ExtensionPointDescriptor::new("com.example.handler", "Handler", ExtensionPointKind::Interface);
        assert!(descriptor.validate().is_ok());

        let missing_type = ExtensionPointDescriptor::new("com.example.handler", "", ExtensionPointKind::Data);
        assert!(missing_type.validate().is_err());

        let missing_name = ExtensionPointDescriptor::new("", "Handler", ExtensionPointKind::Interface);
        assert!(missing_name.validate().is_err());
    }

    #[test]
    fn test_extension_descriptor_attributes() {
        let descriptor = ExtensionDescriptor::new("com.example.FooHandler")
            .with_ordering(10)
            .with_attribute("language", serde_json::json!("rust"));

        assert_eq!(descriptor.ordering, 10);
        assert_eq!(
            descriptor.attributes.get("language"),
            Some(&serde_json::json!("rust"))
        );
    }

    #[test]
    fn test_manifest_deserialization() {
        // 加载器传入的 JSON 形式声明
        let raw = r#"{"name":"com.example.svc","declared_type":"Service","kind":"interface"}"#;
        let descriptor: ExtensionPointDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(descriptor.kind, ExtensionPointKind::Interface);
        assert!(!descriptor.dynamic);
    }
}
