// 组件解析器接口
// 类名到实例的解析由外部插件加载器负责，注册中心只缓存结果

use std::any::Any;
use std::sync::Arc;

use crate::errors::ExtensionError;
use crate::extensions::descriptor::ExtensionDescriptor;

/// 解析出的扩展实例
/// 携带解析器报告的具体类名，用于可赋值性判定，避免依赖反射
#[derive(Clone)]
pub struct ResolvedInstance {
    /// 实例对象
    pub instance: Arc<dyn Any + Send + Sync>,
    /// 实例的具体类名
    pub class_name: String,
}

impl ResolvedInstance {
    pub fn new(instance: Arc<dyn Any + Send + Sync>, class_name: impl Into<String>) -> Self {
        Self {
            instance,
            class_name: class_name.into(),
        }
    }

    /// 按具体类型取回实例
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.instance).downcast::<T>().ok()
    }

    /// 两个解析结果是否为同一实例
    pub fn same_instance(&self, other: &ResolvedInstance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for ResolvedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedInstance")
            .field("class_name", &self.class_name)
            .finish()
    }
}

/// 组件解析器
/// 外部类加载器的接缝：按贡献描述符实例化，并提供类型继承关系判定
pub trait ComponentResolver: Send + Sync {
    /// 将贡献描述符解析为可用实例
    /// 失败时返回 ResolutionFailure，由调用方决定跳过还是上报
    fn instantiate(
        &self,
        descriptor: &ExtensionDescriptor,
        declared_type: &str,
    ) -> Result<ResolvedInstance, ExtensionError>;

    /// 判定 candidate 类是否可赋值给 base 类
    /// 默认实现只认同名类型，继承关系由具体加载器提供
    fn is_assignable(&self, base: &str, candidate: &str) -> bool {
        base == candidate
    }
}
