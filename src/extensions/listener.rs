// 扩展点生命周期监听器
// 变更回调在互斥区内收集、互斥区外执行，分优先与普通两级

use std::sync::Arc;

use extena_common::{AreaInstanceId, PluginDescriptor};

use crate::extensions::descriptor::ExtensionDescriptor;

/// 监听器层级
/// 同一批注销中，优先级监听器的回调先于普通监听器执行完毕
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTier {
    /// 关键清理，先执行
    Priority,
    /// 常规清理
    Ordinary,
}

/// 扩展点生命周期监听器
pub trait ExtensionPointListener: Send + Sync {
    /// 有贡献注册到扩展点
    fn extension_added(&self, _descriptor: &ExtensionDescriptor, _plugin: &PluginDescriptor) {}

    /// 有贡献从扩展点移除
    fn extension_removed(&self, _descriptor: &ExtensionDescriptor, _plugin: &PluginDescriptor) {}

    /// 所属区域被替换
    /// 只有区域感知的监听器需要覆盖此方法重新绑定，默认不做任何事
    /// 纯拆除场景（无替换区域）传入 None
    fn area_replaced(&self, _new_area: Option<AreaInstanceId>) {}
}

/// 延迟执行的监听器回调
/// 注册中心在持锁期间只收集回调，调用方在锁外统一触发，
/// 避免监听器代码再次进入注册中心时发生死锁
pub type ListenerCallback = Box<dyn FnOnce() + Send>;

/// 已注册监听器
pub(crate) struct RegisteredListener {
    pub listener: Arc<dyn ExtensionPointListener>,
    pub tier: ListenerTier,
}
