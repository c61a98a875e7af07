// 扩展点
// 持有一个扩展点的身份、贡献列表和生命周期监听器
// DATA 与 INTERFACE 两种变体共用此类型，由 kind 标签区分

use std::sync::Arc;

use extena_common::{AreaInstanceId, PluginDescriptor, PluginId};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::extensions::descriptor::{
    ExtensionDescriptor, ExtensionPointDescriptor, ExtensionPointKind,
};
use crate::extensions::listener::{
    ExtensionPointListener, ListenerCallback, ListenerTier, RegisteredListener,
};
use crate::extensions::resolver::{ComponentResolver, ResolvedInstance};

/// 类匹配严格程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// 只接受实例类型可赋值给目标类的贡献
    Strict,
    /// 兼容旧调用方：目标类与实例类型任一方向可赋值即匹配
    Lenient,
}

/// 已安装的贡献
/// 实例按需解析并缓存在贡献上，重复查找返回同一实例
struct Contribution {
    descriptor: ExtensionDescriptor,
    plugin: Arc<PluginDescriptor>,
    instance: Option<ResolvedInstance>,
}

/// 扩展点内部状态
/// 单个扩展点的贡献变更必须串行，不同扩展点可完全并行
struct PointState {
    contributions: Vec<Contribution>,
    listeners: Vec<RegisteredListener>,
}

/// 扩展点
pub struct ExtensionPoint {
    /// 唯一名称，注册后不可变
    name: String,
    /// 贡献必须符合的类型名称
    declared_type: String,
    /// 扩展点种类
    kind: ExtensionPointKind,
    /// 声明此扩展点的插件，仅用于诊断信息
    plugin: Arc<PluginDescriptor>,
    /// 是否为动态扩展点
    dynamic: bool,
    /// 当前归属的区域实例
    owner: RwLock<Option<AreaInstanceId>>,
    /// 贡献与监听器状态
    state: RwLock<PointState>,
}

impl ExtensionPoint {
    /// 从声明创建扩展点
    pub fn new(descriptor: &ExtensionPointDescriptor, plugin: Arc<PluginDescriptor>) -> Self {
        Self {
            name: descriptor.name.clone(),
            declared_type: descriptor.declared_type.clone(),
            kind: descriptor.kind,
            plugin,
            dynamic: descriptor.dynamic,
            owner: RwLock::new(None),
            state: RwLock::new(PointState {
                contributions: Vec::new(),
                listeners: Vec::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn kind(&self) -> ExtensionPointKind {
        self.kind
    }

    pub fn plugin(&self) -> &Arc<PluginDescriptor> {
        &self.plugin
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn owner(&self) -> Option<AreaInstanceId> {
        *self.owner.read()
    }

    /// 设置归属区域
    /// 批量注册时由注册表调用，对应区域继承模板扩展点的场景
    pub fn set_owner(&self, area: AreaInstanceId) {
        *self.owner.write() = Some(area);
    }

    /// 当前安装的贡献数量
    pub fn extension_count(&self) -> usize {
        self.state.read().contributions.len()
    }

    /// 当前安装的贡献描述符快照
    pub fn extensions_list(&self) -> Vec<ExtensionDescriptor> {
        self.state
            .read()
            .contributions
            .iter()
            .map(|c| c.descriptor.clone())
            .collect()
    }

    /// 注册监听器
    pub fn add_listener(&self, listener: Arc<dyn ExtensionPointListener>, tier: ListenerTier) {
        self.state
            .write()
            .listeners
            .push(RegisteredListener { listener, tier });
    }

    /// 注册一批贡献
    /// 保持加载器解析出的声明顺序，不做重排；
    /// "added" 回调追加到调用方提供的输出列表，由调用方在锁外触发
    pub fn register_extensions(
        &self,
        descriptors: Vec<ExtensionDescriptor>,
        plugin: &Arc<PluginDescriptor>,
        mut callbacks_out: Option<&mut Vec<ListenerCallback>>,
    ) {
        if descriptors.is_empty() {
            return;
        }

        let mut state = self.state.write();
        debug!(
            "扩展点 '{}' 注册 {} 个贡献（插件: {}）",
            self.name,
            descriptors.len(),
            plugin.id
        );

        for descriptor in descriptors {
            if let Some(callbacks) = callbacks_out.as_mut() {
                Self::collect_added_callbacks(&state.listeners, &descriptor, plugin, callbacks);
            }
            state.contributions.push(Contribution {
                descriptor,
                plugin: Arc::clone(plugin),
                instance: None,
            });
        }
    }

    /// 注销指定插件的一批贡献
    /// 未安装的描述符直接忽略（幂等移除）；
    /// 每个被移除的贡献按监听器层级分别收集回调
    pub fn unregister_extensions(
        &self,
        plugin: &PluginId,
        descriptors: &[ExtensionDescriptor],
        priority_callbacks_out: &mut Vec<ListenerCallback>,
        callbacks_out: &mut Vec<ListenerCallback>,
    ) {
        let mut state = self.state.write();
        let mut removed = Vec::new();

        state.contributions.retain(|contribution| {
            let matches = contribution.plugin.id == *plugin
                && descriptors.contains(&contribution.descriptor);
            if matches {
                removed.push((
                    contribution.descriptor.clone(),
                    Arc::clone(&contribution.plugin),
                ));
            }
            !matches
        });

        if removed.is_empty() {
            return;
        }

        debug!(
            "扩展点 '{}' 注销 {} 个贡献（插件: {}）",
            self.name,
            removed.len(),
            plugin
        );

        for (descriptor, owner) in &removed {
            Self::collect_removed_callbacks(
                &state.listeners,
                descriptor,
                owner,
                priority_callbacks_out,
                callbacks_out,
            );
        }
    }

    /// 重置扩展点
    /// 按注册的逆序为每个已安装贡献触发 "removed" 监听器，
    /// 然后清空贡献列表和实例缓存；回调在锁释放后执行
    pub fn reset(&self) {
        let mut priority_callbacks = Vec::new();
        let mut callbacks = Vec::new();

        {
            let mut state = self.state.write();
            if state.contributions.is_empty() {
                return;
            }

            debug!(
                "重置扩展点 '{}'，移除 {} 个贡献",
                self.name,
                state.contributions.len()
            );

            let contributions = std::mem::take(&mut state.contributions);
            for contribution in contributions.iter().rev() {
                Self::collect_removed_callbacks(
                    &state.listeners,
                    &contribution.descriptor,
                    &contribution.plugin,
                    &mut priority_callbacks,
                    &mut callbacks,
                );
            }
        }

        for callback in priority_callbacks {
            callback();
        }
        for callback in callbacks {
            callback();
        }
    }

    /// 清理用户会话级实例缓存
    /// 只丢弃已解析实例，贡献本身保留；由环境刷新触发，
    /// 与扩展点或贡献的结构性变更无关
    pub fn clear_user_cache(&self) {
        let mut state = self.state.write();
        for contribution in &mut state.contributions {
            contribution.instance = None;
        }
    }

    /// 按类查找贡献实例
    /// 仅 INTERFACE 扩展点支持；贡献按需实例化并缓存；
    /// 单个贡献解析失败记录日志后跳过，不中断整体查询
    pub fn find_extension(
        &self,
        target_class: &str,
        cached_only: bool,
        strictness: Strictness,
        resolver: &dyn ComponentResolver,
    ) -> Option<ResolvedInstance> {
        if self.kind != ExtensionPointKind::Interface {
            // DATA 扩展点绝不实例化贡献
            return None;
        }

        let count = self.state.read().contributions.len();
        for index in 0..count {
            // 快照单个贡献，列表被并发修改时索引失效即结束
            let (descriptor, cached) = {
                let state = self.state.read();
                match state.contributions.get(index) {
                    Some(c) => (c.descriptor.clone(), c.instance.clone()),
                    None => break,
                }
            };

            let resolved = match cached {
                Some(instance) => instance,
                None if cached_only => continue,
                None => {
                    // 解析器属于外部代码，必须在锁外调用
                    match resolver.instantiate(&descriptor, &self.declared_type) {
                        Ok(instance) => self.store_instance(index, &descriptor, instance),
                        Err(error) => {
                            warn!(
                                "扩展点 '{}' 的贡献 '{}' 实例化失败，跳过: {}",
                                self.name, descriptor.implementation, error
                            );
                            continue;
                        }
                    }
                }
            };

            if self.class_matches(&resolved, target_class, strictness, resolver) {
                return Some(resolved);
            }
        }

        None
    }

    /// 克隆出一个空扩展点
    /// 身份元数据保持不变，贡献列表为空且不携带监听器，
    /// 用于区域从模板批量继承扩展点
    pub fn clone_for(&self, new_owner: AreaInstanceId) -> ExtensionPoint {
        ExtensionPoint {
            name: self.name.clone(),
            declared_type: self.declared_type.clone(),
            kind: self.kind,
            plugin: Arc::clone(&self.plugin),
            dynamic: self.dynamic,
            owner: RwLock::new(Some(new_owner)),
            state: RwLock::new(PointState {
                contributions: Vec::new(),
                listeners: Vec::new(),
            }),
        }
    }

    /// 区域替换通知
    /// 只转发给区域感知的监听器（默认实现是空操作）
    pub fn notify_area_replaced(&self, new_area: Option<AreaInstanceId>) {
        let listeners: Vec<Arc<dyn ExtensionPointListener>> = self
            .state
            .read()
            .listeners
            .iter()
            .map(|l| Arc::clone(&l.listener))
            .collect();

        // 监听器可能重新进入注册中心，必须在锁外通知
        for listener in listeners {
            listener.area_replaced(new_area);
        }
    }

    /// 缓存解析结果
    /// 并发竞争时保留先写入的实例，保证查找结果身份稳定
    fn store_instance(
        &self,
        index: usize,
        descriptor: &ExtensionDescriptor,
        instance: ResolvedInstance,
    ) -> ResolvedInstance {
        let mut state = self.state.write();
        if let Some(contribution) = state.contributions.get_mut(index) {
            if contribution.descriptor == *descriptor {
                if let Some(existing) = &contribution.instance {
                    return existing.clone();
                }
                contribution.instance = Some(instance.clone());
            }
        }
        instance
    }

    fn class_matches(
        &self,
        resolved: &ResolvedInstance,
        target_class: &str,
        strictness: Strictness,
        resolver: &dyn ComponentResolver,
    ) -> bool {
        let instance_of = resolved.class_name == target_class
            || resolver.is_assignable(target_class, &resolved.class_name);

        match strictness {
            Strictness::Strict => instance_of,
            Strictness::Lenient => {
                instance_of || resolver.is_assignable(&resolved.class_name, target_class)
            }
        }
    }

    fn collect_added_callbacks(
        listeners: &[RegisteredListener],
        descriptor: &ExtensionDescriptor,
        plugin: &Arc<PluginDescriptor>,
        callbacks_out: &mut Vec<ListenerCallback>,
    ) {
        // 同一层级内按监听器注册顺序触发，优先级层级排在前面
        for tier in [ListenerTier::Priority, ListenerTier::Ordinary] {
            for registered in listeners.iter().filter(|l| l.tier == tier) {
                let listener = Arc::clone(&registered.listener);
                let descriptor = descriptor.clone();
                let plugin = Arc::clone(plugin);
                callbacks_out.push(Box::new(move || {
                    listener.extension_added(&descriptor, &plugin);
                }));
            }
        }
    }

    fn collect_removed_callbacks(
        listeners: &[RegisteredListener],
        descriptor: &ExtensionDescriptor,
        plugin: &Arc<PluginDescriptor>,
        priority_callbacks_out: &mut Vec<ListenerCallback>,
        callbacks_out: &mut Vec<ListenerCallback>,
    ) {
        for registered in listeners {
            let listener = Arc::clone(&registered.listener);
            let descriptor = descriptor.clone();
            let plugin = Arc::clone(plugin);
            let callback: ListenerCallback = Box::new(move || {
                listener.extension_removed(&descriptor, &plugin);
            });

            match registered.tier {
                ListenerTier::Priority => priority_callbacks_out.push(callback),
                ListenerTier::Ordinary => callbacks_out.push(callback),
            }
        }
    }
}

impl std::fmt::Debug for ExtensionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared_type", &self.declared_type)
            .field("plugin", &self.plugin.id)
            .field("dynamic", &self.dynamic)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExtensionError;

    struct EchoResolver;

    impl ComponentResolver for EchoResolver {
        fn instantiate(
            &self,
            descriptor: &ExtensionDescriptor,
            _declared_type: &str,
        ) -> Result<ResolvedInstance, ExtensionError> {
            Ok(ResolvedInstance::new(
                Arc::new(descriptor.implementation.clone()),
                descriptor.implementation.clone(),
            ))
        }
    }

    fn interface_point(name: &str) -> ExtensionPoint {
        let declaration =
            ExtensionPointDescriptor::new(name, "Handler", ExtensionPointKind::Interface);
        ExtensionPoint::new(&declaration, PluginDescriptor::new("test-plugin"))
    }

    #[test]
    fn test_data_point_never_instantiates() {
        let declaration =
            ExtensionPointDescriptor::new("com.example.data", "Bean", ExtensionPointKind::Data);
        let point = ExtensionPoint::new(&declaration, PluginDescriptor::new("test-plugin"));
        let plugin = PluginDescriptor::new("contributor");

        point.register_extensions(vec![ExtensionDescriptor::new("Bean")], &plugin, None);

        assert_eq!(point.extension_count(), 1);
        assert!(
            point
                .find_extension("Bean", false, Strictness::Strict, &EchoResolver)
                .is_none()
        );
    }

    #[test]
    fn test_unregister_unknown_descriptor_is_noop() {
        let point = interface_point("com.example.svc");
        let plugin = PluginDescriptor::new("contributor");
        point.register_extensions(vec![ExtensionDescriptor::new("FooHandler")], &plugin, None);

        let mut priority = Vec::new();
        let mut ordinary = Vec::new();
        point.unregister_extensions(
            &plugin.id,
            &[ExtensionDescriptor::new("NeverRegistered")],
            &mut priority,
            &mut ordinary,
        );

        assert_eq!(point.extension_count(), 1);
        assert!(priority.is_empty());
        assert!(ordinary.is_empty());
    }

    #[test]
    fn test_cached_instance_identity_stable() {
        let point = interface_point("com.example.svc");
        let plugin = PluginDescriptor::new("contributor");
        point.register_extensions(vec![ExtensionDescriptor::new("FooHandler")], &plugin, None);

        let first = point
            .find_extension("FooHandler", false, Strictness::Strict, &EchoResolver)
            .unwrap();
        let second = point
            .find_extension("FooHandler", false, Strictness::Strict, &EchoResolver)
            .unwrap();
        assert!(first.same_instance(&second));

        // 清理用户缓存后重新解析，得到新实例
        point.clear_user_cache();
        let third = point
            .find_extension("FooHandler", false, Strictness::Strict, &EchoResolver)
            .unwrap();
        assert!(!first.same_instance(&third));
    }

    #[test]
    fn test_cached_only_skips_unresolved() {
        let point = interface_point("com.example.svc");
        let plugin = PluginDescriptor::new("contributor");
        point.register_extensions(vec![ExtensionDescriptor::new("FooHandler")], &plugin, None);

        // cached_only 模式下未解析过的贡献直接跳过
        assert!(
            point
                .find_extension("FooHandler", true, Strictness::Strict, &EchoResolver)
                .is_none()
        );

        point
            .find_extension("FooHandler", false, Strictness::Strict, &EchoResolver)
            .unwrap();
        assert!(
            point
                .find_extension("FooHandler", true, Strictness::Strict, &EchoResolver)
                .is_some()
        );
    }

    #[test]
    fn test_clone_for_is_empty() {
        let point = interface_point("com.example.svc");
        let plugin = PluginDescriptor::new("contributor");
        point.register_extensions(vec![ExtensionDescriptor::new("FooHandler")], &plugin, None);

        let clone = point.clone_for(uuid::Uuid::new_v4());
        assert_eq!(clone.name(), point.name());
        assert_eq!(clone.kind(), point.kind());
        assert_eq!(clone.extension_count(), 0);
    }
}
