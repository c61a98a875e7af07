// 扩展点注册表
// 一个区域范围内名称到扩展点的映射，支持并发读取和按键串行写入

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use extena_common::{AreaInstanceId, PluginDescriptor, PluginId};
use tracing::{debug, warn};

use crate::config::RegistrySettings;
use crate::errors::ExtensionError;
use crate::extensions::class_lookup::ClassLookupIndex;
use crate::extensions::descriptor::ExtensionDescriptor;
use crate::extensions::listener::ListenerCallback;
use crate::extensions::point::{ExtensionPoint, Strictness};
use crate::extensions::resolver::{ComponentResolver, ResolvedInstance};

/// 注册调用栈快照
/// 仅调试模式记录，用于重复注册问题的事后诊断
#[derive(Debug, Clone)]
pub struct RegistrationTrace {
    /// 首次注册时的调用栈
    pub backtrace: String,
    /// 记录时间
    pub registered_at: DateTime<Utc>,
}

/// 扩展点注册表
pub struct ExtensionRegistry {
    /// 所属区域实例
    area_id: AreaInstanceId,
    /// 区域标签，用于错误信息
    area_label: String,
    /// 名称 → 扩展点映射
    /// 并发关联结构按键串行化写入，读取路径完全无阻塞
    points: DashMap<String, Arc<ExtensionPoint>>,
    /// 调试模式下的注册调用栈快照；生产模式为 None，整条路径跳过
    traces: Option<DashMap<String, RegistrationTrace>>,
    /// 注册表配置
    settings: RegistrySettings,
}

impl ExtensionRegistry {
    /// 创建注册表
    /// 调试标志在构造时确定一次，之后不再变化
    pub fn new(area_id: AreaInstanceId, area_label: &str, settings: RegistrySettings) -> Self {
        Self {
            area_id,
            area_label: area_label.to_string(),
            points: DashMap::new(),
            traces: settings.debug_registration.then(DashMap::new),
            settings,
        }
    }

    pub fn area_id(&self) -> AreaInstanceId {
        self.area_id
    }

    pub fn area_label(&self) -> &str {
        &self.area_label
    }

    /// 注册单个扩展点
    /// 同名扩展点已存在且归属不同插件时报重复注册错误；
    /// 同一插件重新注册（重载场景）允许覆盖
    pub fn register_point(&self, point: Arc<ExtensionPoint>) -> Result<(), ExtensionError> {
        let name = point.name().to_string();

        if let Some(existing) = self.points.get(&name) {
            if existing.plugin().id != point.plugin().id {
                return Err(self.duplicate_error(&name, existing.plugin(), point.plugin()));
            }
        }

        if self.points.len() >= self.settings.max_points && !self.points.contains_key(&name) {
            warn!(
                "区域 '{}' 的扩展点数量已达 {}，超出配置上限 {}",
                self.area_label,
                self.points.len(),
                self.settings.max_points
            );
        }

        point.set_owner(self.area_id);
        self.points.insert(name.clone(), point);
        self.record_trace(&name);
        Ok(())
    }

    /// 批量注册扩展点
    /// 区域从模板继承全部扩展点时使用；clone_points 为 true 时
    /// 先深克隆并重新归属，模板对象保持原样可被其他区域复用。
    /// 发生名称冲突时恢复该键原有的扩展点再整体报错 ——
    /// 批次中先处理的键保持已应用状态（已知的不对称行为，见文档）
    pub fn register_points_bulk(
        &self,
        points: Vec<Arc<ExtensionPoint>>,
        clone_points: bool,
    ) -> Result<(), ExtensionError> {
        for point in points {
            let point = if clone_points {
                Arc::new(point.clone_for(self.area_id))
            } else {
                point.set_owner(self.area_id);
                point
            };

            let name = point.name().to_string();
            let old = self.points.insert(name.clone(), Arc::clone(&point));

            if let Some(old) = old {
                if old.plugin().id != point.plugin().id {
                    // 恢复该键原先安装的扩展点，然后整体失败
                    let error = self.duplicate_error_with_paths(&name, old.plugin(), point.plugin());
                    self.points.insert(name, old);
                    return Err(error);
                }
            }

            self.record_trace(&name);
        }

        Ok(())
    }

    /// 按名称获取扩展点
    /// 缺失视为调用方代码错误，默认致命
    pub fn point(&self, name: &str) -> Result<Arc<ExtensionPoint>, ExtensionError> {
        self.points
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ExtensionError::missing_extension_point(name, &self.area_label))
    }

    /// 按名称获取扩展点，缺失时返回 None
    /// 供必须容忍可选扩展点的调用方使用
    pub fn point_if_registered(&self, name: &str) -> Option<Arc<ExtensionPoint>> {
        self.points.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// 扩展点是否存在
    pub fn has_point(&self, name: &str) -> bool {
        self.points.contains_key(name)
    }

    /// 注销扩展点
    /// 先重置（为已安装贡献触发 "removed" 监听器）再移除；不存在时为空操作
    pub fn unregister_point(&self, name: &str) {
        if let Some(point) = self.point_if_registered(name) {
            point.reset();
            self.points.remove(name);
            if let Some(traces) = &self.traces {
                traces.remove(name);
            }
            debug!("扩展点 '{}' 已从区域 '{}' 注销", name, self.area_label);
        }
    }

    /// 仅按名称移除扩展点，不触发 reset()
    /// 区域按模板移除扩展点时使用；需要 "removed" 事件的
    /// 调用方必须自行先重置
    pub(crate) fn remove_point_raw(&self, name: &str) {
        self.points.remove(name);
        if let Some(traces) = &self.traces {
            traces.remove(name);
        }
    }

    /// 向指定扩展点注册贡献
    /// 返回扩展点是否存在；未知名称的贡献静默忽略，
    /// 与声明格式对插件依赖顺序不敏感的特性保持一致
    pub fn register_extensions(
        &self,
        point_name: &str,
        descriptors: Vec<ExtensionDescriptor>,
        plugin: &Arc<PluginDescriptor>,
        callbacks_out: Option<&mut Vec<ListenerCallback>>,
    ) -> bool {
        match self.point_if_registered(point_name) {
            Some(point) => {
                point.register_extensions(descriptors, plugin, callbacks_out);
                true
            }
            None => false,
        }
    }

    /// 批量注册贡献
    /// 清单加载器按扩展点名称分好组后一次性提交
    pub fn register_extensions_batch(
        &self,
        extensions: Vec<(String, Vec<ExtensionDescriptor>)>,
        plugin: &Arc<PluginDescriptor>,
        mut callbacks_out: Option<&mut Vec<ListenerCallback>>,
    ) {
        for (point_name, descriptors) in extensions {
            self.register_extensions(
                &point_name,
                descriptors,
                plugin,
                callbacks_out.as_mut().map(|callbacks| &mut **callbacks),
            );
        }
    }

    /// 从指定扩展点注销贡献
    /// 返回扩展点是否存在；回调分两级收集，调用方先执行优先级回调
    pub fn unregister_extensions(
        &self,
        point_name: &str,
        plugin: &PluginId,
        descriptors: &[ExtensionDescriptor],
        priority_callbacks_out: &mut Vec<ListenerCallback>,
        callbacks_out: &mut Vec<ListenerCallback>,
    ) -> bool {
        match self.point_if_registered(point_name) {
            Some(point) => {
                point.unregister_extensions(
                    plugin,
                    descriptors,
                    priority_callbacks_out,
                    callbacks_out,
                );
                true
            }
            None => false,
        }
    }

    /// 按类查找贡献实例
    /// 兼容性慢路径，委托给 ClassLookupIndex 线性扫描；
    /// 匹配严格程度由注册表配置决定
    pub fn find_by_class(
        &self,
        target_class: &str,
        resolver: &dyn ComponentResolver,
    ) -> Option<ResolvedInstance> {
        let strictness = if self.settings.strict_class_check {
            Strictness::Strict
        } else {
            Strictness::Lenient
        };
        ClassLookupIndex::find_by_class(self, target_class, strictness, resolver)
    }

    /// 清理所有扩展点的用户会话级实例缓存
    pub fn clear_user_cache(&self) {
        for entry in self.points.iter() {
            entry.value().clear_user_cache();
        }
    }

    /// 当前注册的全部扩展点快照
    pub fn points(&self) -> Vec<Arc<ExtensionPoint>> {
        self.points
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// 遍历全部扩展点
    pub fn for_each_point(&self, mut f: impl FnMut(&Arc<ExtensionPoint>)) {
        for entry in self.points.iter() {
            f(entry.value());
        }
    }

    /// 扩展点数量
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// 查询调试模式下记录的注册调用栈
    pub fn registration_trace(&self, name: &str) -> Option<RegistrationTrace> {
        self.traces
            .as_ref()
            .and_then(|traces| traces.get(name).map(|entry| entry.value().clone()))
    }

    /// 记录注册调用栈快照
    /// 生产模式下 traces 为 None，此路径完全不执行
    fn record_trace(&self, name: &str) {
        if let Some(traces) = &self.traces {
            traces.insert(
                name.to_string(),
                RegistrationTrace {
                    backtrace: std::backtrace::Backtrace::force_capture().to_string(),
                    registered_at: Utc::now(),
                },
            );
        }
    }

    fn duplicate_error(
        &self,
        name: &str,
        first: &PluginDescriptor,
        second: &PluginDescriptor,
    ) -> ExtensionError {
        if self.traces.is_some() {
            if let Some(trace) = self.registration_trace(name) {
                warn!(
                    "扩展点 '{}' 重复注册，首次注册调用栈:\n{}",
                    name, trace.backtrace
                );
            }
        }

        ExtensionError::duplicate_registration(name, first.id.to_string(), second.id.to_string())
    }

    /// 批量注册冲突错误，错误信息携带两个插件的安装路径
    fn duplicate_error_with_paths(
        &self,
        name: &str,
        first: &PluginDescriptor,
        second: &PluginDescriptor,
    ) -> ExtensionError {
        ExtensionError::duplicate_registration(name, first.source_label(), second.source_label())
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("area_label", &self.area_label)
            .field("point_count", &self.points.len())
            .finish()
    }
}
