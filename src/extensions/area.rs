// 扩展区域
// 一个容器作用域（应用级、项目级、模块级）拥有一个注册表实例，
// 并承载区域替换、按模板重置和按模板移除等生命周期操作

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use extena_common::{AreaInstanceId, PluginDescriptor};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ExtensionConfig;
use crate::errors::ExtensionError;
use crate::extensions::descriptor::ExtensionPointDescriptor;
use crate::extensions::point::ExtensionPoint;
use crate::extensions::registry::ExtensionRegistry;

/// 扩展区域
pub struct ExtensionArea {
    /// 区域实例 ID，替换后新旧实例可区分
    instance_id: AreaInstanceId,
    /// 容器标签，如 "application"、"project:demo"
    owner: String,
    /// 本区域的扩展点注册表
    registry: ExtensionRegistry,
}

impl ExtensionArea {
    /// 创建区域
    /// 调试注册等配置在此读取一次，贯穿注册表整个生命周期
    pub fn new(owner: &str, config: &ExtensionConfig) -> Self {
        let instance_id = Uuid::new_v4();
        info!("创建扩展区域 '{}' ({})", owner, instance_id);

        Self {
            instance_id,
            owner: owner.to_string(),
            registry: ExtensionRegistry::new(instance_id, owner, config.registry.clone()),
        }
    }

    pub fn instance_id(&self) -> AreaInstanceId {
        self.instance_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// 注册一个插件声明的扩展点批次
    /// 清单加载器解析出声明后调用；声明先验证再安装
    pub fn register_points_for_plugin(
        &self,
        plugin: &Arc<PluginDescriptor>,
        declarations: &[ExtensionPointDescriptor],
    ) -> Result<(), ExtensionError> {
        for declaration in declarations {
            declaration.validate()?;
            let point = ExtensionPoint::new(declaration, Arc::clone(plugin));
            self.registry.register_point(Arc::new(point))?;
        }

        debug!(
            "插件 {} 在区域 '{}' 注册了 {} 个扩展点",
            plugin.id,
            self.owner,
            declarations.len()
        );
        Ok(())
    }

    /// 区域替换通知
    /// 先处理本区域（旧区域）全部扩展点，再补充通知仅存在于
    /// 新区域的扩展点；同名扩展点只通知一次（visited 集合保证幂等）。
    /// 纯拆除场景传入 None，旧区域集合仍然全量处理
    pub fn notify_area_replaced(&self, new_area: Option<&ExtensionArea>) {
        let new_id = new_area.map(|area| area.instance_id);
        let mut processed: HashSet<String> = HashSet::new();

        for point in self.registry.points() {
            point.notify_area_replaced(new_id);
            processed.insert(point.name().to_string());
        }

        let Some(new_area) = new_area else {
            info!("扩展区域 '{}' 已拆除", self.owner);
            return;
        };

        for point in new_area.registry.points() {
            if !processed.contains(point.name()) {
                point.notify_area_replaced(new_id);
            }
        }

        info!(
            "扩展区域 '{}' 已替换为 '{}' ({})",
            self.owner, new_area.owner, new_area.instance_id
        );
    }

    /// 按模板重置扩展点
    /// 模板描述符只取名称；匹配的存活扩展点执行 reset()，
    /// 未匹配的模板项忽略
    pub fn reset_points_by_template(&self, templates: &[ExtensionPointDescriptor]) {
        for template in templates {
            if let Some(point) = self.registry.point_if_registered(&template.name) {
                point.reset();
            }
        }
    }

    /// 按模板移除扩展点
    /// 只按名称从注册表移除，不调用 reset()；
    /// 需要触发 "removed" 监听器的调用方必须先调用
    /// reset_points_by_template，否则监听器不会看到此次移除
    pub fn remove_points_by_template(&self, templates: &[ExtensionPointDescriptor]) {
        for template in templates {
            self.registry.remove_point_raw(&template.name);
        }
    }

    /// 清理用户会话级缓存
    pub fn clear_user_cache(&self) {
        self.registry.clear_user_cache();
    }
}

impl fmt::Display for ExtensionArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.owner)
    }
}
