// 按类查找索引
// 面向旧调用方的兼容性回退路径：线性扫描 INTERFACE 扩展点，
// 主查找路径始终是按名称精确查找

use crate::extensions::descriptor::ExtensionPointKind;
use crate::extensions::point::Strictness;
use crate::extensions::registry::ExtensionRegistry;
use crate::extensions::resolver::{ComponentResolver, ResolvedInstance};

/// 按类查找索引
pub struct ClassLookupIndex;

impl ClassLookupIndex {
    /// 查找任意可赋值给目标类的贡献实例
    /// 复杂度为 O(INTERFACE 扩展点数量)；DATA 扩展点直接跳过，
    /// 绝不因查询副作用实例化无关贡献。单个贡献的解析失败由
    /// find_extension 记录日志并跳过，不会中断整体扫描；
    /// 返回第一个非空结果，全部落空时返回 None
    pub fn find_by_class(
        registry: &ExtensionRegistry,
        target_class: &str,
        strictness: Strictness,
        resolver: &dyn ComponentResolver,
    ) -> Option<ResolvedInstance> {
        for point in registry.points() {
            if point.kind() != ExtensionPointKind::Interface {
                continue;
            }

            // 声明类型不兼容时直接排除，避免任何实例化开销
            if !resolver.is_assignable(point.declared_type(), target_class) {
                continue;
            }

            if let Some(instance) = point.find_extension(target_class, false, strictness, resolver)
            {
                return Some(instance);
            }
        }

        None
    }
}
