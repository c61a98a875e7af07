// 扩展点注册中心模块
// 实现扩展点注册、贡献管理、区域生命周期和按类查找

pub mod area;
pub mod class_lookup;
pub mod descriptor;
pub mod listener;
pub mod point;
pub mod registry;
pub mod resolver;


pub use area::ExtensionArea;
pub use class_lookup::ClassLookupIndex;
pub use descriptor::{ExtensionDescriptor, ExtensionPointDescriptor, ExtensionPointKind};
pub use listener::{ExtensionPointListener, ListenerCallback, ListenerTier};
pub use point::{ExtensionPoint, Strictness};
pub use registry::{ExtensionRegistry, RegistrationTrace};
pub use resolver::{ComponentResolver, ResolvedInstance};
