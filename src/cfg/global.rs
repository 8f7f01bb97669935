//! 全局配置注册表
//!
//! 提供进程级的 `ConfigRegistry` 单例和读取默认实例的便捷函数。
//! 单例在第一次使用时创建，默认实例需要显式调用 `init()` 加载。

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use super::config::Config;
use super::error::Result;
use super::options::{ConfigOptions, DefaultConfigOptions};
use super::registry::ConfigRegistry;

static GLOBAL_REGISTRY: Lazy<ConfigRegistry> = Lazy::new(ConfigRegistry::new);

/// 全局注册表
pub fn global_registry() -> &'static ConfigRegistry {
    &GLOBAL_REGISTRY
}

/// 加载默认实例：`config/$SYS_ENV.ini`，未设置 `SYS_ENV` 时为 `config/local.ini`
///
/// 失败只记录日志，返回 `None`，此后便捷函数都返回空值。
///
/// # 示例
///
/// ```no_run
/// iniconf::cfg::global::init();
///
/// let level = iniconf::cfg::global::get("log_level");
/// let host = iniconf::cfg::global::section_get("db", "host");
/// ```
pub fn init() -> Option<Arc<Config>> {
    init_with(&DefaultConfigOptions::default())
}

/// 按指定规则加载默认实例
pub fn init_with(options: &DefaultConfigOptions) -> Option<Arc<Config>> {
    GLOBAL_REGISTRY.init_default(options).ok()
}

/// 在全局注册表中创建实例
pub fn create(options: ConfigOptions) -> Result<Arc<Config>> {
    GLOBAL_REGISTRY.create(options)
}

/// 按名称查找实例，空名称返回默认实例
pub fn config_get(name: &str) -> Option<Arc<Config>> {
    GLOBAL_REGISTRY.lookup(name)
}

/// 默认实例的全局键，不存在时返回空字符串
pub fn get(key: &str) -> String {
    GLOBAL_REGISTRY.get(key)
}

/// 默认实例的 section 键，不存在时返回空字符串
pub fn section_get(section: &str, key: &str) -> String {
    GLOBAL_REGISTRY.section_get(section, key)
}

/// 默认实例的 section 副本，不存在时返回空表
pub fn sections_get(section: &str) -> HashMap<String, String> {
    GLOBAL_REGISTRY.sections_get(section)
}
