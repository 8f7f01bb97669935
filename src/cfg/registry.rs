//! 配置注册表
//!
//! 按文件名（base name）管理配置实例，并指定一个默认实例供便捷函数使用。

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::config::Config;
use super::error::{ConfigError, Result};
use super::options::{ConfigOptions, DefaultConfigOptions};

/// 配置注册表
///
/// 名称到实例的映射由注册表自己的读写锁保护，与各实例的快照锁相互独立。
///
/// # 示例
/// ```no_run
/// use iniconf::cfg::{ConfigOptions, ConfigRegistry};
/// use std::time::Duration;
///
/// let registry = ConfigRegistry::new();
/// let config = registry
///     .create(ConfigOptions::from_path("config/app.ini").with_auto_reload(Duration::from_secs(10)))
///     .unwrap();
/// registry.set_default(config.name());
///
/// let host = registry.section_get("db", "host");
/// ```
#[derive(Default)]
pub struct ConfigRegistry {
    instances: RwLock<HashMap<String, Arc<Config>>>,
    default_name: RwLock<Option<String>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_instances(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Config>>> {
        self.instances.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_instances(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Config>>> {
        self.instances.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 加载配置文件并以文件名注册
    ///
    /// 任何一步失败（选项非法、打开、解析、名称重复）都不会注册实例，也不会留下重载线程。
    pub fn create(&self, options: ConfigOptions) -> Result<Arc<Config>> {
        let options = options.normalize()?;
        let config = Arc::new(Config::open(&options)?);

        if options.auto_reload {
            config.start_auto_reload()?;
        }

        if let Err(e) = self.insert(config.clone()) {
            config.stop_auto_reload();
            return Err(e);
        }

        log::info!(
            "config '{}' loaded from {}, auto_reload={}",
            config.name(),
            config.source(),
            options.auto_reload
        );
        Ok(config)
    }

    /// 只指定路径创建（不自动重载，1 分钟检查周期）
    pub fn create_from_path(&self, path: impl Into<PathBuf>) -> Result<Arc<Config>> {
        let path = path.into();
        self.create(ConfigOptions::from_path(path.to_string_lossy()))
    }

    /// 注册一个已加载的实例（例如基于自定义 `ConfigSource` 构造的实例）
    pub fn register(&self, config: Config) -> Result<Arc<Config>> {
        let config = Arc::new(config);
        self.insert(config.clone())?;
        Ok(config)
    }

    fn insert(&self, config: Arc<Config>) -> Result<()> {
        match self.write_instances().entry(config.name().to_string()) {
            Entry::Occupied(entry) => Err(ConfigError::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(config);
                Ok(())
            }
        }
    }

    /// 按名称查找实例，空名称表示默认实例
    pub fn lookup(&self, name: &str) -> Option<Arc<Config>> {
        if name.is_empty() {
            return self.default_config();
        }
        self.read_instances().get(name).cloned()
    }

    pub fn set_default(&self, name: impl Into<String>) {
        *self
            .default_name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(name.into());
    }

    pub fn default_name(&self) -> Option<String> {
        self.default_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn default_config(&self) -> Option<Arc<Config>> {
        let name = self.default_name()?;
        self.read_instances().get(&name).cloned()
    }

    /// 根据环境变量选择的文件创建默认实例
    ///
    /// 失败时记录错误日志并返回错误；调用方可以忽略错误继续运行，
    /// 此后默认实例的便捷函数都返回空值。
    pub fn init_default(&self, options: &DefaultConfigOptions) -> Result<Arc<Config>> {
        let result = options
            .to_config_options()
            .and_then(|options| self.create(options));

        match result {
            Ok(config) => {
                self.set_default(config.name());
                Ok(config)
            }
            Err(e) => {
                log::error!(
                    "default config init failed [{}]: {}",
                    options.file_path().display(),
                    e
                );
                Err(e)
            }
        }
    }

    /// 默认实例的全局键，不存在时返回空字符串
    pub fn get(&self, key: &str) -> String {
        self.default_config()
            .and_then(|config| config.get(key))
            .unwrap_or_default()
    }

    /// 默认实例的 section 键，不存在时返回空字符串
    pub fn section_get(&self, section: &str, key: &str) -> String {
        self.default_config()
            .and_then(|config| config.section_get(section, key))
            .unwrap_or_default()
    }

    /// 默认实例的 section 副本，不存在时返回空表
    pub fn sections_get(&self, section: &str) -> HashMap<String, String> {
        self.default_config()
            .map(|config| config.sections_get(section))
            .unwrap_or_default()
    }

    /// 已注册的实例名称（按字典序）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_instances().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read_instances().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_instances().is_empty()
    }

    /// 移除实例并停止其自动重载
    pub fn remove(&self, name: &str) -> Option<Arc<Config>> {
        let config = self.write_instances().remove(name)?;
        config.stop_auto_reload();
        Some(config)
    }

    /// 移除全部实例并停止所有自动重载线程
    pub fn shutdown(&self) {
        let instances: Vec<Arc<Config>> = self.write_instances().drain().map(|(_, c)| c).collect();
        for config in &instances {
            config.stop_auto_reload();
        }
        *self
            .default_name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        if !instances.is_empty() {
            log::debug!("config registry shut down, {} instance(s) released", instances.len());
        }
    }
}

impl Drop for ConfigRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_create_and_lookup() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = write_file(&temp_dir, "app.ini", "key=value\n[s]\nk=v\n");

        let registry = ConfigRegistry::new();
        let config = registry.create_from_path(&path)?;

        assert_eq!(config.name(), "app.ini");
        assert!(!config.is_auto_reload());
        assert_eq!(registry.names(), vec!["app.ini"]);
        assert_eq!(registry.len(), 1);

        let found = registry.lookup("app.ini").unwrap();
        assert!(Arc::ptr_eq(&found, &config));
        assert!(registry.lookup("other.ini").is_none());

        // 没有默认实例时空名称查不到
        assert!(registry.lookup("").is_none());
        registry.set_default("app.ini");
        assert!(Arc::ptr_eq(&registry.lookup("").unwrap(), &config));

        Ok(())
    }

    #[test]
    fn test_duplicate_name_is_rejected() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let first = write_file(&temp_dir, "app.ini", "v=first\n");
        fs::create_dir(temp_dir.path().join("other"))?;
        let second = temp_dir.path().join("other").join("app.ini");
        fs::write(&second, "v=second\n")?;

        let registry = ConfigRegistry::new();
        let original = registry.create_from_path(&first)?;

        let err = registry
            .create(ConfigOptions::from_path(second.to_string_lossy()).with_auto_reload(Duration::from_millis(10)))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(ref name) if name == "app.ini"));

        let found = registry.lookup("app.ini").unwrap();
        assert!(Arc::ptr_eq(&found, &original));
        assert_eq!(found.get("v"), Some("first".to_string()));

        Ok(())
    }

    #[test]
    fn test_create_failures_register_nothing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let bad = write_file(&temp_dir, "bad.ini", "justtext\n");
        let unclosed = write_file(&temp_dir, "unclosed.ini", "[s\n");

        let registry = ConfigRegistry::new();
        assert!(registry.create_from_path(&bad).unwrap_err().is_parse_error());
        assert!(registry.create_from_path(&unclosed).unwrap_err().is_parse_error());
        assert!(matches!(
            registry.create_from_path(temp_dir.path().join("missing.ini")),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(
            registry.create(ConfigOptions::default()),
            Err(ConfigError::InvalidOptions(_))
        ));

        assert!(registry.is_empty());
        assert!(registry.lookup("bad.ini").is_none());
        Ok(())
    }

    #[test]
    fn test_default_accessors() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = write_file(&temp_dir, "app.ini", "key=value\nempty=\n[s]\nk=v\n[e]\n");

        let registry = ConfigRegistry::new();
        assert_eq!(registry.get("key"), "");
        assert!(registry.sections_get("s").is_empty());

        let config = registry.create_from_path(&path)?;
        registry.set_default(config.name());

        assert_eq!(registry.get("key"), "value");
        assert_eq!(registry.get("empty"), "");
        assert_eq!(registry.get("missing"), "");
        assert_eq!(registry.section_get("s", "k"), "v");
        assert_eq!(registry.section_get("missing", "k"), "");
        assert_eq!(registry.sections_get("s").len(), 1);
        assert!(registry.sections_get("e").is_empty());
        assert!(registry.sections_get("missing").is_empty());

        Ok(())
    }

    #[test]
    fn test_remove_and_shutdown() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let a = write_file(&temp_dir, "a.ini", "v=a\n");
        let b = write_file(&temp_dir, "b.ini", "v=b\n");

        let registry = ConfigRegistry::new();
        let config_a = registry
            .create(ConfigOptions::from_path(a.to_string_lossy()).with_auto_reload(Duration::from_millis(10)))?;
        let config_b = registry
            .create(ConfigOptions::from_path(b.to_string_lossy()).with_auto_reload(Duration::from_millis(10)))?;
        assert!(config_a.is_auto_reload());

        let removed = registry.remove("a.ini").unwrap();
        assert!(Arc::ptr_eq(&removed, &config_a));
        assert!(!config_a.is_auto_reload());
        assert!(registry.lookup("a.ini").is_none());
        assert!(registry.remove("a.ini").is_none());

        // 移除后同名文件可以重新注册
        registry.create_from_path(&a)?;
        assert_eq!(registry.names(), vec!["a.ini", "b.ini"]);

        registry.set_default("b.ini");
        registry.shutdown();
        assert!(registry.is_empty());
        assert!(registry.default_name().is_none());
        assert!(!config_b.is_auto_reload());
        // 外部持有的实例仍然可读
        assert_eq!(config_b.get("v"), Some("b".to_string()));

        Ok(())
    }

    #[test]
    fn test_concurrent_create() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| write_file(&temp_dir, &format!("c{}.ini", i), &format!("id={}\n", i)))
            .collect();

        let registry = Arc::new(ConfigRegistry::new());
        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.create_from_path(path).map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap()?;
        }

        assert_eq!(registry.len(), 8);
        assert_eq!(registry.lookup("c3.ini").unwrap().get("id"), Some("3".to_string()));
        Ok(())
    }
}
