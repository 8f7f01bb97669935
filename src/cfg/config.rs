//! 配置实例
//!
//! 一个 `Config` 绑定一个配置来源，持有最近一次成功解析的快照。
//! 读操作只获取读锁，彼此之间不会阻塞；重载时先在锁外完成读取和解析，
//! 再在写锁内一次性替换全局键值、section 键值和修改时间。

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::error::Result;
use super::options::{ConfigOptions, DEFAULT_CHECK_INTERVAL};
use super::parser::IniDocument;
use super::reloader::ReloadHandle;
use super::source::{ConfigSource, FileSource, LoadedDocument};

/// 重载事件，通过 `Config::on_reload` 注册的监听器接收
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    /// 重载成功，附带新的修改时间
    Reloaded { name: String, last_modified: i64 },
    /// 重载失败，旧快照保持不变
    Failed { name: String, error: String },
}

/// 重载监听器
pub type ReloadListener = dyn Fn(&ReloadEvent) + Send + Sync;

/// 一次周期检查的结果（由自动重载线程使用）
#[derive(Debug)]
pub(crate) enum PollOutcome {
    /// 文件未修改
    Unchanged,
    /// 文件已修改并成功重载
    Reloaded,
    /// 文件已修改但重载失败
    ReloadFailed,
    /// 查询修改时间失败
    StatFailed,
}

struct Snapshot {
    document: IniDocument,
    last_modified: i64,
}

impl From<LoadedDocument> for Snapshot {
    fn from(loaded: LoadedDocument) -> Self {
        Self {
            document: loaded.document,
            last_modified: loaded.modified,
        }
    }
}

/// 配置实例
///
/// # 示例
/// ```no_run
/// use iniconf::cfg::{Config, ConfigOptions};
///
/// let config = Config::open(&ConfigOptions::from_path("config/local.ini")).unwrap();
/// let host = config.section_get("db", "host").unwrap_or_default();
/// ```
pub struct Config {
    name: String,
    source: Box<dyn ConfigSource>,
    snapshot: RwLock<Snapshot>,
    /// 保证同一实例同时最多只有一个重载在进行
    reload_guard: Mutex<()>,
    check_interval: RwLock<Duration>,
    reloader: Mutex<Option<ReloadHandle>>,
    listeners: RwLock<Vec<Arc<ReloadListener>>>,
}

impl Config {
    /// 从文件加载配置实例（不启动自动重载，也不注册到任何注册表）
    pub fn open(options: &ConfigOptions) -> Result<Self> {
        let options = options.clone().normalize()?;
        let source = FileSource::new(options.path())?;
        Self::with_source(source, options.check_interval)
    }

    /// 从任意配置来源加载配置实例
    pub fn with_source(source: impl ConfigSource + 'static, check_interval: Duration) -> Result<Self> {
        let loaded = source.load()?;
        let check_interval = if check_interval.is_zero() {
            DEFAULT_CHECK_INTERVAL
        } else {
            check_interval
        };

        Ok(Self {
            name: source.name().to_string(),
            source: Box::new(source),
            snapshot: RwLock::new(Snapshot::from(loaded)),
            reload_guard: Mutex::new(()),
            check_interval: RwLock::new(check_interval),
            reloader: Mutex::new(None),
            listeners: RwLock::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 配置来源的描述（文件路径）
    pub fn source(&self) -> String {
        self.source.describe()
    }

    fn read_snapshot(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 读取全局键
    pub fn get(&self, key: &str) -> Option<String> {
        self.read_snapshot().document.get(key).map(str::to_string)
    }

    /// 读取 section 内的键，section 不存在时与键不存在相同
    pub fn section_get(&self, section: &str, key: &str) -> Option<String> {
        self.read_snapshot()
            .document
            .section_get(section, key)
            .map(str::to_string)
    }

    /// 返回 section 全部键值的副本，section 不存在时返回空表
    pub fn sections_get(&self, section: &str) -> HashMap<String, String> {
        self.read_snapshot()
            .document
            .section(section)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.read_snapshot().document.has_section(section)
    }

    pub fn section_names(&self) -> Vec<String> {
        self.read_snapshot().document.section_names()
    }

    /// 全局键值的副本
    pub fn globals(&self) -> HashMap<String, String> {
        self.read_snapshot().document.globals.clone()
    }

    /// 当前快照的完整副本
    pub fn document(&self) -> IniDocument {
        self.read_snapshot().document.clone()
    }

    /// 最近一次成功加载时来源的修改时间（Unix 秒）
    pub fn last_modified(&self) -> i64 {
        self.read_snapshot().last_modified
    }

    pub fn check_interval(&self) -> Duration {
        *self
            .check_interval
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_auto_reload(&self) -> bool {
        self.lock_reloader().is_some()
    }

    fn lock_reload_guard(&self) -> MutexGuard<'_, ()> {
        self.reload_guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_reloader(&self) -> MutexGuard<'_, Option<ReloadHandle>> {
        self.reloader.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 重新读取并解析来源，成功后原子替换快照
    ///
    /// 失败时返回错误，旧快照和修改时间保持不变。
    pub fn reload(&self) -> Result<()> {
        let result = {
            let _guard = self.lock_reload_guard();
            self.swap_from_source()
        };
        self.notify(&result);
        result.map(|_| ())
    }

    /// 调用方必须持有 reload_guard
    fn swap_from_source(&self) -> Result<i64> {
        let snapshot = Snapshot::from(self.source.load()?);
        let last_modified = snapshot.last_modified;
        *self.write_snapshot() = snapshot;
        Ok(last_modified)
    }

    /// 修改时间前进时重载，供自动重载线程周期调用
    pub(crate) fn reload_if_modified(&self) -> PollOutcome {
        let (outcome, result) = {
            let _guard = self.lock_reload_guard();

            let modified = match self.source.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    log::warn!("stat config source failed [{}]: {}", self.source.describe(), e);
                    return PollOutcome::StatFailed;
                }
            };

            if modified <= self.last_modified() {
                log::debug!("config '{}' unchanged", self.name);
                return PollOutcome::Unchanged;
            }

            let result = self.swap_from_source();
            match &result {
                Ok(_) => {
                    log::info!("config '{}' reloaded from {}", self.name, self.source.describe());
                    (PollOutcome::Reloaded, result)
                }
                Err(e) => {
                    log::error!("config '{}' reload failed: {}", self.name, e);
                    (PollOutcome::ReloadFailed, result)
                }
            }
        };
        self.notify(&result);
        outcome
    }

    /// 注册重载监听器，每次重载尝试（直接调用或自动重载）后调用
    pub fn on_reload<F>(&self, listener: F)
    where
        F: Fn(&ReloadEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    fn notify(&self, result: &Result<i64>) {
        // 复制一份再调用，监听器内可以再注册监听器
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if listeners.is_empty() {
            return;
        }

        let event = match result {
            Ok(last_modified) => ReloadEvent::Reloaded {
                name: self.name.clone(),
                last_modified: *last_modified,
            },
            Err(e) => ReloadEvent::Failed {
                name: self.name.clone(),
                error: e.to_string(),
            },
        };
        for listener in listeners.iter() {
            listener(&event);
        }
    }

    /// 重新设置自动重载
    ///
    /// - `check_interval` 非 0 时更新检查周期，下一个周期生效
    /// - 开启时若已有重载线程则不会再启动第二个
    /// - 关闭时停止并等待重载线程退出
    pub fn reset(self: &Arc<Self>, auto_reload: bool, check_interval: Duration) -> Result<()> {
        if !check_interval.is_zero() {
            *self
                .check_interval
                .write()
                .unwrap_or_else(PoisonError::into_inner) = check_interval;
        }

        if auto_reload {
            self.start_auto_reload()
        } else {
            self.stop_auto_reload();
            Ok(())
        }
    }

    /// 启动自动重载线程，已启动时什么都不做
    pub fn start_auto_reload(self: &Arc<Self>) -> Result<()> {
        let mut reloader = self.lock_reloader();
        if reloader.is_none() {
            *reloader = Some(ReloadHandle::spawn(Arc::downgrade(self), &self.name)?);
            log::debug!(
                "config '{}' auto reload started, interval {:?}",
                self.name,
                self.check_interval()
            );
        }
        Ok(())
    }

    /// 停止自动重载线程
    pub fn stop_auto_reload(&self) {
        let handle = self.lock_reloader().take();
        if handle.is_some() {
            // 在锁外 drop，等待线程退出
            drop(handle);
            log::debug!("config '{}' auto reload stopped", self.name);
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("source", &self.source.describe())
            .field("last_modified", &self.last_modified())
            .field("check_interval", &self.check_interval())
            .field("auto_reload", &self.is_auto_reload())
            .finish()
    }
}
