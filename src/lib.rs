//! iniconf - 可热更新的 INI 配置库
//!
//! 从 INI 文件加载全局键和 section 键，按名称注册配置实例，
//! 可选地周期检查文件修改时间并在不重启进程的情况下重新加载。
//!
//! ## 快速开始
//!
//! ```no_run
//! use iniconf::{ConfigOptions, ConfigRegistry};
//! use std::time::Duration;
//!
//! let registry = ConfigRegistry::new();
//! let config = registry
//!     .create(ConfigOptions::from_path("config/local.ini").with_auto_reload(Duration::from_secs(30)))
//!     .unwrap();
//!
//! let level = config.get("log_level").unwrap_or_default();
//! let db = config.sections_get("db");
//! ```
//!
//! ## 设计要点
//!
//! - 读操作只获取读锁，互不阻塞；重载在锁外解析，写锁内一次性替换快照
//! - 同一实例同时最多只有一个重载在进行
//! - 自动重载线程可取消，实例释放或注册表关闭时退出

pub mod cfg;

// 重新导出主要的公共 API
pub use cfg::{
    Config, ConfigError, ConfigOptions, ConfigRegistry, ConfigSource, DefaultConfigOptions,
    FileSource, IniDocument, ReloadEvent,
};
