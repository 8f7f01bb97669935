//! cfg 模块 - INI 配置管理
//!
//! 从 INI 文件加载配置，支持按文件修改时间自动重载，提供线程安全的全局键和 section 键读取。
//!
//! - **parser**: INI 解析器
//! - **source**: 配置来源抽象与文件实现
//! - **config**: 配置实例（快照、读取、重载）
//! - **reloader**: 可取消的自动重载线程
//! - **registry**: 按名称管理实例的注册表
//! - **global**: 进程级注册表与默认实例便捷函数

pub mod config;
pub mod error;
pub mod global;
pub mod options;
pub mod parser;
mod reloader;
pub mod registry;
pub mod serde_duration;
pub mod source;

// 重新导出公共 API
pub use config::{Config, ReloadEvent, ReloadListener};
pub use error::{ConfigError, Result};
pub use options::{ConfigOptions, DefaultConfigOptions, DEFAULT_CHECK_INTERVAL};
pub use parser::{parse, parse_str, IniDocument};
pub use registry::ConfigRegistry;
pub use source::{ConfigSource, FileSource, LoadedDocument};
