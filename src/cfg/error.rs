use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 配置模块统一错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无效配置选项: {0}")]
    InvalidOptions(String),

    #[error("读取配置文件失败 [{path}]: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("读取配置内容失败: {0}")]
    Read(#[source] io::Error),

    #[error("unclosed section (line {line_no}): {line}")]
    UnclosedSection { line_no: usize, line: String },

    #[error("invalid key-value (line {line_no}): {line}")]
    InvalidKeyValue { line_no: usize, line: String },

    #[error("非 UTF-8 内容 (line {line_no})")]
    Encoding { line_no: usize },

    #[error("配置名称重复: '{0}'")]
    DuplicateName(String),

    #[error("启动重载线程失败: {0}")]
    Spawn(#[source] io::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否为解析错误（文件内容格式不合法）
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ConfigError::UnclosedSection { .. }
                | ConfigError::InvalidKeyValue { .. }
                | ConfigError::Encoding { .. }
        )
    }
}

/// cfg 模块的 Result 别名
pub type Result<T> = std::result::Result<T, ConfigError>;
