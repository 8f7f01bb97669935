//! 配置实例的构造选项

use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{ConfigError, Result};
use super::serde_duration::{serde_as, HumanDur};

/// 默认的文件检查周期
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// 配置实例选项
///
/// # 示例
/// ```
/// use iniconf::cfg::ConfigOptions;
///
/// let options: ConfigOptions = serde_json::from_str(r#"{
///     "file_path": "config/app.ini",
///     "auto_reload": true,
///     "check_interval": "30s"
/// }"#).unwrap();
/// assert!(options.auto_reload);
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct ConfigOptions {
    /// 配置文件路径，必填
    #[garde(length(min = 1))]
    pub file_path: String,

    /// 是否自动重载
    #[garde(skip)]
    pub auto_reload: bool,

    /// 自动重载时检查文件修改时间的周期，为 0 时使用默认值（1 分钟）
    #[serde_as(as = "HumanDur")]
    #[default(DEFAULT_CHECK_INTERVAL)]
    #[garde(skip)]
    pub check_interval: Duration,
}

impl ConfigOptions {
    /// 只指定文件路径，其余使用默认值（不自动重载，1 分钟检查周期）
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_auto_reload(mut self, check_interval: Duration) -> Self {
        self.auto_reload = true;
        self.check_interval = check_interval;
        self
    }

    /// 校验选项并补齐默认值
    pub fn normalize(mut self) -> Result<Self> {
        self.validate()
            .map_err(|e| ConfigError::InvalidOptions(e.to_string()))?;
        if self.check_interval.is_zero() {
            self.check_interval = DEFAULT_CHECK_INTERVAL;
        }
        Ok(self)
    }

    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.file_path)
    }
}

impl From<&str> for ConfigOptions {
    fn from(path: &str) -> Self {
        Self::from_path(path)
    }
}

impl From<String> for ConfigOptions {
    fn from(path: String) -> Self {
        Self::from_path(path)
    }
}

/// 默认配置实例的选择规则
///
/// 默认实例的文件为 `<dir>/<环境变量值>.ini`，环境变量未设置或为空时使用 `<dir>/<fallback_name>.ini`。
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct DefaultConfigOptions {
    /// 配置文件目录
    #[default = "config"]
    #[garde(skip)]
    pub dir: String,

    /// 选择配置文件名的环境变量
    #[default = "SYS_ENV"]
    #[garde(length(min = 1))]
    pub env_var: String,

    /// 环境变量未设置时使用的文件名（不含扩展名）
    #[default = "local"]
    #[garde(length(min = 1))]
    pub fallback_name: String,

    #[garde(skip)]
    pub auto_reload: bool,

    #[serde_as(as = "HumanDur")]
    #[default(DEFAULT_CHECK_INTERVAL)]
    #[garde(skip)]
    pub check_interval: Duration,
}

impl DefaultConfigOptions {
    /// 根据环境变量计算默认配置文件路径
    pub fn file_path(&self) -> PathBuf {
        let base = std::env::var(&self.env_var)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.fallback_name.clone());
        PathBuf::from(&self.dir).join(format!("{}.ini", base))
    }

    pub fn to_config_options(&self) -> Result<ConfigOptions> {
        self.validate()
            .map_err(|e| ConfigError::InvalidOptions(e.to_string()))?;
        Ok(ConfigOptions {
            file_path: self.file_path().to_string_lossy().into_owned(),
            auto_reload: self.auto_reload,
            check_interval: self.check_interval,
        })
    }
}
