//! 配置来源抽象
//!
//! 配置实例通过 `ConfigSource` 读取内容并查询修改时间，默认实现为本地文件 `FileSource`。

use chrono::{DateTime, Utc};
use std::fs::{File, Metadata};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::parser::{parse, IniDocument};

/// 一次加载的结果：解析后的文档与来源的修改时间（Unix 秒）
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: IniDocument,
    pub modified: i64,
}

/// 配置来源
///
/// `load` 必须是无副作用的：失败时不能影响调用方已有的快照。
pub trait ConfigSource: Send + Sync {
    /// 注册表中使用的名称
    fn name(&self) -> &str;

    /// 用于日志的描述，例如文件路径
    fn describe(&self) -> String;

    /// 读取并解析全部内容，同时返回读取时的修改时间
    fn load(&self) -> Result<LoadedDocument>;

    /// 只查询修改时间（Unix 秒）
    fn modified(&self) -> Result<i64>;
}

/// 本地 INI 文件来源，名称为文件的 base name（如 `local.ini`）
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidOptions("文件路径不能为空".to_string()));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ConfigError::InvalidOptions(format!("无法从路径获取文件名: {}", path.display()))
            })?;
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_secs(&self, metadata: &Metadata) -> Result<i64> {
        let modified = metadata
            .modified()
            .map_err(|e| ConfigError::io(&self.path, e))?;
        Ok(DateTime::<Utc>::from(modified).timestamp())
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<LoadedDocument> {
        let file = File::open(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        let document = parse(BufReader::new(&file))?;
        let metadata = file.metadata().map_err(|e| ConfigError::io(&self.path, e))?;
        let modified = self.modified_secs(&metadata)?;
        Ok(LoadedDocument { document, modified })
    }

    fn modified(&self) -> Result<i64> {
        let metadata = std::fs::metadata(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        self.modified_secs(&metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_file_source_name_is_base_name() {
        let source = FileSource::new("config/nested/app.ini").unwrap();
        assert_eq!(source.name(), "app.ini");
        assert_eq!(source.path(), Path::new("config/nested/app.ini"));
    }

    #[test]
    fn test_file_source_rejects_empty_path() {
        assert!(matches!(
            FileSource::new(""),
            Err(ConfigError::InvalidOptions(_))
        ));
        assert!(FileSource::new("..").is_err());
    }

    #[test]
    fn test_file_source_load() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("app.ini");
        fs::write(&path, "name = app\n[db]\nhost = localhost\n")?;

        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        fs::File::options().write(true).open(&path)?.set_modified(mtime)?;

        let source = FileSource::new(&path)?;
        let loaded = source.load()?;

        assert_eq!(loaded.document.get("name"), Some("app"));
        assert_eq!(loaded.document.section_get("db", "host"), Some("localhost"));
        assert_eq!(loaded.modified, 1_700_000_000);
        assert_eq!(source.modified()?, 1_700_000_000);

        Ok(())
    }

    #[test]
    fn test_file_source_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSource::new(temp_dir.path().join("missing.ini")).unwrap();

        assert!(matches!(source.load(), Err(ConfigError::Io { .. })));
        assert!(matches!(source.modified(), Err(ConfigError::Io { .. })));
    }
}
