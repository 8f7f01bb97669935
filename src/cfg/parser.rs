//! INI 格式解析器
//!
//! 逐行解析 `key = value` 形式的配置，支持 `[section]` 分段以及 `#`/`;` 注释。
//! 解析只作用于局部临时数据，失败时不会影响任何已有快照。

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::BufRead;

use super::error::{ConfigError, Result};

/// 一次成功解析得到的完整文档
///
/// `globals` 保存出现在任何 section 之前的键值，`sections` 保存各个 section 的键值。
/// 声明过但没有任何键值的 section 也会以空表的形式存在。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IniDocument {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    pub fn section_get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    pub fn section(&self, section: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(section)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// 按字典序返回所有 section 名称
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sections.keys().cloned().collect();
        names.sort();
        names
    }
}

/// 以规范化的 INI 形式输出（键和 section 均按字典序排列）
impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let globals: BTreeMap<_, _> = self.globals.iter().collect();
        for (key, value) in &globals {
            writeln!(f, "{} = {}", key, value)?;
        }

        for (i, name) in self.section_names().iter().enumerate() {
            if i > 0 || !globals.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", name)?;
            if let Some(entries) = self.sections.get(name) {
                let entries: BTreeMap<_, _> = entries.iter().collect();
                for (key, value) in entries {
                    writeln!(f, "{} = {}", key, value)?;
                }
            }
        }
        Ok(())
    }
}

/// 从字节流解析 INI 文档
///
/// 每一行为下一个换行符（含）之前的内容，或文件末尾剩余的字节。
///
/// # 错误
/// - `[` 开头但没有 `]` 的行：`ConfigError::UnclosedSection`
/// - 非注释、非 section 且不含 `=` 的行：`ConfigError::InvalidKeyValue`
/// - 非 UTF-8 的行：`ConfigError::Encoding`
/// - 读取失败：`ConfigError::Read`
///
/// # 示例
/// ```
/// use iniconf::cfg::parser::parse;
///
/// let doc = parse("name = demo\n[db]\nhost = localhost\n".as_bytes()).unwrap();
/// assert_eq!(doc.get("name"), Some("demo"));
/// assert_eq!(doc.section_get("db", "host"), Some("localhost"));
/// ```
pub fn parse<R: BufRead>(mut reader: R) -> Result<IniDocument> {
    let mut doc = IniDocument::default();
    let mut current_section: Option<String> = None;
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(ConfigError::Read)?;
        if n == 0 {
            break;
        }
        line_no += 1;

        // 注释行按字节跳过，不要求是合法 UTF-8
        let start = buf
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(buf.len());
        let raw = &buf[start..];
        if matches!(raw.first(), None | Some(b'#') | Some(b';')) {
            continue;
        }

        let line = std::str::from_utf8(raw).map_err(|_| ConfigError::Encoding { line_no })?;
        let line = line.trim_start();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let close = rest.rfind(']').ok_or_else(|| ConfigError::UnclosedSection {
                line_no,
                line: line.trim_end().to_string(),
            })?;
            let name = rest[..close].to_string();
            // 重复声明的 section 从空映射重新开始
            doc.sections.insert(name.clone(), HashMap::new());
            current_section = Some(name);
            continue;
        }

        let line = line.trim();
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidKeyValue {
                line_no,
                line: line.to_string(),
            })?;

        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim().to_string();

        let entries = match &current_section {
            Some(section) => doc.sections.entry(section.clone()).or_default(),
            None => &mut doc.globals,
        };
        entries.insert(key.to_string(), value);
    }

    Ok(doc)
}

/// 从字符串解析 INI 文档
pub fn parse_str(content: &str) -> Result<IniDocument> {
    parse(content.as_bytes())
}
