//! 人性化时间格式的 serde 适配器
//!
//! 让配置结构体中的 `Duration` 字段可以写成 `"500ms"`、`"30s"`、`"1m"`、`"1h30m"` 这样的形式。

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub use serde_with::{serde_as, DeserializeAs, SerializeAs};

/// `Duration` 与人性化字符串之间的转换器，配合 `#[serde_as(as = "HumanDur")]` 使用
pub struct HumanDur;

impl SerializeAs<Duration> for HumanDur {
    fn serialize_as<S>(source: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*source))
    }
}

impl<'de> DeserializeAs<'de, Duration> for HumanDur {
    fn deserialize_as<D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

fn unit_to_duration(value: u64, unit: &str) -> Option<Duration> {
    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60)?),
        "h" => Duration::from_secs(value.checked_mul(3600)?),
        "d" => Duration::from_secs(value.checked_mul(86400)?),
        _ => return None,
    };
    Some(duration)
}

/// 解析时间字符串，例如 `"1h30m"`、`"250ms"`
///
/// 只接受非负整数与 `ms`/`s`/`m`/`h`/`d` 单位的组合，大小写不敏感。
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_ascii_lowercase();
    if s.is_empty() {
        return Err("空的时间字符串".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = s.as_str();
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(format!("期望数字: {}", s));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("无效数字: {}", &rest[..digits]))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(format!("缺少时间单位: {}", s));
        }
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = unit_to_duration(value, unit)
            .ok_or_else(|| format!("不支持的时间单位: {}", unit))?;
        total = total
            .checked_add(part)
            .ok_or_else(|| format!("时间溢出: {}", s))?;
    }

    Ok(total)
}

/// 把 `Duration` 格式化为最紧凑的人性化字符串，与 `parse_duration` 互逆（精度到毫秒）
pub fn format_duration(duration: Duration) -> String {
    let mut millis = duration.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in [("d", 86_400_000u128), ("h", 3_600_000), ("m", 60_000), ("s", 1_000)] {
        if millis >= size {
            out.push_str(&format!("{}{}", millis / size, unit));
            millis %= size;
        }
    }
    if millis > 0 {
        out.push_str(&format!("{}ms", millis));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
    }

    #[test]
    fn test_parse_duration_compound_and_case() {
        assert_eq!(
            parse_duration(" 1H30m15S ").unwrap(),
            Duration::from_secs(3600 + 1800 + 15)
        );
        assert_eq!(
            parse_duration("1m500ms").unwrap(),
            Duration::from_millis(60_500)
        );
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("1.5s").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(100)), "100ms");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m");
        assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
        assert_eq!(format_duration(Duration::from_millis(61_250)), "1m1s250ms");
    }

    #[serde_as]
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Poll {
        #[serde_as(as = "HumanDur")]
        interval: Duration,
    }

    #[test]
    fn test_serde_adapter() {
        let poll: Poll = serde_json::from_str(r#"{"interval": "1m30s"}"#).unwrap();
        assert_eq!(poll.interval, Duration::from_secs(90));
        assert_eq!(serde_json::to_string(&poll).unwrap(), r#"{"interval":"1m30s"}"#);

        assert!(serde_json::from_str::<Poll>(r#"{"interval": "soon"}"#).is_err());
    }
}
