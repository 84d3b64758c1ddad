//! 时间工具函数
//!
//! 所有日期字符串 ↔ 时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 RFC 3339 日期时间字符串，失败返回 None
///
/// 前端缓存里偶尔会出现没有时区后缀的时间串，按 UTC 处理。
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // 无时区后缀: 尝试按 naive UTC 解析
    value
        .parse::<chrono::NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Unix millis → RFC 3339 字符串
pub fn millis_to_rfc3339(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

/// 当前时间 Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 日期桶比较用的 `YYYY-MM-DD` 前缀
pub fn date_prefix(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_rfc3339() {
        let dt = parse_datetime("2024-01-02T04:00:00Z").unwrap();
        assert_eq!(dt.timestamp(), 1704168000);
    }

    #[test]
    fn test_parse_datetime_naive_is_utc() {
        let dt = parse_datetime("2024-01-02T04:00:00").unwrap();
        assert_eq!(dt.timestamp(), 1704168000);
    }

    #[test]
    fn test_parse_datetime_garbage() {
        assert!(parse_datetime("not-a-date").is_none());
    }

    #[test]
    fn test_parse_date_rejects_bad_format() {
        assert!(parse_date("02-01-2024").is_err());
        assert!(parse_date("2024-01-02").is_ok());
    }
}
