use chrono::{DateTime, Duration, Utc};

use crate::modules::perception::NewsEntry;

pub const DEFAULT_WINDOW_HOURS: i64 = 6;

/// 没有发布时间或解析失败一律视为过期，宁可漏报也不推旧闻
pub fn is_recent(entry: &NewsEntry, window_hours: i64, now: DateTime<Utc>) -> bool {
    match entry.published_at() {
        Some(published) => now - published <= Duration::hours(window_hours),
        None => false,
    }
}
