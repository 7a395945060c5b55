//! Taiwan local time helpers (UTC+8, no daylight saving).

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

const TAIWAN_OFFSET_SECS: i32 = 8 * 60 * 60;

const TAIWAN_OFFSET: FixedOffset = match FixedOffset::east_opt(TAIWAN_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("UTC+8 is out of range"),
};

pub fn taiwan_offset() -> FixedOffset {
    TAIWAN_OFFSET
}

/// Current time in the feed's time zone, independent of the machine's zone.
pub fn taiwan_now() -> DateTime<FixedOffset> {
    to_taiwan_time(Utc::now())
}

pub fn to_taiwan_time(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&taiwan_offset())
}

fn chinese_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "一",
        Weekday::Tue => "二",
        Weekday::Wed => "三",
        Weekday::Thu => "四",
        Weekday::Fri => "五",
        Weekday::Sat => "六",
        Weekday::Sun => "日",
    }
}

/// Formats as `2025年11月1日 (六) 14:30:00`.
pub fn format_chinese_datetime(dt: &DateTime<FixedOffset>) -> String {
    format!(
        "{}年{}月{}日 ({}) {:02}:{:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        chinese_weekday(dt.weekday()),
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}
