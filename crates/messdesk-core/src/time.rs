use anyhow::anyhow;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::warn;

use messdesk_types::models::Window;

use crate::error::Result;

/// SQLite's `datetime('now')` writes "YYYY-MM-DD HH:MM:SS" in UTC without
/// a timezone marker; accept that and RFC 3339.
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}

/// Half-open `[start, end)` bounds for the window containing the current
/// local time: today for daily, Monday-to-Monday for weekly. Returned as
/// UTC strings comparable with stored `created_at` values.
pub(crate) fn window_bounds(window: Window) -> Result<(String, String)> {
    let today = Local::now().date_naive();
    let (start_date, span) = match window {
        Window::Daily => (today, Duration::days(1)),
        Window::Weekly => (
            today - Duration::days(today.weekday().num_days_from_monday() as i64),
            Duration::days(7),
        ),
    };
    let start = local_midnight(start_date)?;
    let end = local_midnight(start_date + span)?;
    Ok((to_sqlite_utc(start), to_sqlite_utc(end)))
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| anyhow!("no local midnight on {date}").into())
}

fn to_sqlite_utc(dt: DateTime<Local>) -> String {
    dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string()
}
