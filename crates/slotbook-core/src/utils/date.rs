//! Date display in the service's fixed timezone (UTC-3, no daylight saving).
//!
//! Every formatter takes the API's string form and returns it unchanged
//! when it cannot be parsed.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeZone, Utc,
};

const SERVICE_OFFSET_WEST_SECS: i32 = 3 * 3600;

/// The service timezone, UTC-3.
pub fn service_offset() -> FixedOffset {
    FixedOffset::west_opt(SERVICE_OFFSET_WEST_SECS).unwrap_or_else(|| Utc.fix())
}

/// Parse an API timestamp. Accepts RFC 3339, naive ISO date-times
/// (read as UTC) and bare `YYYY-MM-DD` dates (UTC midnight).
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// The given instant in the service timezone.
pub fn to_local_time(value: &str) -> Option<DateTime<FixedOffset>> {
    parse_instant(value).map(|dt| dt.with_timezone(&service_offset()))
}

fn format_local(value: &str, pattern: &str) -> String {
    match to_local_time(value) {
        Some(local) => local.format(pattern).to_string(),
        None => value.to_string(),
    }
}

/// `dd/MM/yyyy HH:mm`
pub fn format_date_time(value: &str) -> String {
    format_local(value, "%d/%m/%Y %H:%M")
}

/// `dd/MM/yyyy`
pub fn format_date(value: &str) -> String {
    format_local(value, "%d/%m/%Y")
}

/// `HH:mm`. Full timestamps are converted to the service timezone;
/// wall-clock strings (`HH:mm`, `HH:mm:ss`) are only cut to minutes.
pub fn format_time(value: &str) -> String {
    if value.contains('T') || value.contains('-') {
        return format_local(value, "%H:%M");
    }
    if value.contains(':') {
        return value.chars().take(5).collect();
    }
    value.to_string()
}

/// Portuguese "time ago" label relative to now.
pub fn format_relative_time(value: &str) -> String {
    format_relative_time_at(value, Utc::now())
}

/// Same as [`format_relative_time`] against a fixed `now`.
///
/// Under a minute (or in the future) is "agora mesmo"; after a week the
/// plain date is shown.
pub fn format_relative_time_at(value: &str, now: DateTime<Utc>) -> String {
    let Some(instant) = parse_instant(value) else {
        return value.to_string();
    };

    let elapsed = now.signed_duration_since(instant);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if elapsed.num_seconds() < 60 {
        "agora mesmo".to_string()
    } else if minutes < 60 {
        plural(minutes, "minuto", "minutos")
    } else if hours < 24 {
        plural(hours, "hora", "horas")
    } else if days < 7 {
        plural(days, "dia", "dias")
    } else {
        format_date(value)
    }
}

fn plural(n: i64, one: &str, many: &str) -> String {
    let unit = if n == 1 { one } else { many };
    format!("{} {} atrás", n, unit)
}

/// ISO-8601 UTC with milliseconds, the form the API expects in request bodies.
pub fn to_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
