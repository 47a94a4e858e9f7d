//! Display helpers for dates, prices and phone numbers.

pub mod date;
pub mod format;

pub use date::{
    format_date, format_date_time, format_relative_time, format_relative_time_at, format_time,
    service_offset, to_local_time, to_utc,
};
pub use format::{format_phone, format_price, truncate_string};
