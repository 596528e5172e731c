pub mod browse;
pub mod config;
pub mod notifications;
pub mod schedule;
pub mod show;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use dita_core::EventCategory;

/// Parse a date argument: YYYY-MM-DD, "today", "yesterday" or "tomorrow".
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date = match input.trim().to_ascii_lowercase().as_str() {
        "today" => Some(today),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
    };

    date.ok_or_else(|| {
        anyhow::anyhow!("Invalid date '{}'. Expected YYYY-MM-DD, today, yesterday or tomorrow", input)
    })
}

/// Parse a category argument, falling back to `default` when absent.
pub fn parse_category(input: Option<&str>, default: EventCategory) -> Result<EventCategory> {
    match input {
        Some(s) => Ok(s.parse()?),
        None => Ok(default),
    }
}
