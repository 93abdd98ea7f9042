//! Small text helpers shared by steps: event dates and URL slugs

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Date formats accepted at the date prompt, tried in order
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Parse an event date as typed by the operator (MM/DD/YY preferred)
pub fn parse_event_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}

/// Long form used in notification bodies, e.g. `March 15th`
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}", date.format("%B"), day, suffix)
}

/// RFC 3986 safe slug: lowercase, unreserved characters only, runs of
/// anything else collapsed to a single `-`
pub fn slugify(input: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_run = UNSAFE.get_or_init(|| Regex::new(r"[^a-z0-9._~]+").expect("valid slug regex"));

    let lowered = input.trim().to_lowercase();
    unsafe_run
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
