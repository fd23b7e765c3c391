//! Date-string parsing to zero-padded `YYYY-MM-DD`.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::clean_text;

static FULL_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})").unwrap());
static SHORT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})[-./](\d{1,2})[-./](\d{1,2})").unwrap());
static KOREAN_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})년\s*(\d{1,2})월\s*(\d{1,2})일").unwrap());
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})[-./](\d{1,2})$").unwrap());
static KOREAN_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})월\s*(\d{1,2})일").unwrap());

/// Parse a scraped date string into `YYYY-MM-DD`.
///
/// Accepted forms, tried in order: `YYYY[-./]MM[-./]DD`, `YY[-./]MM[-./]DD`
/// (assumed 2000s), `YYYY년 MM월 DD일`, `MM[-./]DD` and `MM월 DD일` (current
/// year). The candidate must survive a calendar round-trip; otherwise the
/// next pattern is tried and the final fallback is `None`.
pub fn parse_date(raw: &str) -> Option<String> {
    parse_date_with_year(raw, Local::now().year())
}

/// Same as [`parse_date`] but with an explicit year for the year-less forms.
pub fn parse_date_with_year(raw: &str, current_year: i32) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let text = clean_text(raw);

    if let Some(caps) = FULL_YEAR.captures(&text) {
        if let Some(date) = to_valid(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }
    if let Some(caps) = SHORT_YEAR.captures(&text) {
        let year = format!("20{}", &caps[1]);
        if let Some(date) = to_valid(&year, &caps[2], &caps[3]) {
            return Some(date);
        }
    }
    if let Some(caps) = KOREAN_FULL.captures(&text) {
        if let Some(date) = to_valid(&caps[1], &caps[2], &caps[3]) {
            return Some(date);
        }
    }
    if let Some(caps) = MONTH_DAY.captures(&text) {
        if let Some(date) = to_valid(&current_year.to_string(), &caps[1], &caps[2]) {
            return Some(date);
        }
    }
    if let Some(caps) = KOREAN_MONTH_DAY.captures(&text) {
        if let Some(date) = to_valid(&current_year.to_string(), &caps[1], &caps[2]) {
            return Some(date);
        }
    }

    None
}

/// Zero-pad and validate through the calendar; rejects 2024-02-30 and friends.
fn to_valid(year: &str, month: &str, day: &str) -> Option<String> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_year_separators() {
        assert_eq!(parse_date("2024-05-01").as_deref(), Some("2024-05-01"));
        assert_eq!(parse_date("2024.5.1").as_deref(), Some("2024-05-01"));
        assert_eq!(parse_date("2024/05/01").as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn short_year_assumes_2000s() {
        assert_eq!(parse_date("24.05.01").as_deref(), Some("2024-05-01"));
        assert_eq!(parse_date("99-12-31").as_deref(), Some("2099-12-31"));
    }

    #[test]
    fn korean_forms() {
        assert_eq!(parse_date("2024년 5월 1일").as_deref(), Some("2024-05-01"));
        assert_eq!(parse_date("2024년5월1일").as_deref(), Some("2024-05-01"));
        assert_eq!(
            parse_date_with_year("5월 1일", 2024).as_deref(),
            Some("2024-05-01")
        );
    }

    #[test]
    fn month_day_only_is_anchored() {
        assert_eq!(
            parse_date_with_year("05-01", 2024).as_deref(),
            Some("2024-05-01")
        );
        // Embedded in other text the anchored form must not fire.
        assert_eq!(parse_date_with_year("호실 05-01호 배정", 2024), None);
    }

    #[test]
    fn embedded_dates_are_found() {
        assert_eq!(
            parse_date("작성일: 2024.05.01 조회 132").as_deref(),
            Some("2024-05-01")
        );
    }

    #[test]
    fn invalid_calendar_dates_rejected() {
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("공지사항"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn round_trips_parsed_output() {
        let formatted = parse_date("2024년 2월 29일").unwrap();
        assert_eq!(parse_date(&formatted).unwrap(), formatted);
    }
}
