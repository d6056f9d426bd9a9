//! Contrat de frontière : dates calendaires `YYYY-MM-DD`, sans heure ni fuseau.

use crate::model::DateRange;
use crate::scheduler::RotaError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse une date `YYYY-MM-DD`. Toute composante horaire est refusée.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RotaError> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return Err(RotaError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| RotaError::InvalidDate(raw.to_string()))
}

/// Parse deux bornes et vérifie `start <= end`.
pub fn parse_period(start: &str, end: &str) -> Result<DateRange, RotaError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    checked_range(start, end)
}

pub fn checked_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, RotaError> {
    DateRange::new(start, end).map_err(|_| RotaError::InvalidRange { start, end })
}

pub fn is_weekday(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Lundi tombant le jour même ou après `day`, `None` au-delà du calendrier.
pub fn next_monday(day: NaiveDate) -> Option<NaiveDate> {
    let offset = (7 - day.weekday().num_days_from_monday()) % 7;
    day.checked_add_signed(Duration::days(i64::from(offset)))
}

/// Semaine lundi → dimanche.
pub fn week_starting(monday: NaiveDate) -> Option<DateRange> {
    let end = monday.checked_add_signed(Duration::days(6))?;
    Some(DateRange { start: monday, end })
}
