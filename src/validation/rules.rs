use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use thiserror::Error;

pub const MINIMUM_AGE_YEARS: i32 = 17;

/// Usernames that would shadow app routes or look official.
pub const RESERVED_USERNAMES: [&str; 4] = ["admin", "api", "www", "app"];

static DAY_FIRST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap());
static ISO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

pub fn is_reserved_username(username: &str) -> bool {
    let lowered = username.to_lowercase();
    RESERVED_USERNAMES.iter().any(|reserved| *reserved == lowered)
}

#[derive(Debug, Error)]
#[error("birth date must be DD-MM-YYYY or YYYY-MM-DD")]
pub struct BirthDateError;

/// Accepts `DD-MM-YYYY` or `YYYY-MM-DD` and returns the calendar date.
/// The shape is picked by regex first, so `15-03-2000` can never be read
/// as a year-first date.
pub fn normalize_birth_date(input: &str) -> Result<NaiveDate, BirthDateError> {
    if DAY_FIRST_RE.is_match(input) {
        NaiveDate::parse_from_str(input, "%d-%m-%Y").map_err(|_| BirthDateError)
    } else if ISO_RE.is_match(input) {
        NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| BirthDateError)
    } else {
        Err(BirthDateError)
    }
}

/// Whole years between `birth` and `today`; the year ticks on the birthday
/// itself.
pub fn compute_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Deterministic DiceBear avatar for a username. The same username always
/// maps to the same image.
pub fn default_avatar_url(username: &str) -> String {
    format!(
        "https://api.dicebear.com/6.x/initials/svg?seed={}",
        urlencoding::encode(username)
    )
}
