use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday,
};
use regex::Regex;

/// Error type for date parsing and formatting
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("could not parse date '{input}' (expected format: {format})")]
    Unparsable { input: String, format: String },
    #[error("date '{0}' does not exist in the local timezone")]
    NoLocalTime(String),
    #[error("invalid date format string '{0}'")]
    BadFormat(String),
}

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^in\s+(\d+)\s+(hours?|days?|weeks?)$").unwrap()
});

/// Parses user-supplied due dates and formats timestamps for display.
///
/// With `human` enabled (the default), informal phrases such as
/// "tomorrow", "friday" or "in 3 days" are accepted on top of the
/// configured strftime format.
#[derive(Debug, Clone)]
pub struct DateParser {
    format: String,
    human: bool,
}

impl DateParser {
    pub fn new(format: &str, human: bool) -> Self {
        DateParser {
            format: format.to_string(),
            human,
        }
    }

    pub fn display_format(&self) -> &str {
        &self.format
    }

    /// Parse a user-supplied date string. Empty input means "no date".
    pub fn parse(&self, input: &str) -> Result<Option<DateTime<Local>>, DateError> {
        self.parse_at(input, Local::now())
    }

    /// Like `parse`, but relative phrases are anchored at `now`.
    pub fn parse_at(
        &self,
        input: &str,
        now: DateTime<Local>,
    ) -> Result<Option<DateTime<Local>>, DateError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        if self.human {
            if let Some(ts) = parse_phrase(input, now) {
                return Ok(Some(ts));
            }
        }

        // Full date-and-time first, then date-only at midnight
        let naive = NaiveDateTime::parse_from_str(input, &self.format)
            .or_else(|_| {
                NaiveDate::parse_from_str(input, &self.format).map(|d| d.and_time(NaiveTime::MIN))
            })
            .map_err(|_| DateError::Unparsable {
                input: input.to_string(),
                format: self.format.clone(),
            })?;

        local_from_naive(naive, input)
    }

    /// Render a timestamp with the configured display format.
    ///
    /// A malformed format string is reported as an error instead of
    /// panicking inside chrono's Display impl, so a single bad record or
    /// config value cannot abort a whole listing.
    pub fn format(&self, ts: &DateTime<Local>) -> Result<String, DateError> {
        if StrftimeItems::new(&self.format).any(|item| matches!(item, Item::Error)) {
            return Err(DateError::BadFormat(self.format.clone()));
        }
        Ok(ts.format(&self.format).to_string())
    }
}

fn local_from_naive(naive: NaiveDateTime, input: &str) -> Result<Option<DateTime<Local>>, DateError> {
    // DST gaps can make a wall-clock time nonexistent
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(Some)
        .ok_or_else(|| DateError::NoLocalTime(input.to_string()))
}

fn parse_phrase(input: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let lower = input.to_lowercase();
    let midnight = |date: NaiveDate| {
        Local
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
    };

    match lower.as_str() {
        "today" => return midnight(now.date_naive()),
        "tomorrow" => return midnight(now.date_naive() + Duration::days(1)),
        "yesterday" => return midnight(now.date_naive() - Duration::days(1)),
        _ => {}
    }

    if let Ok(weekday) = lower.parse::<Weekday>() {
        let ahead = (weekday.num_days_from_monday() + 7
            - now.weekday().num_days_from_monday())
            % 7;
        // A bare weekday name always means a future day
        let ahead = if ahead == 0 { 7 } else { ahead };
        return midnight(now.date_naive() + Duration::days(ahead as i64));
    }

    if let Some(caps) = RELATIVE_RE.captures(&lower) {
        let amount: i64 = caps[1].parse().ok()?;
        let span = match &caps[2] {
            unit if unit.starts_with("hour") => Duration::hours(amount),
            unit if unit.starts_with("day") => Duration::days(amount),
            _ => Duration::weeks(amount),
        };
        return Some(now + span);
    }

    None
}
