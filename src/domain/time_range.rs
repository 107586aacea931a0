// Query window selection
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| RangeError::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, RangeError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| RangeError::InvalidTime(raw.to_string()))
}

const DAY_START: NaiveTime = NaiveTime::MIN;

const DAY_END: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(time) => time,
    None => panic!("23:59 is a valid time of day"),
};

/// A concrete `[start, end]` bound, ready to be sent as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ResolvedWindow {
    pub fn query_params(&self) -> [(&'static str, String); 4] {
        [
            ("start_date", self.start_date.format(DATE_FORMAT).to_string()),
            ("end_date", self.end_date.format(DATE_FORMAT).to_string()),
            ("start_time", self.start_time.format(TIME_FORMAT).to_string()),
            ("end_time", self.end_time.format(TIME_FORMAT).to_string()),
        ]
    }
}

impl Serialize for ResolvedWindow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let params = self.query_params();
        let mut map = serializer.serialize_map(Some(params.len()))?;
        for (key, value) in &params {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// `"(D)"` for a single day, `"(D1 to D2)"` otherwise.
pub fn range_label(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format!("({})", start.format(DATE_FORMAT))
    } else {
        format!("({} to {})", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
    }
}

/// The user's window choice for the lifetime of a page view.
///
/// The stored times only apply while `full_day` is off; switching it back
/// on keeps them around but resolves to `00:00`-`23:59`.
#[derive(Debug, Clone)]
pub struct TimeRangeSelector {
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    full_day: bool,
    label: String,
}

impl TimeRangeSelector {
    /// Trailing day ending `today`, full-day.
    pub fn new(today: NaiveDate) -> Self {
        let start_date = today.pred_opt().unwrap_or(today);
        Self {
            start_date,
            end_date: today,
            start_time: DAY_START,
            end_time: DAY_END,
            full_day: true,
            label: range_label(start_date, today),
        }
    }

    pub fn starting_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    #[cfg(test)]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[cfg(test)]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn is_full_day(&self) -> bool {
        self.full_day
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    // Only the end date is pulled up to the start; moving the start past the
    // end is accepted as-is.
    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.start_date = date;
        self.label = range_label(self.start_date, self.end_date);
    }

    pub fn set_end_date(&mut self, date: NaiveDate) {
        self.end_date = if date < self.start_date {
            tracing::debug!("End date {} before start {}, clamping", date, self.start_date);
            self.start_date
        } else {
            date
        };
        self.label = range_label(self.start_date, self.end_date);
    }

    pub fn set_start_time(&mut self, time: NaiveTime) {
        self.start_time = time;
    }

    pub fn set_end_time(&mut self, time: NaiveTime) {
        self.end_time = time;
    }

    pub fn set_full_day(&mut self, full_day: bool) {
        self.full_day = full_day;
    }

    pub fn resolve(&self) -> ResolvedWindow {
        let (start_time, end_time) = if self.full_day {
            (DAY_START, DAY_END)
        } else {
            (self.start_time, self.end_time)
        };

        ResolvedWindow {
            start_date: self.start_date,
            end_date: self.end_date,
            start_time,
            end_time,
        }
    }
}
