//! Free-text date/time normalization.
//!
//! Phrases come from an upstream extractor and carry no structural guarantee.
//! Two paths are tried in order:
//!
//! 1. A short numeric `month/day[/year]` date found anywhere in the phrase,
//!    combined with an optional `H:MM [am|pm]` time. Missing years resolve
//!    against the reference date and roll to next year by *calendar date*.
//! 2. A generic parse of the whole phrase: ISO-8601 and long English forms
//!    first, then natural language through `two_timer`. Results before the
//!    reference *instant* roll forward to their next yearly occurrence.
//!
//! Nothing here reads the system clock; the caller supplies "now".

use std::fmt::{self, Display};
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::config::NormalizerConfig;
use crate::event::EventCategory;

/// `month/day` with an optional `/year` of two to four digits.
static SHORT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<month>[0-9]{1,2})/(?<day>[0-9]{1,2})(?:/(?<year>[0-9]{2,4}))?")
        .expect("short date pattern is valid")
});

/// `H:MM` with an optional meridiem marker.
static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?<hour>[0-9]{1,2}):(?<minute>[0-9]{2})\s*(?<meridiem>am|pm)?")
        .expect("time of day pattern is valid")
});

/// Serialization format of a [`NormalizedInstant`].
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%A, %B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%a %b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %B %d, %Y",
    "%d %B %Y",
];

/// Why a phrase could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The phrase was empty or only whitespace.
    #[error("phrase is empty")]
    Empty,
    /// The components do not form a real calendar date.
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate {
        /// Resolved year.
        year: i32,
        /// Month as written.
        month: u32,
        /// Day as written.
        day: u32,
    },
    /// The components do not form a real time of day.
    #[error("{hour}:{minute:02} is not a time of day")]
    InvalidTime {
        /// Hour after meridiem conversion.
        hour: u32,
        /// Minute as written.
        minute: u32,
    },
    /// No supported format matched the phrase.
    #[error("no date format matched")]
    Unrecognized,
}

/// A canonical local timestamp produced by the normalizer.
///
/// Serializes as `YYYY-MM-DDTHH:MM:SS` without an offset; the instant is in
/// the same civil time as the reference it was resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct NormalizedInstant(#[serde(with = "iso_format")] NaiveDateTime);

impl NormalizedInstant {
    /// Wrap an already-resolved local datetime.
    #[must_use]
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    /// The underlying local datetime.
    #[must_use]
    pub fn datetime(self) -> NaiveDateTime {
        self.0
    }
}

impl Display for NormalizedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl From<NormalizedInstant> for NaiveDateTime {
    fn from(instant: NormalizedInstant) -> Self {
        instant.0
    }
}

/// Parse a local ISO-8601 datetime, with or without seconds.
///
/// Also accepts a bare `YYYY-MM-DD`, which is read as midnight.
#[must_use]
pub fn parse_iso_local(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS[..4]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

pub mod iso_format {
    //! Serde adapter for local ISO-8601 datetimes.

    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serialize as `YYYY-MM-DDTHH:MM:SS`.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S>(datetime: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&datetime.format(super::ISO_FORMAT).to_string())
    }

    /// Deserialize from a local ISO-8601 string.
    ///
    /// Minute precision (`YYYY-MM-DDTHH:MM`, as sent by HTML `datetime-local`
    /// inputs) is accepted too.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a local ISO-8601 datetime.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_iso_local(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid local datetime: {s}")))
    }
}

/// Resolves date phrases against a reference instant.
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a normalizer with the given time defaults.
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize a phrase, collapsing every failure to `None`.
    ///
    /// `hint` only matters when `category_default_times` is enabled and the
    /// phrase carries a short numeric date without a time.
    #[must_use]
    pub fn normalize(
        &self,
        phrase: &str,
        reference: NaiveDateTime,
        hint: Option<EventCategory>,
    ) -> Option<NormalizedInstant> {
        match self.try_normalize(phrase, reference, hint) {
            Ok(instant) => {
                log::debug!("Normalized {phrase:?} to {instant}");
                Some(instant)
            }
            Err(err) => {
                log::debug!("Could not normalize {phrase:?}: {err}");
                None
            }
        }
    }

    /// Normalize a phrase, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first step that failed.
    pub fn try_normalize(
        &self,
        phrase: &str,
        reference: NaiveDateTime,
        hint: Option<EventCategory>,
    ) -> Result<NormalizedInstant, ParseError> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(ParseError::Empty);
        }

        let datetime = if let Some(captures) = SHORT_DATE.captures(phrase) {
            log::trace!("Short numeric date in {phrase:?}: {captures:?}");
            self.resolve_short_date(phrase, &captures, reference, hint)?
        } else {
            resolve_generic(phrase, reference)?
        };
        Ok(NormalizedInstant(datetime))
    }

    fn resolve_short_date(
        &self,
        phrase: &str,
        captures: &Captures<'_>,
        reference: NaiveDateTime,
        hint: Option<EventCategory>,
    ) -> Result<NaiveDateTime, ParseError> {
        let today = reference.date();
        let month = number(&captures["month"])?;
        let day = number(&captures["day"])?;

        let year = match captures.name("year") {
            None => today.year(),
            Some(year) if year.as_str().len() < 3 => {
                let year = 2000 + number::<i32>(year.as_str())?;
                if calendar_date(year, month, day)? < today {
                    today.year()
                } else {
                    year
                }
            }
            Some(year) => number(year.as_str())?,
        };

        let mut date = calendar_date(year, month, day)?;
        if date < today {
            date = calendar_date(date.year() + 1, month, day)?;
        }

        let time = match TIME_OF_DAY.captures(phrase) {
            Some(time) => time_of_day(&time)?,
            None => self.default_time(hint),
        };
        Ok(date.and_time(time))
    }

    fn default_time(&self, hint: Option<EventCategory>) -> NaiveTime {
        match hint {
            Some(category) if self.config.category_default_times => {
                self.config.time_for(category)
            }
            _ => self.config.default_time,
        }
    }
}

/// Normalize a phrase with the default configuration and no category hint.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use event_dates::normalize::normalize;
///
/// let now = NaiveDate::from_ymd_opt(2025, 6, 1)
///     .unwrap()
///     .and_hms_opt(9, 0, 0)
///     .unwrap();
/// let instant = normalize("12/25 7:30 pm", now).unwrap();
/// assert_eq!(instant.to_string(), "2025-12-25T19:30:00");
/// ```
#[must_use]
pub fn normalize(phrase: &str, reference: NaiveDateTime) -> Option<NormalizedInstant> {
    Normalizer::default().normalize(phrase, reference, None)
}

fn number<T: std::str::FromStr>(digits: &str) -> Result<T, ParseError> {
    digits.parse().map_err(|_| ParseError::Unrecognized)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, ParseError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ParseError::InvalidDate { year, month, day })
}

fn time_of_day(captures: &Captures<'_>) -> Result<NaiveTime, ParseError> {
    let hour: u32 = number(&captures["hour"])?;
    let minute: u32 = number(&captures["minute"])?;
    let meridiem = captures
        .name("meridiem")
        .map(|m| m.as_str().to_ascii_lowercase());

    let hour = match meridiem.as_deref() {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ParseError::InvalidTime { hour, minute })
}

fn resolve_generic(phrase: &str, reference: NaiveDateTime) -> Result<NaiveDateTime, ParseError> {
    let parsed = parse_fixed(phrase)
        .or_else(|| parse_natural(phrase, reference))
        .ok_or(ParseError::Unrecognized)?;
    log::trace!("Generic parse of {phrase:?}: {parsed}");
    roll_forward(parsed, reference)
}

fn parse_fixed(phrase: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) =
        DateTime::parse_from_rfc3339(phrase).or_else(|_| DateTime::parse_from_rfc2822(phrase))
    {
        return Some(datetime.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(phrase, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(phrase, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn parse_natural(phrase: &str, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    // two_timer::parse returns (start, end, is_range)
    match two_timer::parse(phrase, Some(two_timer::Config::new().now(reference))) {
        Ok((start, _end, _)) => Some(start),
        Err(err) => {
            log::trace!("two_timer rejected {phrase:?}: {err:?}");
            None
        }
    }
}

/// Move an instant before `reference` to its next yearly occurrence.
fn roll_forward(parsed: NaiveDateTime, reference: NaiveDateTime) -> Result<NaiveDateTime, ParseError> {
    if parsed >= reference {
        return Ok(parsed);
    }
    let with_year = |year: i32| {
        parsed.with_year(year).ok_or(ParseError::InvalidDate {
            year,
            month: parsed.month(),
            day: parsed.day(),
        })
    };
    let rolled = with_year(reference.year())?;
    if rolled < reference {
        with_year(reference.year() + 1)
    } else {
        Ok(rolled)
    }
}
