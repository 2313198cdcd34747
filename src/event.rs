//! Event records assembled from extracted date phrases.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::normalize::{NormalizedInstant, Normalizer};

/// Coarse kind of event, used to pick a default time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Evening, social and entertainment events.
    #[serde(alias = "social", alias = "entertainment")]
    #[value(alias = "social", alias = "entertainment")]
    Evening,
    /// Morning and daytime events.
    #[serde(alias = "daytime")]
    #[value(alias = "daytime")]
    Morning,
    /// Business events.
    Business,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evening => write!(f, "evening"),
            Self::Morning => write!(f, "morning"),
            Self::Business => write!(f, "business"),
        }
    }
}

/// Where an event takes place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "LocationRepr")]
pub struct EventLocation {
    /// Venue name.
    pub name: String,
    /// Street address, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Extractors emit either a bare venue name or a full location object.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocationRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        address: Option<String>,
    },
}

impl From<LocationRepr> for EventLocation {
    fn from(repr: LocationRepr) -> Self {
        match repr {
            LocationRepr::Name(name) => Self {
                name,
                address: None,
            },
            LocationRepr::Full { name, address } => Self { name, address },
        }
    }
}

/// Structured output of the upstream extraction step.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractedEvent {
    /// Event title.
    pub title: String,
    /// Date phrases in the order the extractor found them.
    pub dates: Vec<String>,
    /// Event location.
    pub location: Option<EventLocation>,
    /// Free-text description.
    pub description: Option<String>,
    /// Event category.
    #[serde(alias = "type")]
    pub category: Option<EventCategory>,
    /// Expected number of attendees.
    pub capacity: Option<u32>,
}

/// A date phrase alongside its normalized value.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateCandidate {
    /// The phrase as extracted.
    pub original: String,
    /// The normalized instant, or `None` if the phrase could not be parsed.
    pub parsed: Option<NormalizedInstant>,
}

/// An event ready for review or creation.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event title.
    pub title: String,
    /// Canonical event timestamp.
    pub datetime: Option<NormalizedInstant>,
    /// Every extracted phrase with its parse.
    pub all_dates: Vec<DateCandidate>,
    /// Event location.
    pub location: EventLocation,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Event category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<EventCategory>,
    /// Expected number of attendees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// Reasons an event record cannot be created yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// The title is blank.
    #[error("event has no title")]
    MissingTitle,
    /// No date phrase could be normalized and none was entered.
    #[error("event has no date and time; enter one manually")]
    MissingDatetime,
    /// The location name is blank.
    #[error("event has no location")]
    MissingLocation,
}

impl EventRecord {
    /// Check that the record has everything needed to create the event.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.title.trim().is_empty() {
            return Err(EventError::MissingTitle);
        }
        if self.datetime.is_none() {
            return Err(EventError::MissingDatetime);
        }
        if self.location.name.trim().is_empty() {
            return Err(EventError::MissingLocation);
        }
        Ok(())
    }

    /// Record a manually entered canonical timestamp.
    pub fn set_datetime(&mut self, instant: NormalizedInstant) {
        self.datetime = Some(instant);
    }
}

/// Normalize every date phrase of an extracted event and build its record.
///
/// The canonical `datetime` is the first phrase that normalizes, in the
/// order the extractor produced them.
#[must_use]
pub fn assemble(
    extracted: ExtractedEvent,
    reference: NaiveDateTime,
    normalizer: &Normalizer,
) -> EventRecord {
    let category = extracted.category;
    let all_dates: Vec<DateCandidate> = extracted
        .dates
        .into_iter()
        .map(|original| {
            let parsed = normalizer.normalize(&original, reference, category);
            DateCandidate { original, parsed }
        })
        .collect();
    log::trace!("Date candidates: {all_dates:#?}");

    let datetime = all_dates.iter().find_map(|candidate| candidate.parsed);
    if datetime.is_none() {
        log::warn!(
            "None of the {} date phrase(s) for {:?} could be parsed",
            all_dates.len(),
            extracted.title
        );
    }

    EventRecord {
        title: extracted.title,
        datetime,
        all_dates,
        location: extracted.location.unwrap_or_default(),
        description: extracted.description,
        category,
        capacity: extracted.capacity,
    }
}
