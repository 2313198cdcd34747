#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;
pub mod config;
pub mod context;
pub mod event;
pub mod normalize;

pub use event::{assemble, EventCategory, EventRecord, ExtractedEvent};
pub use normalize::{normalize, NormalizedInstant, Normalizer, ParseError};
