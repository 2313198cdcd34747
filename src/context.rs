//! Application context shared across commands.

use chrono::{Local, NaiveDateTime};
use console::Term;

use crate::config::Config;
use crate::normalize::Normalizer;

/// Shared application context passed to all commands.
pub struct AppContext {
    /// Normalizer built from the configuration.
    pub normalizer: Normalizer,
    /// Terminal for output.
    pub term: Term,
    /// Reference instant that phrases are resolved against.
    pub now: NaiveDateTime,
}

impl AppContext {
    /// Create a new application context.
    ///
    /// `now` overrides the wall clock as the reference instant.
    #[must_use]
    pub fn new(config: Config, now: Option<NaiveDateTime>) -> Self {
        let now = now.unwrap_or_else(|| Local::now().naive_local());
        log::debug!("Resolving date phrases against {now}");
        Self {
            normalizer: Normalizer::new(config.normalizer),
            term: Term::stdout(),
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn uses_supplied_reference() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let ctx = AppContext::new(Config::default(), Some(now));
        assert_eq!(ctx.now, now);

        let instant = ctx.normalizer.normalize("6/15", ctx.now, None).unwrap();
        assert_eq!(instant.datetime(), now.date().and_hms_opt(19, 0, 0).unwrap());
    }

    #[test]
    fn normalizer_follows_configuration() {
        let config = crate::config::parse("[normalizer]\ndefault_time = \"20:15\"").unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let ctx = AppContext::new(config, Some(now));

        let instant = ctx.normalizer.normalize("7/1", ctx.now, None).unwrap();
        assert_eq!(instant.to_string(), "2024-07-01T20:15:00");
    }
}
