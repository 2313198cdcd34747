//! Assemble command for building event records from extractor output.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read as _};
use std::path::Path;

use anyhow::Context as _;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input};

use crate::context::AppContext;
use crate::event::{assemble, EventCategory, EventRecord, ExtractedEvent};
use crate::normalize::NormalizedInstant;

use super::OutputFormat;

/// Run the assemble command.
///
/// Reads an extracted event as JSON from `input` (or stdin), normalizes its
/// date phrases and prints the resulting record.
///
/// When no phrase parses:
/// - **Interactive mode**: prompts until a date phrase normalizes
/// - **Otherwise**: prints the record without a datetime and a warning
///
/// # Errors
///
/// Returns an error if the input cannot be read or deserialized, if terminal
/// I/O fails, or if `strict` is set and the record is incomplete.
pub fn run(
    ctx: &mut AppContext,
    input: Option<&Path>,
    format: OutputFormat,
    interactive: bool,
    strict: bool,
) -> anyhow::Result<()> {
    log::info!("Assembling event record...");
    let raw = if let Some(path) = input {
        log::debug!("Reading extracted event from {}...", path.display());
        fs::read_to_string(path).context("could not read extracted event file")?
    } else {
        log::debug!("Reading extracted event from stdin...");
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("could not read extracted event from stdin")?;
        raw
    };

    let extracted: ExtractedEvent =
        serde_json::from_str(&raw).context("could not deserialize extracted event")?;
    log::trace!("Extracted event: {extracted:#?}");

    let mut record = assemble(extracted, ctx.now, &ctx.normalizer);
    if record.datetime.is_none() && interactive {
        let instant = prompt_for_datetime(ctx, record.category)?;
        record.set_datetime(instant);
    }

    match format {
        OutputFormat::Json => {
            ctx.term
                .write_line(&serde_json::to_string_pretty(&record)?)?;
        }
        OutputFormat::Pretty => {
            ctx.term.write_str(render(&record).trim_end())?;
            ctx.term.write_line("")?;
        }
    }

    if let Err(err) = record.validate() {
        if strict {
            return Err(err).context("event record is incomplete");
        }
        log::warn!("Event record is incomplete: {err}");
        Term::stderr().write_line(&format!("{}", style(format!("Warning: {err}")).red()))?;
    }
    Ok(())
}

/// Ask for a date phrase until one normalizes.
fn prompt_for_datetime(
    ctx: &AppContext,
    category: Option<EventCategory>,
) -> anyhow::Result<NormalizedInstant> {
    ctx.term.write_line(&format!(
        "{}",
        style("No date could be read from the event, please enter one.").yellow()
    ))?;
    loop {
        let phrase: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Date & time (e.g., 12/25 7:30 pm, next friday)")
            .interact_text()?;

        if let Some(instant) = ctx.normalizer.normalize(&phrase, ctx.now, category) {
            return Ok(instant);
        }
        ctx.term.write_line(&format!(
            "{}",
            style(format!("Could not parse {phrase:?}, try again.")).red()
        ))?;
    }
}

fn render(record: &EventRecord) -> String {
    let mut string = String::new();

    let _ = writeln!(string, "{}", style(&record.title).bold());
    match record.datetime {
        Some(instant) => {
            let _ = writeln!(
                string,
                "{} {}",
                style("when:").dim(),
                style(instant.datetime().format("%a %b %-d, %Y %-I:%M %p")).cyan()
            );
        }
        None => {
            let _ = writeln!(
                string,
                "{} {}",
                style("when:").dim(),
                style("unknown").red().bold()
            );
        }
    }

    let _ = write!(string, "{} {}", style("where:").dim(), record.location.name);
    if let Some(address) = &record.location.address {
        let _ = write!(string, " ({address})");
    }
    string.push('\n');

    if let Some(category) = record.category {
        let _ = writeln!(string, "{} {category}", style("type:").dim());
    }
    if let Some(capacity) = record.capacity {
        let _ = writeln!(string, "{} {capacity} people", style("capacity:").dim());
    }
    if let Some(description) = &record.description {
        let _ = writeln!(string, "\n{description}");
    }

    if !record.all_dates.is_empty() {
        let _ = writeln!(string, "\n{}", style("dates found:").bold());
        for candidate in &record.all_dates {
            let parsed = candidate
                .parsed
                .map_or_else(|| "could not parse".to_string(), |i| i.to_string());
            let _ = writeln!(string, "- {} → {}", candidate.original, style(parsed).dim());
        }
    }
    string
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use chrono::NaiveDate;

    fn record(dates: &[&str]) -> EventRecord {
        let extracted: ExtractedEvent = serde_json::from_value(serde_json::json!({
            "title": "Jazz Night",
            "dates": dates,
            "location": { "name": "Blue Room", "address": "12 Main St" },
            "type": "social",
        }))
        .unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assemble(extracted, now, &Normalizer::default())
    }

    #[test]
    fn renders_assembled_record() {
        let rendered =
            console::strip_ansi_codes(&render(&record(&["12/25 7:30 pm", "bad date string"])))
                .to_string();

        assert!(rendered.starts_with("Jazz Night\n"));
        assert!(rendered.contains("when: Thu Dec 25, 2025 7:30 PM"));
        assert!(rendered.contains("where: Blue Room (12 Main St)"));
        assert!(rendered.contains("type: evening"));
        assert!(rendered.contains("- 12/25 7:30 pm → 2025-12-25T19:30:00"));
        assert!(rendered.contains("- bad date string → could not parse"));
    }

    fn write_event(name: &str, dates: &[&str]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "event-dates-{}-{name}.json",
            std::process::id()
        ));
        let body = serde_json::json!({
            "title": "Jazz Night",
            "dates": dates,
            "location": "Blue Room",
        });
        fs::write(&path, body.to_string()).unwrap();
        path
    }

    fn make_context() -> AppContext {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        AppContext::new(crate::config::Config::default(), Some(now))
    }

    #[test]
    fn strict_rejects_record_without_datetime() {
        let path = write_event("strict-missing", &["bad date string"]);
        let mut ctx = make_context();

        let result = run(&mut ctx, Some(&path), OutputFormat::Json, false, true);
        let _ = fs::remove_file(&path);

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<crate::event::EventError>(),
            Some(&crate::event::EventError::MissingDatetime)
        );
    }

    #[test]
    fn lenient_mode_accepts_incomplete_record() {
        let path = write_event("lenient-missing", &["bad date string"]);
        let mut ctx = make_context();

        let result = run(&mut ctx, Some(&path), OutputFormat::Json, false, false);
        let _ = fs::remove_file(&path);
        assert!(result.is_ok());
    }

    #[test]
    fn strict_accepts_complete_record() {
        let path = write_event("strict-complete", &["12/25 7:30 pm"]);
        let mut ctx = make_context();

        let result = run(&mut ctx, Some(&path), OutputFormat::Pretty, false, true);
        let _ = fs::remove_file(&path);
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_malformed_input() {
        let path = std::env::temp_dir().join(format!(
            "event-dates-{}-malformed.json",
            std::process::id()
        ));
        fs::write(&path, "not json").unwrap();
        let mut ctx = make_context();

        let result = run(&mut ctx, Some(&path), OutputFormat::Json, false, false);
        let _ = fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn renders_missing_datetime() {
        let rendered =
            console::strip_ansi_codes(&render(&record(&["bad date string"]))).to_string();
        assert!(rendered.contains("when: unknown"));
    }
}
