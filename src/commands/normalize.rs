//! Normalize command handler.

use std::fmt::Write;

use console::style;

use crate::context::AppContext;
use crate::event::{DateCandidate, EventCategory};

use super::OutputFormat;

/// Run the normalize command.
///
/// Prints every phrase next to its normalized timestamp, in input order.
///
/// # Errors
///
/// Returns an error if terminal I/O or JSON serialization fails.
pub fn run(
    ctx: &mut AppContext,
    phrases: &[String],
    category: Option<EventCategory>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    log::info!("Normalizing {} phrase(s)...", phrases.len());
    let candidates: Vec<DateCandidate> = phrases
        .iter()
        .map(|phrase| DateCandidate {
            original: phrase.clone(),
            parsed: ctx.normalizer.normalize(phrase, ctx.now, category),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            ctx.term
                .write_line(&serde_json::to_string_pretty(&candidates)?)?;
        }
        OutputFormat::Pretty => {
            ctx.term.write_str(render(&candidates).trim_end())?;
            ctx.term.write_line("")?;
        }
    }
    Ok(())
}

fn render(candidates: &[DateCandidate]) -> String {
    let mut string = String::new();
    for candidate in candidates {
        match candidate.parsed {
            Some(instant) => {
                let _ = writeln!(
                    string,
                    "{} {} {}",
                    style("✔").green().bold(),
                    candidate.original,
                    style(instant.datetime().format("(%a %b %-d, %Y %-I:%M %p)")).cyan()
                );
            }
            None => {
                let _ = writeln!(
                    string,
                    "{} {} {}",
                    style("✘").red().bold(),
                    candidate.original,
                    style("(could not parse)").red()
                );
            }
        }
    }
    string
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedInstant;
    use chrono::NaiveDate;

    #[test]
    fn renders_parsed_and_failed_phrases() {
        let instant = NormalizedInstant::new(
            NaiveDate::from_ymd_opt(2025, 12, 25)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
        );
        let rendered = console::strip_ansi_codes(&render(&[
            DateCandidate {
                original: "12/25 7:30 pm".to_string(),
                parsed: Some(instant),
            },
            DateCandidate {
                original: "bad date string".to_string(),
                parsed: None,
            },
        ]))
        .to_string();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "✔ 12/25 7:30 pm (Thu Dec 25, 2025 7:30 PM)");
        assert_eq!(lines[1], "✘ bad date string (could not parse)");
    }
}
