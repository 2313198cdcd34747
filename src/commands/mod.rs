//! Command handlers for the CLI.

pub mod assemble;
pub mod normalize;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Styled, human-readable output
    Pretty,
    /// JSON for programmatic use
    Json,
}
