//! `survey-export`: flatten a survey's responses into one CSV table.
//!
//! Reads the survey definition (JSON, with its version history) and a
//! JSON-lines file of raw responses, and writes the response table to a file
//! or stdout. Settings come from `survey-export.toml` (or `--config`), then
//! `SURVEY_EXPORT_*` environment variables, then flags.
//!
//! ```
//! survey-export --survey weekly.json --responses weekly.jsonl --short-keys \
//!   --from 2024-01-01T00:00:00Z --output weekly.csv
//! ```

mod export;
mod settings;

use anyhow::Context as _;
use clap::Parser;
use settings::{Cli, ExportConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing; stdout may carry the table, so log to stderr.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = ExportConfig::load(&cli)?;

  export::run(&cfg).await.context("export failed")?;
  Ok(())
}
