//! Command-line flags and the layered export configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Deserialize;
use survey_flatten::ParserConfig;

/// Prefix of the environment variables read into [`ExportConfig`].
pub const ENV_PREFIX: &str = "SURVEY_EXPORT";

#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Flatten survey responses into one CSV table"
)]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "survey-export.toml")]
  pub config: PathBuf,

  /// Survey definition (JSON, current version plus history).
  #[arg(long, value_name = "FILE")]
  pub survey: Option<PathBuf>,

  /// Raw responses, one JSON object per line.
  #[arg(long, value_name = "FILE")]
  pub responses: Option<PathBuf>,

  /// Where to write the response table (default: stdout).
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Also write the survey structure as CSV to this file.
  #[arg(long, value_name = "FILE")]
  pub info_output: Option<PathBuf>,

  /// Language code for question titles and labels.
  #[arg(long, value_name = "CODE")]
  pub language: Option<String>,

  /// Strip the survey key from question keys.
  #[arg(long)]
  pub short_keys: bool,

  /// Separator between key segments in column names.
  #[arg(long, value_name = "SEP")]
  pub separator: Option<String>,

  /// Append the per-question metadata columns.
  #[arg(long)]
  pub include_meta: bool,

  /// Only export responses submitted at or after this instant (RFC 3339).
  #[arg(long, value_name = "RFC3339")]
  pub from: Option<DateTime<Utc>>,

  /// Only export responses submitted before this instant (RFC 3339).
  #[arg(long, value_name = "RFC3339")]
  pub until: Option<DateTime<Utc>>,
}

/// Everything one export run needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
  pub survey:       Option<PathBuf>,
  pub responses:    Option<PathBuf>,
  pub output:       Option<PathBuf>,
  pub info_output:  Option<PathBuf>,
  pub language:     String,
  pub short_keys:   bool,
  pub separator:    String,
  pub include_meta: bool,
  pub from:         Option<DateTime<Utc>>,
  pub until:        Option<DateTime<Utc>>,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      survey:       None,
      responses:    None,
      output:       None,
      info_output:  None,
      language:     "en".to_string(),
      short_keys:   false,
      separator:    "-".to_string(),
      include_meta: false,
      from:         None,
      until:        None,
    }
  }
}

impl ExportConfig {
  /// Read the optional config file, then `SURVEY_EXPORT_*` variables, then
  /// apply the command-line flags on top.
  pub fn load(cli: &Cli) -> anyhow::Result<Self> {
    Ok(Self::from_sources(&cli.config)?.with_cli(cli))
  }

  fn from_sources(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ExportConfig")
  }

  /// Flags given on the command line win over every other source.
  pub fn with_cli(mut self, cli: &Cli) -> Self {
    let override_with = |slot: &mut Option<PathBuf>, flag: &Option<PathBuf>| {
      if flag.is_some() {
        slot.clone_from(flag);
      }
    };
    override_with(&mut self.survey, &cli.survey);
    override_with(&mut self.responses, &cli.responses);
    override_with(&mut self.output, &cli.output);
    override_with(&mut self.info_output, &cli.info_output);

    if let Some(language) = &cli.language {
      self.language.clone_from(language);
    }
    if let Some(separator) = &cli.separator {
      self.separator.clone_from(separator);
    }
    self.short_keys |= cli.short_keys;
    self.include_meta |= cli.include_meta;
    self.from = cli.from.or(self.from);
    self.until = cli.until.or(self.until);
    self
  }

  pub fn parser_config(&self) -> ParserConfig {
    ParserConfig {
      preview_language: self.language.clone(),
      short_keys:       self.short_keys,
      separator:        self.separator.clone(),
    }
  }

  pub fn window(&self) -> TimeWindow {
    TimeWindow {
      from:  self.from.map(|t| t.timestamp()),
      until: self.until.map(|t| t.timestamp()),
    }
  }
}

/// Half-open submission window in epoch seconds: `from <= t < until`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
  pub from:  Option<i64>,
  pub until: Option<i64>,
}

impl TimeWindow {
  pub fn contains(&self, submitted_at: i64) -> bool {
    self.from.is_none_or(|from| from <= submitted_at)
      && self.until.is_none_or(|until| submitted_at < until)
  }
}
