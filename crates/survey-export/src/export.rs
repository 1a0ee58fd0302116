//! One export run: load the survey, stream the responses through the parser,
//! write the tables.

use std::{
  fs::File,
  io::{self, BufWriter},
  path::Path,
};

use anyhow::Context as _;
use survey_core::{definition::Survey, response::SurveyResponse};
use survey_flatten::ResponseParser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::settings::{ExportConfig, TimeWindow};

/// Per-run counters, reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
  /// Responses added to the table.
  pub ingested: usize,
  /// Lines that were not valid response JSON.
  pub skipped:  usize,
  /// Responses the parser refused, e.g. with no matching survey version.
  pub rejected: usize,
  /// Responses outside the configured time window.
  pub filtered: usize,
}

pub async fn run(cfg: &ExportConfig) -> anyhow::Result<Summary> {
  let survey_path = cfg.survey.as_deref().context("no survey file configured")?;
  let responses_path = cfg
    .responses
    .as_deref()
    .context("no responses file configured")?;

  let raw = tokio::fs::read_to_string(survey_path)
    .await
    .with_context(|| {
      format!("failed to read survey {}", survey_path.display())
    })?;
  let survey = Survey::from_json(&raw).context("failed to parse survey")?;

  let mut parser = ResponseParser::new(&survey, cfg.parser_config())
    .context("failed to prepare survey versions")?;
  tracing::info!(
    survey = parser.survey_key(),
    versions = parser.survey_versions().len(),
    "survey loaded"
  );

  if let Some(path) = &cfg.info_output {
    parser
      .write_survey_info(create(path)?)
      .with_context(|| {
        format!("failed to write survey info {}", path.display())
      })?;
  }

  let summary = ingest(&mut parser, responses_path, cfg.window()).await?;
  tracing::info!(
    ingested = summary.ingested,
    skipped = summary.skipped,
    rejected = summary.rejected,
    filtered = summary.filtered,
    "responses processed"
  );

  // Bail before touching the output so a failed run leaves no empty file.
  if parser.responses().is_empty() {
    return Err(survey_flatten::Error::EmptyResult)
      .context("failed to write response table");
  }

  let written = match &cfg.output {
    Some(path) => parser.write_csv(create(path)?, cfg.include_meta),
    None => parser.write_csv(io::stdout().lock(), cfg.include_meta),
  };
  written.context("failed to write response table")?;

  Ok(summary)
}

/// Feed every line of `path` to the parser. Bad lines and rejected responses
/// are logged and counted; only I/O failures abort.
async fn ingest(
  parser: &mut ResponseParser,
  path: &Path,
  window: TimeWindow,
) -> anyhow::Result<Summary> {
  let file = tokio::fs::File::open(path)
    .await
    .with_context(|| format!("failed to open responses {}", path.display()))?;
  let mut lines = BufReader::new(file).lines();
  let mut summary = Summary::default();
  let mut line_no = 0usize;

  while let Some(line) = lines
    .next_line()
    .await
    .with_context(|| format!("failed to read responses {}", path.display()))?
  {
    line_no += 1;
    if line.trim().is_empty() {
      continue;
    }

    let raw = match SurveyResponse::from_json(&line) {
      Ok(raw) => raw,
      Err(e) => {
        tracing::warn!(
          line = line_no,
          error = %e,
          "skipping malformed response"
        );
        summary.skipped += 1;
        continue;
      }
    };

    if !window.contains(raw.submitted_at) {
      tracing::debug!(
        line = line_no,
        submitted_at = raw.submitted_at,
        "response outside time window"
      );
      summary.filtered += 1;
      continue;
    }

    match parser.add_response(&raw) {
      Ok(()) => summary.ingested += 1,
      Err(e) => {
        tracing::warn!(
          line = line_no,
          participant = %raw.participant_id,
          error = %e,
          "response rejected"
        );
        summary.rejected += 1;
      }
    }
  }

  Ok(summary)
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
  let file = File::create(path)
    .with_context(|| format!("failed to create {}", path.display()))?;
  Ok(BufWriter::new(file))
}
