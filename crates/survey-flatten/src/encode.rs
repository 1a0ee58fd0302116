//! CSV rendering of ingested responses and of the extracted schema.

use std::io;

use survey_core::schema::SchemaVersion;

use crate::{
  ColumnNamespace, ColumnRegistry, MetaKind, ParsedResponse,
  error::{Error, Result},
};

/// Leading columns of every response table, in order.
pub(crate) const FIXED_COLUMNS: [&str; 3] =
  ["participantID", "version", "submitted"];

const SURVEY_INFO_HEADER: [&str; 10] = [
  "versionID",
  "published",
  "unpublished",
  "questionKey",
  "title",
  "questionType",
  "slotKey",
  "slotType",
  "slotLabel",
  "options",
];

/// Join timestamps as base-10 integers. An empty slice yields `""`.
pub fn timestamps_to_str(ts: &[i64], sep: &str) -> String {
  ts.iter().map(i64::to_string).collect::<Vec<_>>().join(sep)
}

// ─── Response table ──────────────────────────────────────────────────────────

/// Write the header and one row per response, in ingestion order.
///
/// Every row is as wide as the header: columns a response never produced are
/// written as empty cells.
pub(crate) fn write_responses<W: io::Write>(
  writer: W,
  responses: &[ParsedResponse],
  columns: &ColumnRegistry,
  include_meta: bool,
) -> Result<()> {
  if responses.is_empty() {
    return Err(Error::EmptyResult);
  }

  let context_cols = columns.sorted(ColumnNamespace::Context);
  let response_cols = columns.sorted(ColumnNamespace::Response);
  let meta_cols = if include_meta {
    columns.sorted(ColumnNamespace::Meta)
  } else {
    Vec::new()
  };
  // Routing by marker is done once per column, not once per cell.
  let meta_kinds: Vec<Option<MetaKind>> =
    meta_cols.iter().map(|c| MetaKind::from_column(c)).collect();

  let mut w = csv::Writer::from_writer(writer);
  w.write_record(
    FIXED_COLUMNS
      .iter()
      .copied()
      .chain(context_cols.iter().copied())
      .chain(response_cols.iter().copied())
      .chain(meta_cols.iter().copied()),
  )?;

  let width = FIXED_COLUMNS.len()
    + context_cols.len()
    + response_cols.len()
    + meta_cols.len();
  for resp in responses {
    let submitted = resp.submitted_at.to_string();
    let mut row: Vec<&str> = Vec::with_capacity(width);
    row.extend([
      resp.participant_id.as_str(),
      resp.version.as_str(),
      submitted.as_str(),
    ]);
    row.extend(context_cols.iter().map(|c| cell(resp.context.get(*c))));
    row.extend(response_cols.iter().map(|c| cell(resp.responses.get(*c))));
    row.extend(meta_cols.iter().zip(&meta_kinds).map(|(c, kind)| {
      cell(kind.and_then(|k| resp.meta.get(k).get(*c)))
    }));
    w.write_record(&row)?;
  }

  w.flush()?;
  Ok(())
}

fn cell(value: Option<&String>) -> &str {
  value.map(String::as_str).unwrap_or_default()
}

// ─── Survey info ─────────────────────────────────────────────────────────────

/// Write one row per (version, question, slot). Questions without slots get
/// a single row with empty slot fields.
pub(crate) fn write_survey_info<W: io::Write>(
  writer: W,
  versions: &[SchemaVersion],
) -> Result<()> {
  let mut w = csv::Writer::from_writer(writer);
  w.write_record(SURVEY_INFO_HEADER)?;

  for version in versions {
    let published = version.published.to_string();
    let unpublished = version.unpublished.to_string();
    for question in &version.questions {
      let prefix = [
        version.version_id.as_str(),
        published.as_str(),
        unpublished.as_str(),
        question.key.as_str(),
        question.title.as_str(),
        question.question_type().as_str(),
      ];

      if question.responses.is_empty() {
        w.write_record(prefix.iter().chain(&["", "", "", ""]))?;
        continue;
      }
      for slot in &question.responses {
        let options = slot
          .options
          .iter()
          .map(|o| format!("{}:{}", o.key, o.kind.as_str()))
          .collect::<Vec<_>>()
          .join(";");
        w.write_record(prefix.iter().chain(&[
          slot.key.as_str(),
          slot.kind.as_str(),
          slot.label.as_str(),
          options.as_str(),
        ]))?;
      }
    }
  }

  w.flush()?;
  Ok(())
}
