//! Survey response flattening engine.
//!
//! Turns a versioned survey definition and a stream of raw responses into one
//! CSV table. Pure synchronous; no I/O beyond the writer handed to the
//! finalisation call.
//!
//! # Quick start
//!
//! ```no_run
//! use survey_core::{definition::Survey, response::SurveyResponse};
//! use survey_flatten::{ParserConfig, ResponseParser};
//!
//! # fn load() -> (Survey, Vec<SurveyResponse>) { unimplemented!() }
//! let (survey, raw_responses) = load();
//! let config = ParserConfig::default();
//! let mut parser = ResponseParser::new(&survey, config).unwrap();
//! for raw in &raw_responses {
//!   if let Err(e) = parser.add_response(raw) {
//!     eprintln!("skipping response: {e}");
//!   }
//! }
//! parser.write_csv(std::io::stdout(), false).unwrap();
//! ```

pub mod columns;
mod encode;
pub mod error;
mod extract;
mod flatten;
mod parser;
mod version;

use std::collections::BTreeMap;

pub use columns::{ColumnNamespace, ColumnRegistry};
pub use encode::timestamps_to_str;
pub use error::{Error, Result};
pub use extract::{extract_questions, extract_version, get_translation};
pub use flatten::{flatten, retrieve_response_item};
pub use parser::{ParserConfig, ResponseParser};
use survey_core::response::ResponseMeta;
pub use version::resolve_version;

/// Key of the answer-tree root node every slot path starts from.
pub const RESPONSE_ROOT_KEY: &str = "rg";

/// Separator used when joining timestamp arrays in metadata cells.
pub const META_ARRAY_SEPARATOR: &str = ";";

// ─── Parsed responses ────────────────────────────────────────────────────────

/// One ingested response, flattened into column → value maps.
///
/// Created once per successful ingestion and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
  pub participant_id: String,
  /// The id of the version the response was resolved against.
  pub version:        String,
  pub submitted_at:   i64,
  pub context:        BTreeMap<String, String>,
  pub responses:      BTreeMap<String, String>,
  pub meta:           MetaColumns,
}

/// The four per-question metadata maps. All four share the column namespace
/// [`ColumnNamespace::Meta`]; a column is routed to its map by the marker it
/// contains (see [`MetaKind::from_column`]).
#[derive(Debug, Clone, Default)]
pub struct MetaColumns {
  pub initialised:  BTreeMap<String, String>,
  pub displayed:    BTreeMap<String, String>,
  pub responded:    BTreeMap<String, String>,
  pub item_version: BTreeMap<String, String>,
}

impl MetaColumns {
  pub fn get(&self, kind: MetaKind) -> &BTreeMap<String, String> {
    match kind {
      MetaKind::Initialised => &self.initialised,
      MetaKind::Displayed => &self.displayed,
      MetaKind::Responded => &self.responded,
      MetaKind::ItemVersion => &self.item_version,
    }
  }

  pub(crate) fn get_mut(
    &mut self,
    kind: MetaKind,
  ) -> &mut BTreeMap<String, String> {
    match kind {
      MetaKind::Initialised => &mut self.initialised,
      MetaKind::Displayed => &mut self.displayed,
      MetaKind::Responded => &mut self.responded,
      MetaKind::ItemVersion => &mut self.item_version,
    }
  }
}

/// The kinds of per-question metadata exported next to the answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
  Initialised,
  Displayed,
  Responded,
  ItemVersion,
}

impl MetaKind {
  pub const ALL: [MetaKind; 4] = [
    MetaKind::Initialised,
    MetaKind::Displayed,
    MetaKind::Responded,
    MetaKind::ItemVersion,
  ];

  /// Marker embedded in the column name.
  pub fn marker(self) -> &'static str {
    match self {
      Self::Initialised => "metaInit",
      Self::Displayed => "metaDisplayed",
      Self::Responded => "metaResponse",
      Self::ItemVersion => "metaItemVersion",
    }
  }

  /// `questionKey + sep + marker`.
  pub fn column(self, question_key: &str, sep: &str) -> String {
    format!("{question_key}{sep}{}", self.marker())
  }

  /// Route a metadata column back to its kind by its trailing marker, so a
  /// marker inside the question key cannot misroute it.
  pub fn from_column(column: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| column.ends_with(k.marker()))
  }

  /// Cell value for this kind, taken from an item's recorded metadata.
  pub fn value(self, meta: &ResponseMeta) -> String {
    let sep = META_ARRAY_SEPARATOR;
    match self {
      Self::Initialised => timestamps_to_str(&meta.rendered, sep),
      Self::Displayed => timestamps_to_str(&meta.displayed, sep),
      Self::Responded => timestamps_to_str(&meta.responded, sep),
      Self::ItemVersion => meta.version.to_string(),
    }
  }
}


// ─── Shared test helpers ─────────────────────────────────────────────────────
