//! Error types for the survey-flatten engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("current survey definition not found")]
  SchemaMissing,

  #[error(
    "no survey version found for version id {version_id:?} submitted at \
     {submitted_at}"
  )]
  VersionNotFound {
    version_id:   String,
    submitted_at: i64,
  },

  #[error("no responses, nothing is generated")]
  EmptyResult,

  #[error("translations missing")]
  TranslationsMissing,

  #[error("translation missing for language {0:?}")]
  TranslationMissing(String),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
