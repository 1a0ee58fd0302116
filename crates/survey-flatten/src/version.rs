//! Selection of the schema version a response was answered against.

use survey_core::schema::SchemaVersion;

use crate::error::{Error, Result};

/// Pick the version for a response.
///
/// A non-empty `version_id` is matched exactly first. Without a match the
/// publication windows decide: the first version (in slice order) active at
/// `submitted_at` wins. Callers pass the current version first, then the
/// history newest-first; overlapping windows are not detected.
pub fn resolve_version<'a>(
  version_id: &str,
  submitted_at: i64,
  versions: &'a [SchemaVersion],
) -> Result<&'a SchemaVersion> {
  if !version_id.is_empty() {
    if let Some(v) = versions.iter().find(|v| v.version_id == version_id) {
      return Ok(v);
    }
    tracing::debug!(
      version_id,
      submitted_at,
      "unknown version id, falling back to submission time"
    );
  }

  versions
    .iter()
    .find(|v| v.is_active_at(submitted_at))
    .ok_or_else(|| Error::VersionNotFound {
      version_id: version_id.to_string(),
      submitted_at,
    })
}
