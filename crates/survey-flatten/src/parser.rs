//! The response-flattening engine.

use std::io;

use survey_core::{
  definition::Survey,
  response::{SurveyItemResponse, SurveyResponse},
  schema::SchemaVersion,
};

use crate::{
  ColumnNamespace, ColumnRegistry, MetaKind, ParsedResponse, encode,
  error::{Error, Result},
  extract::extract_version,
  flatten::flatten,
  version::resolve_version,
};

/// Engine-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
  /// Language code used for question titles and labels.
  pub preview_language: String,
  /// Strip `surveyKey.` from question keys.
  pub short_keys:       bool,
  /// Joins key segments into column names.
  pub separator:        String,
}

impl Default for ParserConfig {
  fn default() -> Self {
    Self {
      preview_language: "en".to_string(),
      short_keys:       false,
      separator:        "-".to_string(),
    }
  }
}

/// Accumulates flattened responses for one survey.
///
/// Responses are ingested one at a time with [`ResponseParser::add_response`];
/// a rejected response leaves the parser untouched and usable. The table is
/// produced by [`ResponseParser::write_csv`], which can be called any number
/// of times.
#[derive(Debug)]
pub struct ResponseParser {
  survey_key: String,
  /// `survey_key + "."`, stripped when short keys are enabled.
  key_prefix: String,
  config:     ParserConfig,
  /// Current version first, then the history in upstream order.
  versions:   Vec<SchemaVersion>,
  responses:  Vec<ParsedResponse>,
  columns:    ColumnRegistry,
}

impl ResponseParser {
  /// Extract every version of `survey`.
  ///
  /// Fails with [`Error::SchemaMissing`] when there is no current version or
  /// it carries no definition.
  pub fn new(survey: &Survey, config: ParserConfig) -> Result<Self> {
    let current = survey.current.as_ref().ok_or(Error::SchemaMissing)?;
    let survey_key = survey
      .survey_key()
      .ok_or(Error::SchemaMissing)?
      .to_string();
    let key_prefix = format!("{survey_key}.");

    let mut versions: Vec<SchemaVersion> = std::iter::once(current)
      .chain(&survey.history)
      .map(|v| extract_version(v, &config.preview_language))
      .collect();

    if config.short_keys {
      for question in versions.iter_mut().flat_map(|v| &mut v.questions) {
        if let Some(short) = question.key.strip_prefix(&key_prefix) {
          question.key = short.to_string();
        }
      }
    }

    tracing::debug!(
      survey_key = %survey_key,
      versions = versions.len(),
      "survey versions extracted"
    );

    Ok(Self {
      survey_key,
      key_prefix,
      config,
      versions,
      responses: Vec::new(),
      columns: ColumnRegistry::new(),
    })
  }

  /// Flatten one raw response against the version it was answered in.
  ///
  /// Fails with [`Error::VersionNotFound`] when no version matches; nothing
  /// is recorded in that case.
  pub fn add_response(&mut self, raw: &SurveyResponse) -> Result<()> {
    let version =
      resolve_version(&raw.version_id, raw.submitted_at, &self.versions)?;
    let sep = self.config.separator.as_str();

    let mut parsed = ParsedResponse {
      participant_id: raw.participant_id.clone(),
      version: version.version_id.clone(),
      submitted_at: raw.submitted_at,
      context: raw.context.clone(),
      ..Default::default()
    };

    for question in &version.questions {
      let answer = self.find_item_response(&raw.responses, &question.key);
      parsed.responses.extend(flatten(question, answer, sep));

      let meta = answer.and_then(|a| a.meta.as_ref());
      for kind in MetaKind::ALL {
        let col = kind.column(&question.key, sep);
        let value = meta.map(|m| kind.value(m)).unwrap_or_default();
        self.columns.add(ColumnNamespace::Meta, &col);
        parsed.meta.get_mut(kind).insert(col, value);
      }
    }

    for col in parsed.responses.keys() {
      self.columns.add(ColumnNamespace::Response, col);
    }
    for col in parsed.context.keys() {
      self.columns.add(ColumnNamespace::Context, col);
    }

    self.responses.push(parsed);
    Ok(())
  }

  /// The item response answering `question_key`, comparing shortened keys
  /// when short keys are enabled.
  fn find_item_response<'r>(
    &self,
    items: &'r [SurveyItemResponse],
    question_key: &str,
  ) -> Option<&'r SurveyItemResponse> {
    items.iter().find(|item| {
      let key = if self.config.short_keys {
        item.key.strip_prefix(&self.key_prefix).unwrap_or(&item.key)
      } else {
        item.key.as_str()
      };
      key == question_key
    })
  }

  /// Write every ingested response as CSV.
  ///
  /// Fails with [`Error::EmptyResult`] when nothing was ingested.
  pub fn write_csv<W: io::Write>(
    &self,
    writer: W,
    include_meta: bool,
  ) -> Result<()> {
    let (responses, columns) = (&self.responses, &self.columns);
    encode::write_responses(writer, responses, columns, include_meta)
  }

  /// Write the structure of every extracted version as CSV.
  pub fn write_survey_info<W: io::Write>(&self, writer: W) -> Result<()> {
    encode::write_survey_info(writer, &self.versions)
  }

  pub fn survey_key(&self) -> &str { &self.survey_key }

  pub fn config(&self) -> &ParserConfig { &self.config }

  pub fn survey_versions(&self) -> &[SchemaVersion] { &self.versions }

  pub fn responses(&self) -> &[ParsedResponse] { &self.responses }

  pub fn columns(&self) -> &ColumnRegistry { &self.columns }
}
