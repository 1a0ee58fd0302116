//! Survey definition object graph, as delivered by the study service.
//!
//! A survey carries its current version plus the versions it replaced. Each
//! version holds a tree of [`SurveyItem`]s; an item with children is a group,
//! a leaf item describes its UI through a tree of role-tagged
//! [`ItemComponent`]s.

use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Survey ──────────────────────────────────────────────────────────────────

/// A survey with its full publication history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Survey {
  pub current: Option<SurveyVersion>,
  /// Earlier versions, in the order the study service returns them.
  pub history: Vec<SurveyVersion>,
}

impl Survey {
  /// Decode a survey from its JSON representation.
  pub fn from_json(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }

  /// Key of the current version's root item, used as the prefix of every
  /// question key.
  pub fn survey_key(&self) -> Option<&str> {
    self
      .current
      .as_ref()
      .and_then(|v| v.survey_definition.as_ref())
      .map(|root| root.key.as_str())
  }
}

/// One published snapshot of a survey.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyVersion {
  pub version_id:        String,
  pub published:         i64,
  /// `0` while the version is still active.
  pub unpublished:       i64,
  pub survey_definition: Option<SurveyItem>,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// A node of the survey tree: either a group (has `items`) or a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyItem {
  pub key:        String,
  /// Optional item type tag, e.g. `pageBreak`.
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub item_type:  Option<String>,
  pub items:      Vec<SurveyItem>,
  pub components: Option<ItemComponent>,
}

impl SurveyItem {
  pub fn is_group(&self) -> bool { !self.items.is_empty() }

  /// First top-level component with the given role.
  pub fn component(&self, role: &str) -> Option<&ItemComponent> {
    self
      .components
      .as_ref()
      .and_then(|root| root.items.iter().find(|c| c.role == role))
  }
}

/// A role-tagged UI element. Components nest: a response group holds choice
/// groups, which hold options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemComponent {
  pub key:     String,
  pub role:    String,
  pub items:   Vec<ItemComponent>,
  pub content: Vec<LocalisedObject>,
}

// ─── Localised text ──────────────────────────────────────────────────────────

/// Text for one language, split into parts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalisedObject {
  pub code:  String,
  pub parts: Vec<ExpressionArg>,
}

impl LocalisedObject {
  /// Concatenation of all plain-text parts; numbers and expressions are
  /// skipped.
  pub fn text(&self) -> String {
    self
      .parts
      .iter()
      .filter_map(|p| match p {
        ExpressionArg::Str { str } => Some(str.as_str()),
        _ => None,
      })
      .collect()
  }
}

/// A single part of a localised text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "dtype", rename_all = "lowercase")]
pub enum ExpressionArg {
  Str { str: String },
  Num { num: f64 },
  /// A dynamic expression evaluated by the survey engine; opaque here.
  Exp { exp: serde_json::Value },
}

impl ExpressionArg {
  pub fn text(s: impl Into<String>) -> Self { Self::Str { str: s.into() } }
}
