//! Raw survey responses, as streamed by the study service.
//!
//! One [`SurveyResponse`] per submission. Each answered item contributes a
//! [`SurveyItemResponse`] whose answer tree mirrors the component tree of the
//! question: the root node is the response group (`rg`), its children are
//! choice groups or inputs, and selected options appear as leaves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One participant submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyResponse {
  pub key:            String,
  pub participant_id: String,
  /// Version id reported by the participant's client; may be empty.
  pub version_id:     String,
  pub submitted_at:   i64,
  /// Client-supplied context, e.g. `language` or engine version.
  pub context:        BTreeMap<String, String>,
  pub responses:      Vec<SurveyItemResponse>,
}

impl SurveyResponse {
  /// Decode one response from its JSON representation.
  pub fn from_json(input: &str) -> Result<Self> {
    Ok(serde_json::from_str(input)?)
  }
}

/// The answer to one survey item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyItemResponse {
  pub key:      String,
  pub meta:     Option<ResponseMeta>,
  pub response: Option<ResponseItem>,
}

/// A node of the answer tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseItem {
  pub key:   String,
  pub value: String,
  pub dtype: String,
  pub items: Vec<ResponseItem>,
}

impl ResponseItem {
  /// A leaf carrying only a key (e.g. a selected option).
  pub fn leaf(key: impl Into<String>) -> Self {
    Self { key: key.into(), ..Default::default() }
  }

  /// A leaf carrying a key and a value (e.g. a filled-in input).
  pub fn answer(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self { key: key.into(), value: value.into(), ..Default::default() }
  }

  /// A group node.
  pub fn group(key: impl Into<String>, items: Vec<ResponseItem>) -> Self {
    Self { key: key.into(), items, ..Default::default() }
  }

  pub fn child(&self, key: &str) -> Option<&ResponseItem> {
    self.items.iter().find(|i| i.key == key)
  }
}

/// Interaction timestamps recorded by the client for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseMeta {
  pub position:  i32,
  pub rendered:  Vec<i64>,
  pub displayed: Vec<i64>,
  pub responded: Vec<i64>,
  /// Version of the item definition the participant saw.
  pub version:   i32,
}
