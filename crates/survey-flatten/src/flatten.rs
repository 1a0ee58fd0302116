//! Question + raw answer → flat columns.
//!
//! Every rule first writes the full candidate column set of the question
//! (empty values), then fills in what the answer tree holds. Two responses to
//! the same question version therefore always produce the same column names,
//! except for selections of keys the schema does not know.
//!
//! Column names are `questionKey + sep + slotKey [+ sep + optionKey]`; with a
//! single slot the slot part is dropped, except for matrix rows.

use std::collections::BTreeMap;

use survey_core::{
  response::{ResponseItem, SurveyItemResponse},
  schema::{OptionKind, Question, QuestionType, ResponseSlot, SlotKind},
};

use crate::RESPONSE_ROOT_KEY;

const OPEN_FIELD_COL_SUFFIX: &str = "open";
const TRUE_VALUE: &str = "TRUE";
const FALSE_VALUE: &str = "FALSE";

type Columns = BTreeMap<String, String>;

// ─── Column naming ───────────────────────────────────────────────────────────

struct Naming<'a> {
  question_key: &'a str,
  sep:          &'a str,
  single_slot:  bool,
}

impl<'a> Naming<'a> {
  fn new(question: &'a Question, sep: &'a str) -> Self {
    Self {
      question_key: &question.key,
      sep,
      single_slot: question.responses.len() == 1,
    }
  }

  fn slot(&self, slot: &ResponseSlot) -> String {
    if self.single_slot {
      self.question_key.to_string()
    } else {
      format!("{}{}{}", self.question_key, self.sep, slot.key)
    }
  }

  /// Matrix rows always keep their row id, even as the only slot.
  fn row(&self, slot: &ResponseSlot) -> String {
    format!("{}{}{}", self.question_key, self.sep, slot.key)
  }

  fn option(&self, slot: &ResponseSlot, option_key: &str) -> String {
    format!("{}{}{}", self.slot(slot), self.sep, option_key)
  }

  fn open_field(&self, slot: &ResponseSlot, option_key: &str) -> String {
    format!(
      "{}{}{}",
      self.option(slot, option_key),
      self.sep,
      OPEN_FIELD_COL_SUFFIX
    )
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Flatten the answer to `question` into column → value pairs.
///
/// `response` is the participant's item response for this question, if any;
/// `None` (or a missing path inside it) reads as "unanswered".
pub fn flatten(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  sep: &str,
) -> Columns {
  let naming = Naming::new(question, sep);
  match question.question_type() {
    QuestionType::SingleChoice
    | QuestionType::Dropdown
    | QuestionType::Likert => single_choice(question, response, &naming),
    QuestionType::MultipleChoice => {
      multiple_choice(question, response, &naming)
    }
    QuestionType::TextInput
    | QuestionType::NumberInput
    | QuestionType::DateInput
    | QuestionType::NumericSlider
    | QuestionType::Eq5dSlider => inputs(question, response, &naming),
    QuestionType::Matrix => matrix(question, response, &naming),
    QuestionType::Unknown => unknown(question, response, &naming),
    QuestionType::Empty => Columns::new(),
  }
}

/// Walk `full_key` (dot-separated) down the answer tree. The first segment
/// must match the root node's key.
pub fn retrieve_response_item<'a>(
  response: Option<&'a SurveyItemResponse>,
  full_key: &str,
) -> Option<&'a ResponseItem> {
  let root = response?.response.as_ref()?;
  let mut segments = full_key.split('.');
  if segments.next()? != root.key {
    return None;
  }
  segments.try_fold(root, |node, key| node.child(key))
}

fn slot_answer<'a>(
  response: Option<&'a SurveyItemResponse>,
  slot: &ResponseSlot,
) -> Option<&'a ResponseItem> {
  let path = format!("{RESPONSE_ROOT_KEY}.{}", slot.key);
  retrieve_response_item(response, &path)
}

/// The one selection expected inside `group`. Zero selections yield `None`;
/// extra selections are logged and ignored.
fn single_selection<'a>(
  question_key: &str,
  group: &'a ResponseItem,
) -> Option<&'a ResponseItem> {
  match group.items.as_slice() {
    [] => {
      tracing::warn!(
        question = question_key,
        slot = %group.key,
        "unexpected response group: no selection"
      );
      None
    }
    [selection] => Some(selection),
    [first, ..] => {
      tracing::warn!(
        question = question_key,
        slot = %group.key,
        count = group.items.len(),
        "unexpected response group: multiple selections, using the first"
      );
      Some(first)
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Radio groups, dropdowns and likert scales: the selected key per slot, plus
/// a value column per non-selectable option.
fn single_choice(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  naming: &Naming<'_>,
) -> Columns {
  let mut cols = Columns::new();
  for slot in &question.responses {
    let slot_col = naming.slot(slot);
    cols.insert(slot_col.clone(), String::new());
    for option in slot.options.iter().filter(|o| !o.kind.is_selectable()) {
      cols.insert(naming.option(slot, &option.key), String::new());
    }

    let Some(selection) = slot_answer(response, slot)
      .and_then(|group| single_selection(&question.key, group))
    else {
      continue;
    };
    cols.insert(slot_col, selection.key.clone());
    if let Some(v) = cols.get_mut(&naming.option(slot, &selection.key)) {
      v.clone_from(&selection.value);
    }
  }
  cols
}

/// Checkbox groups: one TRUE/FALSE column per option and an open column per
/// option that carries its own value. Unanswered slots stay empty instead of
/// FALSE.
fn multiple_choice(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  naming: &Naming<'_>,
) -> Columns {
  let mut cols = Columns::new();
  for slot in &question.responses {
    let selections = slot_answer(response, slot)
      .map(|group| group.items.as_slice())
      .unwrap_or_default();
    let default = if selections.is_empty() { "" } else { FALSE_VALUE };

    for option in &slot.options {
      cols.insert(naming.option(slot, &option.key), default.to_string());
      if option.kind != OptionKind::Checkbox {
        cols.insert(naming.open_field(slot, &option.key), String::new());
      }
    }

    for item in selections {
      cols.insert(naming.option(slot, &item.key), TRUE_VALUE.to_string());
      if let Some(v) = cols.get_mut(&naming.open_field(slot, &item.key)) {
        v.clone_from(&item.value);
      }
    }
  }
  cols
}

/// Free inputs and sliders: the leaf value per slot.
fn inputs(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  naming: &Naming<'_>,
) -> Columns {
  question
    .responses
    .iter()
    .map(|slot| {
      let value = slot_answer(response, slot)
        .map(|item| item.value.clone())
        .unwrap_or_default();
      (naming.slot(slot), value)
    })
    .collect()
}

/// One column per row slot. Radio rows hold the selected key; value cells
/// hold the selection's value, falling back to its key.
fn matrix(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  naming: &Naming<'_>,
) -> Columns {
  let mut cols = Columns::new();
  for slot in &question.responses {
    let value = slot_answer(response, slot).and_then(|cell| {
      if slot.kind == SlotKind::MatrixRadioRow {
        return single_selection(&question.key, cell).map(|s| s.key.clone());
      }
      if cell.items.is_empty() {
        // Input cells answer directly on the cell node.
        return Some(cell.value.clone());
      }
      single_selection(&question.key, cell).map(value_or_key)
    });
    cols.insert(naming.row(slot), value.unwrap_or_default());
  }
  cols
}

/// Mixed-shape questions: the single-choice layout, reading either the first
/// selection or, for leaf answers, the slot node itself.
fn unknown(
  question: &Question,
  response: Option<&SurveyItemResponse>,
  naming: &Naming<'_>,
) -> Columns {
  let mut cols = Columns::new();
  for slot in &question.responses {
    let slot_col = naming.slot(slot);
    cols.insert(slot_col.clone(), String::new());
    for option in slot.options.iter().filter(|o| !o.kind.is_selectable()) {
      cols.insert(naming.option(slot, &option.key), String::new());
    }

    let Some(answer) = slot_answer(response, slot) else {
      continue;
    };
    if answer.items.is_empty() {
      cols.insert(slot_col, value_or_key(answer));
      continue;
    }
    if let Some(selection) = single_selection(&question.key, answer) {
      cols.insert(slot_col, selection.key.clone());
      if let Some(v) = cols.get_mut(&naming.option(slot, &selection.key)) {
        v.clone_from(&selection.value);
      }
    }
  }
  cols
}

fn value_or_key(item: &ResponseItem) -> String {
  if item.value.is_empty() {
    item.key.clone()
  } else {
    item.value.clone()
  }
}
