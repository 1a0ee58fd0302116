//! Extracted schema descriptors.
//!
//! A [`SchemaVersion`] is the flat view of one survey version: its questions
//! in document order, each with the typed answer slots it exposes. These are
//! built once per version and never mutated afterwards, except for the
//! optional shortening of question keys.

use serde::Serialize;

// ─── Tags ────────────────────────────────────────────────────────────────────

/// The answer shape of a single response slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
  SingleChoice,
  MultipleChoice,
  Dropdown,
  Likert,
  #[serde(rename = "text")]
  TextInput,
  #[serde(rename = "number")]
  NumberInput,
  #[serde(rename = "date")]
  DateInput,
  #[serde(rename = "slider")]
  NumericSlider,
  Eq5dSlider,
  MatrixRadioRow,
  MatrixDropdown,
  MatrixInput,
  MatrixNumberInput,
  MatrixCheckbox,
}

impl SlotKind {
  /// Stable tag; matches the serde representation.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::SingleChoice => "single_choice",
      Self::MultipleChoice => "multiple_choice",
      Self::Dropdown => "dropdown",
      Self::Likert => "likert",
      Self::TextInput => "text",
      Self::NumberInput => "number",
      Self::DateInput => "date",
      Self::NumericSlider => "slider",
      Self::Eq5dSlider => "eq5d_slider",
      Self::MatrixRadioRow => "matrix_radio_row",
      Self::MatrixDropdown => "matrix_dropdown",
      Self::MatrixInput => "matrix_input",
      Self::MatrixNumberInput => "matrix_number_input",
      Self::MatrixCheckbox => "matrix_checkbox",
    }
  }

  /// The question type a slot of this kind contributes. All matrix row kinds
  /// belong to the one `matrix` question type.
  pub fn question_type(self) -> QuestionType {
    match self {
      Self::SingleChoice => QuestionType::SingleChoice,
      Self::MultipleChoice => QuestionType::MultipleChoice,
      Self::Dropdown => QuestionType::Dropdown,
      Self::Likert => QuestionType::Likert,
      Self::TextInput => QuestionType::TextInput,
      Self::NumberInput => QuestionType::NumberInput,
      Self::DateInput => QuestionType::DateInput,
      Self::NumericSlider => QuestionType::NumericSlider,
      Self::Eq5dSlider => QuestionType::Eq5dSlider,
      Self::MatrixRadioRow
      | Self::MatrixDropdown
      | Self::MatrixInput
      | Self::MatrixNumberInput
      | Self::MatrixCheckbox => QuestionType::Matrix,
    }
  }
}

/// The type of a whole question, derived from its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
  /// No answer slots at all.
  Empty,
  /// Slots of differing types.
  Unknown,
  SingleChoice,
  MultipleChoice,
  Dropdown,
  Likert,
  #[serde(rename = "text")]
  TextInput,
  #[serde(rename = "number")]
  NumberInput,
  #[serde(rename = "date")]
  DateInput,
  #[serde(rename = "slider")]
  NumericSlider,
  Eq5dSlider,
  Matrix,
}

impl QuestionType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Empty => "empty",
      Self::Unknown => "unknown",
      Self::SingleChoice => "single_choice",
      Self::MultipleChoice => "multiple_choice",
      Self::Dropdown => "dropdown",
      Self::Likert => "likert",
      Self::TextInput => "text",
      Self::NumberInput => "number",
      Self::DateInput => "date",
      Self::NumericSlider => "slider",
      Self::Eq5dSlider => "eq5d_slider",
      Self::Matrix => "matrix",
    }
  }

  /// Classify a list of slots: none → `Empty`; all of one type → that type;
  /// anything else → `Unknown`.
  pub fn classify(slots: &[ResponseSlot]) -> Self {
    let Some((first, rest)) = slots.split_first() else {
      return Self::Empty;
    };
    let ty = first.kind.question_type();
    if rest.iter().all(|s| s.kind.question_type() == ty) {
      ty
    } else {
      Self::Unknown
    }
  }
}

/// How an option inside a choice slot behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
  Radio,
  Checkbox,
  /// An entry of a dropdown list.
  #[serde(rename = "option")]
  DropdownOption,
  #[serde(rename = "text")]
  TextInput,
  #[serde(rename = "number")]
  NumberInput,
  #[serde(rename = "date")]
  DateInput,
}

impl OptionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Radio => "radio",
      Self::Checkbox => "checkbox",
      Self::DropdownOption => "option",
      Self::TextInput => "text",
      Self::NumberInput => "number",
      Self::DateInput => "date",
    }
  }

  /// `true` for plain selectable entries of a single-choice list (radio
  /// buttons and dropdown entries). Everything else carries a value of its
  /// own and gets a dedicated column.
  pub fn is_selectable(self) -> bool {
    matches!(self, Self::Radio | Self::DropdownOption)
  }
}

// ─── Descriptors ─────────────────────────────────────────────────────────────

/// One choice inside a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseOption {
  pub key:   String,
  pub kind:  OptionKind,
  pub label: String,
}

/// A typed answer-bearing element of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSlot {
  /// Dot-separated path below the response group, e.g. `scg` or `lg.cat1`.
  pub key:     String,
  pub kind:    SlotKind,
  pub label:   String,
  pub options: Vec<ResponseOption>,
}

impl ResponseSlot {
  pub fn new(key: impl Into<String>, kind: SlotKind) -> Self {
    Self {
      key: key.into(),
      kind,
      label: String::new(),
      options: Vec::new(),
    }
  }
}

/// A question and its answer slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
  pub key:       String,
  pub title:     String,
  pub responses: Vec<ResponseSlot>,
}

impl Question {
  /// Derived from the slots on every call; never stored.
  pub fn question_type(&self) -> QuestionType {
    QuestionType::classify(&self.responses)
  }
}

/// The extracted form of one survey version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaVersion {
  pub version_id:  String,
  pub published:   i64,
  /// `0` while the version is still active.
  pub unpublished: i64,
  pub questions:   Vec<Question>,
}

impl SchemaVersion {
  /// Whether a response submitted at `ts` falls into this version's
  /// publication window: `published <= ts` and, unless the version is still
  /// active, `ts < unpublished`.
  pub fn is_active_at(&self, ts: i64) -> bool {
    self.published <= ts && (self.unpublished == 0 || self.unpublished > ts)
  }
}
