//! Survey tree → question descriptors.
//!
//! Pipeline:
//!   SurveyItem tree
//!     └─ extract_questions()      → leaf items with a response group
//!          └─ map_response_slots() → ResponseSlots per response-group child
//!               └─ map_options()   → ResponseOption per choice component

use survey_core::{
  definition::{ItemComponent, LocalisedObject, SurveyItem, SurveyVersion},
  schema::{
    OptionKind, Question, ResponseOption, ResponseSlot, SchemaVersion, SlotKind,
  },
};

use crate::error::{Error, Result};

const ROLE_RESPONSE_GROUP: &str = "responseGroup";
const ROLE_TITLE: &str = "title";

// ─── Versions ────────────────────────────────────────────────────────────────

/// Extract the flat descriptor of one survey version. Titles and labels are
/// taken in `lang`.
pub fn extract_version(version: &SurveyVersion, lang: &str) -> SchemaVersion {
  SchemaVersion {
    version_id:  version.version_id.clone(),
    published:   version.published,
    unpublished: version.unpublished,
    questions:   extract_questions(version.survey_definition.as_ref(), lang),
  }
}

// ─── Tree walk ───────────────────────────────────────────────────────────────

/// List the questions below `root` in document order.
///
/// Groups are flattened at any depth. The walk uses an explicit stack, so
/// nesting depth is bounded by memory only. Leaf items without a response
/// group (static text, page breaks) are skipped.
pub fn extract_questions(
  root: Option<&SurveyItem>,
  lang: &str,
) -> Vec<Question> {
  let mut questions = Vec::new();
  let Some(root) = root else {
    return questions;
  };

  let mut stack: Vec<&SurveyItem> = root.items.iter().rev().collect();
  while let Some(item) = stack.pop() {
    if item.is_group() {
      stack.extend(item.items.iter().rev());
      continue;
    }

    let Some(rg) = item.component(ROLE_RESPONSE_GROUP) else {
      tracing::trace!(key = %item.key, "item without response group skipped");
      continue;
    };

    let title = match item.component(ROLE_TITLE) {
      Some(c) => get_translation(&c.content, lang).unwrap_or_else(|e| {
        tracing::warn!(key = %item.key, "question title error: {e}");
        String::new()
      }),
      None => String::new(),
    };

    let responses = rg
      .items
      .iter()
      .flat_map(|c| map_response_slots(c, &item.key, lang))
      .collect();

    questions.push(Question {
      key: item.key.clone(),
      title,
      responses,
    });
  }
  questions
}

// ─── Slots ───────────────────────────────────────────────────────────────────

/// Map one response-group child to its slots. Only likert groups and
/// matrices expand to more than one.
fn map_response_slots(
  c: &ItemComponent,
  question_key: &str,
  lang: &str,
) -> Vec<ResponseSlot> {
  let slot = match c.role.as_str() {
    "singleChoiceGroup" => {
      choice_slot(c, SlotKind::SingleChoice, OptionKind::Radio, lang)
    }
    "multipleChoiceGroup" => {
      choice_slot(c, SlotKind::MultipleChoice, OptionKind::Checkbox, lang)
    }
    "dropDownGroup" => {
      choice_slot(c, SlotKind::Dropdown, OptionKind::DropdownOption, lang)
    }
    "input" | "multilineTextInput" => input_slot(c, SlotKind::TextInput, lang),
    "numberInput" => input_slot(c, SlotKind::NumberInput, lang),
    "dateInput" => input_slot(c, SlotKind::DateInput, lang),
    "sliderNumeric" => ResponseSlot::new(&c.key, SlotKind::NumericSlider),
    "eq5d-health-indicator" => ResponseSlot::new(&c.key, SlotKind::Eq5dSlider),
    "likert" => ResponseSlot {
      options: radio_options(&c.items, lang),
      ..ResponseSlot::new(&c.key, SlotKind::Likert)
    },
    "likertGroup" => return likert_group_slots(c, lang),
    "matrix" => return matrix_slots(c, lang),
    role => {
      tracing::debug!(
        question = question_key,
        key = %c.key,
        role,
        "unrecognized response component skipped"
      );
      return Vec::new();
    }
  };
  vec![slot]
}

fn choice_slot(
  c: &ItemComponent,
  kind: SlotKind,
  selectable: OptionKind,
  lang: &str,
) -> ResponseSlot {
  ResponseSlot {
    options: map_options(&c.items, selectable, lang),
    ..ResponseSlot::new(&c.key, kind)
  }
}

fn input_slot(c: &ItemComponent, kind: SlotKind, lang: &str) -> ResponseSlot {
  ResponseSlot {
    label: label(&c.content, lang),
    ..ResponseSlot::new(&c.key, kind)
  }
}

/// One likert slot per category, keyed `group.category`. A category's label
/// is the text component preceding it.
fn likert_group_slots(group: &ItemComponent, lang: &str) -> Vec<ResponseSlot> {
  let mut slots = Vec::new();
  let mut pending_label: Option<String> = None;
  for c in &group.items {
    match c.role.as_str() {
      "text" => pending_label = Some(label(&c.content, lang)),
      "likert" => slots.push(ResponseSlot {
        key:     format!("{}.{}", group.key, c.key),
        kind:    SlotKind::Likert,
        label:   pending_label.take().unwrap_or_default(),
        options: radio_options(&c.items, lang),
      }),
      _ => {}
    }
  }
  slots
}

/// One slot per radio row, one per cell of a response row. Header rows carry
/// no answers.
fn matrix_slots(matrix: &ItemComponent, lang: &str) -> Vec<ResponseSlot> {
  let mut slots = Vec::new();
  for row in &matrix.items {
    let row_key = format!("{}.{}", matrix.key, row.key);
    let row_label = row
      .items
      .iter()
      .find(|c| c.role == "label")
      .map(|c| label(&c.content, lang))
      .unwrap_or_default();

    match row.role.as_str() {
      "radioRow" => {
        let options = row.items.iter().filter(|c| c.role == "option");
        slots.push(ResponseSlot {
          key:     row_key,
          kind:    SlotKind::MatrixRadioRow,
          label:   row_label,
          options: options
            .map(|o| option(o, OptionKind::Radio, lang))
            .collect(),
        });
      }
      "responseRow" => {
        for cell in &row.items {
          let (kind, options) = match cell.role.as_str() {
            "dropDownGroup" => (
              SlotKind::MatrixDropdown,
              map_options(&cell.items, OptionKind::DropdownOption, lang),
            ),
            "input" => (SlotKind::MatrixInput, Vec::new()),
            "numberInput" => (SlotKind::MatrixNumberInput, Vec::new()),
            "check" => (SlotKind::MatrixCheckbox, Vec::new()),
            _ => continue,
          };
          slots.push(ResponseSlot {
            key: format!("{row_key}.{}", cell.key),
            kind,
            label: row_label.clone(),
            options,
          });
        }
      }
      _ => {}
    }
  }
  slots
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// Map choice components to options. `option` components become
/// `selectable`; embedded inputs keep their own kind. Anything else (display
/// text, expressions) is skipped.
fn map_options(
  items: &[ItemComponent],
  selectable: OptionKind,
  lang: &str,
) -> Vec<ResponseOption> {
  items
    .iter()
    .filter_map(|o| {
      let kind = match o.role.as_str() {
        "option" => selectable,
        "input" => OptionKind::TextInput,
        "numberInput" => OptionKind::NumberInput,
        "dateInput" => OptionKind::DateInput,
        role => {
          tracing::debug!(key = %o.key, role, "option component skipped");
          return None;
        }
      };
      Some(option(o, kind, lang))
    })
    .collect()
}

/// Every child becomes a radio option (likert scales).
fn radio_options(items: &[ItemComponent], lang: &str) -> Vec<ResponseOption> {
  items
    .iter()
    .map(|o| option(o, OptionKind::Radio, lang))
    .collect()
}

fn option(c: &ItemComponent, kind: OptionKind, lang: &str) -> ResponseOption {
  ResponseOption {
    key: c.key.clone(),
    kind,
    label: label(&c.content, lang),
  }
}

// ─── Text ────────────────────────────────────────────────────────────────────

/// Labels are best-effort: a missing translation yields an empty label.
fn label(content: &[LocalisedObject], lang: &str) -> String {
  get_translation(content, lang).unwrap_or_default()
}

/// Text of `content` in `lang`, with all plain-text parts merged.
pub fn get_translation(
  content: &[LocalisedObject],
  lang: &str,
) -> Result<String> {
  if content.is_empty() {
    return Err(Error::TranslationsMissing);
  }
  content
    .iter()
    .find(|t| t.code == lang)
    .map(LocalisedObject::text)
    .ok_or_else(|| Error::TranslationMissing(lang.to_string()))
}

#[cfg(test)]
mod tests {
  use survey_core::{
    definition::{ExpressionArg, LocalisedObject},
    schema::QuestionType,
  };

  use super::*;
  use crate::test_helpers::*;

  fn extract(root: &SurveyItem) -> Vec<Question> {
    extract_questions(Some(root), "en")
  }

  fn single(rg: ItemComponent) -> Question {
    let root = mock_group("s", vec![mock_question("s.Q", "en", "T", rg)]);
    let mut qs = extract(&root);
    assert_eq!(qs.len(), 1);
    qs.remove(0)
  }

  // ── Tree walk ──────────────────────────────────────────────────────────────

  #[test]
  fn missing_root_yields_nothing() {
    assert!(extract_questions(None, "en").is_empty());
  }

  #[test]
  fn nested_groups_in_document_order() {
    let rg = || mock_single_choice_group("en", &[("1", "option", "Yes")]);
    let root = mock_group("s", vec![
      mock_question("s.A", "en", "A", rg()),
      mock_group("s.G1", vec![
        mock_question("s.G1.B", "en", "B", rg()),
        mock_group("s.G1.G2", vec![mock_question(
          "s.G1.G2.C",
          "en",
          "C",
          rg(),
        )]),
        mock_question("s.G1.D", "en", "D", rg()),
      ]),
      mock_question("s.E", "en", "E", rg()),
    ]);
    let keys: Vec<_> = extract(&root).into_iter().map(|q| q.key).collect();
    assert_eq!(keys, ["s.A", "s.G1.B", "s.G1.G2.C", "s.G1.D", "s.E"]);
  }

  #[test]
  fn deep_nesting_does_not_recurse() {
    let mut item = mock_question(
      "s.deep",
      "en",
      "Deep",
      mock_single_choice_group("en", &[("1", "option", "Yes")]),
    );
    for i in 0..2_000 {
      item = mock_group(&format!("s.G{i}"), vec![item]);
    }
    let root = mock_group("s", vec![item]);
    let qs = extract(&root);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].key, "s.deep");
  }

  #[test]
  fn leaf_without_response_group_skipped() {
    let display = SurveyItem {
      key: "s.text".into(),
      components: Some(with_items(component("", "root"), vec![labelled(
        "", "text", "en", "Hello",
      )])),
      ..Default::default()
    };
    let page_break = SurveyItem {
      key: "s.pb".into(),
      item_type: Some("pageBreak".into()),
      ..Default::default()
    };
    let root = mock_group("s", vec![
      display,
      page_break,
      mock_question("s.Q", "en", "T", mock_single_choice_group("en", &[])),
    ]);
    let qs = extract(&root);
    assert_eq!(qs.len(), 1);
    assert_eq!(qs[0].key, "s.Q");
  }

  #[test]
  fn title_in_preferred_language() {
    let root = mock_group("s", vec![mock_question(
      "s.Q",
      "en",
      "Title of Q",
      mock_single_choice_group("en", &[]),
    )]);
    assert_eq!(extract(&root)[0].title, "Title of Q");
    assert_eq!(extract_questions(Some(&root), "de")[0].title, "");
  }

  #[test]
  fn version_fields_copied() {
    let version = SurveyVersion {
      version_id:        "v7".into(),
      published:         10,
      unpublished:       20,
      survey_definition: Some(mock_survey_definition("en")),
    };
    let sv = extract_version(&version, "en");
    assert_eq!(sv.version_id, "v7");
    assert_eq!((sv.published, sv.unpublished), (10, 20));
    assert_eq!(sv.questions.len(), 3);
  }

  // ── Shapes ─────────────────────────────────────────────────────────────────

  #[test]
  fn single_choice_options() {
    let q = single(mock_single_choice_group("en", &[
      ("1", "option", "Yes"),
      ("2", "option", "No"),
      ("3", "input", "Other"),
      ("4", "numberInput", "Count"),
      ("5", "dateInput", "When"),
      ("x", "text", "ignored"),
    ]));
    assert_eq!(q.question_type(), QuestionType::SingleChoice);
    let slot = &q.responses[0];
    assert_eq!(slot.key, "scg");
    let kinds: Vec<_> = slot.options.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, [
      OptionKind::Radio,
      OptionKind::Radio,
      OptionKind::TextInput,
      OptionKind::NumberInput,
      OptionKind::DateInput,
    ]);
    assert_eq!(slot.options[1].label, "No");
  }

  #[test]
  fn multiple_choice_options_are_checkboxes() {
    let q = single(mock_multiple_choice_group("en", &[
      ("1", "option", "A"),
      ("2", "input", "Other"),
    ]));
    assert_eq!(q.question_type(), QuestionType::MultipleChoice);
    assert_eq!(q.responses[0].options[0].kind, OptionKind::Checkbox);
    assert_eq!(q.responses[0].options[1].kind, OptionKind::TextInput);
  }

  #[test]
  fn dropdown_options() {
    let q = single(response_group(vec![with_items(
      component("ddg", "dropDownGroup"),
      vec![labelled("a", "option", "en", "A")],
    )]));
    assert_eq!(q.question_type(), QuestionType::Dropdown);
    assert_eq!(q.responses[0].options[0].kind, OptionKind::DropdownOption);
  }

  #[test]
  fn standalone_inputs() {
    for (role, ty) in [
      ("input", QuestionType::TextInput),
      ("multilineTextInput", QuestionType::TextInput),
      ("numberInput", QuestionType::NumberInput),
      ("dateInput", QuestionType::DateInput),
    ] {
      let q = single(response_group(vec![labelled("inp", role, "en", "Age?")]));
      assert_eq!(q.question_type(), ty, "role {role}");
      assert_eq!(q.responses[0].label, "Age?");
      assert!(q.responses[0].options.is_empty());
    }
  }

  #[test]
  fn sliders() {
    let q = single(response_group(vec![component("sl", "sliderNumeric")]));
    assert_eq!(q.question_type(), QuestionType::NumericSlider);
    let q =
      single(response_group(vec![component("eq", "eq5d-health-indicator")]));
    assert_eq!(q.question_type(), QuestionType::Eq5dSlider);
  }

  #[test]
  fn single_likert() {
    let q = single(response_group(vec![with_items(
      component("lk", "likert"),
      vec![
        labelled("1", "option", "en", "low"),
        labelled("2", "option", "en", "high"),
      ],
    )]));
    assert_eq!(q.question_type(), QuestionType::Likert);
    assert_eq!(q.responses.len(), 1);
    assert!(q.responses[0].options.iter().all(|o| o.kind == OptionKind::Radio));
  }

  #[test]
  fn likert_group_expands_per_category() {
    let q = single(mock_likert_group(
      "en",
      &[("cat1", "Category 1"), ("cat2", "Category 2")],
      &["o1", "o2", "o3"],
    ));
    assert_eq!(q.question_type(), QuestionType::Likert);
    assert_eq!(q.responses.len(), 2);
    assert_eq!(q.responses[0].key, "lg.cat1");
    assert_eq!(q.responses[0].label, "Category 1");
    assert_eq!(q.responses[1].key, "lg.cat2");
    assert_eq!(q.responses[1].label, "Category 2");
    let labels: Vec<_> =
      q.responses[1].options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, ["o1", "o2", "o3"]);
  }

  #[test]
  fn matrix_rows_and_cells() {
    let radio_row = with_items(component("r1", "radioRow"), vec![
      labelled("l", "label", "en", "Row 1"),
      component("a", "option"),
      component("b", "option"),
    ]);
    let response_row = with_items(component("r2", "responseRow"), vec![
      labelled("l", "label", "en", "Row 2"),
      with_items(component("c1", "dropDownGroup"), vec![component(
        "x", "option",
      )]),
      component("c2", "input"),
      component("c3", "numberInput"),
      component("c4", "check"),
    ]);
    let q = single(response_group(vec![with_items(
      component("mat", "matrix"),
      vec![component("h", "headerRow"), radio_row, response_row],
    )]));

    assert_eq!(q.question_type(), QuestionType::Matrix);
    let slots: Vec<_> =
      q.responses.iter().map(|s| (s.key.as_str(), s.kind)).collect();
    assert_eq!(slots, [
      ("mat.r1", SlotKind::MatrixRadioRow),
      ("mat.r2.c1", SlotKind::MatrixDropdown),
      ("mat.r2.c2", SlotKind::MatrixInput),
      ("mat.r2.c3", SlotKind::MatrixNumberInput),
      ("mat.r2.c4", SlotKind::MatrixCheckbox),
    ]);
    assert_eq!(q.responses[0].label, "Row 1");
    assert_eq!(q.responses[0].options.len(), 2);
    assert_eq!(q.responses[1].label, "Row 2");
    assert_eq!(q.responses[1].options[0].kind, OptionKind::DropdownOption);
  }

  #[test]
  fn mixed_slots_are_unknown() {
    let q = single(response_group(vec![
      with_items(component("scg", "singleChoiceGroup"), vec![component(
        "1", "option",
      )]),
      component("inp", "input"),
    ]));
    assert_eq!(q.question_type(), QuestionType::Unknown);
    assert_eq!(q.responses.len(), 2);
  }

  #[test]
  fn unrecognized_roles_contribute_no_slot() {
    let q = single(response_group(vec![
      component("t", "text"),
      component("x", "somethingNew"),
    ]));
    assert!(q.responses.is_empty());
    assert_eq!(q.question_type(), QuestionType::Empty);
  }

  // ── Translations ───────────────────────────────────────────────────────────

  fn lo(code: &str, parts: Vec<ExpressionArg>) -> LocalisedObject {
    LocalisedObject {
      code: code.into(),
      parts,
    }
  }

  #[test]
  fn translation_list_empty() {
    let err = get_translation(&[], "en").unwrap_err();
    assert_eq!(err.to_string(), "translations missing");
  }

  #[test]
  fn translation_missing_for_language() {
    let content = [
      lo("de", vec![ExpressionArg::text("Test DE")]),
      lo("nl", vec![ExpressionArg::text("Test NL")]),
    ];
    let err = get_translation(&content, "en").unwrap_err();
    assert!(matches!(err, Error::TranslationMissing(ref l) if l == "en"));
  }

  #[test]
  fn translation_single_part() {
    let content = [
      lo("de", vec![ExpressionArg::text("Test DE")]),
      lo("en", vec![ExpressionArg::text("Test EN")]),
    ];
    assert_eq!(get_translation(&content, "en").unwrap(), "Test EN");
  }

  #[test]
  fn translation_merges_string_parts() {
    let content = [lo("en", vec![
      ExpressionArg::text("Test "),
      ExpressionArg::Exp {
        exp: serde_json::json!({}),
      },
      ExpressionArg::text("EN"),
    ])];
    assert_eq!(get_translation(&content, "en").unwrap(), "Test EN");
  }
}
