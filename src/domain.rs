//! Domain models: cases, missions, compiled success conditions and the validation result.

use serde::{Deserialize, Serialize};

/// Points a condition is worth when the casebook does not say otherwise.
pub const DEFAULT_POINTS: u32 = 10;

/// Which half of a submission a check looks at.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
  Html,
  Css,
}

/// The fixed catalog of heuristic checks a success condition can be bound to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckKind {
  /// A marker (`hidden`, `display: none`) must be gone and the content it hid must still be there.
  AttributeAbsent {
    source: Source,
    marker: String,
    #[serde(default)] revealed: Vec<String>,
  },
  /// `property: value` must be declared, optionally under `selector`, with no conflicting declaration left.
  PropertyPresent {
    #[serde(default)] selector: Option<String>,
    property: String,
    value: String,
    #[serde(default)] conflicting: Vec<String>,
  },
  /// A deprecated tag must be swapped for a modern one without losing the wrapped text.
  TagReplaced {
    deprecated: String,
    replacements: Vec<String>,
    #[serde(default)] preserved: Vec<String>,
  },
  /// Any one of several acceptable declarations or selectors.
  StylePresentAnyOf {
    options: Vec<String>,
  },
}

/// One compiled rule of a mission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessCondition {
  pub text: String,
  pub points: u32,
  pub check: CheckKind,
}

/// One HTML/CSS repair puzzle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mission {
  pub id: String,
  pub title: String,
  #[serde(default)] pub briefing: String,
  pub starter_html: String,
  pub starter_css: String,
  pub conditions: Vec<SuccessCondition>,
}

/// Sum of point values, clamped at `u32::MAX` instead of overflowing.
pub fn total_points(points: impl IntoIterator<Item = u32>) -> u32 {
  points.into_iter().fold(0, u32::saturating_add)
}

impl Mission {
  pub fn max_score(&self) -> u32 {
    total_points(self.conditions.iter().map(|c| c.points))
  }
}

/// A themed mystery. Owns its missions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Case {
  pub id: String,
  pub title: String,
  #[serde(default)] pub difficulty: String,
  #[serde(default)] pub narrative: String,
  pub missions: Vec<Mission>,
}

/// Outcome of one condition for one submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionFeedback {
  pub condition: String,
  pub passed: bool,
  pub points: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

/// Score and per-condition feedback for one submission. Never persisted here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub mission_id: String,
  pub score: u32,
  pub max_score: u32,
  pub is_complete: bool,
  pub feedback: Vec<ConditionFeedback>,
}

impl ValidationResult {
  /// Messages for the unmet conditions, in mission order.
  pub fn messages(&self) -> Vec<String> {
    self.feedback.iter().filter_map(|f| f.message.clone()).collect()
  }

  pub fn percent(&self) -> f32 {
    if self.max_score == 0 { return 100.0; }
    self.score as f32 * 100.0 / self.max_score as f32
  }
}
