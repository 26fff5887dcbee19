//! The mission validator: a pure function from (identifier, html, css) to a score.
//!
//! No I/O and no shared mutable state; identical inputs always produce identical
//! results. The only failure is an identifier the catalog does not know.

use crate::checks::{evaluate, Document, Verdict};
use crate::domain::{total_points, ConditionFeedback, Mission, ValidationResult};
use crate::error::ValidationError;
use crate::state::Catalog;

/// Reference code that revealed/preserved content is derived from.
#[derive(Debug, Clone, Copy)]
pub struct Prior<'a> {
  pub html: &'a str,
  pub css: &'a str,
}

pub fn validate(catalog: &Catalog, identifier: &str, html: &str, css: &str) -> Result<ValidationResult, ValidationError> {
  validate_with_prior(catalog, identifier, html, css, None)
}

/// Like `validate`, with an explicit prior instead of the mission's starter code.
pub fn validate_with_prior(
  catalog: &Catalog,
  identifier: &str,
  html: &str,
  css: &str,
  prior: Option<Prior<'_>>,
) -> Result<ValidationResult, ValidationError> {
  let (_, mission) = catalog
    .resolve_mission(identifier)
    .ok_or_else(|| ValidationError::NotFound { identifier: identifier.to_string() })?;
  Ok(evaluate_mission(mission, html, css, prior))
}

/// Score one submission against one mission.
pub fn evaluate_mission(mission: &Mission, html: &str, css: &str, prior: Option<Prior<'_>>) -> ValidationResult {
  let doc = Document::new(html, css);
  let prior = match prior {
    Some(p) => Document::new(p.html, p.css),
    None => Document::new(&mission.starter_html, &mission.starter_css),
  };

  let feedback: Vec<ConditionFeedback> = mission
    .conditions
    .iter()
    .map(|cond| match evaluate(&cond.check, &doc, &prior) {
      Verdict::Pass => ConditionFeedback { condition: cond.text.clone(), passed: true, points: cond.points, message: None },
      Verdict::Fail(reason) => ConditionFeedback {
        condition: cond.text.clone(),
        passed: false,
        points: cond.points,
        message: Some(format!("{} ({})", cond.text, reason)),
      },
    })
    .collect();

  let max_score = mission.max_score();
  let awarded = total_points(feedback.iter().filter(|f| f.passed).map(|f| f.points));
  ValidationResult {
    mission_id: mission.id.clone(),
    score: awarded.min(max_score),
    max_score,
    is_complete: feedback.iter().all(|f| f.passed),
    feedback,
  }
}

/// The next thing the learner should fix, or a closing line when nothing is left.
pub fn hint(catalog: &Catalog, identifier: &str, html: &str, css: &str) -> Result<String, ValidationError> {
  let result = validate(catalog, identifier, html, css)?;
  Ok(match result.feedback.iter().find(|f| !f.passed) {
    Some(f) => format!("Clue: {}", f.message.as_deref().unwrap_or(&f.condition)),
    None => "Case closed! Every condition is satisfied.".to_string(),
  })
}
