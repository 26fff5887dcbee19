//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Validating a submission (with an optional prior document)
//!   - Producing a hint for the next unmet condition
//!   - Listing cases and fetching one case for the editor

use tracing::{debug, info, instrument, warn};

use crate::domain::ValidationResult;
use crate::error::ValidationError;
use crate::protocol::{to_out, to_summary, CaseOut, CaseSummaryOut};
use crate::state::AppState;
use crate::util::trunc_for_log;
use crate::validator::{self, Prior};

#[instrument(level = "info", skip(state, html, css, prior_html, prior_css), fields(%identifier, html_len = html.len(), css_len = css.len()))]
pub fn evaluate_submission(
  state: &AppState,
  identifier: &str,
  html: &str,
  css: &str,
  prior_html: Option<&str>,
  prior_css: Option<&str>,
) -> Result<ValidationResult, ValidationError> {
  // A partial prior falls back to empty text for the missing half.
  let prior = match (prior_html, prior_css) {
    (None, None) => None,
    (h, c) => Some(Prior { html: h.unwrap_or_default(), css: c.unwrap_or_default() }),
  };
  debug!(target: "validator", html = %trunc_for_log(html, 120), css = %trunc_for_log(css, 120), has_prior = prior.is_some(), "Submission received");

  match validator::validate_with_prior(&state.catalog, identifier, html, css, prior) {
    Ok(result) => {
      info!(target: "validator", mission = %result.mission_id, score = result.score, max_score = result.max_score, percent = result.percent(), complete = result.is_complete, "Submission evaluated");
      Ok(result)
    }
    Err(e) => {
      warn!(target: "validator", %identifier, error = %e, "Validation target not found");
      Err(e)
    }
  }
}

#[instrument(level = "info", skip(state, html, css), fields(%identifier))]
pub fn hint_text(state: &AppState, identifier: &str, html: &str, css: &str) -> Result<String, ValidationError> {
  validator::hint(&state.catalog, identifier, html, css)
}

pub fn case_summaries(state: &AppState) -> Vec<CaseSummaryOut> {
  state.catalog.list_cases().iter().map(to_summary).collect()
}

#[instrument(level = "debug", skip(state), fields(%case_id))]
pub fn case_detail(state: &AppState, case_id: &str) -> Option<CaseOut> {
  state.catalog.get_case(case_id).map(to_out)
}
