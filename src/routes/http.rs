//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{info, instrument};

use crate::error::ValidationError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

fn not_found(message: String) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: "not_found", message })).into_response()
}

impl IntoResponse for ValidationError {
  fn into_response(self) -> Response {
    not_found(self.to_string())
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_cases(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let cases = case_summaries(&state);
  info!(target: "codecase_backend", count = cases.len(), "HTTP cases listed");
  Json(cases)
}

#[instrument(level = "info", skip_all, fields(%case_id))]
pub async fn http_get_case(
  State(state): State<Arc<AppState>>,
  Path(case_id): Path<String>,
) -> Response {
  match case_detail(&state, &case_id) {
    Some(case) => Json(case).into_response(),
    None => not_found(format!("no case with id '{}'", case_id)),
  }
}

#[instrument(level = "info", skip(state, body), fields(identifier = %body.identifier, html_len = body.html.len(), css_len = body.css.len()))]
pub async fn http_post_validate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ValidateIn>,
) -> Result<Json<crate::domain::ValidationResult>, ValidationError> {
  let result = evaluate_submission(
    &state,
    &body.identifier,
    &body.html,
    &body.css,
    body.prior_html.as_deref(),
    body.prior_css.as_deref(),
  )?;
  info!(target: "codecase_backend", mission = %result.mission_id, score = result.score, "HTTP validate served");
  Ok(Json(result))
}

#[instrument(level = "info", skip(state, body), fields(identifier = %body.identifier))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Json(body): Json<HintIn>,
) -> Result<Json<HintOut>, ValidationError> {
  let text = hint_text(&state, &body.identifier, &body.html, &body.css)?;
  info!(target: "codecase_backend", identifier = %body.identifier, "HTTP hint served");
  Ok(Json(HintOut { text }))
}
