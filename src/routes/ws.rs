//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request, so an
//! editor can re-validate on every keystroke over one connection.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "codecase_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "codecase_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = reply_to_text(&txt, &state);
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "codecase_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "codecase_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize one text frame.
pub fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "codecase_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state)
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListCases => ServerWsMessage::Cases { cases: case_summaries(state) },

    ClientWsMessage::GetCase { case_id } => match case_detail(state, &case_id) {
      Some(case) => ServerWsMessage::Case { case },
      None => ServerWsMessage::NotFound { message: format!("no case with id '{}'", case_id) },
    },

    ClientWsMessage::Validate { identifier, html, css, prior_html, prior_css } => {
      match evaluate_submission(state, &identifier, &html, &css, prior_html.as_deref(), prior_css.as_deref()) {
        Ok(result) => {
          tracing::info!(target: "codecase_backend", mission = %result.mission_id, score = result.score, "WS validate evaluated");
          ServerWsMessage::ValidationResult { result }
        }
        Err(e) => ServerWsMessage::NotFound { message: e.to_string() },
      }
    }

    ClientWsMessage::Hint { identifier, html, css } => match hint_text(state, &identifier, &html, &css) {
      Ok(text) => ServerWsMessage::Hint { text },
      Err(e) => ServerWsMessage::NotFound { message: e.to_string() },
    },
  }
}
