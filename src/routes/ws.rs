//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::EvaluateError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "prompt_trainer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "prompt_trainer", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "prompt_trainer", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "prompt_trainer", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "prompt_trainer", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Evaluate { user_id, prompt, phase } => {
      let user_id = user_or_local(user_id.as_deref());
      match evaluate_prompt(state, user_id, &prompt, &phase).await {
        Ok(outcome) => {
          info!(target: "evaluation", %user_id, id = %outcome.evaluation.id, score = outcome.evaluation.evaluation.score, "WS evaluate served");
          ServerWsMessage::Evaluation { outcome }
        }
        Err(EvaluateError::Validation(details)) => ServerWsMessage::ValidationFailed { details },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetProgress { user_id } => {
      let progress = state.progress_for(user_or_local(user_id.as_deref())).await;
      ServerWsMessage::Progress { progress }
    }

    ClientWsMessage::SelectPhase { user_id, phase } => {
      match change_phase(state, user_or_local(user_id.as_deref()), &phase).await {
        Ok(progress) => ServerWsMessage::Progress { progress },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}
