//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::logic::EvaluationOutcome;
use crate::progress::ProgressState;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Evaluate {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
        #[serde(default)]
        prompt: String,
        #[serde(default)]
        phase: String,
    },
    GetProgress {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
    },
    SelectPhase {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
        phase: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Evaluation {
        outcome: EvaluationOutcome,
    },
    ValidationFailed {
        details: Vec<String>,
    },
    Progress {
        progress: ProgressState,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

/// Fields are optional so a missing prompt or phase surfaces as the
/// "Missing required fields" error instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateIn {
    pub user_id: Option<String>,
    pub prompt: Option<String>,
    pub phase: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
    pub phase: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPhaseIn {
    pub user_id: Option<String>,
    pub phase: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingIn {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
    pub ok: bool,
    pub external_grader: bool,
}
