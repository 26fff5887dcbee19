//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//! Compiled checks are never sent to clients; they would give the answers away.

use serde::{Deserialize, Serialize};

use crate::domain::{total_points, Case, Mission, ValidationResult};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListCases,
    GetCase {
        #[serde(rename = "caseId")]
        case_id: String,
    },
    Validate {
        identifier: String,
        html: String,
        css: String,
        #[serde(default, rename = "priorHtml")]
        prior_html: Option<String>,
        #[serde(default, rename = "priorCss")]
        prior_css: Option<String>,
    },
    Hint {
        identifier: String,
        html: String,
        css: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Cases {
        cases: Vec<CaseSummaryOut>,
    },
    Case {
        case: CaseOut,
    },
    ValidationResult {
        result: ValidationResult,
    },
    Hint {
        text: String,
    },
    NotFound {
        message: String,
    },
    Error {
        message: String,
    },
}

/// Case listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummaryOut {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    pub mission_count: usize,
    pub max_score: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOut {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    pub narrative: String,
    pub missions: Vec<MissionOut>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionOut {
    pub id: String,
    pub title: String,
    pub briefing: String,
    pub starter_html: String,
    pub starter_css: String,
    pub conditions: Vec<ConditionOut>,
    pub max_score: u32,
}

#[derive(Debug, Serialize)]
pub struct ConditionOut {
    pub text: String,
    pub points: u32,
}

pub fn to_summary(c: &Case) -> CaseSummaryOut {
    CaseSummaryOut {
        id: c.id.clone(),
        title: c.title.clone(),
        difficulty: c.difficulty.clone(),
        mission_count: c.missions.len(),
        max_score: total_points(c.missions.iter().map(Mission::max_score)),
    }
}

/// Convert a full `Case` (internal) to the public DTO.
pub fn to_out(c: &Case) -> CaseOut {
    CaseOut {
        id: c.id.clone(),
        title: c.title.clone(),
        difficulty: c.difficulty.clone(),
        narrative: c.narrative.clone(),
        missions: c
            .missions
            .iter()
            .map(|m| MissionOut {
                id: m.id.clone(),
                title: m.title.clone(),
                briefing: m.briefing.clone(),
                starter_html: m.starter_html.clone(),
                starter_css: m.starter_css.clone(),
                conditions: m
                    .conditions
                    .iter()
                    .map(|s| ConditionOut { text: s.text.clone(), points: s.points })
                    .collect(),
                max_score: m.max_score(),
            })
            .collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateIn {
    pub identifier: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub prior_html: Option<String>,
    #[serde(default)]
    pub prior_css: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HintIn {
    pub identifier: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: &'static str,
    pub message: String,
}
