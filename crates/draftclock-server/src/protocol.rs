// JSON request/response messages exchanged with draft clients.
//
// Every frame is one JSON object tagged by `type`. Clients may attach a
// `request_id`; the server echoes it on the matching response.

use serde::{Deserialize, Serialize};

use draftclock_core::draft::pick::Pick;
use draftclock_core::draft::queue::QueueEntry;
use draftclock_core::draft::state::DraftSnapshot;
use draftclock_core::error::DraftError;
use draftclock_core::service::{InitSummary, SweepReport};

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    GetDraftState {
        league_id: i64,
    },
    SubmitPick {
        league_id: i64,
        manager_id: String,
        player_id: i64,
    },
    EnqueuePreference {
        league_id: i64,
        manager_id: String,
        player_id: i64,
    },
    RemovePreference {
        queue_id: i64,
        manager_id: String,
    },
    ListPreferences {
        league_id: i64,
        manager_id: String,
    },
    InitializeDraft {
        league_id: i64,
        requester_id: String,
    },
    /// Trusted callers only: must carry the configured sweep secret.
    SweepTick {
        secret: String,
    },
}

/// Fields shared by every request frame, read alongside the tagged body.
#[derive(Debug, Default, Deserialize)]
struct RequestMeta {
    #[serde(default)]
    request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    DraftState {
        state: DraftSnapshot,
    },
    /// `filled` is false when a concurrent auto-pick claimed the turn first;
    /// `pick` then shows what it was filled with.
    PickResult {
        filled: bool,
        pick: Pick,
    },
    PreferenceQueued {
        queue_id: i64,
    },
    PreferenceRemoved {
        queue_id: i64,
    },
    Preferences {
        entries: Vec<QueueEntry>,
    },
    DraftInitialized {
        total_picks: u32,
        total_rounds: u32,
    },
    SweepResult {
        report: SweepReport,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl Response {
    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Response::Error {
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<&DraftError> for Response {
    fn from(err: &DraftError) -> Self {
        // Storage failures are logged server-side; clients get a generic message.
        let message = match err {
            DraftError::Storage(_) => "internal storage error".to_string(),
            other => other.to_string(),
        };
        Response::error(err.kind(), message)
    }
}

impl From<InitSummary> for Response {
    fn from(summary: InitSummary) -> Self {
        Response::DraftInitialized {
            total_picks: summary.total_picks,
            total_rounds: summary.total_rounds,
        }
    }
}

/// A response frame: the body plus the echoed `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub body: Response,
}

impl ResponseFrame {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"ERROR","kind":"INTERNAL","message":"failed to encode response: {}"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

/// Parse one inbound frame. On failure the returned frame is a ready-made
/// `BAD_REQUEST` error carrying whatever `request_id` could be recovered.
pub fn parse_request(text: &str) -> Result<(Option<String>, Request), ResponseFrame> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| ResponseFrame {
        request_id: None,
        body: Response::error("BAD_REQUEST", format!("invalid JSON: {e}")),
    })?;

    let meta: RequestMeta = serde_json::from_value(value.clone()).unwrap_or_default();
    match serde_json::from_value::<Request>(value) {
        Ok(request) => Ok((meta.request_id, request)),
        Err(e) => Err(ResponseFrame {
            request_id: meta.request_id,
            body: Response::error("BAD_REQUEST", format!("invalid request: {e}")),
        }),
    }
}
