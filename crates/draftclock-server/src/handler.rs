// Request dispatch: turns protocol frames into draft service calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use draftclock_core::draft::resolve::Resolution;
use draftclock_core::error::DraftError;
use draftclock_core::service::DraftService;

use crate::protocol::{parse_request, Request, Response, ResponseFrame};

/// Shared, cheaply cloneable request handler. One per server; every
/// connection holds a clone.
#[derive(Clone)]
pub struct Handler {
    service: Arc<DraftService>,
    sweep_secret: Option<Arc<str>>,
}

impl Handler {
    pub fn new(service: Arc<DraftService>, sweep_secret: Option<String>) -> Self {
        Handler {
            service,
            sweep_secret: sweep_secret.map(Arc::from),
        }
    }

    /// Handle one text frame and return the JSON reply. Store work runs on
    /// the blocking pool so slow SQLite calls never stall the reactor.
    pub async fn handle_text(&self, text: String) -> String {
        let handler = self.clone();
        match tokio::task::spawn_blocking(move || handler.handle_frame(&text, Utc::now())).await {
            Ok(frame) => frame.to_json(),
            Err(e) => {
                error!("Request task failed: {}", e);
                ResponseFrame {
                    request_id: None,
                    body: Response::error("INTERNAL", "request handler failed"),
                }
                .to_json()
            }
        }
    }

    /// Synchronous core of `handle_text`, evaluated as of `now`.
    pub fn handle_frame(&self, text: &str, now: DateTime<Utc>) -> ResponseFrame {
        let (request_id, request) = match parse_request(text) {
            Ok(parsed) => parsed,
            Err(frame) => {
                warn!("Rejected malformed request: {}", text);
                return frame;
            }
        };

        let body = match self.dispatch(request, now) {
            Ok(body) => body,
            Err(e) => {
                if let DraftError::Storage(inner) = &e {
                    error!("Storage failure while handling request: {:#}", inner);
                }
                Response::from(&e)
            }
        };
        ResponseFrame { request_id, body }
    }

    fn dispatch(&self, request: Request, now: DateTime<Utc>) -> Result<Response, DraftError> {
        let svc = &self.service;
        Ok(match request {
            Request::GetDraftState { league_id } => Response::DraftState {
                state: svc.get_draft_state(league_id, now)?,
            },
            Request::SubmitPick {
                league_id,
                manager_id,
                player_id,
            } => match svc.submit_pick(league_id, &manager_id, player_id, now)? {
                Resolution::Filled(pick) => Response::PickResult { filled: true, pick },
                Resolution::AlreadyFilled(pick) => Response::PickResult {
                    filled: false,
                    pick,
                },
            },
            Request::EnqueuePreference {
                league_id,
                manager_id,
                player_id,
            } => Response::PreferenceQueued {
                queue_id: svc.enqueue_preference(league_id, &manager_id, player_id)?,
            },
            Request::RemovePreference {
                queue_id,
                manager_id,
            } => {
                svc.remove_preference(queue_id, &manager_id)?;
                Response::PreferenceRemoved { queue_id }
            }
            Request::ListPreferences {
                league_id,
                manager_id,
            } => Response::Preferences {
                entries: svc.list_preferences(league_id, &manager_id)?,
            },
            Request::InitializeDraft {
                league_id,
                requester_id,
            } => svc.initialize_draft(league_id, &requester_id)?.into(),
            Request::SweepTick { secret } => {
                if !self.sweep_allowed(&secret) {
                    warn!("Rejected SWEEP_TICK with missing or wrong secret");
                    return Err(DraftError::Unauthorized {
                        manager_id: "remote caller".into(),
                        action: "trigger a sweep".into(),
                    });
                }
                Response::SweepResult {
                    report: svc.sweep_tick(now)?,
                }
            }
        })
    }

    /// Remote sweeps are only accepted when a secret is configured and matches.
    fn sweep_allowed(&self, presented: &str) -> bool {
        match &self.sweep_secret {
            Some(expected) => constant_time_eq(expected.as_bytes(), presented.as_bytes()),
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
