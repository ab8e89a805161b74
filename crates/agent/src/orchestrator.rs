use std::sync::Arc;

use leadline_core::config::SessionConfig;
use leadline_core::{ConversationTurn, SessionError, SessionState};
use leadline_gateway::ModelGateway;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::context::build_context_window;

/// Session state shared between the surface and background enrichment tasks.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Fallback reply for a quota-shaped chat failure.
pub const RATE_LIMITED_REPLY: &str =
    "I'm currently experiencing high traffic. Please try again in a moment.";

/// Fallback reply for any other chat failure.
pub const GENERIC_FAILURE_REPLY: &str = "Sorry, I encountered an error processing your request.";

/// Reply markers that signal a degraded reply; suggestion calls are skipped
/// for these to save quota.
const FAILURE_MARKERS: [&str; 2] = ["trouble connecting", "error processing"];

/// Outcome of one user turn. Background enrichment handles are returned so
/// surfaces can detach them and tests can await them; their results apply to
/// the shared session whenever they land.
#[derive(Debug)]
pub struct TurnReceipt {
    pub reply: ConversationTurn,
    pub extraction_dispatched: bool,
    pub suggestions_dispatched: bool,
    pub background: Vec<JoinHandle<()>>,
}

pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    session: SharedSession,
    history_window: usize,
    extraction_min_turns: usize,
    suggestion_count: usize,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>, session: SharedSession, cfg: &SessionConfig) -> Self {
        Self {
            gateway,
            session,
            history_window: cfg.history_window,
            extraction_min_turns: cfg.extraction_min_turns,
            suggestion_count: cfg.suggestion_count,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Run one full turn: awaited chat reply, then fire-and-forget
    /// extraction and suggestion refresh per their gates.
    pub async fn handle_user_turn(&self, text: &str) -> Result<TurnReceipt, SessionError> {
        let text = text.trim().to_string();

        let window = {
            let mut session = self.session.lock().await;
            session.begin_send(&text)?;
            // The just-appended user turn is removed again by the dedup
            // filter, so the window holds only prior context.
            build_context_window(session.transcript(), &text, self.history_window)
        };

        let reply_text = match self.gateway.chat(&window, &text).await {
            Ok(reply_text) => reply_text,
            Err(error) if error.is_rate_limited() => {
                tracing::warn!(%error, "chat call rate limited, substituting fallback reply");
                RATE_LIMITED_REPLY.to_string()
            }
            Err(error) => {
                tracing::error!(%error, "chat call failed, substituting fallback reply");
                GENERIC_FAILURE_REPLY.to_string()
            }
        };

        let (reply, transcript_len, transcript) = {
            let mut session = self.session.lock().await;
            let (reply, transcript_len) = session.complete_send(reply_text);
            (reply, transcript_len, session.transcript().to_vec())
        };

        let mut background = Vec::new();

        let extraction_dispatched =
            transcript_len >= self.extraction_min_turns && transcript_len % 2 == 0;
        if extraction_dispatched {
            background.push(self.spawn_extraction(transcript));
        }

        let suggestions_dispatched =
            !FAILURE_MARKERS.iter().any(|marker| reply.text.contains(marker));
        if suggestions_dispatched {
            background.push(self.spawn_suggestions(reply.text.clone()));
        }

        Ok(TurnReceipt { reply, extraction_dispatched, suggestions_dispatched, background })
    }

    fn spawn_extraction(&self, transcript: Vec<ConversationTurn>) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            match gateway.extract_lead(&transcript).await {
                Ok(patch) if !patch.is_empty() => {
                    session.lock().await.apply_lead_patch(&patch);
                }
                Ok(_) => {}
                Err(error) if error.is_rate_limited() => {
                    tracing::warn!(%error, "lead extraction rate limited, skipping");
                }
                Err(error) => {
                    tracing::error!(%error, "lead extraction failed, skipping");
                }
            }
        })
    }

    fn spawn_suggestions(&self, reply_text: String) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.gateway);
        let session = Arc::clone(&self.session);
        let count = self.suggestion_count;
        tokio::spawn(async move {
            match gateway.suggest(&reply_text, count).await {
                Ok(suggestions) if !suggestions.is_empty() => {
                    session.lock().await.replace_suggestions(suggestions);
                }
                Ok(_) => {}
                Err(error) if error.is_rate_limited() => {
                    tracing::warn!(%error, "suggestion refresh rate limited, skipping");
                }
                Err(error) => {
                    tracing::error!(%error, "suggestion refresh failed, skipping");
                }
            }
        })
    }
}
