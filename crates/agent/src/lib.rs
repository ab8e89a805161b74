//! Conversation Orchestrator - per-turn sequencing over the model gateway
//!
//! This crate drives the one linear flow the application has. For each user
//! turn it:
//! 1. **Begins the send** - appends the user turn, clears suggestions, and
//!    marks the session pending (at most one send is outstanding at a time)
//! 2. **Builds the context window** (`context`) - deduplicated against the
//!    new utterance and bounded to the most recent entries
//! 3. **Awaits the chat reply** - the only call a surface blocks on; a
//!    classified gateway failure becomes a fixed fallback reply here
//! 4. **Dispatches background enrichment** (`orchestrator`) - parity-gated
//!    lead extraction and marker-gated suggestion refresh, fire-and-forget
//!
//! Sign-in lives here too (`auth`): a credential-issuance trait with a
//! local simulated implementation.
//!
//! Background failures degrade silently - logged, never surfaced to chat.

pub mod auth;
pub mod context;
pub mod orchestrator;

pub use auth::{Authenticator, LocalAuthenticator};
pub use context::build_context_window;
pub use orchestrator::{
    Orchestrator, SharedSession, TurnReceipt, GENERIC_FAILURE_REPLY, RATE_LIMITED_REPLY,
};
