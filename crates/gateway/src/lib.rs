//! Model Gateway - schema-aware client for the hosted language model
//!
//! This crate owns every byte that crosses the model boundary:
//! - **Payload building** (`payload`) - transcript windows, the extraction
//!   schema, and the suggestion schema in the Gemini `generateContent` shape
//! - **Failure classification** (`error`) - rate-limited (quota-shaped)
//!   versus generic faults; the gateway never retries
//! - **The `ModelGateway` trait** - the seam surfaces and tests depend on,
//!   with `GeminiGateway` as the shipped implementation (`client`)
//!
//! The gateway reports classified failures to the caller; deciding what the
//! user sees in their place is the orchestrator's job, not ours.

pub mod client;
pub mod error;
pub mod payload;
pub mod response;

use async_trait::async_trait;
use leadline_core::{ConversationTurn, LeadPatch, Suggestion};

pub use client::{GeminiGateway, EMPTY_REPLY_FALLBACK};
pub use error::GatewayError;

/// The three call kinds the conversation flow issues per user turn.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Free-text chat reply for the bounded context window plus the new
    /// utterance. The only call a surface awaits synchronously.
    async fn chat(
        &self,
        window: &[ConversationTurn],
        utterance: &str,
    ) -> Result<String, GatewayError>;

    /// Schema-constrained lead extraction over the full transcript.
    async fn extract_lead(
        &self,
        transcript: &[ConversationTurn],
    ) -> Result<LeadPatch, GatewayError>;

    /// Quick-reply suggestions derived from the last assistant reply.
    async fn suggest(&self, last_reply: &str, count: usize)
        -> Result<Vec<Suggestion>, GatewayError>;
}
