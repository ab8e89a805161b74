//! Response parsing for `generateContent` payloads.

use leadline_core::{LeadPatch, Suggestion};
use serde_json::Value;

use crate::error::GatewayError;

/// Concatenated text of the first candidate's parts, if any.
pub fn candidate_text(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())?;

    let mut text = String::new();
    for part in parts {
        if let Some(chunk) = part.get("text").and_then(|v| v.as_str()) {
            text.push_str(chunk);
        }
    }

    (!text.is_empty()).then_some(text)
}

pub fn parse_lead_patch(text: &str) -> Result<LeadPatch, GatewayError> {
    serde_json::from_str(text)
        .map_err(|error| GatewayError::Other(format!("malformed extraction payload: {error}")))
}

pub fn parse_suggestions(text: &str) -> Result<Vec<Suggestion>, GatewayError> {
    serde_json::from_str(text)
        .map_err(|error| GatewayError::Other(format!("malformed suggestion payload: {error}")))
}

#[cfg(test)]
mod tests {
    use leadline_core::LeadStatus;
    use serde_json::json;

    use super::{candidate_text, parse_lead_patch, parse_suggestions};

    #[test]
    fn extracts_first_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there." }] }
            }]
        });
        assert_eq!(candidate_text(&body).as_deref(), Some("Hello there."));
    }

    #[test]
    fn missing_candidates_yield_none() {
        assert!(candidate_text(&json!({})).is_none());
        assert!(candidate_text(&json!({ "candidates": [] })).is_none());
    }

    #[test]
    fn lead_patch_parses_partial_object() {
        let patch = parse_lead_patch(
            r#"{"name": "Dana Reyes", "score": 72, "status": "Qualified", "summary": "Wants the enterprise tier this quarter."}"#,
        )
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Dana Reyes"));
        assert_eq!(patch.score, Some(72));
        assert_eq!(patch.status, Some(LeadStatus::Qualified));
        assert!(patch.company.is_none());
    }

    #[test]
    fn fractional_score_does_not_discard_the_patch() {
        let patch = parse_lead_patch(
            r#"{"name": "Dana Reyes", "company": "Globex", "score": 85.5, "status": "Qualified", "summary": "Wants a pilot."}"#,
        )
        .unwrap();

        assert_eq!(patch.score, Some(86));
        assert_eq!(patch.name.as_deref(), Some("Dana Reyes"));
        assert_eq!(patch.company.as_deref(), Some("Globex"));
    }

    #[test]
    fn malformed_extraction_is_a_generic_failure() {
        assert!(parse_lead_patch("not json").is_err());
    }

    #[test]
    fn suggestions_parse_as_label_action_pairs() {
        let suggestions = parse_suggestions(
            r#"[{"label": "Book Demo", "action": "Let's book a demo."},
                {"label": "Pricing", "action": "Send me pricing."}]"#,
        )
        .unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].label, "Book Demo");
        assert_eq!(suggestions[1].action, "Send me pricing.");
    }
}
