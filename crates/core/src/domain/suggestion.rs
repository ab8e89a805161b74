use serde::{Deserialize, Serialize};

/// A precomposed follow-up the user can send with one action. Suggestions
/// are ephemeral: replaced wholesale after each assistant reply and cleared
/// while a reply is pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub action: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self { label: label.into(), action: action.into() }
    }
}

/// Fixed suggestions shown before the first assistant reply arrives.
pub fn starter_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new("Schedule a Demo", "I would like to schedule a product demo."),
        Suggestion::new("Request Pricing", "Can you send me the pricing tier details?"),
        Suggestion::new("Tech Support", "I have a technical implementation question."),
    ]
}
