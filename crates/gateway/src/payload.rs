//! Request payload builders for the Gemini `generateContent` API.

use leadline_core::{ConversationTurn, Role};
use serde_json::{json, Value};

/// Fixed system instruction sent with every chat turn.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful, professional AI assistant embedded in a \
     sales chat workspace. You help users qualify leads, schedule meetings, and manage CRM data. \
     Keep responses concise and business-oriented.";

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn content(role: &str, text: &str) -> Value {
    json!({ "role": role, "parts": [{ "text": text }] })
}

/// Chat request: the bounded context window followed by the new utterance,
/// with the fixed system instruction.
pub fn chat_body(window: &[ConversationTurn], utterance: &str) -> Value {
    let mut contents: Vec<Value> =
        window.iter().map(|turn| content(gemini_role(turn.role), &turn.text)).collect();
    contents.push(content("user", utterance));

    json!({
        "contents": contents,
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
    })
}

/// Full transcript serialized as `role: text` lines for the extraction call.
pub fn transcript_lines(transcript: &[ConversationTurn]) -> String {
    transcript
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extraction request: schema-constrained JSON object with score, status and
/// summary mandatory in the declared shape.
pub fn extraction_body(transcript: &[ConversationTurn]) -> Value {
    let prompt = format!(
        "Analyze the conversation below and extract lead information into a JSON \
         object.\nConversation:\n{}",
        transcript_lines(transcript)
    );

    json!({
        "contents": [content("user", &prompt)],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "company": { "type": "STRING" },
                    "email": { "type": "STRING" },
                    "phone": { "type": "STRING" },
                    "score": {
                        "type": "NUMBER",
                        "description": "Lead score from 0 to 100 based on interest level"
                    },
                    "status": {
                        "type": "STRING",
                        "enum": ["New", "Qualified", "Negotiation", "Closed"]
                    },
                    "summary": {
                        "type": "STRING",
                        "description": "A 2 sentence summary of the lead's needs"
                    }
                },
                "required": ["score", "status", "summary"]
            }
        }
    })
}

/// Suggestion request: JSON array of {label, action} pairs. The requested
/// count is advisory; the model is not forced to honor it.
pub fn suggestion_body(last_reply: &str, count: usize) -> Value {
    let prompt = format!(
        "Based on the last message: \"{last_reply}\", provide {count} short, relevant follow-up \
         actions. Return ONLY a JSON array."
    );

    json!({
        "contents": [content("user", &prompt)],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "action": { "type": "STRING" }
                    },
                    "required": ["label", "action"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use leadline_core::ConversationTurn;

    use super::{chat_body, extraction_body, suggestion_body, transcript_lines};

    #[test]
    fn chat_body_appends_utterance_after_window() {
        let window =
            vec![ConversationTurn::user("hello"), ConversationTurn::assistant("hi there")];
        let body = chat_body(&window, "tell me more");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "tell me more");
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("qualify leads"));
    }

    #[test]
    fn transcript_serializes_as_role_text_lines() {
        let transcript =
            vec![ConversationTurn::user("need a demo"), ConversationTurn::assistant("happy to!")];
        assert_eq!(transcript_lines(&transcript), "user: need a demo\nassistant: happy to!");
    }

    #[test]
    fn extraction_schema_requires_score_status_summary() {
        let body = extraction_body(&[ConversationTurn::user("hi")]);
        let schema = &body["generationConfig"]["responseSchema"];
        let required: Vec<&str> =
            schema["required"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(required, vec!["score", "status", "summary"]);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn suggestion_schema_is_an_array_of_label_action() {
        let body = suggestion_body("Shall we book a call?", 3);
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["type"], "ARRAY");
        let required: Vec<&str> = schema["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["label", "action"]);
        assert!(body["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("provide 3"));
    }
}
