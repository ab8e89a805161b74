use serde::{Deserialize, Serialize};

/// Pipeline stage of the tracked lead. Serialized names match the enum the
/// extraction schema declares on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Qualified,
    Negotiation,
    Closed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Qualified => "Qualified",
            Self::Negotiation => "Negotiation",
            Self::Closed => "Closed",
        }
    }
}

/// The lead record derived from the conversation. Never replaced after
/// session start; mutated only through field-level merges of a `LeadPatch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub score: u8,
    pub status: LeadStatus,
    pub summary: String,
}

impl Default for LeadRecord {
    fn default() -> Self {
        Self {
            name: "Unknown Lead".to_string(),
            company: "Not identified".to_string(),
            email: "-".to_string(),
            phone: "-".to_string(),
            score: 0,
            status: LeadStatus::New,
            summary: "Awaiting conversation data...".to_string(),
        }
    }
}

impl LeadRecord {
    /// Shallow field-level merge: fields absent from the patch keep their
    /// prior values. Scores are clamped to the 0..=100 range.
    pub fn apply(&mut self, patch: &LeadPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(company) = &patch.company {
            self.company = company.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(score) = patch.score {
            self.score = score.min(100);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(summary) = &patch.summary {
            self.summary = summary.clone();
        }
    }
}

/// Partial lead data returned by a background extraction call. Every field is
/// optional even where the request schema marks it required, so a lenient
/// parse never discards the fields that did arrive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_score")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// The wire schema declares `score` as a JSON number, so the model may send
/// a fractional value. Round it to the nearest integer; the `as` cast
/// saturates, and `LeadRecord::apply` clamps to 100.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let score = Option::<f64>::deserialize(deserializer)?;
    Ok(score.map(|value| value.round() as u8))
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.score.is_none()
            && self.status.is_none()
            && self.summary.is_none()
    }
}
