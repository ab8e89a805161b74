use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingId(pub Uuid);

/// A scheduled meeting. Immutable once created; the schedule list is
/// append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub participants: Vec<String>,
}

impl Meeting {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        time: NaiveTime,
        participants: Vec<String>,
    ) -> Self {
        Self { id: MeetingId(Uuid::new_v4()), title: title.into(), date, time, participants }
    }
}
