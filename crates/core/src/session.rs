//! Application state store: one value per session, mutated only through the
//! intent methods below. No ambient singletons; surfaces own the value (or a
//! shared handle to it) and call intents as user actions arrive.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::domain::conversation::ConversationTurn;
use crate::domain::lead::{LeadPatch, LeadRecord};
use crate::domain::meeting::Meeting;
use crate::domain::note::Note;
use crate::domain::profile::{avatar_initials, UserProfile};
use crate::domain::suggestion::{starter_suggestions, Suggestion};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a send is already pending for this session")]
    SendPending,
    #[error("text must not be empty")]
    EmptyText,
    #[error("no user is signed in")]
    NotSignedIn,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    transcript: Vec<ConversationTurn>,
    lead: LeadRecord,
    notes: Vec<Note>,
    meetings: Vec<Meeting>,
    suggestions: Vec<Suggestion>,
    profile: Option<UserProfile>,
    pending_send: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            lead: LeadRecord::default(),
            notes: Vec::new(),
            meetings: Vec::new(),
            suggestions: starter_suggestions(),
            profile: None,
            pending_send: false,
        }
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn lead(&self) -> &LeadRecord {
        &self.lead
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn send_pending(&self) -> bool {
        self.pending_send
    }

    /// Start a user send: append the user turn, clear suggestions, and mark
    /// the session pending. At most one send may be outstanding at a time.
    pub fn begin_send(&mut self, text: &str) -> Result<ConversationTurn, SessionError> {
        if self.pending_send {
            return Err(SessionError::SendPending);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyText);
        }

        let turn = ConversationTurn::user(text);
        self.transcript.push(turn.clone());
        self.suggestions.clear();
        self.pending_send = true;
        Ok(turn)
    }

    /// Finish the awaited send with the assistant's reply text. Returns the
    /// appended turn and the post-reply transcript length, which drives the
    /// extraction gate.
    pub fn complete_send(&mut self, reply_text: impl Into<String>) -> (ConversationTurn, usize) {
        let turn = ConversationTurn::assistant(reply_text.into());
        self.transcript.push(turn.clone());
        self.pending_send = false;
        (turn, self.transcript.len())
    }

    /// Prepend a note so the newest entry lists first.
    pub fn add_note(&mut self, text: &str) -> Result<Note, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyText);
        }
        let note = Note::new(text);
        self.notes.insert(0, note.clone());
        Ok(note)
    }

    /// Append a meeting with the lead and the operator as participants.
    pub fn schedule_meeting(&mut self, title: &str, date: NaiveDate, time: NaiveTime) -> Meeting {
        let title = if title.trim().is_empty() { "Product Demo" } else { title.trim() };
        let participants = vec![self.lead.name.clone(), "You".to_string()];
        let meeting = Meeting::new(title, date, time, participants);
        self.meetings.push(meeting.clone());
        meeting
    }

    /// Field-level merge of extracted lead data into the lead record.
    pub fn apply_lead_patch(&mut self, patch: &LeadPatch) {
        self.lead.apply(patch);
    }

    /// Wholesale replacement of the suggestion list. Callers skip empty
    /// results so a failed background call leaves prior state untouched.
    pub fn replace_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
    }

    pub fn sign_in(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    pub fn sign_out(&mut self) {
        self.profile = None;
    }

    /// Replace the profile slot, recomputing the avatar initials from the
    /// (possibly changed) display name.
    pub fn update_profile(&mut self, mut profile: UserProfile) -> Result<(), SessionError> {
        if self.profile.is_none() {
            return Err(SessionError::NotSignedIn);
        }
        profile.avatar_initials = avatar_initials(&profile.name);
        self.profile = Some(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::{SessionError, SessionState};
    use crate::domain::profile::UserProfile;
    use crate::domain::suggestion::Suggestion;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn time() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 30, 0).unwrap()
    }

    #[test]
    fn begin_send_appends_turn_and_clears_suggestions() {
        let mut session = SessionState::new();
        assert!(!session.suggestions().is_empty());

        let turn = session.begin_send("Hello there").unwrap();
        assert_eq!(turn.text, "Hello there");
        assert_eq!(session.transcript().len(), 1);
        assert!(session.suggestions().is_empty());
        assert!(session.send_pending());
    }

    #[test]
    fn second_send_is_rejected_while_pending() {
        let mut session = SessionState::new();
        session.begin_send("first").unwrap();
        assert_eq!(session.begin_send("second"), Err(SessionError::SendPending));
    }

    #[test]
    fn blank_send_is_rejected() {
        let mut session = SessionState::new();
        assert_eq!(session.begin_send("   "), Err(SessionError::EmptyText));
        assert!(!session.send_pending());
    }

    #[test]
    fn complete_send_reports_post_reply_length() {
        let mut session = SessionState::new();
        session.begin_send("hi").unwrap();
        let (reply, len) = session.complete_send("hello!");
        assert_eq!(reply.text, "hello!");
        assert_eq!(len, 2);
        assert!(!session.send_pending());
    }

    #[test]
    fn newest_note_lists_first() {
        let mut session = SessionState::new();
        session.add_note("older").unwrap();
        session.add_note("newer").unwrap();

        let texts: Vec<&str> = session.notes().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[test]
    fn newest_meeting_lists_last() {
        let mut session = SessionState::new();
        session.schedule_meeting("Kickoff", date(), time());
        session.schedule_meeting("Follow-up", date(), time());

        let titles: Vec<&str> = session.meetings().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Kickoff", "Follow-up"]);
    }

    #[test]
    fn meeting_participants_include_lead_and_operator() {
        let mut session = SessionState::new();
        let meeting = session.schedule_meeting("", date(), time());
        assert_eq!(meeting.title, "Product Demo");
        assert_eq!(meeting.participants, vec!["Unknown Lead".to_string(), "You".to_string()]);
    }

    #[test]
    fn replace_suggestions_is_wholesale() {
        let mut session = SessionState::new();
        session.replace_suggestions(vec![Suggestion::new("One", "one")]);
        assert_eq!(session.suggestions().len(), 1);
        assert_eq!(session.suggestions()[0].label, "One");
    }

    #[test]
    fn update_profile_recomputes_initials() {
        let mut session = SessionState::new();
        session.sign_in(UserProfile::from_email("john.doe@example.com"));

        let mut updated = session.profile().unwrap().clone();
        updated.name = "Alexandra Morgan Reyes".to_string();
        session.update_profile(updated).unwrap();

        assert_eq!(session.profile().unwrap().avatar_initials, "AM");
    }

    #[test]
    fn update_profile_requires_sign_in() {
        let mut session = SessionState::new();
        let profile = UserProfile::from_email("a.b@example.com");
        assert_eq!(session.update_profile(profile), Err(SessionError::NotSignedIn));
    }

    #[test]
    fn sign_out_clears_profile() {
        let mut session = SessionState::new();
        session.sign_in(UserProfile::from_email("a.b@example.com"));
        session.sign_out();
        assert!(session.profile().is_none());
    }
}
