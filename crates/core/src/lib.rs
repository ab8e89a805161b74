pub mod config;
pub mod domain;
pub mod session;

pub use domain::conversation::{ConversationTurn, Role, TurnId};
pub use domain::lead::{LeadPatch, LeadRecord, LeadStatus};
pub use domain::meeting::{Meeting, MeetingId};
pub use domain::note::{Note, NoteId};
pub use domain::profile::{
    avatar_initials, display_name_from_email, NotificationPrefs, Presence, Theme, UserProfile,
};
pub use domain::suggestion::{starter_suggestions, Suggestion};
pub use session::{SessionError, SessionState};
