use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    #[default]
    Available,
    Busy,
    Away,
    DoNotDisturb,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Busy => "Busy",
            Self::Away => "Away",
            Self::DoNotDisturb => "Do Not Disturb",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub email: bool,
    pub push: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        Self { email: true, push: false }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

/// The signed-in operator's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: String,
    pub avatar_initials: String,
    pub presence: Presence,
    pub bio: String,
    pub notifications: NotificationPrefs,
    pub theme: Theme,
}

impl UserProfile {
    /// Mint a profile from an email address alone, deriving the display
    /// name from the local part and the initials from that name.
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let name = display_name_from_email(&email);
        let avatar_initials = avatar_initials(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            job_title: "Sales Manager".to_string(),
            avatar_initials,
            presence: Presence::default(),
            bio: String::new(),
            notifications: NotificationPrefs::default(),
            theme: Theme::default(),
        }
    }
}

/// Derive a display name from an email local part: split on `.` or `_`,
/// title-case each segment, join with spaces. `john.doe@example.com`
/// becomes `John Doe`. Falls back to `User` when nothing usable remains.
pub fn display_name_from_email(email: &str) -> String {
    let local_part = email.split('@').next().unwrap_or_default();
    let name = local_part
        .split(['.', '_'])
        .filter(|segment| !segment.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        "User".to_string()
    } else {
        name
    }
}

/// First character of up to the first two space-separated words, upper-cased.
pub fn avatar_initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{avatar_initials, display_name_from_email, UserProfile};

    #[test]
    fn derives_name_from_dotted_local_part() {
        assert_eq!(display_name_from_email("john.doe@example.com"), "John Doe");
    }

    #[test]
    fn derives_name_from_underscored_local_part() {
        assert_eq!(display_name_from_email("maria_garcia@corp.io"), "Maria Garcia");
    }

    #[test]
    fn single_segment_local_part_is_title_cased() {
        assert_eq!(display_name_from_email("sam@example.com"), "Sam");
    }

    #[test]
    fn empty_local_part_falls_back_to_user() {
        assert_eq!(display_name_from_email("@example.com"), "User");
        assert_eq!(display_name_from_email(""), "User");
    }

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(avatar_initials("John Doe"), "JD");
        assert_eq!(avatar_initials("Ana Maria Silva"), "AM");
        assert_eq!(avatar_initials("plain"), "P");
        assert_eq!(avatar_initials(""), "");
    }

    #[test]
    fn profile_from_email_matches_derivations() {
        let profile = UserProfile::from_email("john.doe@example.com");
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.avatar_initials, "JD");
        assert_eq!(profile.email, "john.doe@example.com");
    }
}
