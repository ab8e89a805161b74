pub mod conversation;
pub mod lead;
pub mod meeting;
pub mod note;
pub mod profile;
pub mod suggestion;
