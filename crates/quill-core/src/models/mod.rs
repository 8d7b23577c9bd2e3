//! Data models shared across Quill

mod credential;
mod note;

pub use credential::Credential;
pub use note::{Note, NoteDraft, NoteId};
