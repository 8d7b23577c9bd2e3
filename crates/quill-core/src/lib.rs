//! quill-core - Core library for Quill
//!
//! This crate contains the shared models, service clients, and the
//! application state controller used by all Quill front ends.

pub mod api;
pub mod app;
pub mod auth;
pub mod models;
pub mod util;

pub use models::{Credential, Note, NoteDraft, NoteId};
