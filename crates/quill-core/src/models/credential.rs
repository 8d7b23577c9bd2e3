//! Authenticated session record

use std::fmt;

use serde::{Deserialize, Serialize};

/// A credential returned by the login service.
///
/// Persisted verbatim by session stores and used to derive the bearer
/// token installed on the notes client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub name: String,
    pub token: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
