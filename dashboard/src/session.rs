//! Authenticated session context.
//!
//! The bearer credential comes from a prior login against the backend and is
//! handed to the API client at construction. There is no ambient lookup: a
//! session is created when the user logs in, passed explicitly to whoever
//! needs it, and dropped at logout.

/// Bearer credential for the backend REST API.
#[derive(Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into() }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

// Keep the credential out of debug logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("access_token", &"<redacted>").finish()
    }
}
