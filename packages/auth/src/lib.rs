#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demo credential gate for the authority view.
//!
//! A fixed credential pair checked with plain equality. This is a demo
//! stub, not a security boundary: there are no sessions, no hashing, and
//! no account model. Anything that needs real authentication replaces
//! this package wholesale.

use serde::{Deserialize, Serialize};

/// Default authority username.
pub const DEFAULT_USERNAME: &str = "authority";
/// Default authority password.
pub const DEFAULT_PASSWORD: &str = "mangrove";

/// A credential pair as submitted by the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Submitted username.
    pub username: String,
    /// Submitted password.
    pub password: String,
}

/// The configured authority credential pair.
#[derive(Debug, Clone)]
pub struct AuthGate {
    username: String,
    password: String,
}

impl AuthGate {
    /// Creates a gate accepting exactly this credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads the credential pair from the environment, falling back to
    /// the built-in demo pair.
    ///
    /// Honors `MANGROVE_AUTHORITY_USER` and `MANGROVE_AUTHORITY_PASS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("MANGROVE_AUTHORITY_USER")
                .unwrap_or_else(|_| DEFAULT_USERNAME.to_string()),
            password: std::env::var("MANGROVE_AUTHORITY_PASS")
                .unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
        }
    }

    /// Whether the submitted credentials match the configured pair.
    #[must_use]
    pub fn is_authorized(&self, credentials: &Credentials) -> bool {
        credentials.username == self.username && credentials.password == self.password
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}
