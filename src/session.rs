//! # Session
//!
//! The identity every cart and order operation runs under. Components take the owner from
//! a [`Session`] when they are built, so a signed-out session fails early with
//! [`SessionError::SignedOut`] instead of writing under an empty owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No user is signed in")]
    SignedOut,
}

/// Explicit session handle passed to every component that acts on behalf of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    owner: Option<OwnerId>,
}

impl Session {
    pub fn signed_in(owner: impl Into<OwnerId>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { owner: None }
    }

    pub fn sign_in(&mut self, owner: impl Into<OwnerId>) {
        self.owner = Some(owner.into());
    }

    pub fn sign_out(&mut self) {
        self.owner = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Result<&OwnerId, SessionError> {
        self.owner.as_ref().ok_or(SessionError::SignedOut)
    }
}
