use bcrypt::BcryptError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("bad credentials")]
    BadCredentials,
}

/// A configured account. Only the bcrypt hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl UserEntry {
    /// Hashes `password` with a fresh salt at the given bcrypt work factor.
    pub fn new(
        username: impl Into<String>,
        password: &str,
        roles: Vec<String>,
        cost: u32,
    ) -> Result<Self, BcryptError> {
        Ok(Self {
            username: username.into(),
            password_hash: bcrypt::hash(password, cost)?,
            roles,
        })
    }
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
}

pub struct UserDirectory {
    users: HashMap<String, UserEntry>,
    // Verified against when the username is unknown, result discarded
    decoy_hash: Option<String>,
}

impl UserDirectory {
    pub fn new(entries: impl IntoIterator<Item = UserEntry>) -> Self {
        let users: HashMap<String, UserEntry> = entries
            .into_iter()
            .map(|entry| (entry.username.clone(), entry))
            .collect();
        let decoy_hash = users.values().next().map(|entry| entry.password_hash.clone());
        Self { users, decoy_hash }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Unknown users pay for one bcrypt verification too, so response time
    /// does not tell which usernames exist.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some(entry) = self.users.get(username) else {
            if let Some(hash) = &self.decoy_hash {
                let _ = bcrypt::verify(password, hash);
            }
            return Err(AuthError::BadCredentials);
        };

        match bcrypt::verify(password, &entry.password_hash) {
            Ok(true) => Ok(Principal {
                username: entry.username.clone(),
                roles: entry.roles.clone(),
            }),
            Ok(false) => Err(AuthError::BadCredentials),
            Err(e) => {
                tracing::warn!("Unusable password hash for user {}: {}", entry.username, e);
                Err(AuthError::BadCredentials)
            }
        }
    }
}
