//! Producer login.
//!
//! There is no credential check: any non-empty email and password log the
//! single local producer in. The logged-in user is remembered under one
//! backend key so the next start resumes the session.

use crate::backend::KeyValueBackend;
use crate::error::StorageError;
use crate::models::{User, UserId, UserRole};

pub const CURRENT_USER_KEY: &str = "currentUser";

/// Id of the local producer. Collections are stored under this id.
pub const LOCAL_PRODUCER_ID: &str = "1";

pub struct SessionManager<B> {
    backend: B,
    producer_name: String,
}

impl<B: KeyValueBackend> SessionManager<B> {
    pub fn new(backend: B, producer_name: impl Into<String>) -> Self {
        Self {
            backend,
            producer_name: producer_name.into(),
        }
    }

    /// `None` when either credential is empty.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        if email.is_empty() || password.is_empty() {
            tracing::debug!("login rejected: empty credentials");
            return Ok(None);
        }

        let user = User {
            id: UserId::from(LOCAL_PRODUCER_ID),
            name: self.producer_name.clone(),
            email: email.to_string(),
            role: UserRole::Producer,
        };
        let json = serde_json::to_string(&user).map_err(|e| StorageError::Serialization {
            key: CURRENT_USER_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.backend.set(CURRENT_USER_KEY, &json)?;
        tracing::info!(user = %user.id, "producer logged in");
        Ok(Some(user))
    }

    /// The remembered user, if any. A corrupt payload counts as logged out.
    pub fn current_user(&self) -> Result<Option<User>, StorageError> {
        let Some(raw) = self.backend.get(CURRENT_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(key = CURRENT_USER_KEY, error = %e, "discarding corrupt session");
                Ok(None)
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.backend.remove(CURRENT_USER_KEY)?;
        tracing::info!("producer logged out");
        Ok(())
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
