//! Accounts and Login
//!
//! Registration and login for both roles. A successful login becomes
//! the persisted [`Session`]; logout removes it.

use crate::backend::{
    BackendClient, BackendError, DoctorRegistration, LoginRequest, PatientRegistration,
};
use crate::session::{Identity, Role, Session, SessionError, SessionStore};
use thiserror::Error;

/// Errors from account operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Login, logout and registration against the backend
pub struct AuthService {
    client: BackendClient,
    store: SessionStore,
}

impl AuthService {
    pub fn new(client: BackendClient, store: SessionStore) -> Self {
        Self { client, store }
    }

    /// Session saved by the last login
    pub fn current(&self) -> Result<Session, AuthError> {
        Ok(self.store.load()?)
    }

    pub async fn register_patient(&self, registration: &PatientRegistration) -> Result<(), AuthError> {
        self.client.register_patient(registration).await?;
        tracing::info!(email = %registration.email, "Patient registered");
        Ok(())
    }

    pub async fn register_doctor(&self, registration: &DoctorRegistration) -> Result<(), AuthError> {
        self.client.register_doctor(registration).await?;
        tracing::info!(username = %registration.username, "Doctor registered");
        Ok(())
    }

    /// Log in and persist the resulting session
    pub async fn login(
        &self,
        role: Role,
        username_or_email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .client
            .login(
                role,
                &LoginRequest {
                    username_or_email: username_or_email.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;

        // patients keep their city, doctors their clinic
        let identity = Identity {
            id: response.id,
            role,
            name: response.name,
            city: response.city.filter(|_| role == Role::Patient),
            hospital_name: response.hospital_name.filter(|_| role == Role::Doctor),
        };

        self.store.save(&identity)?;
        tracing::info!(id = identity.id, role = %role, "Logged in");
        Ok(Session::new(identity))
    }

    /// Forget the saved session. Returns whether anyone was logged in.
    pub fn logout(&self) -> Result<bool, AuthError> {
        Ok(self.store.clear()?)
    }
}
