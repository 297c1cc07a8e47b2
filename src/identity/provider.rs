use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::delegate::{CredentialDelegate, VerifyError};
use super::session::{Session, SessionManager, SessionToken};
use super::user::{Identity, IdentityStore};
use crate::tprintln;

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub identity: Identity,
    pub session: Session,
}

/// Typed login outcome. The two failure arms map to different HTTP statuses
/// at the boundary (401 vs 503) and must stay distinguishable.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Owns the login/logout state machine and the per-request authorization
/// gate. The identity and session stores are held here exclusively; no other
/// component creates or deletes entries in either.
pub struct AuthService {
    delegate: Arc<dyn CredentialDelegate>,
    identities: IdentityStore,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(delegate: Arc<dyn CredentialDelegate>, sessions: SessionManager) -> Self {
        let identities = IdentityStore::new();
        identities.ensure_default_admin();
        Self { delegate, identities, sessions }
    }

    /// Login either succeeds atomically or the client stays anonymous: no
    /// Identity and no Session are created on any failure path.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, LoginError> {
        let valid = self
            .delegate
            .verify(&req.username, &req.password)
            .await
            .map_err(|e| match e {
                VerifyError::Unavailable(msg) => LoginError::ServiceUnavailable(msg),
            })?;
        if !valid {
            return Err(LoginError::InvalidCredentials);
        }
        let identity = self.identities.get_or_create(&req.username);
        let session = self.sessions.issue(&identity.id);
        info!("login ok user={}", identity.username);
        tprintln!("auth.login user={} id={}", identity.username, identity.id);
        Ok(LoginResponse { identity, session })
    }

    /// The authorization gate applied per request: resolves a presented token
    /// to its Identity, treating expired sessions as absent (and purging them).
    pub fn current_identity(&self, token: &SessionToken) -> Option<Identity> {
        let identity_id = self.sessions.validate(token)?;
        self.identities.get(&identity_id)
    }

    /// Idempotent: logging out with no active session is a no-op success.
    pub fn logout(&self, token: &SessionToken) {
        let _ = self.sessions.logout(token);
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
