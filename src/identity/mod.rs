//! Central identity and session management for the Resorter360 admin gateway.
//! Keep the public surface thin and split implementation across sub-modules.

mod user;
mod session;
mod delegate;
mod provider;

pub use user::{Identity, IdentityStore};
pub use session::{Session, SessionToken, SessionManager};
pub use delegate::{CredentialDelegate, RemoteCredentialDelegate, VerifyError};
pub use provider::{AuthService, LoginRequest, LoginResponse, LoginError};
