use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use parking_lot::RwLock;

use crate::tprintln;

pub type SessionToken = String;

/// One authenticated browser/client context. Sessions are immutable once
/// issued; expiry makes them indistinguishable from "not found".
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub identity_id: String,
    pub issued_at: Instant,
    pub expires_at: Instant,
    /// Single authorization tier: every session is elevated.
    pub elevated: bool,
}

fn gen_token() -> String {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Owns the token -> session map. Held by the AuthService rather than living
/// in a process-wide static, so tests and embedders control its lifecycle.
#[derive(Debug)]
pub struct SessionManager {
    pub ttl: Duration,
    sessions: RwLock<HashMap<SessionToken, Session>>,
}

impl Default for SessionManager {
    fn default() -> Self { Self::with_ttl(Duration::from_secs(24 * 60 * 60)) }
}

impl SessionManager {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, sessions: RwLock::new(HashMap::new()) }
    }

    pub fn issue(&self, identity_id: &str) -> Session {
        let now = Instant::now();
        let sess = Session {
            token: gen_token(),
            identity_id: identity_id.to_string(),
            issued_at: now,
            expires_at: now + self.ttl,
            elevated: true,
        };
        self.sessions.write().insert(sess.token.clone(), sess.clone());
        tprintln!("session.issue identity={} ttl_secs={}", identity_id, self.ttl.as_secs());
        sess
    }

    /// Resolve a token to the owning identity id. Expired entries are purged
    /// on detection and reported as absent.
    pub fn validate(&self, token: &str) -> Option<String> {
        let now = Instant::now();
        let mut drop_key: Option<String> = None;
        let out = {
            let map = self.sessions.read();
            if let Some(sess) = map.get(token) {
                if sess.expires_at > now {
                    Some(sess.identity_id.clone())
                } else {
                    drop_key = Some(token.to_string());
                    None
                }
            } else { None }
        };
        if let Some(k) = drop_key {
            self.sessions.write().remove(&k);
            tprintln!("session.expired purged");
        }
        out
    }

    /// Remove the session for `token`. Idempotent: removing an unknown token
    /// reports `false` and is not an error.
    pub fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().remove(token).is_some();
        if removed { tprintln!("session.logout"); }
        removed
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_validate_returns_identity() {
        let sm = SessionManager::default();
        let sess = sm.issue("id-1");
        assert!(sess.elevated);
        assert_eq!(sm.validate(&sess.token), Some("id-1".to_string()));
    }

    #[test]
    fn unknown_token_is_absent() {
        let sm = SessionManager::default();
        assert_eq!(sm.validate("not-a-token"), None);
    }

    #[test]
    fn expired_session_is_rejected_and_purged() {
        let sm = SessionManager::with_ttl(Duration::from_millis(10));
        let sess = sm.issue("id-1");
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(sm.validate(&sess.token), None);
        // Detection must purge the record itself
        assert_eq!(sm.active_count(), 0);
    }

    #[test]
    fn session_valid_for_full_ttl_window() {
        let sm = SessionManager::with_ttl(Duration::from_secs(3600));
        let sess = sm.issue("id-1");
        assert_eq!(sm.validate(&sess.token), Some("id-1".to_string()));
        // Validation does not consume the session
        assert_eq!(sm.validate(&sess.token), Some("id-1".to_string()));
    }

    #[test]
    fn logout_is_idempotent() {
        let sm = SessionManager::default();
        let sess = sm.issue("id-1");
        assert!(sm.logout(&sess.token));
        assert!(!sm.logout(&sess.token));
        assert!(!sm.logout("never-existed"));
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let sm = SessionManager::default();
        let a = sm.issue("id-1");
        let b = sm.issue("id-1");
        assert_ne!(a.token, b.token);
        assert!(a.token.len() >= 40, "token too short: {}", a.token.len());
    }
}
