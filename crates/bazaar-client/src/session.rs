//! # Session
//!
//! The identity the client acts as. Passed explicitly to the client and the
//! route guards instead of living in a global.
//!
//! ```text
//!   restoring() ── Resolving ──finish_restore──┬──► SignedIn(principal)
//!                                               └──► Anonymous
//!   new()       ── Anonymous ──sign_in(p)──────────► SignedIn(p)
//!                               ◄──sign_out()──────
//! ```

use std::sync::Arc;

use bazaar_core::access::IdentityState;
use bazaar_core::{Principal, ValidationError};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ClientError, ClientResult};

/// Shared handle to the current identity. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<RwLock<IdentityState>>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    /// A settled session with nobody signed in.
    pub fn new() -> Self {
        Session {
            state: Arc::new(RwLock::new(IdentityState::Anonymous)),
        }
    }

    /// A session whose stored identity is still being restored.
    pub fn restoring() -> Self {
        Session {
            state: Arc::new(RwLock::new(IdentityState::Resolving)),
        }
    }

    /// Settles a restoring session.
    pub async fn finish_restore(&self, principal: Option<Principal>) {
        let next = match principal {
            Some(p) if !p.is_anonymous() => IdentityState::SignedIn(p),
            _ => IdentityState::Anonymous,
        };
        *self.state.write().await = next;
    }

    /// Signs in as `principal`. The anonymous principal is rejected.
    pub async fn sign_in(&self, principal: Principal) -> ClientResult<()> {
        if principal.is_anonymous() {
            return Err(ClientError::Validation(ValidationError::InvalidFormat {
                field: "principal".to_string(),
                reason: "the anonymous principal cannot sign in".to_string(),
            }));
        }
        info!(principal = %principal, "Signed in");
        *self.state.write().await = IdentityState::SignedIn(principal);
        Ok(())
    }

    pub async fn sign_out(&self) {
        info!("Signed out");
        *self.state.write().await = IdentityState::Anonymous;
    }

    pub async fn state(&self) -> IdentityState {
        self.state.read().await.clone()
    }

    /// The signed-in principal, if any.
    pub async fn principal(&self) -> Option<Principal> {
        match &*self.state.read().await {
            IdentityState::SignedIn(p) => Some(p.clone()),
            _ => None,
        }
    }

    /// The signed-in principal, or `NotSignedIn`.
    pub async fn require(&self) -> ClientResult<Principal> {
        self.principal().await.ok_or(ClientError::NotSignedIn)
    }

    /// The principal to send as caller: anonymous when signed out.
    pub async fn caller(&self) -> Principal {
        self.principal().await.unwrap_or_else(Principal::anonymous)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
