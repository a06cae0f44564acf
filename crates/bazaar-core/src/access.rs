//! # Role-Gated Access Control
//!
//! Decides what a protected route shows while the caller's identity and
//! role are being resolved.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 AccessGuard (one per protected route)                   │
//! │                                                                         │
//! │   identity: Resolving ──on_identity(None)──────► Unauthenticated        │
//! │        │                                                                │
//! │   on_identity(Some(p))                                                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   role: Pending ──► Initializing (spinner)                              │
//! │        │                                                                │
//! │   on_role(p, role) / on_role_failed(p)                                  │
//! │        │                                                                │
//! │        ├── role admits required ──────────────► Authorized              │
//! │        └── insufficient / lookup failed ──────► Unauthorized            │
//! │                                                                         │
//! │   Role results tagged with another principal are discarded.             │
//! │   A new identity resets the role to Pending.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identity and role arrive independently and in either order. Authorized is
//! only reported once both have settled for the same principal.
//!
//! The backend enforces permissions on every call; this guard only decides
//! what to render.

use serde::Serialize;

use crate::types::{Principal, UserRole};

// =============================================================================
// Required Role
// =============================================================================

/// The role a route demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredRole {
    /// Admin console pages.
    Admin,
    /// Customer pages (cart, checkout, orders). Admins qualify too.
    User,
}

impl RequiredRole {
    /// Whether `role` satisfies this requirement.
    ///
    /// ## Rules
    /// - `Admin` accepts only `admin`
    /// - `User` accepts `admin` or `user`
    /// - `guest` never qualifies
    pub fn admits(&self, role: UserRole) -> bool {
        match self {
            RequiredRole::Admin => role == UserRole::Admin,
            RequiredRole::User => matches!(role, UserRole::Admin | UserRole::User),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredRole::Admin => "admin",
            RequiredRole::User => "user",
        }
    }

    /// Text of the access-denied view.
    pub fn denied_message(&self) -> String {
        format!(
            "You don't have permission to access this page. This area is restricted to {}s only.",
            self.as_str()
        )
    }
}

// =============================================================================
// Resolution States
// =============================================================================

/// Where identity resolution stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// The identity provider has not reported yet.
    Resolving,
    /// Nobody is signed in.
    Anonymous,
    SignedIn(Principal),
}

/// Where role resolution stands. Settled results remember their principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleState {
    Pending,
    Resolved { principal: Principal, role: UserRole },
    Failed { principal: Principal },
}

impl RoleState {
    fn principal(&self) -> Option<&Principal> {
        match self {
            RoleState::Pending => None,
            RoleState::Resolved { principal, .. } | RoleState::Failed { principal } => {
                Some(principal)
            }
        }
    }
}

/// What a protected route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessState {
    /// Identity or role still in flight: loading indicator.
    Initializing,
    /// No identity: access-denied view.
    Unauthenticated,
    /// Identity present, role insufficient: access-denied view.
    Unauthorized,
    /// Render the page.
    Authorized,
}

impl AccessState {
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessState::Unauthenticated | AccessState::Unauthorized)
    }
}

// =============================================================================
// Access Guard
// =============================================================================

/// Explicit state holder for one protected route.
///
/// ## Example
/// ```rust
/// use bazaar_core::access::{AccessGuard, AccessState, RequiredRole};
/// use bazaar_core::types::{Principal, UserRole};
///
/// let alice: Principal = "rrkah-fqaaa-aaaaa-aaaaq-cai".parse().unwrap();
/// let mut guard = AccessGuard::new(RequiredRole::Admin);
/// assert_eq!(guard.state(), AccessState::Initializing);
///
/// guard.on_identity(Some(alice.clone()));
/// assert_eq!(guard.state(), AccessState::Initializing);
///
/// guard.on_role(&alice, UserRole::User);
/// assert_eq!(guard.state(), AccessState::Unauthorized);
/// ```
#[derive(Debug, Clone)]
pub struct AccessGuard {
    required: RequiredRole,
    identity: IdentityState,
    role: RoleState,
}

impl AccessGuard {
    pub fn new(required: RequiredRole) -> Self {
        AccessGuard {
            required,
            identity: IdentityState::Resolving,
            role: RoleState::Pending,
        }
    }

    pub fn required(&self) -> RequiredRole {
        self.required
    }

    pub fn identity(&self) -> &IdentityState {
        &self.identity
    }

    /// The signed-in principal, once known.
    pub fn principal(&self) -> Option<&Principal> {
        match &self.identity {
            IdentityState::SignedIn(p) => Some(p),
            _ => None,
        }
    }

    /// Identity resolution settled. `None` means signed out.
    ///
    /// A role already settled for a different principal is dropped.
    pub fn on_identity(&mut self, identity: Option<Principal>) {
        self.identity = match identity {
            Some(p) => {
                if self.role.principal().is_some_and(|rp| rp != &p) {
                    self.role = RoleState::Pending;
                }
                IdentityState::SignedIn(p)
            }
            None => {
                self.role = RoleState::Pending;
                IdentityState::Anonymous
            }
        };
    }

    /// Role lookup for `principal` succeeded.
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub fn on_role(&mut self, principal: &Principal, role: UserRole) -> bool {
        if !self.accepts_role_for(principal) {
            return false;
        }
        self.role = RoleState::Resolved {
            principal: principal.clone(),
            role,
        };
        true
    }

    /// Role lookup for `principal` failed. Settles as Unauthorized.
    ///
    /// Returns `false` when the result is stale and was discarded.
    pub fn on_role_failed(&mut self, principal: &Principal) -> bool {
        if !self.accepts_role_for(principal) {
            return false;
        }
        self.role = RoleState::Failed {
            principal: principal.clone(),
        };
        true
    }

    fn accepts_role_for(&self, principal: &Principal) -> bool {
        match &self.identity {
            // Held until identity settles; on_identity drops it on mismatch.
            IdentityState::Resolving => true,
            IdentityState::Anonymous => false,
            IdentityState::SignedIn(current) => current == principal,
        }
    }

    /// What the route shows right now.
    pub fn state(&self) -> AccessState {
        let current = match &self.identity {
            IdentityState::Resolving => return AccessState::Initializing,
            IdentityState::Anonymous => return AccessState::Unauthenticated,
            IdentityState::SignedIn(p) => p,
        };

        match &self.role {
            RoleState::Pending => AccessState::Initializing,
            RoleState::Resolved { principal, role } if principal == current => {
                if self.required.admits(*role) {
                    AccessState::Authorized
                } else {
                    AccessState::Unauthorized
                }
            }
            RoleState::Failed { principal } if principal == current => AccessState::Unauthorized,
            _ => AccessState::Initializing,
        }
    }

    /// Access-denied text when the route is denied.
    pub fn denied_message(&self) -> Option<String> {
        self.state()
            .is_denied()
            .then(|| self.required.denied_message())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
