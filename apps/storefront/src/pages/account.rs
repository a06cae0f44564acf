//! # Account Pages
//!
//! Sign in, profile setup, and the admin login page.
//!
//! ## Admin Login Flow
//! ```text
//! signed out ─────────────────────► "Sign in to continue"
//! signed in, admin ───────────────► redirect /admin
//! signed in, not admin
//!      │
//!      ├── no profile ────────────► prompt profile setup
//!      └── profile saved ─────────► [Claim owner access]
//!                                        │
//!                                        ▼
//!                         backend decides: no admin yet, or the
//!                         profile email is on the owner list
//! ```

use bazaar_client::error::ErrorClass;
use bazaar_client::{ClientError, Notice};
use bazaar_core::forms::ProfileDraft;
use bazaar_core::Principal;
use serde::Serialize;
use tracing::{info, warn};

use super::Outcome;
use crate::error::ApiError;
use crate::routes::Route;
use crate::state::AppState;

const ADMIN_DENIED: &str = "You don't have administrator permissions. Only authorized administrators can access this area.";
const ADMIN_EXISTS: &str =
    "An administrator already exists. Please contact an existing admin for access.";

// =============================================================================
// Sign In
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub principal: Option<String>,
    pub needs_profile: bool,
}

pub async fn login_view(state: &AppState) -> Result<LoginView, ApiError> {
    let prompt = profile_prompt(state).await?;
    Ok(LoginView {
        principal: state.session().principal().await.map(|p| p.to_string()),
        needs_profile: prompt.needs_profile,
    })
}

/// Signs in with a principal typed or returned by the identity provider.
pub async fn sign_in(state: &AppState, text: &str) -> Notice {
    let principal = match text.parse::<Principal>() {
        Ok(principal) => principal,
        Err(err) => {
            warn!(error = %err, "Rejected principal at sign in");
            return Notice::error("Invalid principal ID format");
        }
    };
    match state.client.sign_in(principal).await {
        Ok(()) => Notice::success("Signed in"),
        Err(err) => Notice::error(err.to_string()),
    }
}

pub async fn sign_out(state: &AppState) -> Outcome {
    state.client.sign_out().await;
    Outcome::done(Notice::info("Signed out"), Route::Home)
}

// =============================================================================
// Profile Setup
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePromptView {
    /// Signed in without a saved profile.
    pub needs_profile: bool,
    pub draft: ProfileDraft,
}

pub async fn profile_prompt(state: &AppState) -> Result<ProfilePromptView, ApiError> {
    let signed_in = state.session().principal().await.is_some();
    let profile = state.client.caller_profile().await?;
    Ok(ProfilePromptView {
        needs_profile: signed_in && profile.is_none(),
        draft: profile
            .map(|p| ProfileDraft {
                name: p.name,
                email: p.email,
            })
            .unwrap_or_default(),
    })
}

pub async fn save_profile(state: &AppState, draft: &ProfileDraft) -> Notice {
    match state.client.save_profile(draft).await {
        Ok(()) => Notice::success("Profile saved"),
        Err(err) => err.notice("save profile"),
    }
}

// =============================================================================
// Admin Login
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginView {
    /// Set when the caller is already an admin.
    pub redirect: Option<Route>,
    pub principal: Option<String>,
    pub has_profile: bool,
    /// Profile email is on the configured owner list.
    pub owner_eligible: bool,
    /// Show the claim button. The backend makes the final call.
    pub can_bootstrap: bool,
    pub message: Option<String>,
}

pub async fn admin_login(state: &AppState) -> Result<AdminLoginView, ApiError> {
    let Some(principal) = state.session().principal().await else {
        return Ok(AdminLoginView {
            redirect: None,
            principal: None,
            has_profile: false,
            owner_eligible: false,
            can_bootstrap: false,
            message: Some("Sign in to continue".to_string()),
        });
    };

    if state.client.is_admin().await? {
        return Ok(AdminLoginView {
            redirect: Some(Route::AdminDashboard),
            principal: Some(principal.to_string()),
            has_profile: true,
            owner_eligible: false,
            can_bootstrap: false,
            message: None,
        });
    }

    let profile = state.client.caller_profile().await?;
    let owner_eligible = profile
        .as_ref()
        .is_some_and(|p| state.config.admin.is_owner_email(&p.email));

    Ok(AdminLoginView {
        redirect: None,
        principal: Some(principal.to_string()),
        has_profile: profile.is_some(),
        owner_eligible,
        can_bootstrap: profile.is_some(),
        message: Some(ADMIN_DENIED.to_string()),
    })
}

/// Claims admin access through the caller's own profile email.
pub async fn bootstrap(state: &AppState) -> Outcome {
    match state.client.bootstrap_owner_admin().await {
        Ok(()) => {
            info!("Owner admin access granted");
            Outcome::done(
                Notice::success("Owner admin access granted successfully!"),
                Route::AdminDashboard,
            )
        }
        Err(err) => Outcome::failed(Notice::error(bootstrap_failure(&err))),
    }
}

fn bootstrap_failure(err: &ClientError) -> String {
    match err {
        ClientError::NotFound { .. } => {
            "You must complete profile setup with an authorized owner email first".to_string()
        }
        ClientError::Remote(message) if message.contains("No user profile found") => {
            "Please complete your profile setup with the correct email first.".to_string()
        }
        ClientError::Remote(message) if message.contains("already exists") => {
            ADMIN_EXISTS.to_string()
        }
        _ if err.class() == ErrorClass::Authorization => ADMIN_EXISTS.to_string(),
        _ => err.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, demo_state, shopper, ALICE};

    #[tokio::test]
    async fn test_sign_in_and_profile_prompt() {
        let state = demo_state(vec![]);
        assert_eq!(sign_in(&state, "bad principal").await.message, "Invalid principal ID format");
        assert!(sign_in(&state, "2vxsx-fae").await.is_error());

        assert_eq!(sign_in(&state, ALICE).await, Notice::success("Signed in"));
        let view = login_view(&state).await.unwrap();
        assert_eq!(view.principal.as_deref(), Some(ALICE));
        assert!(view.needs_profile);

        let draft = ProfileDraft {
            name: "Alice".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(save_profile(&state, &draft).await.is_error());

        let draft = ProfileDraft {
            email: "alice@shop.example".to_string(),
            ..draft
        };
        assert_eq!(save_profile(&state, &draft).await, Notice::success("Profile saved"));

        let prompt = profile_prompt(&state).await.unwrap();
        assert!(!prompt.needs_profile);
        assert_eq!(prompt.draft.name, "Alice");
    }

    #[tokio::test]
    async fn test_signed_out_prompt() {
        let state = demo_state(vec![]);
        assert!(!profile_prompt(&state).await.unwrap().needs_profile);

        let view = admin_login(&state).await.unwrap();
        assert_eq!(view.message.as_deref(), Some("Sign in to continue"));
        assert!(!view.can_bootstrap);
    }

    #[tokio::test]
    async fn test_sign_out_redirects_home() {
        let state = demo_state(vec![]);
        shopper(&state, "alice@shop.example").await;
        let outcome = sign_out(&state).await;
        assert_eq!(outcome.redirect, Some(Route::Home));
        assert_eq!(state.session().principal().await, None);
    }

    #[tokio::test]
    async fn test_admin_login_for_admin_redirects() {
        let state = demo_state(vec![]);
        admin(&state).await;
        let view = admin_login(&state).await.unwrap();
        assert_eq!(view.redirect, Some(Route::AdminDashboard));
    }

    #[tokio::test]
    async fn test_bootstrap_without_profile() {
        let state = demo_state(vec![]);
        sign_in(&state, ALICE).await;

        let view = admin_login(&state).await.unwrap();
        assert!(!view.has_profile);
        assert!(!view.can_bootstrap);

        let outcome = bootstrap(&state).await;
        assert_eq!(
            outcome.notice.message,
            "You must complete profile setup with an authorized owner email first"
        );
    }

    #[tokio::test]
    async fn test_first_bootstrap_then_admin_exists() {
        let state = demo_state(vec![]);
        admin(&state).await;
        shopper(&state, "alice@shop.example").await;

        let view = admin_login(&state).await.unwrap();
        assert_eq!(view.message.as_deref(), Some(ADMIN_DENIED));
        assert!(view.can_bootstrap);
        assert!(!view.owner_eligible);

        let outcome = bootstrap(&state).await;
        assert_eq!(outcome.notice.message, ADMIN_EXISTS);
        assert_eq!(outcome.redirect, None);
    }

    #[tokio::test]
    async fn test_owner_email_can_claim_after_first_admin() {
        let state = demo_state(vec!["Alice@Shop.Example".to_string()]);
        admin(&state).await;
        shopper(&state, "alice@shop.example").await;

        assert!(admin_login(&state).await.unwrap().owner_eligible);

        let outcome = bootstrap(&state).await;
        assert_eq!(
            outcome.notice,
            Notice::success("Owner admin access granted successfully!")
        );
        assert_eq!(outcome.redirect, Some(Route::AdminDashboard));
        assert!(state.client.is_admin().await.unwrap());
    }

    #[test]
    fn test_failure_texts() {
        assert_eq!(
            bootstrap_failure(&ClientError::Remote(
                "No user profile found for email a@b.co".into()
            )),
            "Please complete your profile setup with the correct email first."
        );
        assert_eq!(
            bootstrap_failure(&ClientError::Remote("Admin already exists".into())),
            ADMIN_EXISTS
        );
        assert_eq!(
            bootstrap_failure(&ClientError::Remote("Service unavailable".into())),
            "Service unavailable"
        );
    }
}
