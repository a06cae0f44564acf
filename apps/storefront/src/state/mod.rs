//! # State Module
//!
//! What every page needs: the data client (which carries the session) and
//! the display configuration.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐         │
//! │  │   MarketplaceClient      │      │   ConfigState            │         │
//! │  │                          │      │                          │         │
//! │  │  • Session (principal)   │      │  • currency symbol       │         │
//! │  │  • QueryCache (moka)     │      │  • tax rate              │         │
//! │  │  • dyn Backend           │      │  • featured count        │         │
//! │  └──────────────────────────┘      └──────────────────────────┘         │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • MarketplaceClient: Arc-shared backend, moka cache, RwLock session   │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

pub use config::ConfigState;

use std::sync::Arc;

use bazaar_client::{ClientConfig, MarketplaceBackend, MarketplaceClient, Session};

/// Everything a page loader receives. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub client: MarketplaceClient,
    pub config: Arc<ConfigState>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn MarketplaceBackend>,
        session: Session,
        config: &ClientConfig,
    ) -> Self {
        AppState {
            client: MarketplaceClient::new(backend, session, config),
            config: Arc::new(ConfigState::from(config)),
        }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }
}
