//! Hostel complaint tracker — session and complaint stores.
//!
//! Students submit complaints; a rector reviews and resolves them. All
//! state lives in two stores backed by a [`KVStore`]:
//!
//! - **SessionStore**: resolves logins against a fixed credential
//!   directory and keeps the active identity under the `user` key.
//! - **ComplaintStore**: the complaint collection under the `complaints`
//!   key, with creation, status updates, and filtered queries.
//!
//! Both publish their state into a shared [`StateStore`] (see [`state`])
//! so views can subscribe to changes instead of polling.
//!
//! # Usage
//!
//! ```ignore
//! use hostel::{HostelApp, HostelConfig};
//!
//! let app = HostelApp::open(HostelConfig::default())?;
//! if app.session().login("student@pu.edu", "student123").await? {
//!     app.submit(form).await?;
//! }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod service;
pub mod state;

use std::sync::Arc;

use hostel_flux::StateStore;
use hostel_kv::{KVStore, RedbStore};
use tracing::info;

pub use config::{ConfigError, HostelConfig};
pub use directory::{Credential, CredentialDirectory};
pub use error::HostelError;
pub use model::{
    Complaint, ComplaintCategory, ComplaintForm, ComplaintStatus, Identity, NewComplaint, Role,
    StatusCounts,
};
pub use service::{ComplaintStore, SessionStore};

/// Composition root: one per application session.
///
/// Construction order is fixed: the shared state store, then the session
/// store, then the complaint store. Views receive the stores by reference
/// from here.
pub struct HostelApp {
    config: HostelConfig,
    state: Arc<StateStore>,
    session: SessionStore,
    complaints: ComplaintStore,
}

impl HostelApp {
    /// Build the app over `kv` with the built-in credential directory.
    pub fn new(config: HostelConfig, kv: Arc<dyn KVStore>) -> Result<Self, HostelError> {
        Self::with_directory(config, kv, CredentialDirectory::builtin())
    }

    pub fn with_directory(
        config: HostelConfig,
        kv: Arc<dyn KVStore>,
        directory: CredentialDirectory,
    ) -> Result<Self, HostelError> {
        let state = Arc::new(StateStore::new());
        let session = SessionStore::new(kv.clone(), state.clone(), directory, &config)?;
        let complaints = ComplaintStore::new(kv, state.clone(), &config)?;

        Ok(Self {
            config,
            state,
            session,
            complaints,
        })
    }

    /// Open the redb file named by `config.db_path` and build the app on it.
    pub fn open(config: HostelConfig) -> Result<Self, HostelError> {
        let kv = RedbStore::open(&config.db_path)?;
        info!("hostel data at {}", config.db_path.display());
        Self::new(config, Arc::new(kv))
    }

    pub fn config(&self) -> &HostelConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn complaints(&self) -> &ComplaintStore {
        &self.complaints
    }

    /// Submit a complaint as the logged-in user.
    ///
    /// Returns `Ok(None)` when nobody is logged in.
    pub async fn submit(&self, form: ComplaintForm) -> Result<Option<Complaint>, HostelError> {
        let user = self.session.user();
        self.complaints.submit(user.as_ref(), form).await
    }
}
