use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use hostel_flux::StateStore;
use hostel_kv::{JsonKV, KVError, KVStore};
use tracing::{debug, info, warn};

use crate::config::HostelConfig;
use crate::directory::CredentialDirectory;
use crate::error::HostelError;
use crate::model::Identity;
use crate::service::{Pending, USER_KEY, suspend};
use crate::state::{AUTH_LOADING, AUTH_USER};

/// Session store: resolves logins and owns the active identity.
///
/// The active identity is mirrored to storage under `user` on every change
/// and restored on construction, so a session survives a restart without
/// re-entering credentials.
pub struct SessionStore {
    kv: Arc<dyn KVStore>,
    state: Arc<StateStore>,
    directory: CredentialDirectory,
    login_delay: Duration,
    user: RwLock<Option<Identity>>,
    /// Logins currently in flight.
    pending: AtomicUsize,
}

impl SessionStore {
    /// Create the store and restore a previously persisted identity.
    ///
    /// A `user` entry that does not parse is discarded and the session
    /// starts logged out.
    pub fn new(
        kv: Arc<dyn KVStore>,
        state: Arc<StateStore>,
        directory: CredentialDirectory,
        config: &HostelConfig,
    ) -> Result<Self, HostelError> {
        let user = restore(kv.as_ref())?;
        match &user {
            Some(identity) => info!(user = %identity.id, role = %identity.role, "session restored"),
            None => debug!("no persisted session"),
        }

        state.set(AUTH_USER, user.clone());
        state.set(AUTH_LOADING, false);

        Ok(Self {
            kv,
            state,
            directory,
            login_delay: config.login_delay(),
            user: RwLock::new(user),
            pending: AtomicUsize::new(0),
        })
    }

    /// The active identity, if anyone is logged in.
    pub fn user(&self) -> Option<Identity> {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Whether a login is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Look up credentials after the simulated round trip.
    ///
    /// Does not touch the active session.
    pub async fn resolve(&self, email: &str, secret: &str) -> Option<Identity> {
        suspend(self.login_delay).await;
        self.directory.find(email, secret)
    }

    /// Attempt a login.
    ///
    /// Returns `Ok(false)` when the credentials do not match; the previous
    /// session (if any) is left as it was. Overlapping calls are not
    /// serialized: the last one to succeed becomes the active identity.
    pub async fn login(&self, email: &str, secret: &str) -> Result<bool, HostelError> {
        let _pending = Pending::begin(&self.pending, &self.state, AUTH_LOADING);

        let Some(identity) = self.resolve(email, secret).await else {
            info!(email, "login rejected");
            return Ok(false);
        };

        {
            let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
            self.kv.set_json(USER_KEY, &identity)?;
            *user = Some(identity.clone());
        }
        info!(user = %identity.id, role = %identity.role, "logged in");
        self.publish();

        Ok(true)
    }

    /// End the session.
    ///
    /// The in-memory identity is always cleared; a failure to remove the
    /// persisted copy is returned to the caller.
    pub fn logout(&self) -> Result<(), HostelError> {
        let (previous, deleted) = {
            let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
            (user.take(), self.kv.delete(USER_KEY))
        };
        self.publish();

        if let Some(identity) = previous {
            info!(user = %identity.id, "logged out");
        }
        deleted?;
        Ok(())
    }

    /// Publish the current identity. Runs without the lock held; repeats
    /// if the identity changed meanwhile.
    fn publish(&self) {
        loop {
            let user = self.user();
            self.state.set(AUTH_USER, user.clone());
            if self.user() == user {
                break;
            }
        }
    }
}

fn restore(kv: &dyn KVStore) -> Result<Option<Identity>, HostelError> {
    match kv.get_json::<Identity>(USER_KEY) {
        Ok(user) => Ok(user),
        Err(KVError::Serialization(msg)) => {
            warn!("discarding malformed persisted session: {msg}");
            kv.delete(USER_KEY)?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
