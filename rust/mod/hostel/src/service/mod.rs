pub mod complaint;
pub mod session;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hostel_flux::StateStore;

pub use complaint::ComplaintStore;
pub use session::SessionStore;

/// Storage key holding the active identity.
pub const USER_KEY: &str = "user";

/// Storage key holding the complaint collection.
pub const COMPLAINTS_KEY: &str = "complaints";

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Yield to the runtime, waiting `delay` first when it is non-zero.
///
/// Stands in for network latency; a zero delay still suspends once so
/// pending flags are observable.
pub(crate) async fn suspend(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}

/// Raises a published busy flag for as long as at least one guard is alive.
///
/// Overlapping operations share one counter, so the flag only drops when
/// the last of them finishes (or is dropped mid-flight).
pub(crate) struct Pending<'a> {
    count: &'a AtomicUsize,
    state: &'a StateStore,
    path: &'static str,
}

impl<'a> Pending<'a> {
    pub(crate) fn begin(count: &'a AtomicUsize, state: &'a StateStore, path: &'static str) -> Self {
        if count.fetch_add(1, Ordering::SeqCst) == 0 {
            state.set(path, true);
        }
        Self { count, state, path }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.set(self.path, false);
        }
    }
}
