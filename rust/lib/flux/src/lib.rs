//! Flux — reactive state for the hostel views.
//!
//! Stores publish their public state at fixed paths; views read it with
//! `get(path)` and observe changes with `subscribe(pattern)`.
//!
//! # Path Addressing
//!
//! Paths are `/`-separated: `auth/user`, `auth/loading`,
//! `complaints/items`.
//!
//! # Pattern Matching
//!
//! Subscriptions use MQTT-style wildcards:
//! - Exact: `auth/user`
//! - Single-level: `auth/+` matches `auth/user`, `auth/loading`
//! - Multi-level: `complaints/#` matches everything under `complaints/`
//! - All: `#` matches everything
//!
//! # Example
//!
//! ```ignore
//! let state = StateStore::new();
//! state.subscribe("auth/+", |path, _value| {
//!     tracing::info!("{path} changed");
//! });
//! state.set("auth/loading", true);
//! ```

pub mod pattern;
pub mod store;
pub mod value;

pub use pattern::topic_matches;
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
