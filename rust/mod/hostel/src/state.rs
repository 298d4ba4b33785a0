//! Paths under which the stores publish their state for views.
//!
//! | Path | Value |
//! |---|---|
//! | `auth/user` | `Option<Identity>` |
//! | `auth/loading` | `bool` |
//! | `complaints/items` | `Arc<Vec<Complaint>>` |
//! | `complaints/submitting` | `bool` |
//! | `complaints/updating` | `bool` |

pub const AUTH_USER: &str = "auth/user";
pub const AUTH_LOADING: &str = "auth/loading";
pub const COMPLAINTS_ITEMS: &str = "complaints/items";
pub const COMPLAINTS_SUBMITTING: &str = "complaints/submitting";
pub const COMPLAINTS_UPDATING: &str = "complaints/updating";
