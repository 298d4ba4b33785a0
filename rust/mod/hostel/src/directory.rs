use std::fmt;

use crate::model::{Identity, Role};

/// One known account: login email, secret, and the identity it resolves to.
#[derive(Clone)]
pub struct Credential {
    pub email: String,
    pub secret: String,
    pub identity: Identity,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Fixed list of accounts used to resolve logins. Never persisted.
///
/// Stands in for a real credential backend.
#[derive(Debug, Clone)]
pub struct CredentialDirectory {
    entries: Vec<Credential>,
}

impl CredentialDirectory {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    /// The demo accounts: one student in hostel `h1`, one rector.
    pub fn builtin() -> Self {
        Self::new(vec![
            Credential {
                email: "student@pu.edu".to_string(),
                secret: "student123".to_string(),
                identity: Identity {
                    id: "s1".to_string(),
                    name: "Aditya Student".to_string(),
                    email: "student@pu.edu".to_string(),
                    role: Role::Student,
                    hostel_id: Some("h1".to_string()),
                },
            },
            Credential {
                email: "rector@pu.edu".to_string(),
                secret: "rector123".to_string(),
                identity: Identity {
                    id: "r1".to_string(),
                    name: "Rector".to_string(),
                    email: "rector@pu.edu".to_string(),
                    role: Role::Rector,
                    hostel_id: None,
                },
            },
        ])
    }

    /// Find the identity whose email and secret both match exactly.
    ///
    /// Unknown email and wrong secret are indistinguishable to the caller.
    pub fn find(&self, email: &str, secret: &str) -> Option<Identity> {
        self.entries
            .iter()
            .find(|c| c.email == email && c.secret == secret)
            .map(|c| c.identity.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CredentialDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}
