use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::Identity;

// ---------------------------------------------------------------------------
// ComplaintStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a complaint.
///
/// ```text
/// PENDING → RESOLVED
///         → REJECTED
/// ```
///
/// The store never moves a complaint back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Pending,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Resolved or rejected; shown under the "closed" tab of a student.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ComplaintCategory
// ---------------------------------------------------------------------------

/// Categories offered by the submission form.
///
/// Complaints store the category as plain text; the store accepts any value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplaintCategory {
    Plumbing,
    Electrical,
    Furniture,
    Cleanliness,
    Security,
    Other,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 6] = [
        Self::Plumbing,
        Self::Electrical,
        Self::Furniture,
        Self::Cleanliness,
        Self::Security,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plumbing => "plumbing",
            Self::Electrical => "electrical",
            Self::Furniture => "furniture",
            Self::Cleanliness => "cleanliness",
            Self::Security => "security",
            Self::Other => "other",
        }
    }

    /// Label shown in the category picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Furniture => "Furniture",
            Self::Cleanliness => "Cleanliness",
            Self::Security => "Security",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Complaint
// ---------------------------------------------------------------------------

/// A student-submitted issue report.
///
/// Persisted as one element of the JSON array under the `complaints` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,

    pub title: String,
    pub description: String,
    pub category: String,
    pub room_number: String,

    /// Set once at creation.
    pub created_at: DateTime<Utc>,

    pub status: ComplaintStatus,

    // --- owner ---
    pub student_id: String,
    pub student_name: String,
    pub hostel_id: String,

    /// Set on every status change, absent until the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Rector comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Input for creating a complaint: everything except id, timestamp and status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub room_number: String,
    pub student_id: String,
    pub student_name: String,
    pub hostel_id: String,
}

impl NewComplaint {
    /// Combine the submission form with the submitting identity.
    ///
    /// Identities without a hostel affiliation file under `default_hostel_id`.
    pub fn from_form(form: ComplaintForm, identity: &Identity, default_hostel_id: &str) -> Self {
        Self {
            title: form.title,
            description: form.description,
            category: form.category,
            room_number: form.room_number,
            student_id: identity.id.clone(),
            student_name: identity.name.clone(),
            hostel_id: identity
                .hostel_id
                .clone()
                .unwrap_or_else(|| default_hostel_id.to_string()),
        }
    }
}

/// The fields a student fills in on the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub room_number: String,
}

/// Per-status totals for the rector dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub resolved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.resolved + self.rejected
    }

    pub(crate) fn tally<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Self {
        let mut counts = Self::default();
        for c in complaints {
            match c.status {
                ComplaintStatus::Pending => counts.pending += 1,
                ComplaintStatus::Resolved => counts.resolved += 1,
                ComplaintStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }
}
