pub mod complaint;
pub mod identity;

pub use complaint::{
    Complaint, ComplaintCategory, ComplaintForm, ComplaintStatus, NewComplaint, StatusCounts,
};
pub use identity::{Identity, Role};
