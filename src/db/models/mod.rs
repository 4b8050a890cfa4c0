pub mod tracker_entry;
pub mod user;

pub use tracker_entry::{NewTrackerEntry, TrackerEntry};
pub use user::{NewUser, User, UserProfileChanges};
