pub mod faculty;

pub use faculty::{FacultyRecord, ListingEntry, ProfileRecord};
