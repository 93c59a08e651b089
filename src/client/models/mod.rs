//! BugMart API data models

mod category;
mod listing;
mod user;
mod wanted;

pub use category::Category;
pub use listing::{ContactInfo, Listing, Page, PartySummary};
pub use user::UserProfile;
pub use wanted::WantedPost;
