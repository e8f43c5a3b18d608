//! Domain layer - Core business entities and logic
//!
//! Plain value-holding entities with their invariant checks. Nothing in here
//! knows how rows are stored.

pub mod book;
pub mod email;
pub mod role;
pub mod user;

pub use book::Book;
pub use email::{is_valid_email, normalize_email};
pub use role::Role;
pub use user::User;
