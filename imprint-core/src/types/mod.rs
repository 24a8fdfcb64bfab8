//! Catalog entities and their client-facing input payloads

mod book;
mod publisher;
mod review;
mod role;
mod user;
pub mod validate;

pub use book::{Book, BookInput};
pub use publisher::{Publisher, PublisherInput, DEFAULT_PHOTO};
pub use review::{average_rating, Review, ReviewInput};
pub use role::{Genre, Role};
pub use user::{User, UserInput};
