/// HTTP request handlers
pub mod posts;

pub use posts::{create_post, delete_post, get_post, list_posts, update_post};
