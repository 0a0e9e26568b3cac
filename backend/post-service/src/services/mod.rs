/// Business logic layer
pub mod posts;

pub use posts::{NewPost, PostPage, PostPatch, PostService};
