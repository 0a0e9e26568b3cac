/// Database access layer
///
/// Repositories are free async functions over sqlx executors. Read paths
/// take the shared `PgPool`; write paths take the caller's open transaction
/// so a post and its image commit or roll back together.
pub mod image_repo;
pub mod post_repo;
