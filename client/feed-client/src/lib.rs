//! Client library for the Mural feed.
//!
//! Three layers, composed by [`Feed`]:
//!
//! - [`api::ApiClient`]: typed HTTP calls against the post-service REST API
//! - [`reconciler::FeedReconciler`]: optimistic create/update/delete state
//!   machine over the confirmed post list
//! - [`pager::FeedPager`]: sequential infinite-scroll page tracking
//!
//! The reconciler and pager are pure state machines with no I/O; only the
//! API client and the [`Feed`] facade touch the network.
pub mod api;
pub mod feed;
pub mod models;
pub mod pager;
pub mod reconciler;

pub use api::{ApiClient, ApiError};
pub use feed::{Feed, FeedError};
pub use models::{PageMeta, Post, PostDraft, PostPage};
pub use pager::FeedPager;
pub use reconciler::{FeedReconciler, Pending};
