//! Feed facade: wires the API client, the reconciler and the pager into
//! the submit -> optimistic transition -> request -> confirm/rollback
//! cycle the UI drives.
use crate::api::{ApiClient, ApiError};
use crate::models::{Post, PostDraft};
use crate::pager::FeedPager;
use crate::reconciler::FeedReconciler;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no post with id {0} in the feed")]
    UnknownPost(i64),
}

pub struct Feed {
    api: ApiClient,
    reconciler: FeedReconciler,
    pager: FeedPager,
}

impl Feed {
    pub fn new(api: ApiClient, per_page: i64) -> Self {
        Self {
            api,
            reconciler: FeedReconciler::new(),
            pager: FeedPager::new(per_page),
        }
    }

    /// The list as it should render right now.
    pub fn visible(&self) -> Vec<&Post> {
        self.reconciler.visible()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    /// Fetch the next page, if one is due. Returns how many items were
    /// appended.
    pub async fn load_next_page(&mut self) -> Result<usize, FeedError> {
        let Some(page) = self.pager.next_page() else {
            return Ok(0);
        };

        match self.api.list_posts(page, self.pager.per_page()).await {
            Ok(fetched) => {
                let count = fetched.items.len();
                self.pager.record_page(page, count, fetched.meta.as_ref());
                self.reconciler.append_page(fetched.items);
                Ok(count)
            }
            Err(e) => {
                self.pager.record_failure();
                Err(e.into())
            }
        }
    }

    /// Submit a new post. The placeholder is visible for the whole round
    /// trip; the caller surfaces the error on failure (the placeholder is
    /// already gone by then).
    pub async fn submit_create(&mut self, draft: PostDraft) -> Result<Post, FeedError> {
        let epoch = self.reconciler.begin_create(&draft);

        match self.api.create_post(&draft).await {
            Ok(post) => {
                self.reconciler.confirm_create(epoch, post.clone());
                Ok(post)
            }
            Err(e) => {
                self.reconciler.fail_create(epoch);
                Err(e.into())
            }
        }
    }

    /// Submit an edit to an existing post. On failure the pre-edit item is
    /// restored before the error is returned.
    pub async fn submit_update(&mut self, post_id: i64, draft: PostDraft) -> Result<Post, FeedError> {
        let epoch = self
            .reconciler
            .begin_update(post_id, &draft)
            .ok_or(FeedError::UnknownPost(post_id))?;

        match self.api.update_post(post_id, &draft).await {
            Ok(post) => {
                self.reconciler.confirm_update(epoch, post.clone());
                Ok(post)
            }
            Err(e) => {
                self.reconciler.fail_update(epoch);
                Err(e.into())
            }
        }
    }

    /// Remove a post. The item disappears immediately; a failed background
    /// delete only logs a warning, it is never re-inserted.
    pub async fn remove(&mut self, post_id: i64) {
        self.reconciler.remove(post_id);

        if let Err(e) = self.api.delete_post(post_id).await {
            tracing::warn!(post_id, error = %e, "background delete failed; item stays removed");
        }
    }

    /// Throw away all loaded state and start over from page one. In-flight
    /// responses from before the reset are ignored when they land.
    pub fn reset(&mut self) {
        self.reconciler.reset();
        self.pager.reset();
    }
}
