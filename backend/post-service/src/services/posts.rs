/// Post service - transactional write paths and read-side pagination
use crate::db::{image_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{Imagem, Post};
use sqlx::PgPool;
use std::collections::HashMap;

pub const DEFAULT_PER_PAGE: i64 = 15;
pub const MIN_PER_PAGE: i64 = 5;
pub const MAX_PER_PAGE: i64 = 50;

/// Fields required to create a post. Validated at the handler boundary.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub autor: String,
    pub categoria: String,
    pub publicacao: String,
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub autor: Option<String>,
    pub categoria: Option<String>,
    pub publicacao: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.autor.is_none() && self.categoria.is_none() && self.publicacao.is_none()
    }
}

/// One page of the feed, newest-first, with each post's image row attached.
#[derive(Debug)]
pub struct PostPage {
    pub items: Vec<(Post, Option<Imagem>)>,
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

pub struct PostService {
    pool: PgPool,
    max_image_bytes: usize,
}

impl PostService {
    pub fn new(pool: PgPool, max_image_bytes: usize) -> Self {
        Self {
            pool,
            max_image_bytes,
        }
    }

    /// Decode an inline image before any row is touched, so a bad payload
    /// can never leave partial state behind.
    fn decode_image(&self, input: Option<&str>) -> Result<Option<Vec<u8>>> {
        match input {
            Some(value) => Ok(Some(image_codec::decode_with_limit(
                value,
                self.max_image_bytes,
            )?)),
            None => Ok(None),
        }
    }

    /// Create a post, persisting its image (if any) in the same transaction.
    pub async fn create_post(
        &self,
        fields: NewPost,
        imagem_input: Option<&str>,
    ) -> Result<(Post, Option<Imagem>)> {
        let decoded = self.decode_image(imagem_input)?;

        let mut tx = self.pool.begin().await?;

        let image = match decoded {
            Some(bytes) => Some(image_repo::insert_image(&mut tx, &bytes).await?),
            None => None,
        };

        let post = post_repo::insert_post(
            &mut tx,
            &fields.autor,
            &fields.categoria,
            &fields.publicacao,
            image.as_ref().map(|img| img.id),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(post_id = post.id, has_image = image.is_some(), "post created");

        Ok((post, image))
    }

    /// Get a post with its image row
    pub async fn get_post(&self, post_id: i64) -> Result<(Post, Option<Imagem>)> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        let image = self.load_image(&post).await?;

        Ok((post, image))
    }

    /// List a page of posts, newest-first.
    ///
    /// `per_page` is clamped to [5, 50] (default 15); `page` floors at 1.
    pub async fn list_posts(&self, page: Option<i64>, per_page: Option<i64>) -> Result<PostPage> {
        let per_page = clamp_per_page(per_page);
        let page = clamp_page(page);
        let offset = (page - 1) * per_page;

        let total = post_repo::count_posts(&self.pool).await?;
        let posts = post_repo::list_posts(&self.pool, per_page, offset).await?;

        let imagem_ids: Vec<i64> = posts.iter().filter_map(|p| p.imagem_id).collect();
        let mut images: HashMap<i64, Imagem> =
            image_repo::find_images_by_ids(&self.pool, &imagem_ids)
                .await?
                .into_iter()
                .map(|img| (img.id, img))
                .collect();

        let items = posts
            .into_iter()
            .map(|post| {
                let image = post.imagem_id.and_then(|id| images.remove(&id));
                (post, image)
            })
            .collect();

        Ok(PostPage {
            items,
            current_page: page,
            last_page: last_page(total, per_page),
            per_page,
            total,
        })
    }

    /// Partially update a post.
    ///
    /// Only supplied fields overwrite. A supplied image replaces the old
    /// row inside the same transaction; no image input leaves the stored
    /// image untouched.
    pub async fn update_post(
        &self,
        post_id: i64,
        patch: PostPatch,
        imagem_input: Option<&str>,
    ) -> Result<(Post, Option<Imagem>)> {
        let decoded = self.decode_image(imagem_input)?;

        if patch.is_empty() && decoded.is_none() {
            // Nothing to write; behaves as a read.
            return self.get_post(post_id).await;
        }

        let mut tx = self.pool.begin().await?;

        let current = post_repo::find_post_for_update(&mut tx, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        let mut post = if patch.is_empty() {
            current.clone()
        } else {
            post_repo::update_post_fields(
                &mut tx,
                post_id,
                patch.autor.as_deref(),
                patch.categoria.as_deref(),
                patch.publicacao.as_deref(),
            )
            .await?
        };

        let mut new_image = None;
        if let Some(bytes) = decoded {
            let image = image_repo::insert_image(&mut tx, &bytes).await?;
            post = post_repo::set_post_image(&mut tx, post_id, image.id).await?;
            if let Some(old_id) = current.imagem_id {
                image_repo::delete_image(&mut tx, old_id).await?;
            }
            new_image = Some(image);
        }

        tx.commit().await?;

        tracing::info!(post_id, replaced_image = new_image.is_some(), "post updated");

        let image = match new_image {
            Some(image) => Some(image),
            None => self.load_image(&post).await?,
        };

        Ok((post, image))
    }

    /// Delete a post and its image row atomically
    pub async fn delete_post(&self, post_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let post = post_repo::find_post_for_update(&mut tx, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))?;

        post_repo::delete_post(&mut tx, post_id).await?;
        if let Some(imagem_id) = post.imagem_id {
            image_repo::delete_image(&mut tx, imagem_id).await?;
        }

        tx.commit().await?;

        tracing::info!(post_id, "post deleted");

        Ok(())
    }

    async fn load_image(&self, post: &Post) -> Result<Option<Imagem>> {
        match post.imagem_id {
            Some(id) => Ok(image_repo::find_image_by_id(&self.pool, id).await?),
            None => Ok(None),
        }
    }
}

pub(crate) fn clamp_per_page(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(MIN_PER_PAGE, MAX_PER_PAGE)
}

pub(crate) fn clamp_page(requested: Option<i64>) -> i64 {
    requested.unwrap_or(1).max(1)
}

pub(crate) fn last_page(total: i64, per_page: i64) -> i64 {
    if total == 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_is_clamped_into_range() {
        assert_eq!(clamp_per_page(Some(100)), 50);
        assert_eq!(clamp_per_page(Some(1)), 5);
        assert_eq!(clamp_per_page(Some(25)), 25);
        assert_eq!(clamp_per_page(None), 15);
    }

    #[test]
    fn page_floors_at_one() {
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(4)), 4);
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(last_page(0, 15), 1);
        assert_eq!(last_page(15, 15), 1);
        assert_eq!(last_page(16, 15), 2);
        assert_eq!(last_page(31, 15), 3);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(PostPatch::default().is_empty());
        assert!(!PostPatch {
            autor: Some("Ana".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
