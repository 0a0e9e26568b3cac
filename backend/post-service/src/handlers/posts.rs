/// Post handlers - HTTP endpoints for the feed
use crate::config::MediaConfig;
use crate::error::Result;
use crate::models::{Imagem, Post, CATEGORIAS};
use crate::services::{NewPost, PostPage, PostPatch, PostService};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 60, message = "autor must be between 1 and 60 characters"))]
    pub autor: String,
    pub categoria: String,
    #[validate(length(min = 1, message = "publicacao must not be empty"))]
    pub publicacao: String,
    pub imagem: Option<String>,
}

impl CreatePostRequest {
    fn validate_all(&self) -> Result<()> {
        self.validate()?;
        validate_categoria(&self.categoria)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 60, message = "autor must be between 1 and 60 characters"))]
    pub autor: Option<String>,
    pub categoria: Option<String>,
    #[validate(length(min = 1, message = "publicacao must not be empty"))]
    pub publicacao: Option<String>,
    pub imagem: Option<String>,
}

impl UpdatePostRequest {
    fn validate_all(&self) -> Result<()> {
        self.validate()?;
        match &self.categoria {
            Some(categoria) => validate_categoria(categoria),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// External JSON shape of a post. The image travels as a data URL labeled
/// from its sniffed format; a post without a usable image serializes `null`.
#[derive(Debug, Serialize)]
pub struct PostResource {
    pub id: i64,
    pub autor: String,
    pub categoria: String,
    pub publicacao: String,
    pub imagem: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResource {
    /// Read-side projection: stored rows -> external shape.
    pub fn from_parts(post: Post, image: Option<Imagem>) -> Self {
        PostResource {
            id: post.id,
            autor: post.autor,
            categoria: post.categoria,
            publicacao: post.publicacao,
            imagem: image.and_then(|img| image_codec::encode(&img.imagem)),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub data: Vec<PostResource>,
    pub meta: PaginationMeta,
}

impl From<PostPage> for PostListResponse {
    fn from(page: PostPage) -> Self {
        PostListResponse {
            data: page
                .items
                .into_iter()
                .map(|(post, image)| PostResource::from_parts(post, image))
                .collect(),
            meta: PaginationMeta {
                current_page: page.current_page,
                last_page: page.last_page,
                per_page: page.per_page,
                total: page.total,
            },
        }
    }
}

fn validate_categoria(value: &str) -> Result<()> {
    if CATEGORIAS.contains(&value) {
        Ok(())
    } else {
        Err(crate::error::AppError::Validation(format!(
            "categoria must be one of: {}",
            CATEGORIAS.join(", ")
        )))
    }
}

/// An image field only counts when present and non-empty; an empty string
/// means "no change", never "delete".
fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// List posts, newest-first
/// GET /posts?page=N&per_page=M
pub async fn list_posts(
    pool: web::Data<PgPool>,
    media: web::Data<MediaConfig>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone(), media.max_image_bytes);
    let page = service.list_posts(query.page, query.per_page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse::from(page)))
}

/// Create a new post
/// POST /posts
pub async fn create_post(
    pool: web::Data<PgPool>,
    media: web::Data<MediaConfig>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate_all()?;

    let service = PostService::new((**pool).clone(), media.max_image_bytes);
    let fields = NewPost {
        autor: req.autor.clone(),
        categoria: req.categoria.clone(),
        publicacao: req.publicacao.clone(),
    };

    let (post, image) = service
        .create_post(fields, filled(req.imagem.as_deref()))
        .await?;

    Ok(HttpResponse::Created().json(PostResource::from_parts(post, image)))
}

/// Get a post by ID
/// GET /posts/{id}
pub async fn get_post(
    pool: web::Data<PgPool>,
    media: web::Data<MediaConfig>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone(), media.max_image_bytes);
    let (post, image) = service.get_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(PostResource::from_parts(post, image)))
}

/// Partially update a post
/// PUT/PATCH /posts/{id}
pub async fn update_post(
    pool: web::Data<PgPool>,
    media: web::Data<MediaConfig>,
    post_id: web::Path<i64>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate_all()?;

    let service = PostService::new((**pool).clone(), media.max_image_bytes);
    let patch = PostPatch {
        autor: req.autor.clone(),
        categoria: req.categoria.clone(),
        publicacao: req.publicacao.clone(),
    };

    let (post, image) = service
        .update_post(*post_id, patch, filled(req.imagem.as_deref()))
        .await?;

    Ok(HttpResponse::Ok().json(PostResource::from_parts(post, image)))
}

/// Delete a post and its image
/// DELETE /posts/{id}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    media: web::Data<MediaConfig>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone(), media.max_image_bytes);
    service.delete_post(*post_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
