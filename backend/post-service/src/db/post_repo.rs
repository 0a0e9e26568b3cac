use crate::models::Post;
use sqlx::{PgPool, Postgres, Row, Transaction};

/// Find a post by ID
pub async fn find_post_by_id(pool: &PgPool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// List posts newest-first
pub async fn list_posts(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Count all posts
pub async fn count_posts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Insert a new post, optionally pointing at an already-inserted image row
pub async fn insert_post(
    tx: &mut Transaction<'_, Postgres>,
    autor: &str,
    categoria: &str,
    publicacao: &str,
    imagem_id: Option<i64>,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (autor, categoria, publicacao, imagem_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        "#,
    )
    .bind(autor)
    .bind(categoria)
    .bind(publicacao)
    .bind(imagem_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(post)
}

/// Partially update a post: NULL arguments keep the stored value.
pub async fn update_post_fields(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    autor: Option<&str>,
    categoria: Option<&str>,
    publicacao: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET autor = COALESCE($2, autor),
            categoria = COALESCE($3, categoria),
            publicacao = COALESCE($4, publicacao),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        "#,
    )
    .bind(post_id)
    .bind(autor)
    .bind(categoria)
    .bind(publicacao)
    .fetch_one(&mut **tx)
    .await?;

    Ok(post)
}

/// Repoint a post at a new image row, returning the refreshed row
pub async fn set_post_image(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    imagem_id: i64,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET imagem_id = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        "#,
    )
    .bind(imagem_id)
    .bind(post_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(post)
}

/// Find a post inside a write transaction, locking the row until commit
pub async fn find_post_for_update(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, autor, categoria, publicacao, imagem_id, created_at, updated_at
        FROM posts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(post)
}

/// Delete a post row. Returns whether a row was removed.
pub async fn delete_post(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}
