use crate::models::Imagem;
use sqlx::{PgPool, Postgres, Transaction};

/// Insert an image payload, returning the stored row
pub async fn insert_image(
    tx: &mut Transaction<'_, Postgres>,
    bytes: &[u8],
) -> Result<Imagem, sqlx::Error> {
    let image = sqlx::query_as::<_, Imagem>(
        r#"
        INSERT INTO imagens (imagem)
        VALUES ($1)
        RETURNING id, imagem, created_at
        "#,
    )
    .bind(bytes)
    .fetch_one(&mut **tx)
    .await?;

    Ok(image)
}

/// Delete an image row
pub async fn delete_image(
    tx: &mut Transaction<'_, Postgres>,
    imagem_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM imagens WHERE id = $1")
        .bind(imagem_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Find an image by ID
pub async fn find_image_by_id(pool: &PgPool, imagem_id: i64) -> Result<Option<Imagem>, sqlx::Error> {
    let image = sqlx::query_as::<_, Imagem>(
        r#"
        SELECT id, imagem, created_at
        FROM imagens
        WHERE id = $1
        "#,
    )
    .bind(imagem_id)
    .fetch_optional(pool)
    .await?;

    Ok(image)
}

/// Fetch the image rows for a page of posts in one query
pub async fn find_images_by_ids(
    pool: &PgPool,
    imagem_ids: &[i64],
) -> Result<Vec<Imagem>, sqlx::Error> {
    if imagem_ids.is_empty() {
        return Ok(Vec::new());
    }

    let images = sqlx::query_as::<_, Imagem>(
        r#"
        SELECT id, imagem, created_at
        FROM imagens
        WHERE id = ANY($1)
        "#,
    )
    .bind(imagem_ids)
    .fetch_all(pool)
    .await?;

    Ok(images)
}
