/// Data models for post-service
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Categories a post can belong to. The same set is enforced by a CHECK
/// constraint on the `posts` table.
pub const CATEGORIAS: &[&str] = &["post", "artigo", "grupo"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub autor: String,
    pub categoria: String,
    pub publicacao: String,
    pub imagem_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Imagem {
    pub id: i64,
    /// Raw payload. No MIME column exists; the format is sniffed on read.
    pub imagem: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
