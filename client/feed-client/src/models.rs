use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A confirmed post as served by the API.
///
/// Optimistic placeholders reuse this shape with a synthetic negative id
/// until the server assigns a real one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: i64,
    pub autor: String,
    pub categoria: String,
    pub publicacao: String,
    pub imagem: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the user edits in the create/edit form. `imagem` is only
/// serialized when the user picked a new image, so an update without one
/// never clears the stored image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostDraft {
    pub autor: String,
    pub categoria: String,
    pub publicacao: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagem: Option<String>,
}

/// Pagination metadata returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// One fetched page. `meta` is absent when the backend returns a bare
/// array.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub meta: Option<PageMeta>,
}

/// Wire shapes the list endpoint may produce: a paginated envelope or a
/// bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse {
    Paginated {
        data: Vec<Post>,
        #[serde(default)]
        meta: Option<PageMeta>,
    },
    Plain(Vec<Post>),
}

impl From<ListResponse> for PostPage {
    fn from(response: ListResponse) -> Self {
        match response {
            ListResponse::Paginated { data, meta } => PostPage { items: data, meta },
            ListResponse::Plain(items) => PostPage { items, meta: None },
        }
    }
}

/// Some backends serialize ids as numbers, others as numeric strings.
/// Accept both so id comparisons stay meaningful across either shape.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Number(i64),
        Text(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(n) => Ok(n),
        IdRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
