//! Typed HTTP client for the post-service REST API.
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::models::{ListResponse, Post, PostDraft, PostPage};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// REST client for the Mural post API.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one feed page, newest-first.
    pub async fn list_posts(&self, page: i64, per_page: i64) -> Result<PostPage, ApiError> {
        let url = format!(
            "{}/posts?page={}&per_page={}",
            self.base_url, page, per_page
        );
        let response = self.client.get(&url).send().await?;
        let list: ListResponse = Self::read_json(response).await?;
        Ok(list.into())
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post, ApiError> {
        let url = format!("{}/posts/{}", self.base_url, post_id);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post, ApiError> {
        let url = format!("{}/posts", self.base_url);
        let response = self.client.post(&url).json(draft).send().await?;
        Self::read_json(response).await
    }

    pub async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Post, ApiError> {
        let url = format!("{}/posts/{}", self.base_url, post_id);
        let response = self.client.put(&url).json(draft).send().await?;
        Self::read_json(response).await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<(), ApiError> {
        let url = format!("{}/posts/{}", self.base_url, post_id);
        let response = self.client.delete(&url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
