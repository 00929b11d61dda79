//! HTTP client for the persistence service.
//!
//! Thin wrapper over `reqwest`. Endpoint construction and response parsing
//! are pure functions so they can be tested without a server.

use std::time::Duration;

use canvas::doc::Item;
use reqwest::{Method, RequestBuilder};

use super::wire::{self, ItemRecord, User};
use super::{ApiError, ItemApi};
use crate::config::BoardConfig;

// =============================================================================
// ENDPOINTS
// =============================================================================

#[must_use]
pub fn items_url(base: &str) -> String {
    format!("{base}/api/items")
}

#[must_use]
pub fn item_url(base: &str, id: i64) -> String {
    format!("{base}/api/items/{id}")
}

#[must_use]
pub fn undelete_url(base: &str, id: i64) -> String {
    format!("{base}/api/items/{id}/undelete")
}

#[must_use]
pub fn user_url(base: &str) -> String {
    format!("{base}/auth/user")
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpItemApi {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpItemApi {
    /// Build a client from board config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &BoardConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_url.clone(), auth_token: config.auth_token.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connect(e.to_string())
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    /// Fetch the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// undecodable body.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let body = self
            .send(self.request(Method::GET, user_url(&self.base_url)))
            .await?;
        wire::parse_user(&body)
    }
}

#[async_trait::async_trait]
impl ItemApi for HttpItemApi {
    async fn list_items(&self, include_deleted: bool) -> Result<Vec<Item>, ApiError> {
        let body = self
            .send(self.request(Method::GET, items_url(&self.base_url)))
            .await?;
        Ok(retain_visible(wire::parse_item_list(&body)?, include_deleted))
    }

    async fn create_item(&self, item: &Item) -> Result<Item, ApiError> {
        let mut record = ItemRecord::from_item(item);
        record.id = None;
        let body = self
            .send(
                self.request(Method::POST, items_url(&self.base_url))
                    .json(&record),
            )
            .await?;
        wire::parse_item(&body)
    }

    async fn update_item(&self, id: i64, item: &Item) -> Result<Item, ApiError> {
        let mut record = ItemRecord::from_item(item);
        record.id = Some(id);
        let body = self
            .send(
                self.request(Method::PUT, item_url(&self.base_url, id))
                    .json(&record),
            )
            .await?;
        wire::parse_item(&body)
    }

    async fn soft_delete_item(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, item_url(&self.base_url, id)))
            .await?;
        Ok(())
    }

    async fn undelete_item(&self, id: i64) -> Result<(), ApiError> {
        self.send(self.request(Method::PUT, undelete_url(&self.base_url, id)))
            .await?;
        Ok(())
    }
}

/// The service returns tombstoned items too; drop them unless asked.
#[must_use]
pub fn retain_visible(items: Vec<Item>, include_deleted: bool) -> Vec<Item> {
    if include_deleted {
        return items;
    }
    items
        .into_iter()
        .filter(|item| !item.deleted)
        .collect()
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
