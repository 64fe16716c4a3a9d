//! HTTP wrapper around the remote `/api/items` collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Item, ItemDraft, ItemId},
    error::error_message_from_body,
    protocol::{ItemPayload, ITEMS_PATH},
};
use tracing::debug;
use url::Url;

use crate::error::ItemsApiError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The four round trips the list view needs. Calls are independent of each other.
#[async_trait]
pub trait ItemsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, ItemsApiError>;
    async fn create(&self, draft: &ItemDraft) -> Result<Item, ItemsApiError>;
    /// Servers may answer an update with the stored item or with an empty body.
    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<Option<Item>, ItemsApiError>;
    async fn delete(&self, id: &ItemId) -> Result<(), ItemsApiError>;
}

pub struct HttpItemsApi {
    http: Client,
    base_url: Url,
}

impl HttpItemsApi {
    pub fn new(base_url: &str) -> Result<Self, ItemsApiError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ItemsApiError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, id: Option<&ItemId>) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base urls, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(ITEMS_PATH.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ItemsApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ItemsApiError::server(
                status.as_u16(),
                error_message_from_body(&body),
            ));
        }
        Ok(body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ItemsApiError> {
    let url = Url::parse(raw).map_err(|e| ItemsApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ItemsApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) url".to_string(),
        });
    }
    Ok(url)
}

fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, ItemsApiError> {
    serde_json::from_str(body).map_err(|source| ItemsApiError::Decode { what, source })
}

#[async_trait]
impl ItemsApi for HttpItemsApi {
    async fn list(&self) -> Result<Vec<Item>, ItemsApiError> {
        let url = self.endpoint(None);
        debug!(%url, "GET items");
        let body = self.send(self.http.get(url)).await?;
        decode("list", &body)
    }

    async fn create(&self, draft: &ItemDraft) -> Result<Item, ItemsApiError> {
        let url = self.endpoint(None);
        debug!(%url, "POST item");
        let body = self
            .send(self.http.post(url).json(&ItemPayload::from(draft)))
            .await?;
        decode("create", &body)
    }

    async fn update(&self, id: &ItemId, draft: &ItemDraft) -> Result<Option<Item>, ItemsApiError> {
        let url = self.endpoint(Some(id));
        debug!(%url, "PUT item");
        let body = self
            .send(self.http.put(url).json(&ItemPayload::from(draft)))
            .await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode("update", &body).map(Some)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ItemsApiError> {
        let url = self.endpoint(Some(id));
        debug!(%url, "DELETE item");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
