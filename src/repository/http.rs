//! HTTP Repository Implementation
//!
//! REST-backed implementation of `Repository<T>`:
//! `GET/POST {base}/{collection}`, `PUT/DELETE {base}/{collection}/{id}`.

use std::marker::PhantomData;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::domain::{Category, DomainError, DomainResult, Entity, Item};
use super::error_body::error_from_response;
use super::traits::{CatalogBackend, Repository};

/// Characters escaped when an id is placed in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One REST collection
pub struct HttpCollection<T> {
    client: Client,
    base_url: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> HttpCollection<T> {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            _entity: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::COLLECTION)
    }

    fn record_url(&self, id: &T::Id) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            T::COLLECTION,
            utf8_percent_encode(&id.to_string(), PATH_SEGMENT)
        )
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for HttpCollection<T> {
    async fn list(&self) -> DomainResult<Vec<T>> {
        let url = self.collection_url();
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        decode(response).await
    }

    async fn create(&self, draft: &T::Draft) -> DomainResult<T> {
        let url = self.collection_url();
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let url = self.record_url(entity.id());
        tracing::debug!(%url, "PUT");
        let response = self
            .client
            .put(&url)
            .json(entity)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn delete(&self, id: &T::Id) -> DomainResult<()> {
        let url = self.record_url(id);
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            // 204 or a body we have no use for
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }
}

/// Read the body and decode it, or turn it into an error
async fn decode<R: DeserializeOwned>(response: Response) -> DomainResult<R> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(error_from_response(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| DomainError::Format(e.to_string()))
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_decode() {
        DomainError::Format(e.to_string())
    } else {
        DomainError::Transport(e.to_string())
    }
}

/// Catalog backed by a REST server
pub struct HttpBackend {
    base_url: String,
    categories: HttpCollection<Category>,
    items: HttpCollection<Item>,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> DomainResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            categories: HttpCollection::new(client.clone(), base_url),
            items: HttpCollection::new(client, base_url),
        }
    }
}

impl CatalogBackend for HttpBackend {
    fn categories(&self) -> &dyn Repository<Category> {
        &self.categories
    }

    fn items(&self) -> &dyn Repository<Item> {
        &self.items
    }

    fn describe(&self) -> String {
        format!("remote {}", self.base_url)
    }
}
