//! Remote fetch adapter for the book service
//!
//! Translates a query plus filters into a request against the search endpoint
//! and decodes the response. No retries, no caching: every call is one HTTP
//! request and every failure is reported as a [`FetchError`].

use async_trait::async_trait;
use bookhub_core::query::{detail_path, search_path};
use bookhub_core::{BookRecord, FetchError, FilterSpec};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::prelude::*;

/// Source of book records
///
/// The controller and the detail loader only depend on this trait, so tests
/// can swap the HTTP adapter for a scripted one.
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Every record matching the query and filters, in server order
    async fn search(&self, query: &str, filters: &FilterSpec)
        -> Result<Vec<BookRecord>, FetchError>;

    /// A single record by identifier
    async fn book(&self, id: u64) -> Result<BookRecord, FetchError>;
}

/// [`BookSource`] backed by the book service HTTP API
#[derive(Debug, Clone)]
pub struct HttpBookSource {
    client: reqwest::Client,
    api_base: Url,
}

impl HttpBookSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bookhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    pub fn search_url(&self, query: &str, filters: &FilterSpec) -> Result<Url, FetchError> {
        self.endpoint(&search_path(query, filters))
    }

    pub fn detail_url(&self, id: u64) -> Result<Url, FetchError> {
        self.endpoint(&detail_path(id))
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.api_base
            .join(path)
            .map_err(|e| FetchError::transport(f!("invalid endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {url} -> HTTP {status}");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::decode(e.to_string())
            } else {
                FetchError::transport(e.to_string())
            }
        })
    }
}

#[async_trait]
impl BookSource for HttpBookSource {
    async fn search(
        &self,
        query: &str,
        filters: &FilterSpec,
    ) -> Result<Vec<BookRecord>, FetchError> {
        let url = self.search_url(query, filters)?;
        let books: Vec<BookRecord> = self.get_json(url).await?;
        log::debug!("search returned {} books", books.len());
        Ok(books)
    }

    async fn book(&self, id: u64) -> Result<BookRecord, FetchError> {
        let url = self.detail_url(id)?;
        self.get_json(url).await
    }
}
