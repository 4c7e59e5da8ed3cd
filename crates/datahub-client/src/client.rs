//! HTTP implementation of the catalogue client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{header, Client, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::error::ClientError;
use crate::models::OrderResponse;
use crate::query::QueryParams;

/// Production endpoint of the map-images API.
pub const DEFAULT_BASE_URL: &str = "https://data.hub.api.metoffice.gov.uk/map-images/1.0.0";

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_PNG: &str = "image/png";

/// Body of a file download.
///
/// The stream owns the HTTP response; dropping it releases the connection,
/// whichever path the caller leaves by.
pub type FileStream = BoxStream<'static, Result<Bytes, ClientError>>;

/// Read operations against an order in the provider's catalogue.
#[async_trait]
pub trait CatalogueClient: Send + Sync {
    /// Fetch the manifest of the latest run of an order.
    async fn fetch_latest_order(
        &self,
        order_id: &str,
        params: &QueryParams,
    ) -> Result<OrderResponse, ClientError>;

    /// Open the PNG body of one file in the latest run.
    async fn fetch_file(
        &self,
        order_id: &str,
        file_id: &str,
        params: &QueryParams,
    ) -> Result<FileStream, ClientError>;
}

/// Catalogue client speaking HTTP to the provider.
#[derive(Debug, Clone)]
pub struct DataHubClient {
    base_url: Url,
    api_key: String,
    client: Client,
}

impl DataHubClient {
    /// Client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Client against an arbitrary endpoint.
    ///
    /// No request timeout is configured: a stalled transfer blocks its
    /// caller until the peer gives up.
    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .tcp_nodelay(true)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}?{params}`.
    ///
    /// Each segment is percent-encoded exactly once here, so order and file
    /// ids are passed around unescaped everywhere else.
    fn endpoint(&self, segments: &[&str], params: &QueryParams) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !params.is_empty() {
            url.set_query(Some(&params.to_query_string()));
        }
        url
    }

    async fn get(&self, url: &Url, accept: &str) -> Result<Response, ClientError> {
        debug!(url = %url, "Retrieving");

        let response = self
            .client
            .get(url.clone())
            .header("apikey", &self.api_key)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.as_u16() > 299 {
            return Err(ClientError::Remote {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CatalogueClient for DataHubClient {
    #[instrument(skip(self, params), fields(order_id = %order_id))]
    async fn fetch_latest_order(
        &self,
        order_id: &str,
        params: &QueryParams,
    ) -> Result<OrderResponse, ClientError> {
        let url = self.endpoint(&["orders", order_id, "latest"], params);
        let response = self.get(&url, ACCEPT_JSON).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    #[instrument(skip(self, params), fields(order_id = %order_id, file_id = %file_id))]
    async fn fetch_file(
        &self,
        order_id: &str,
        file_id: &str,
        params: &QueryParams,
    ) -> Result<FileStream, ClientError> {
        let url = self.endpoint(&["orders", order_id, "latest", file_id, "data"], params);
        let response = self.get(&url, ACCEPT_PNG).await?;

        let url = url.to_string();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })
        });

        Ok(stream.boxed())
    }
}

/// Drain a file stream into memory.
pub async fn collect_bytes(mut stream: FileStream) -> Result<Vec<u8>, ClientError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer)
}
