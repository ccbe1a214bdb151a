//! Product service client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use viewer_common::{ProductResponse, QueryParameters, ViewerError, ViewerResult};

/// Fetches one product description per call.
#[async_trait]
pub trait ProductClient: Send + Sync {
    async fn fetch(&self, params: &QueryParameters) -> ViewerResult<ProductResponse>;
}

/// [`ProductClient`] over HTTP GET.
///
/// No request timeout is set: a hung request simply never completes and the
/// engine keeps playing what it has until the next refresh.
#[derive(Debug, Clone)]
pub struct HttpProductClient {
    client: Client,
    endpoint: String,
}

impl HttpProductClient {
    pub fn new(endpoint: impl Into<String>) -> ViewerResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ViewerError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProductClient for HttpProductClient {
    #[instrument(skip(self, params), fields(query = %params.to_query_string()))]
    async fn fetch(&self, params: &QueryParameters) -> ViewerResult<ProductResponse> {
        let url = format!("{}?{}", self.endpoint, params.to_query_string());

        // Connection failures and unreadable status lines both land here
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ViewerError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ViewerError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ViewerError::Transport(format!("Failed to read response body: {}", e)))?;
        debug!(bytes = body.len(), "Product response received");

        ProductResponse::from_xml(&body)
    }
}
