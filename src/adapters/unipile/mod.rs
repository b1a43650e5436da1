//! HTTP client for the Unipile messaging-aggregation API
//!
//! Wraps the REST surface the engine needs: accounts, chats, chat messages,
//! message send, hosted connection links, and calendar events. Every call is
//! a single request/response with a bounded timeout and no retries.

pub mod payloads;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::adapters::MessagingGateway;
use crate::config::GatewayConfig;
use crate::types::error::{OrchestratedError, Result};

use payloads::{
    HostedLinkRequest, HostedLinkResponse, RawAccount, RawChat, RawEvent, RawListResponse,
    RawMessage, SendMessageRequest,
};

/// Header carrying the static gateway API key
const API_KEY_HEADER: &str = "X-API-KEY";

/// Unipile REST client
pub struct UnipileClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl UnipileClient {
    /// Create a client from gateway configuration
    ///
    /// Returns an error if the base URL is missing/invalid or the API key
    /// cannot be turned into a header value.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(OrchestratedError::Config(
                "gateway.base_url is required".to_string(),
            ));
        }
        Url::parse(&config.base_url)
            .map_err(|e| OrchestratedError::Config(format!("invalid gateway.base_url: {}", e)))?;
        if config.api_key.is_empty() {
            return Err(OrchestratedError::Config(
                "gateway.api_key is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| OrchestratedError::Config(format!("invalid api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                OrchestratedError::Config(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a list endpoint and unwrap its `items` envelope
    async fn get_items<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| OrchestratedError::Network(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratedError::Gateway(format!(
                "gateway returned {} for {}",
                status, path
            )));
        }

        let list: RawListResponse<T> = response
            .json()
            .await
            .map_err(|e| OrchestratedError::Parse(format!("bad response from {}: {}", path, e)))?;

        Ok(list.items)
    }
}

#[async_trait]
impl MessagingGateway for UnipileClient {
    async fn list_accounts(&self) -> Result<Vec<RawAccount>> {
        self.get_items("/accounts").await
    }

    async fn list_chats(&self) -> Result<Vec<RawChat>> {
        self.get_items("/chats").await
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<RawMessage>> {
        let path = format!("/chats/{}/messages", urlencoding::encode(chat_id));
        self.get_items(&path).await
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<RawMessage> {
        let url = self.endpoint("/messages");
        let body = SendMessageRequest { chat_id, text };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrchestratedError::Network(format!("send failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratedError::Gateway(format!(
                "gateway returned {} for send",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OrchestratedError::Parse(format!("bad send response: {}", e)))
    }

    async fn create_hosted_link(&self, request: &HostedLinkRequest) -> Result<String> {
        let url = self.endpoint("/hosted/accounts/link");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| OrchestratedError::Network(format!("link request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratedError::Gateway(format!(
                "gateway returned {} for hosted link",
                status
            )));
        }

        let parsed: HostedLinkResponse = response
            .json()
            .await
            .map_err(|e| OrchestratedError::Parse(format!("bad link response: {}", e)))?;

        parsed.url.filter(|u| !u.is_empty()).ok_or_else(|| {
            OrchestratedError::Gateway("hosted link response did not include a url".to_string())
        })
    }

    async fn list_events(&self) -> Result<Vec<RawEvent>> {
        self.get_items("/events").await
    }
}
