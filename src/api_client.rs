//! HTTP client for the pots, friends and activities endpoints.

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::{Activity, Friend, Pot};
use crate::services::BootstrapSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client for the cause-pots HTTP API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(url)),
            status => Err(FetchError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }
}

#[async_trait]
impl BootstrapSource for ApiClient {
    async fn fetch_all_pots(&self) -> Result<Vec<Pot>, FetchError> {
        self.get_json("/api/pots").await
    }

    async fn fetch_friends(&self, address: &str) -> Result<Vec<Friend>, FetchError> {
        self.get_json(&format!("/api/friends/{}", address)).await
    }

    async fn fetch_activities(&self, address: &str) -> Result<Vec<Activity>, FetchError> {
        self.get_json(&format!("/api/activities/user/{}", address)).await
    }
}
