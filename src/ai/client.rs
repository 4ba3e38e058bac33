use async_trait::async_trait;
use reqwest::Client;

use crate::config::OpenAiConfig;

use super::{
    inference::{build_request, parse_response},
    LinkAssessor, RemoteClassificationError,
};

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(http: Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl LinkAssessor for OpenAiClient {
    async fn assess(&self, link: &str) -> Result<String, RemoteClassificationError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(RemoteClassificationError::MissingApiKey)?;

        let request = build_request(self.config.model.clone(), link);
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteClassificationError::Status(status));
        }

        parse_response(response).await
    }
}
