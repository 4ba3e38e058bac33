use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::TwilioConfig;

/// Provider-assigned identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub sid: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to the SMS provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("SMS provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("SMS provider response did not contain a message sid")]
    MalformedResponse,
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError>;
}

pub struct TwilioNotifier {
    http: Client,
    config: TwilioConfig,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

impl TwilioNotifier {
    pub fn new(http: Client, config: TwilioConfig) -> Self {
        Self { http, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioNotifier {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .timeout(self.config.timeout)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { status, body });
        }

        let resource: MessageResource = response.json().await?;
        let sid = resource.sid.ok_or(DeliveryError::MalformedResponse)?;
        tracing::info!(target: "notifier", to, sid = %sid, "sms accepted");
        Ok(DeliveryReceipt { sid })
    }
}
