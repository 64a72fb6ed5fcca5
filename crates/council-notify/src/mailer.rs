//! HTTP mail-gateway delivery
//!
//! Delivers the run report and unrecoverable-failure alerts as JSON POSTs
//! to a configured mail gateway. Configuration is environment-driven, the
//! same way the rest of the system reads its credentials. Callers treat
//! every error from this module as log-and-continue; a failed notification
//! never aborts a run.

use crate::error::NotifyError;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

const ALERT_SUBJECT: &str = "Warning - from the trading council";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment-driven mail gateway configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Gateway endpoint accepting the JSON payload
    pub gateway_url: String,

    /// Sender address
    pub from: String,

    /// Recipient address
    pub to: String,

    /// Optional bearer token for the gateway
    pub api_token: Option<String>,
}

impl MailerConfig {
    /// Read configuration from `MAIL_GATEWAY_URL`, `MAIL_FROM`, `MAIL_TO`,
    /// and the optional `MAIL_API_TOKEN`
    pub fn from_env() -> Result<Self, NotifyError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| NotifyError::Config(format!("{name} environment variable not set")))
        };

        Ok(Self {
            gateway_url: var("MAIL_GATEWAY_URL")?,
            from: var("MAIL_FROM")?,
            to: var("MAIL_TO")?,
            api_token: std::env::var("MAIL_API_TOKEN").ok(),
        })
    }
}

/// JSON payload posted to the gateway
#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    sent_at: String,
}

/// Mail gateway client
pub struct Mailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl Mailer {
    /// Create a mailer with the given configuration
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Deliver the run report
    pub async fn send_report(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.post(subject, body).await?;
        info!(subject, "report email delivered");
        Ok(())
    }

    /// Deliver an unrecoverable-failure alert
    ///
    /// This is the distinct channel for run failures; its own delivery
    /// errors are still only logged by the caller.
    pub async fn send_alert(&self, body: &str) -> Result<(), NotifyError> {
        self.post(ALERT_SUBJECT, body).await?;
        info!("failure alert delivered");
        Ok(())
    }

    async fn post(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = EmailPayload {
            from: &self.config.from,
            to: &self.config.to,
            subject,
            body,
            sent_at: chrono::Utc::now().to_rfc3339(),
        };

        debug!(gateway = %self.config.gateway_url, subject, "posting to mail gateway");

        let mut request = self.client.post(&self.config.gateway_url).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!(
                "gateway returned HTTP {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test for both env cases; parallel tests must not race on the
    // shared process environment.
    #[test]
    fn test_config_from_env() {
        unsafe {
            std::env::remove_var("MAIL_GATEWAY_URL");
        }
        assert!(matches!(
            MailerConfig::from_env(),
            Err(NotifyError::Config(_))
        ));

        unsafe {
            std::env::set_var("MAIL_GATEWAY_URL", "https://mail.example.com/send");
            std::env::set_var("MAIL_FROM", "council@example.com");
            std::env::set_var("MAIL_TO", "desk@example.com");
            std::env::remove_var("MAIL_API_TOKEN");
        }

        let config = MailerConfig::from_env().unwrap();
        assert_eq!(config.gateway_url, "https://mail.example.com/send");
        assert_eq!(config.from, "council@example.com");
        assert_eq!(config.to, "desk@example.com");
        assert!(config.api_token.is_none());

        unsafe {
            std::env::remove_var("MAIL_GATEWAY_URL");
            std::env::remove_var("MAIL_FROM");
            std::env::remove_var("MAIL_TO");
        }
    }

    #[test]
    fn test_payload_serialization() {
        let payload = EmailPayload {
            from: "council@example.com",
            to: "desk@example.com",
            subject: "BTC report",
            body: "Decision: Buy",
            sent_at: "2025-06-02T12:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["from"], "council@example.com");
        assert_eq!(json["subject"], "BTC report");
        assert_eq!(json["body"], "Decision: Buy");
    }
}
