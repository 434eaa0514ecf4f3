use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::OtpProvider;

const VERIFY_BASE_URL: &str = "https://verify.twilio.com/v2";

/// Twilio Verify: Twilio generates, sends and stores the code. The
/// challenge handed to clients is the verification SID.
pub struct TwilioVerifyProvider {
    account_sid: String,
    auth_token: String,
    service_sid: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct VerificationResponse {
    sid: String,
    to: String,
    status: String,
}

impl TwilioVerifyProvider {
    pub fn new(
        account_sid: String,
        auth_token: String,
        service_sid: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            account_sid,
            auth_token,
            service_sid,
            base_url: VERIFY_BASE_URL.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/Services/{}/{resource}", self.base_url, self.service_sid)
    }
}

#[async_trait]
impl OtpProvider for TwilioVerifyProvider {
    async fn start_verification(&self, phone_number: &str) -> anyhow::Result<String> {
        let verification: VerificationResponse = self
            .client
            .post(self.url("Verifications"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", phone_number), ("Channel", "sms")])
            .send()
            .await
            .context("failed to call Twilio Verify")?
            .error_for_status()
            .context("Twilio Verify returned error")?
            .json()
            .await
            .context("failed to parse Twilio Verify response")?;

        tracing::debug!(sid = %verification.sid, status = %verification.status, "verification started");
        Ok(verification.sid)
    }

    async fn check_code(&self, challenge: &str, code: &str) -> anyhow::Result<Option<String>> {
        let resp = self
            .client
            .post(self.url("VerificationCheck"))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("VerificationSid", challenge), ("Code", code)])
            .send()
            .await
            .context("failed to call Twilio Verify")?;

        // Unknown, expired or exhausted verifications come back as 404.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let check: VerificationResponse = resp
            .error_for_status()
            .context("Twilio Verify returned error")?
            .json()
            .await
            .context("failed to parse Twilio Verify response")?;

        if check.status == "approved" {
            Ok(Some(check.to))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use axum::routing::post;
    use axum::Router;

    use super::*;

    /// Serves a canned VerificationCheck response and returns a provider
    /// pointed at it.
    async fn provider_against(status: StatusCode, body: &'static str) -> TwilioVerifyProvider {
        let app = Router::new().route(
            "/v2/Services/VA456/VerificationCheck",
            post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TwilioVerifyProvider::new(
            "AC123".to_string(),
            "token".to_string(),
            "VA456".to_string(),
            Duration::from_secs(2),
        )
        .unwrap()
        .with_base_url(format!("http://{addr}/v2"))
    }

    #[tokio::test]
    async fn test_approved_check_returns_phone() {
        let provider = provider_against(
            StatusCode::OK,
            r#"{"sid":"VE1","to":"+15551234567","status":"approved"}"#,
        )
        .await;
        let verified = provider.check_code("VE1", "123456").await.unwrap();
        assert_eq!(verified.as_deref(), Some("+15551234567"));
    }

    #[tokio::test]
    async fn test_pending_check_is_rejected() {
        let provider = provider_against(
            StatusCode::OK,
            r#"{"sid":"VE1","to":"+15551234567","status":"pending"}"#,
        )
        .await;
        assert_eq!(provider.check_code("VE1", "000000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_verification_is_rejected() {
        let provider = provider_against(
            StatusCode::NOT_FOUND,
            r#"{"code":20404,"message":"The requested resource was not found"}"#,
        )
        .await;
        assert_eq!(provider.check_code("VE404", "123456").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let provider = provider_against(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"down"}"#).await;
        assert!(provider.check_code("VE1", "123456").await.is_err());
    }

    #[test]
    fn test_urls_use_service_sid() {
        let provider = TwilioVerifyProvider::new(
            "AC123".to_string(),
            "token".to_string(),
            "VA456".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
        .with_base_url("http://localhost:9999/v2");

        assert_eq!(
            provider.url("Verifications"),
            "http://localhost:9999/v2/Services/VA456/Verifications"
        );
        assert_eq!(
            provider.url("VerificationCheck"),
            "http://localhost:9999/v2/Services/VA456/VerificationCheck"
        );
    }

    #[test]
    fn test_parses_verification_response() {
        let resp: VerificationResponse = serde_json::from_str(
            r#"{"sid":"VE1","to":"+15551234567","status":"approved","channel":"sms","valid":true}"#,
        )
        .unwrap();
        assert_eq!(resp.sid, "VE1");
        assert_eq!(resp.to, "+15551234567");
        assert_eq!(resp.status, "approved");
    }
}
