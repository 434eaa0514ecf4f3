use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::OtpProvider;

const CHALLENGE_PREFIX: &str = "dev.";

/// Development provider: sends nothing and accepts a single configured
/// code for any phone number.
pub struct FixedCodeProvider {
    code: String,
}

impl FixedCodeProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

#[async_trait]
impl OtpProvider for FixedCodeProvider {
    async fn start_verification(&self, phone_number: &str) -> anyhow::Result<String> {
        tracing::debug!(phone = %phone_number, "dev OTP provider: no code sent");
        Ok(format!(
            "{CHALLENGE_PREFIX}{}",
            URL_SAFE_NO_PAD.encode(phone_number)
        ))
    }

    async fn check_code(&self, challenge: &str, code: &str) -> anyhow::Result<Option<String>> {
        let Some(encoded) = challenge.strip_prefix(CHALLENGE_PREFIX) else {
            return Ok(None);
        };
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(encoded) else {
            return Ok(None);
        };
        let Ok(phone) = String::from_utf8(bytes) else {
            return Ok(None);
        };

        if code != self.code {
            return Ok(None);
        }
        Ok(Some(phone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_challenge() {
        let provider = FixedCodeProvider::new("123456");
        let challenge = provider.start_verification("+15551234567").await.unwrap();
        assert!(challenge.starts_with("dev."));

        assert_eq!(
            provider.check_code(&challenge, "123456").await.unwrap().as_deref(),
            Some("+15551234567")
        );
        assert!(provider.check_code(&challenge, "654321").await.unwrap().is_none());
        assert!(provider.check_code("garbage", "123456").await.unwrap().is_none());
        assert!(provider.check_code("dev.%%%", "123456").await.unwrap().is_none());
    }
}
