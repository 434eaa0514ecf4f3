pub mod fixed;
pub mod twilio;

use std::time::Duration;

use async_trait::async_trait;

use crate::db::{self, queries, Db, StoreError};
use crate::models::User;

/// Delivers and checks one-time codes. The provider owns code generation,
/// delivery and challenge state; it hands back an opaque challenge.
#[async_trait]
pub trait OtpProvider: Send + Sync {
    async fn start_verification(&self, phone_number: &str) -> anyhow::Result<String>;

    /// Returns the verified phone number, or `None` if the code was rejected.
    async fn check_code(&self, challenge: &str, code: &str) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("verification failed")]
    VerificationFailed,

    #[error("identity service unavailable: {0}")]
    Transient(String),
}

impl From<StoreError> for IdentityError {
    fn from(e: StoreError) -> Self {
        IdentityError::Transient(e.to_string())
    }
}

pub struct IdentityVerifier {
    provider: Box<dyn OtpProvider>,
    db: Db,
    timeout: Duration,
}

impl IdentityVerifier {
    pub fn new(provider: Box<dyn OtpProvider>, db: Db, timeout: Duration) -> Self {
        Self {
            provider,
            db,
            timeout,
        }
    }

    pub async fn request_code(&self, phone_number: &str) -> Result<String, IdentityError> {
        let phone = normalize_phone(phone_number)?;

        let challenge = tokio::time::timeout(self.timeout, self.provider.start_verification(&phone))
            .await
            .map_err(|_| IdentityError::Transient("OTP provider timed out".to_string()))?
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to start phone verification");
                IdentityError::Transient(e.to_string())
            })?;

        tracing::debug!(phone = %phone, "verification code requested");
        Ok(challenge)
    }

    /// Checks `code` against `challenge` and returns the user for the
    /// verified phone, creating the user on first verification.
    pub async fn verify_code(
        &self,
        challenge: &str,
        code: &str,
        full_name: Option<String>,
    ) -> Result<User, IdentityError> {
        let code = code.trim();
        if challenge.is_empty() || code.is_empty() {
            return Err(IdentityError::VerificationFailed);
        }

        let verified = tokio::time::timeout(self.timeout, self.provider.check_code(challenge, code))
            .await
            .map_err(|_| IdentityError::Transient("OTP provider timed out".to_string()))?
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to check verification code");
                IdentityError::Transient(e.to_string())
            })?;

        let Some(phone) = verified else {
            return Err(IdentityError::VerificationFailed);
        };
        let phone = normalize_phone(&phone)?;

        let full_name = full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let user = db::run(&self.db, self.timeout, move |conn| {
            let now = chrono::Utc::now().naive_utc();
            queries::find_or_create_user(conn, &phone, full_name.as_deref(), &now)
        })
        .await?;

        tracing::info!(user_id = %user.id, "phone verified");
        Ok(user)
    }
}

/// Strips spaces, dashes and parentheses and requires `+` followed by 8 to
/// 15 digits.
pub fn normalize_phone(raw: &str) -> Result<String, IdentityError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let digits = cleaned.strip_prefix('+').unwrap_or("");
    let valid = (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(IdentityError::InvalidPhone(raw.to_string()));
    }
    Ok(cleaned)
}
