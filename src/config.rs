use std::env;
use std::time::Duration;

use crate::services::session::MAX_TTL_HOURS;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub otp_provider: String,
    pub dev_otp_code: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_verify_service_sid: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub collaborator_timeout_ms: u64,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "salonbook.db".to_string()),
            otp_provider: env::var("OTP_PROVIDER").unwrap_or_else(|_| "fixed".to_string()),
            dev_otp_code: env::var("DEV_OTP_CODE").unwrap_or_else(|_| "123456".to_string()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_verify_service_sid: env::var("TWILIO_VERIFY_SERVICE_SID").unwrap_or_default(),
            session_secret: env::var("SESSION_SECRET").unwrap_or_else(|_| "changeme".to_string()),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(72),
            collaborator_timeout_ms: env::var("COLLABORATOR_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Upper bound for any single call to storage or an external provider.
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_TTL_HOURS).contains(&self.session_ttl_hours),
            "SESSION_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}, got {}",
            self.session_ttl_hours
        );
        anyhow::ensure!(
            self.collaborator_timeout_ms > 0,
            "COLLABORATOR_TIMEOUT_MS must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(session_ttl_hours: i64) -> AppConfig {
        AppConfig {
            port: 3001,
            database_url: ":memory:".to_string(),
            otp_provider: "fixed".to_string(),
            dev_otp_code: "123456".to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_verify_service_sid: String::new(),
            session_secret: "secret".to_string(),
            session_ttl_hours,
            collaborator_timeout_ms: 5000,
            seed_demo_data: false,
        }
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert!(config(72).validate().is_ok());
        assert!(config(MAX_TTL_HOURS).validate().is_ok());
        assert!(config(0).validate().is_err());
        assert!(config(MAX_TTL_HOURS + 1).validate().is_err());
        assert!(config(i64::MAX).validate().is_err());
    }
}
