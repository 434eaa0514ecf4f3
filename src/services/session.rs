use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Longest accepted session lifetime: one year.
pub const MAX_TTL_HOURS: i64 = 24 * 366;

/// Caller identity established from a bearer token. Handed explicitly to
/// every operation that acts on behalf of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("missing session token")]
    Missing,
    #[error("malformed session token")]
    Malformed,
    #[error("invalid session token signature")]
    BadSignature,
    #[error("session expired")]
    Expired,
}

/// Issues and checks `payload.signature` tokens, where the payload is
/// `user_id:expiry_unix` and the signature an HMAC-SHA1 of it.
pub struct SessionKeys {
    secret: Vec<u8>,
    ttl: TimeDelta,
}

impl SessionKeys {
    /// `ttl_hours` is clamped to `1..=MAX_TTL_HOURS`.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let ttl = TimeDelta::try_hours(ttl_hours.clamp(1, MAX_TTL_HOURS)).unwrap_or(TimeDelta::MAX);
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        }
    }

    pub fn issue(&self, user_id: &str) -> String {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> String {
        let expires = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp();
        let payload = URL_SAFE_NO_PAD.encode(format!("{user_id}:{expires}"));
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Missing);
        }
        let (payload, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(SessionError::Malformed)?;
        let (user_id, expires) = decoded.rsplit_once(':').ok_or(SessionError::Malformed)?;
        let expires_at = expires
            .parse::<i64>()
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .ok_or(SessionError::Malformed)?;

        if user_id.is_empty() {
            return Err(SessionError::Malformed);
        }
        if expires_at <= now {
            return Err(SessionError::Expired);
        }

        Ok(Session {
            user_id: user_id.to_string(),
            expires_at,
        })
    }

    fn mac(&self) -> HmacSha1 {
        HmacSha1::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
