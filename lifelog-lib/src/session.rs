//! Signed session tokens.
//!
//! Logging in is handled outside of LifeLog; all the service needs is to turn a request's
//! token back into an account. A token is `<account id>.<expiry as unix seconds>.<signature>`,
//! where the signature is the base64url HMAC-SHA256 of everything before the last dot.

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "lifelog_session";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Malformed session token")]
    Malformed,
    #[error("Invalid session signature")]
    BadSignature,
    #[error("Session expired")]
    Expired,
    #[error("Unusable session secret")]
    InvalidKey,
    #[error("Session lifetime is out of range")]
    TtlOutOfRange,
}

/// An issued token together with what it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionKey {
    secret: Arc<[u8]>,
}

impl SessionKey {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().into(),
        }
    }

    /// A fresh random secret suitable for [`SessionKey::new`].
    pub fn generate_secret() -> String {
        let mut bytes = Vec::with_capacity(32);
        bytes.extend_from_slice(Uuid::new_v4().as_bytes());
        bytes.extend_from_slice(Uuid::new_v4().as_bytes());

        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn issue(&self, user_id: Uuid, ttl: TimeDelta) -> Result<Session, SessionError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(SessionError::TtlOutOfRange)?;

        self.issue_until(user_id, expires_at)
    }

    /// Issue a token valid until `expires_at`, truncated to whole seconds.
    pub fn issue_until(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, SessionError> {
        let expires = expires_at.timestamp();
        let payload = format!("{user_id}.{expires}");

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(Session {
            token: format!("{payload}.{signature}"),
            user_id,
            expires_at: DateTime::from_timestamp(expires, 0).ok_or(SessionError::Malformed)?,
        })
    }

    /// The account a token was issued for, if it is authentic and unexpired.
    pub fn verify(&self, token: &str) -> Result<Uuid, SessionError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, SessionError> {
        let (payload, signature) = token
            .trim()
            .rsplit_once('.')
            .ok_or(SessionError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::BadSignature)?;

        let (user_id, expires) = payload.split_once('.').ok_or(SessionError::Malformed)?;
        let user_id = Uuid::parse_str(user_id).map_err(|_| SessionError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| SessionError::Malformed)?;

        if now.timestamp() >= expires {
            return Err(SessionError::Expired);
        }

        Ok(user_id)
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::InvalidKey)
    }
}

impl Debug for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let key = SessionKey::new("secret");
        let user = Uuid::new_v4();

        let session = key.issue(user, TimeDelta::hours(1)).unwrap();

        assert_eq!(session.user_id, user);
        assert_eq!(key.verify(&session.token), Ok(user));
    }

    #[test]
    fn test_expired() {
        let key = SessionKey::new("secret");
        let expires = Utc::now() - TimeDelta::seconds(1);

        let session = key.issue_until(Uuid::new_v4(), expires).unwrap();

        assert_eq!(key.verify(&session.token), Err(SessionError::Expired));
        assert!(
            key.verify_at(&session.token, expires - TimeDelta::minutes(1))
                .is_ok()
        );
    }

    #[test]
    fn test_ttl_past_representable_time() {
        let key = SessionKey::new("secret");

        let result = key.issue(Uuid::new_v4(), TimeDelta::hours(u32::MAX.into()));

        assert_eq!(result, Err(SessionError::TtlOutOfRange));
    }

    #[test]
    fn test_tampered_token() {
        let key = SessionKey::new("secret");
        let session = key.issue(Uuid::new_v4(), TimeDelta::hours(1)).unwrap();

        let (_, rest) = session.token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", Uuid::new_v4());

        assert_eq!(key.verify(&forged), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_wrong_key() {
        let session = SessionKey::new("secret")
            .issue(Uuid::new_v4(), TimeDelta::hours(1))
            .unwrap();

        assert_eq!(
            SessionKey::new("other").verify(&session.token),
            Err(SessionError::BadSignature)
        );
    }

    #[test]
    fn test_malformed() {
        let key = SessionKey::new("secret");

        assert_eq!(key.verify(""), Err(SessionError::Malformed));
        assert_eq!(key.verify("no-dots"), Err(SessionError::Malformed));
        assert_eq!(key.verify("a.b.%%%"), Err(SessionError::Malformed));
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(SessionKey::generate_secret(), SessionKey::generate_secret());
    }
}
