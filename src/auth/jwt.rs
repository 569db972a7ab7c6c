use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT payload. The token is a stateless bearer credential: nothing is
/// persisted server-side and there is no revocation or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            ttl: Duration::days(jwt.ttl_days),
        }
    }
}

impl JwtKeys {
    /// Issue a token for the given user, expiring `ttl` from now.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt issued");
        Ok(token)
    }

    /// Decode and validate a token. Bad signatures and expired tokens are
    /// both reported as `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::Unauthorized)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let past = OffsetDateTime::now_utc() - Duration::days(1);
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (past - Duration::days(7)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(matches!(keys.verify(&token), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"another-secret"),
            decoding: DecodingKey::from_secret(b"another-secret"),
            ttl: Duration::days(7),
        };
        let token = other.issue(Uuid::new_v4()).expect("issue");
        assert!(matches!(keys.verify(&token), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys();
        assert!(matches!(
            keys.verify("not-a-jwt"),
            Err(ApiError::Unauthorized)
        ));
    }
}
