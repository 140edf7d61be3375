use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use newsletter_core::auth::{AuthSession, UserIdentity};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::main_lib::AppState;

/// Verifies bearer tokens issued by the account service.
pub struct AuthManager {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

impl AuthManager {
    pub fn new(jwt_secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation,
        }
    }

    /// Returns the identity carried by `token`, or `None` when the token is
    /// invalid or expired.
    pub fn identity(&self, token: &str) -> Option<UserIdentity> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) if !data.claims.sub.trim().is_empty() => {
                Some(UserIdentity::new(data.claims.sub, data.claims.email))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::debug!("Rejected bearer token: {err}");
                None
            }
        }
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

/// The caller's identity, if the request carried a valid bearer token.
///
/// Extraction never fails: an anonymous request reaches the handler and the
/// core services reject it with `AuthenticationRequired`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserIdentity>);

impl AuthSession for CurrentUser {
    fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut split = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (split.next(), split.next()) else {
        return None;
    };
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            bearer_token(parts).and_then(|token| state.auth.identity(token)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn token(sub: &str, exp_offset: i64, secret: &[u8]) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            email: Some("me@example.com".to_string()),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let auth = AuthManager::new(SECRET);
        let identity = auth.identity(&token("user-1", 3600, SECRET)).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_bad_tokens_yield_no_identity() {
        let auth = AuthManager::new(SECRET);
        assert!(auth.identity(&token("user-1", -3600, SECRET)).is_none());
        assert!(auth
            .identity(&token("user-1", 3600, b"ffffffffffffffffffffffffffffffff"))
            .is_none());
        assert!(auth.identity(&token("  ", 3600, SECRET)).is_none());
        assert!(auth.identity("not-a-jwt").is_none());
    }

    #[test]
    fn test_decode_secret_key() {
        assert_eq!(
            decode_secret_key("0123456789abcdef0123456789abcde!")
                .unwrap()
                .len(),
            32
        );
        let b64 = BASE64.encode([7u8; 32]);
        assert_eq!(decode_secret_key(&b64).unwrap(), vec![7u8; 32]);
        assert!(decode_secret_key("").is_err());
        assert!(decode_secret_key("short").is_err());
    }
}
