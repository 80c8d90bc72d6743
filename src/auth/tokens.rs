use crate::config::Settings;
use crate::db::{RefreshTokenRecord, Store};
use crate::error::{AppError, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which kind of token this is, carried in the `iss` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: TokenKind,
    pub sub: String, // User ID
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<u64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Strips the `Bearer ` prefix from an `Authorization` header value.
pub fn strip_bearer(raw: &str) -> Result<&str, AuthError> {
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Issues and checks signed session tokens.
///
/// Access tokens are self-contained. Refresh tokens are additionally tracked
/// in the store by their exact string, so each one can be revoked on its own.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<Store>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        store: Arc<Store>,
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_settings(store: Arc<Store>, settings: &Settings) -> Self {
        Self::new(
            store,
            &settings.auth.jwt_secret,
            settings.access_token_ttl(),
            settings.refresh_token_ttl(),
        )
    }

    /// Signs a new token for `user_id`. Refresh tokens are registered as
    /// active before they are handed out, and registry entries for refresh
    /// tokens that can no longer validate are dropped in the same write.
    pub fn issue(&self, user_id: u64, kind: TokenKind) -> Result<String, AppError> {
        let token = self.sign(user_id, kind)?;

        if kind == TokenKind::Refresh {
            let now = Utc::now().timestamp();
            let pruned = self.store.update(|snapshot| {
                let before = snapshot.revocations.len();
                snapshot
                    .revocations
                    .retain(|stored, _| self.expires_after(stored, now));
                let pruned = before - snapshot.revocations.len();

                snapshot
                    .revocations
                    .insert(token.clone(), RefreshTokenRecord::new(token.clone()));
                Ok::<_, AppError>(pruned)
            })?;

            if pruned > 0 {
                debug!("Pruned {} stale refresh tokens", pruned);
            }
        }

        debug!("Issued {} token for user {}", kind.as_str(), user_id);
        Ok(token)
    }

    /// Verifies signature and expiry. Says nothing about revocation.
    pub fn parse_and_validate(&self, raw: &str) -> Result<Claims, AuthError> {
        let token = strip_bearer(raw)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Resolves an access token to its user id. Refresh tokens are refused.
    pub fn authenticate(&self, raw: &str) -> Result<u64, AuthError> {
        let claims = self.parse_and_validate(raw)?;
        if claims.iss != TokenKind::Access {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Access.as_str(),
            });
        }
        claims.user_id()
    }

    /// Resolves a refresh token to its user id, provided it is registered
    /// and has not been revoked.
    pub fn validate_refresh(&self, raw: &str) -> Result<u64, AppError> {
        let claims = self.parse_and_validate(raw)?;
        if claims.iss != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind {
                expected: TokenKind::Refresh.as_str(),
            }
            .into());
        }

        let token = strip_bearer(raw)?;
        let snapshot = self.store.load()?;
        match snapshot.revocations.get(token) {
            Some(record) if record.is_active() => Ok(claims.user_id()?),
            Some(_) => {
                warn!("Rejected revoked refresh token for user {}", claims.sub);
                Err(AuthError::TokenRevoked.into())
            }
            None => {
                warn!("Rejected unregistered refresh token for user {}", claims.sub);
                Err(AuthError::TokenRevoked.into())
            }
        }
    }

    /// Marks a refresh token as revoked. Unknown tokens are ignored.
    pub fn revoke(&self, raw: &str) -> Result<(), AppError> {
        let token = strip_bearer(raw)?;

        let revoked = self.store.update(|snapshot| {
            Ok::<_, AppError>(match snapshot.revocations.get_mut(token) {
                Some(record) => {
                    record.revoked_at = Some(Utc::now());
                    true
                }
                None => false,
            })
        })?;

        if revoked {
            info!("Refresh token revoked");
        } else {
            debug!("Revoke requested for an unknown token, nothing to do");
        }
        Ok(())
    }

    /// True when `token` carries our signature and its `exp` is after `now`.
    fn expires_after(&self, token: &str, now: i64) -> bool {
        #[derive(Deserialize)]
        struct Expiry {
            exp: i64,
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Expiry>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.exp > now)
            .unwrap_or(false)
    }

    fn sign(&self, user_id: u64, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            iss: kind,
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))
    }
}
