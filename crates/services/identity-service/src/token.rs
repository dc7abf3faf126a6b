//! HS256 JWT implementation of `TokenIssuer`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};

use crate::ports::{TokenClaims, TokenIssuer, TokenKind};

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Access and refresh tokens are signed with different secrets, so one can
/// never be replayed as the other.
pub struct JwtTokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    issuer: String,
    audience: String,
}

impl JwtTokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access: SigningKeys::from_secret(&config.access_secret),
            refresh: SigningKeys::from_secret(&config.refresh_secret),
            access_ttl: Duration::seconds(config.access_ttl_seconds()),
            refresh_ttl: Duration::seconds(config.refresh_ttl_seconds()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn mint(&self, user_id: Uuid, kind: TokenKind) -> AppResult<String> {
        if user_id.is_nil() {
            return Err(AppError::token_issuance("cannot issue a token for a nil user id"));
        }

        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            typ: kind,
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys(kind).encoding)
            .map_err(|e| AppError::token_issuance(e.to_string()))
    }

    fn decode(&self, token: &str, kind: TokenKind) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);

        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &validation)?;
        if data.claims.typ != kind {
            return Err(AppError::Unauthorized);
        }
        Ok(data.claims)
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn generate_access_token(&self, user_id: Uuid) -> AppResult<String> {
        self.mint(user_id, TokenKind::Access)
    }

    async fn generate_refresh_token(&self, user_id: Uuid) -> AppResult<String> {
        self.mint(user_id, TokenKind::Refresh)
    }

    fn validate_token(&self, token: &str) -> AppResult<TokenClaims> {
        self.decode(token, TokenKind::Access)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        self.mint(claims.sub, TokenKind::Access)
    }

    fn access_token_expiry_seconds(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> JwtTokenIssuer {
        JwtTokenIssuer::new(&JwtConfig {
            access_secret: "a".repeat(32),
            refresh_secret: "r".repeat(32),
            ..JwtConfig::default()
        })
    }

    #[tokio::test]
    async fn test_access_token_round_trip() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let token = issuer.generate_access_token(user_id).await.unwrap();
        let claims = issuer.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.iss, "identity-service");
        assert_eq!(claims.aud, "identity-clients");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(issuer.access_token_expiry_seconds(), 900);
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_an_access_token() {
        let issuer = issuer();
        let refresh = issuer.generate_refresh_token(Uuid::new_v4()).await.unwrap();

        assert!(issuer.validate_token(&refresh).is_err());
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let issuer = issuer();
        let access = issuer.generate_access_token(Uuid::new_v4()).await.unwrap();

        assert!(issuer.refresh_access_token(&access).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_mints_access_for_same_subject() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let refresh = issuer.generate_refresh_token(user_id).await.unwrap();

        let access = issuer.refresh_access_token(&refresh).await.unwrap();
        let claims = issuer.validate_token(&access).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn test_nil_user_id_fails() {
        let result = issuer().generate_access_token(Uuid::nil()).await;
        assert!(matches!(result, Err(AppError::TokenIssuance(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let past = Utc::now() - Duration::hours(2);
        let claims = TokenClaims {
            sub: Uuid::new_v4(),
            exp: (past + Duration::minutes(15)).timestamp(),
            iat: past.timestamp(),
            iss: "identity-service".to_string(),
            aud: "identity-clients".to_string(),
            typ: TokenKind::Access,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::default(), &claims, &issuer.access.encoding).unwrap();

        assert!(issuer.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let other = JwtTokenIssuer::new(&JwtConfig {
            access_secret: "a".repeat(32),
            refresh_secret: "r".repeat(32),
            audience: "someone-else".to_string(),
            ..JwtConfig::default()
        });
        let token = other.mint(Uuid::new_v4(), TokenKind::Access).unwrap();

        assert!(issuer().validate_token(&token).is_err());
    }
}
