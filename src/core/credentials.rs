//! Password hashing and signed tokens

use crate::core::errors::{ServiceError, ServiceResult};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::entities::{User, UserRole};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use di::{Ref, inject, injectable};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BCRYPT_COST: u32 = 10;
const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    /// Makes every refresh token distinct, even two issued in the same second.
    pub jti: Uuid,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialService: Send + Sync {
    async fn hash_password(&self, password: &str) -> ServiceResult<String>;

    async fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool>;

    fn issue_access_token(&self, user: &User) -> ServiceResult<String>;

    fn issue_refresh_token(&self, user_id: Uuid) -> ServiceResult<IssuedToken>;

    /// Returns `Unauthorized` for bad signatures, expired tokens and refresh tokens.
    fn verify_access_token(&self, token: &str) -> ServiceResult<AccessClaims>;

    /// Checks signature and expiry only; whether the token was revoked is up to the caller.
    fn verify_refresh_token(&self, token: &str) -> ServiceResult<RefreshClaims>;
}

pub struct JwtCredentialService {
    config: Ref<AppConfig>,
}

#[injectable(CredentialService)]
impl JwtCredentialService {
    #[inject]
    pub fn new(config: Ref<AppConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CredentialService for JwtCredentialService {
    async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
            .await
            .map_err(|e| anyhow!(e))?
            .map_err(|e| anyhow!("failed to hash password: {e}"))?;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> ServiceResult<bool> {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| anyhow!(e))?
            // a stored value that is not a bcrypt hash can never match
            .unwrap_or(false);
        Ok(matches)
    }

    fn issue_access_token(&self, user: &User) -> ServiceResult<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            token_type: ACCESS.to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.access_token_ttl_minutes)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(anyhow!("failed to sign access token: {e}")))
    }

    fn issue_refresh_token(&self, user_id: Uuid) -> ServiceResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::days(self.config.refresh_token_ttl_days);
        let claims = RefreshClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            token_type: REFRESH.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_refresh_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(anyhow!("failed to sign refresh token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify_access_token(&self, token: &str) -> ServiceResult<AccessClaims> {
        let claims = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| ServiceError::unauthorized("Invalid or expired token"))?
        .claims;

        if claims.token_type != ACCESS {
            return Err(ServiceError::unauthorized("Invalid or expired token"));
        }
        Ok(claims)
    }

    fn verify_refresh_token(&self, token: &str) -> ServiceResult<RefreshClaims> {
        let claims = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_refresh_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| ServiceError::unauthorized("Invalid refresh token"))?
        .claims;

        if claims.token_type != REFRESH {
            return Err(ServiceError::unauthorized("Invalid refresh token"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtCredentialService {
        JwtCredentialService::new(Ref::new(AppConfig::default()))
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            password_hash: String::new(),
            name: "Ada".to_owned(),
            role: UserRole::User,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original_password() {
        let credentials = service();
        let hash = credentials.hash_password("correct horse").await.unwrap();

        assert_ne!(hash, "correct horse");
        assert!(credentials.verify_password("correct horse", &hash).await.unwrap());
        assert!(!credentials.verify_password("battery staple", &hash).await.unwrap());
        assert!(!credentials.verify_password("correct horse", "not-a-hash").await.unwrap());
    }

    #[test]
    fn access_token_round_trips_claims() {
        let credentials = service();
        let user = user();

        let token = credentials.issue_access_token(&user).unwrap();
        let claims = credentials.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::User);
        assert!(claims.exp - claims.iat <= 15 * 60);
    }

    #[test]
    fn tokens_are_not_interchangeable() {
        let credentials = service();
        let user = user();

        let access = credentials.issue_access_token(&user).unwrap();
        let refresh = credentials.issue_refresh_token(user.id).unwrap();

        assert!(matches!(
            credentials.verify_access_token(&refresh.token),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            credentials.verify_refresh_token(&access),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn refresh_tokens_are_unique() {
        let credentials = service();
        let user_id = Uuid::new_v4();

        let first = credentials.issue_refresh_token(user_id).unwrap();
        let second = credentials.issue_refresh_token(user_id).unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(credentials.verify_refresh_token(&first.token).unwrap().sub, user_id);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let credentials = service();
        let token = credentials.issue_access_token(&user()).unwrap();

        let other = JwtCredentialService::new(Ref::new(AppConfig {
            jwt_secret: "some-other-secret".to_owned(),
            ..AppConfig::default()
        }));

        assert!(other.verify_access_token(&token).is_err());
        assert!(credentials.verify_access_token("garbage").is_err());
    }
}
