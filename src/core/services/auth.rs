use super::required;
use crate::core::credentials::CredentialService;
use crate::core::email::{self, EmailSender};
use crate::core::errors::{ServiceError, ServiceResult};
use crate::core::models::{AuthSession, LoginAttempt, Registration, TokenPair};
use crate::core::traits::AuthService;
use crate::infrastructure::entities::{RefreshToken, User, UserRole};
use crate::infrastructure::traits::UserRepository;
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::info;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 8;

#[injectable(AuthService)]
pub struct MyAuthService {
    users: Ref<dyn UserRepository>,
    credentials: Ref<dyn CredentialService>,
    mailer: Ref<dyn EmailSender>,
}

impl MyAuthService {
    pub fn new(
        users: Ref<dyn UserRepository>,
        credentials: Ref<dyn CredentialService>,
        mailer: Ref<dyn EmailSender>,
    ) -> Self {
        Self {
            users,
            credentials,
            mailer,
        }
    }

    /// Issues a token pair and remembers the refresh token server-side.
    async fn start_session(&self, user: User) -> ServiceResult<AuthSession> {
        let access_token = self.credentials.issue_access_token(&user)?;
        let refresh = self.credentials.issue_refresh_token(user.id)?;

        self.users
            .store_refresh_token(RefreshToken {
                id: Uuid::new_v4(),
                token: refresh.token.clone(),
                user_id: user.id,
                expires_at: refresh.expires_at,
                created_at: Utc::now(),
            })
            .await?;

        Ok(AuthSession {
            user,
            tokens: TokenPair {
                access_token,
                refresh_token: refresh.token,
            },
        })
    }
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ServiceError::validation("A valid email is required")),
    }
}

#[async_trait]
impl AuthService for MyAuthService {
    async fn register(&self, registration: Registration) -> ServiceResult<AuthSession> {
        let email = normalize_email(&registration.email)?;
        let name = required("name", &registration.name)?;
        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_owned()));
        }

        let now = Utc::now();
        let user = self
            .users
            .create_user(User {
                id: Uuid::new_v4(),
                email,
                password_hash: self.credentials.hash_password(&registration.password).await?,
                name,
                role: UserRole::User,
                avatar: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("Email already registered".to_owned())
                }
                other => other,
            })?;
        info!("registered user {}", user.id);

        let session = self.start_session(user).await?;
        email::dispatch(
            self.mailer.clone(),
            email::welcome_email(&session.user.email, &session.user.name),
        );

        Ok(session)
    }

    async fn login(&self, attempt: LoginAttempt) -> ServiceResult<AuthSession> {
        let invalid = || ServiceError::unauthorized("Invalid credentials");

        let email = attempt.email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;

        if !self
            .credentials
            .verify_password(&attempt.password, &user.password_hash)
            .await?
        {
            return Err(invalid());
        }

        self.start_session(user).await
    }

    async fn refresh(&self, refresh_token: &str) -> ServiceResult<String> {
        if refresh_token.trim().is_empty() {
            return Err(ServiceError::validation("Refresh token required"));
        }

        let claims = self.credentials.verify_refresh_token(refresh_token)?;

        // a validly signed token that was logged out is no longer accepted
        if self.users.find_refresh_token(refresh_token).await?.is_none() {
            return Err(ServiceError::unauthorized("Invalid refresh token"));
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        self.credentials.issue_access_token(&user)
    }

    async fn logout(&self, refresh_token: Option<&str>) -> ServiceResult<()> {
        if let Some(token) = refresh_token {
            self.users.delete_refresh_token(token).await?;
        }
        Ok(())
    }

    async fn me(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ada", "@example.com", "ada@localhost"] {
            assert!(
                matches!(normalize_email(email), Err(ServiceError::ValidationFailed(_))),
                "{email:?} should be rejected"
            );
        }
    }
}
