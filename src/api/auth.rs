//! Account and session endpoints

use crate::api::auth::schemas::{
    AccessTokenResponse, LoginRequest, Logout, RefreshRequest, RegisterRequest, SessionResponse,
    UserProfile,
};
use crate::api::{ApiResult, ExtractUser, JsonBody, MessageBody};
use crate::core::traits::AuthService;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn register(
    Inject(auth_service): Inject<dyn AuthService>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = auth_service.register(body.into()).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

async fn login(
    Inject(auth_service): Inject<dyn AuthService>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = auth_service.login(body.into()).await?;
    Ok(Json(session.into()))
}

async fn refresh(
    Inject(auth_service): Inject<dyn AuthService>,
    JsonBody(body): JsonBody<RefreshRequest>,
) -> ApiResult<Json<AccessTokenResponse>> {
    let access_token = auth_service
        .refresh(body.refresh_token.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

async fn logout(
    Inject(auth_service): Inject<dyn AuthService>,
    body: Option<JsonBody<Logout>>,
) -> ApiResult<Json<MessageBody>> {
    let refresh_token = body.and_then(|JsonBody(body)| body.refresh_token);
    auth_service.logout(refresh_token.as_deref()).await?;
    Ok(MessageBody::new("Logged out successfully"))
}

async fn me(
    Inject(auth_service): Inject<dyn AuthService>,
    ExtractUser(current_user): ExtractUser,
) -> ApiResult<Json<UserProfile>> {
    let user = auth_service.me(current_user.id).await?;
    Ok(Json(user.into()))
}

pub mod schemas {
    use crate::core::models::{AuthSession, LoginAttempt, Registration, TokenPair};
    use crate::infrastructure::entities::{self, UserRole};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct RegisterRequest {
        pub email: String,
        pub password: String,
        pub name: String,
    }

    impl From<RegisterRequest> for Registration {
        fn from(body: RegisterRequest) -> Self {
            Registration {
                email: body.email,
                password: body.password,
                name: body.name,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    impl From<LoginRequest> for LoginAttempt {
        fn from(body: LoginRequest) -> Self {
            LoginAttempt {
                email: body.email,
                password: body.password,
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct RefreshRequest {
        pub refresh_token: Option<String>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Logout {
        pub refresh_token: Option<String>,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct AccessTokenResponse {
        pub access_token: String,
    }

    #[derive(Serialize, Debug)]
    pub struct SessionUser {
        pub id: Uuid,
        pub email: String,
        pub name: String,
        pub role: UserRole,
    }

    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct Tokens {
        pub access_token: String,
        pub refresh_token: String,
    }

    impl From<TokenPair> for Tokens {
        fn from(tokens: TokenPair) -> Self {
            Tokens {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct SessionResponse {
        pub user: SessionUser,
        pub tokens: Tokens,
    }

    impl From<AuthSession> for SessionResponse {
        fn from(session: AuthSession) -> Self {
            SessionResponse {
                user: SessionUser {
                    id: session.user.id,
                    email: session.user.email,
                    name: session.user.name,
                    role: session.user.role,
                },
                tokens: session.tokens.into(),
            }
        }
    }

    /// Everything about a user except the password hash.
    #[derive(Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct UserProfile {
        pub id: Uuid,
        pub email: String,
        pub name: String,
        pub role: UserRole,
        pub avatar: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::User> for UserProfile {
        fn from(user: entities::User) -> Self {
            UserProfile {
                id: user.id,
                email: user.email,
                name: user.name,
                role: user.role,
                avatar: user.avatar,
                created_at: user.created_at,
            }
        }
    }
}
