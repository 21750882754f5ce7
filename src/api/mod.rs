use crate::core::credentials::CredentialService;
use crate::core::errors::{ServiceError, ServiceResult};
use crate::infrastructure::entities::UserRole;
use anyhow::anyhow;
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use di_axum::Inject;
use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub mod analytics;
pub mod auth;
pub mod bots;
pub mod chat;
pub mod conversations;
pub mod documents;
pub mod health;
pub mod integrations;
pub mod leads;
pub mod notifications;
pub mod subscriptions;

pub type ApiResult<T> = Result<T, ServiceError>;

/// Every versioned endpoint, to be nested under `/api/v1`.
pub fn router() -> Router {
    Router::new()
        .nest("/chat", chat::router())
        .nest("/auth", auth::router())
        .nest("/bots", bots::router())
        .nest("/documents", documents::router())
        .nest("/conversations", conversations::router())
        .nest("/leads", leads::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/notifications", notifications::router())
        .nest("/integrations", integrations::router())
        .nest("/analytics", analytics::router())
        .merge(health::router())
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            ServiceError::Internal(e) => {
                error!("request failed: {e:#}");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// Plain acknowledgement for endpoints that return no resource.
#[derive(Serialize, Debug)]
pub struct MessageBody {
    pub message: &'static str,
}

impl MessageBody {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(MessageBody { message })
    }
}

/// JSON body extractor that reports malformed input as a validation error.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ServiceError> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| JsonBody(value))
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))
    }
}

/// Query string extractor that reports malformed input as a validation error.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ServiceError> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))
    }
}

/// Path segment extractor that reports malformed ids as a validation error.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ServiceError> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| PathParam(value))
            .map_err(|rejection| ServiceError::validation(rejection.body_text()))
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn require_admin(&self) -> ServiceResult<()> {
        match self.role {
            UserRole::Admin => Ok(()),
            UserRole::User => Err(ServiceError::Forbidden("Admin access required".to_owned())),
        }
    }
}

/// The user behind the request's `Authorization: Bearer` access token.
#[derive(Debug)]
pub struct ExtractUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ServiceError> {
        let token = bearer_token(&parts.headers)?.to_owned();
        let Inject(credentials) = Inject::<dyn CredentialService>::from_request_parts(parts, state)
            .await
            .map_err(|_| ServiceError::Internal(anyhow!("credential service is not registered")))?;

        let claims = credentials.verify_access_token(&token)?;
        Ok(ExtractUser(CurrentUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> ServiceResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ServiceError::unauthorized("No token provided"))?
        .to_str()
        .map_err(|_| ServiceError::unauthorized("Invalid or expired token"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ServiceError::unauthorized("No token provided")),
    }
}
