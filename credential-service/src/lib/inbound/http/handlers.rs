use std::error::Error;
use std::sync::Arc;

use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::classifier::classify;
use super::pipeline::PendingError;
use crate::domain::errors::codes;
use crate::domain::errors::ClassifiedError;
use crate::domain::principal::models::Principal;

pub mod authenticate;
pub mod lookup;
pub mod refresh_token;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, message, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Handler failure, already classified.
///
/// Converts from any error type: the classifier decides the kind. The
/// response only carries the status and a [`PendingError`]; the body is
/// written by the error pipeline.
#[derive(Debug)]
pub struct ApiError(pub ClassifiedError);

impl<E> From<E> for ApiError
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        ApiError(classify(Box::new(err)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.0.http_status().into_response();
        response
            .extensions_mut()
            .insert(PendingError(Arc::new(self.0)));
        response
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    message: String,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            message: message.into(),
            data,
        }
    }
}

/// Public view of a principal. Never includes the credential hash or the
/// token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalData {
    pub identifier: String,
    pub email: Option<String>,
    pub has_credential: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            identifier: principal.identifier.to_string(),
            email: principal.email.as_ref().map(|email| email.as_str().to_string()),
            has_credential: principal.credential_hash.is_some(),
            token_expires_at: principal.token.as_ref().map(|token| token.expires_at),
        }
    }
}

/// Freshly issued token returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokenData {
    pub principal: PrincipalData,
    pub auth_token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedTokenData {
    /// `None` when the principal carries no token.
    pub fn from_principal(principal: &Principal) -> Option<Self> {
        principal.token.as_ref().map(|token| Self {
            principal: principal.into(),
            auth_token: token.auth_token.clone(),
            expires_at: token.expires_at,
        })
    }
}

/// Fallback for unknown routes.
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError(
        ClassifiedError::business(
            codes::ROUTE_NOT_FOUND,
            format!("Route {} {} not found", method, uri.path()),
        )
        .with_status(StatusCode::NOT_FOUND),
    )
}

/// Fallback for known paths called with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError(
        ClassifiedError::business(
            codes::METHOD_NOT_ALLOWED,
            format!("Method {} not allowed on {}", method, uri.path()),
        )
        .with_status(StatusCode::METHOD_NOT_ALLOWED),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::errors::ErrorKind;
    use crate::domain::principal::errors::PrincipalError;
    use crate::domain::principal::models::Identifier;
    use crate::domain::principal::models::TokenState;

    #[test]
    fn test_api_error_from_principal_error() {
        let ApiError(error) = PrincipalError::AlreadyExists("alice".to_string()).into();

        assert_eq!(error.kind(), ErrorKind::Business);
        assert_eq!(error.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_error_response_defers_body_to_pipeline() {
        let response = ApiError(ClassifiedError::auth(codes::TOKEN_INVALID, "Token is invalid"))
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let pending = response.extensions().get::<PendingError>().unwrap();
        assert_eq!(pending.0.code(), "AUTH.001");
    }

    #[test]
    fn test_principal_view_hides_secrets() {
        let principal = Principal::registered(
            Identifier::new("alice".to_string()).unwrap(),
            None,
            "$argon2id$hash".to_string(),
        )
        .with_token(TokenState::new(
            "secret-token".to_string(),
            Utc::now() + Duration::hours(1),
        ));

        let json = serde_json::to_string(&PrincipalData::from(&principal)).unwrap();

        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"hasCredential\":true"));
        assert!(json.contains("tokenExpiresAt"));
    }

    #[test]
    fn test_issued_token_requires_token() {
        let principal = Principal::registered(
            Identifier::new("alice".to_string()).unwrap(),
            None,
            "hash".to_string(),
        );

        assert!(IssuedTokenData::from_principal(&principal).is_none());
    }
}
