use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::errors::codes;
use crate::domain::errors::ClassifiedError;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identifier;
use crate::inbound::http::router::AppState;

/// Extension type to store the verified token subject in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub identifier: Identifier,
}

/// Middleware that validates bearer tokens and adds the subject to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims: auth::Claims = state
        .authenticator
        .validate_token(token)
        .map_err(PrincipalError::from)?;

    let subject = claims
        .sub
        .ok_or_else(|| PrincipalError::from(auth::JwtError::MissingClaim("sub".to_string())))?;

    let identifier = Identifier::new(subject).map_err(|_| {
        PrincipalError::from(auth::JwtError::InvalidToken(
            "subject is not a valid identifier".to_string(),
        ))
    })?;

    tracing::debug!(identifier = %identifier, "Bearer token accepted");

    req.extensions_mut()
        .insert(AuthenticatedPrincipal { identifier });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let missing = || {
        ApiError(ClassifiedError::auth(
            codes::MISSING_BEARER,
            "Missing or malformed Authorization header. Expected: Bearer <token>",
        ))
    };

    let auth_str = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(missing)?
        .to_str()
        .map_err(|_| missing())?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(missing)
}
