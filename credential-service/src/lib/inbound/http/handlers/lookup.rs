use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::Identifier;
use crate::inbound::http::middleware::AuthenticatedPrincipal;
use crate::inbound::http::router::AppState;

pub async fn lookup(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedPrincipal>,
    identifier: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let Path(identifier) = identifier?;
    let identifier = Identifier::new(identifier).map_err(PrincipalError::from)?;

    tracing::debug!(
        caller = %caller.identifier,
        identifier = %identifier,
        "Principal lookup"
    );

    let principal = state.principal_service.lookup(&identifier).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        "Principal retrieved",
        (&principal).into(),
    ))
}
