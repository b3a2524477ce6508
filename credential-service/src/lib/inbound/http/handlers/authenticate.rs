use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::ApiError;
use super::ApiSuccess;
use super::IssuedTokenData;
use crate::domain::errors::codes;
use crate::domain::errors::ClassifiedError;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::AuthenticateCommand;
use crate::domain::principal::models::Identifier;
use crate::inbound::http::router::AppState;

pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticateRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<IssuedTokenData>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;

    // A malformed identifier cannot belong to anyone.
    let identifier =
        Identifier::new(body.identifier).map_err(|_| PrincipalError::InvalidCredentials)?;

    let principal = state
        .principal_service
        .authenticate(AuthenticateCommand {
            identifier,
            credential: body.credential,
        })
        .await?;

    let data = IssuedTokenData::from_principal(&principal).ok_or_else(|| {
        ApiError(ClassifiedError::technical(
            codes::UNCLASSIFIED,
            "Internal server error",
        ))
    })?;

    Ok(ApiSuccess::new(StatusCode::OK, "Authenticated", data))
}

/// Login payload. `username`/`password` are accepted as aliases.
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AuthenticateRequestBody {
    #[serde(alias = "username")]
    #[validate(length(min = 1, message = "must not be empty"))]
    identifier: String,

    #[serde(alias = "password")]
    #[validate(length(min = 1, message = "must not be empty"))]
    credential: String,
}
