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
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::RefreshTokenCommand;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<IssuedTokenData>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;

    let identifier = Identifier::new(body.identifier).map_err(PrincipalError::from)?;

    let principal = state
        .principal_service
        .refresh_token(RefreshTokenCommand {
            identifier,
            auth_token: body.auth_token,
        })
        .await?;

    let data = IssuedTokenData::from_principal(&principal).ok_or_else(|| {
        ApiError(ClassifiedError::technical(
            codes::UNCLASSIFIED,
            "Internal server error",
        ))
    })?;

    Ok(ApiSuccess::new(StatusCode::OK, "Token refreshed", data))
}

#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequestBody {
    #[serde(alias = "username")]
    #[validate(length(min = 1, message = "must not be empty"))]
    identifier: String,

    #[serde(alias = "token", alias = "auth_token")]
    #[validate(length(min = 1, message = "must not be empty"))]
    auth_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_field_spellings() {
        for field in ["authToken", "auth_token", "token"] {
            let json = format!(r#"{{"identifier":"alice","{}":"abc"}}"#, field);
            let body: RefreshTokenRequestBody = serde_json::from_str(&json).unwrap();
            assert_eq!(body.auth_token, "abc");
        }
    }

    #[test]
    fn test_empty_token_rejected() {
        let body = RefreshTokenRequestBody {
            identifier: "alice".to_string(),
            auth_token: String::new(),
        };

        assert!(body.validate().unwrap_err().field_errors().contains_key("auth_token"));
    }
}
