use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::domain::principal::errors::PrincipalError;
use crate::domain::principal::models::EmailAddress;
use crate::domain::principal::models::Identifier;
use crate::domain::principal::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    let Json(body) = payload?;
    body.validate()?;

    let command = body.try_into_domain()?;
    let principal = state.principal_service.register(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        "Principal registered",
        (&principal).into(),
    ))
}

/// Registration payload. `username`/`password` are accepted as aliases.
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RegisterRequestBody {
    #[serde(alias = "username")]
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    identifier: String,

    #[validate(email(message = "must be a valid email address"))]
    email: String,

    #[serde(alias = "password")]
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    credential: String,
}

impl RegisterRequestBody {
    fn try_into_domain(self) -> Result<RegisterCommand, PrincipalError> {
        let identifier = Identifier::new(self.identifier)?;
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterCommand::new(identifier, Some(email), self.credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(identifier: &str, email: &str, credential: &str) -> RegisterRequestBody {
        RegisterRequestBody {
            identifier: identifier.to_string(),
            email: email.to_string(),
            credential: credential.to_string(),
        }
    }

    #[test]
    fn test_aliases_accepted() {
        let body: RegisterRequestBody = serde_json::from_str(
            r#"{"username":"alice","email":"alice@example.com","password":"secret123"}"#,
        )
        .unwrap();

        assert_eq!(body.identifier, "alice");
        assert_eq!(body.credential, "secret123");
    }

    #[test]
    fn test_short_credential_rejected() {
        let errors = body("alice", "alice@example.com", "12345")
            .validate()
            .unwrap_err();

        assert!(errors.field_errors().contains_key("credential"));
    }

    #[test]
    fn test_identifier_characters_checked_by_domain() {
        let result = body("alice smith", "alice@example.com", "secret123").try_into_domain();

        assert!(matches!(result, Err(PrincipalError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_valid_body_converts() {
        let command = body("alice", "alice@example.com", "secret123")
            .try_into_domain()
            .unwrap();

        assert_eq!(command.identifier.as_str(), "alice");
        assert_eq!(command.email.unwrap().as_str(), "alice@example.com");
    }
}
