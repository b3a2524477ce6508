//! Turns any caught failure into a [`ClassifiedError`].
//!
//! Recognized kinds pass through untouched, schema validator output becomes
//! `Validation` with per-field details, and everything else is upgraded to
//! `Technical` with the original error kept as the cause.

use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use validator::ValidationErrors;

use crate::domain::errors::codes;
use crate::domain::errors::Cause;
use crate::domain::errors::ClassifiedError;
use crate::domain::errors::FieldError;
use crate::domain::principal::errors::PrincipalError;

pub fn classify(error: Cause) -> ClassifiedError {
    let error = match error.downcast::<ClassifiedError>() {
        Ok(classified) => return *classified,
        Err(other) => other,
    };

    let error = match error.downcast::<PrincipalError>() {
        Ok(principal) => return (*principal).into(),
        Err(other) => other,
    };

    let error = match error.downcast::<ValidationErrors>() {
        Ok(validation) => return from_validation_errors(*validation),
        Err(other) => other,
    };

    let error = match error.downcast::<JsonRejection>() {
        Ok(rejection) => return from_json_rejection(*rejection),
        Err(other) => other,
    };

    let error = match error.downcast::<PathRejection>() {
        Ok(rejection) => return from_path_rejection(*rejection),
        Err(other) => other,
    };

    ClassifiedError::technical(codes::UNCLASSIFIED, "Internal server error").with_cause(error)
}

fn from_validation_errors(errors: ValidationErrors) -> ClassifiedError {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, failures)| {
            failures.iter().map(move |failure| {
                let message = failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("failed '{}' check", failure.code));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();

    // HashMap iteration order is unstable; clients get a deterministic list.
    details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));

    ClassifiedError::validation(codes::SCHEMA_VALIDATION, "Request validation failed")
        .with_details(details)
        .with_cause(errors)
}

fn from_json_rejection(rejection: JsonRejection) -> ClassifiedError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected request with `Content-Type: application/json`",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::JsonDataError(_) => "Request body does not match the expected shape",
        _ => "Request body could not be read",
    };

    ClassifiedError::validation(codes::MALFORMED_BODY, message)
        .with_details(vec![FieldError::new("body", rejection.body_text())])
        .with_cause(rejection)
}

fn from_path_rejection(rejection: PathRejection) -> ClassifiedError {
    ClassifiedError::validation(codes::MALFORMED_PATH, "Request path could not be parsed")
        .with_details(vec![FieldError::new("path", rejection.body_text())])
        .with_cause(rejection)
}
