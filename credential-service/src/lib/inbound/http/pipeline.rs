//! Error propagation pipeline.
//!
//! The single place that turns a classified error into client output. Each
//! error is handled once, in order: monitoring event, structured log line,
//! JSON envelope. Handlers never write error bodies themselves; they return
//! an [`ApiError`](super::handlers::ApiError) whose response carries a
//! [`PendingError`] extension, and [`propagate_errors`] finishes the job.

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::context::RequestContext;
use super::context::REQUEST_ID_HEADER;
use super::context::TRACK_ID_HEADER;
use crate::domain::errors::codes;
use crate::domain::errors::ClassifiedError;
use crate::domain::errors::ErrorKind;
use crate::domain::errors::FieldError;
use crate::domain::monitoring::redact;
use crate::domain::monitoring::Monitor;
use crate::domain::monitoring::MonitoringEvent;

const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains";
const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Envelope returned when the pipeline itself fails. Built without any
/// serialization so it cannot fail in turn.
const FALLBACK_BODY: &str = r#"{"success":false,"message":"Internal server error","data":null,"error":{"name":"TechnicalError","statusCode":500,"code":"TEC.000","details":[]}}"#;

/// A classified error waiting to be emitted, attached to the response by
/// `ApiError::into_response`.
#[derive(Debug, Clone)]
pub struct PendingError(pub Arc<ClassifiedError>);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope<'a> {
    pub success: bool,
    pub message: &'a str,
    pub data: Option<()>,
    pub error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    pub name: &'static str,
    pub status_code: u16,
    pub code: &'static str,
    pub details: &'a [FieldError],
}

impl<'a> ErrorEnvelope<'a> {
    pub fn new(error: &'a ClassifiedError) -> Self {
        Self {
            success: false,
            message: error.message(),
            data: None,
            error: ErrorBody {
                name: error.kind().name(),
                status_code: error.http_status().as_u16(),
                code: error.code(),
                details: error.details(),
            },
        }
    }
}

#[derive(Clone)]
pub struct ErrorPipeline {
    monitor: Arc<dyn Monitor>,
}

impl ErrorPipeline {
    pub fn new(monitor: Arc<dyn Monitor>) -> Self {
        Self { monitor }
    }

    /// Monitor, log and render `error`. Never panics: a fault in any step
    /// yields the generic 500 envelope.
    pub fn emit(&self, error: &ClassifiedError, context: &RequestContext) -> Response {
        let emitted = panic::catch_unwind(AssertUnwindSafe(|| {
            self.monitor.record(&MonitoringEvent::from_error(
                error,
                &context.request_id,
                &endpoint(context),
            ));
            log_error(error, context);
            render(error, context)
        }));

        match emitted {
            Ok(response) => response,
            Err(payload) => {
                tracing::error!(
                    request_id = %context.request_id,
                    code = error.code(),
                    panic = %panic_message(payload.as_ref()),
                    "Error pipeline failed"
                );
                fallback_response(Some(context))
            }
        }
    }
}

/// Middleware completing every error response through the pipeline.
///
/// Error responses the framework produced without a [`PendingError`] are
/// classified from their status. Correlation ids are echoed on every
/// response.
pub async fn propagate_errors(
    State(pipeline): State<ErrorPipeline>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::from_request(&request);

    let mut response = next.run(request).await;

    let pending = response.extensions_mut().remove::<PendingError>();
    match pending {
        Some(PendingError(error)) => response = pipeline.emit(&error, &context),
        None if is_failure(response.status()) => {
            let error = classify_status(response.status(), &context);
            response = pipeline.emit(&error, &context);
        }
        None => {}
    }

    stamp_correlation(response.headers_mut(), &context);
    response
}

fn is_failure(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Classify an error response that the framework produced on its own
/// (routing, extractor rejections) and that therefore carries no
/// [`PendingError`].
fn classify_status(status: StatusCode, context: &RequestContext) -> ClassifiedError {
    if status.is_server_error() {
        return ClassifiedError::technical(codes::UNCLASSIFIED, "Internal server error");
    }

    let error = match status {
        StatusCode::NOT_FOUND => ClassifiedError::business(
            codes::ROUTE_NOT_FOUND,
            format!("Route {} {} not found", context.method, context.endpoint),
        ),
        StatusCode::METHOD_NOT_ALLOWED => ClassifiedError::business(
            codes::METHOD_NOT_ALLOWED,
            format!("Method {} not allowed on {}", context.method, context.endpoint),
        ),
        _ => ClassifiedError::business(
            codes::REQUEST_REJECTED,
            status.canonical_reason().unwrap_or("Request rejected"),
        ),
    };

    error.with_status(status)
}

fn endpoint(context: &RequestContext) -> String {
    format!("{} {}", context.method, context.endpoint)
}

fn log_error(error: &ClassifiedError, context: &RequestContext) {
    let cause = error
        .cause()
        .map(|cause| redact(&cause.to_string()))
        .unwrap_or_default();

    macro_rules! emit_log {
        ($level:ident) => {
            tracing::$level!(
                request_id = %context.request_id,
                track_id = %context.track_id,
                method = %context.method,
                endpoint = %context.endpoint,
                code = error.code(),
                kind = %error.kind(),
                status = error.http_status().as_u16(),
                cause = %cause,
                "{}",
                error.message()
            )
        };
    }

    match error.kind() {
        ErrorKind::Validation | ErrorKind::Auth | ErrorKind::Business => emit_log!(warn),
        ErrorKind::Technical | ErrorKind::Adapter => emit_log!(error),
    }
}

fn render(error: &ClassifiedError, context: &RequestContext) -> Response {
    let mut response = (error.http_status(), Json(ErrorEnvelope::new(error))).into_response();
    stamp_security(response.headers_mut());
    stamp_correlation(response.headers_mut(), context);
    response
}

/// Generic 500 envelope used when classification or emission is impossible.
pub fn fallback_response(context: Option<&RequestContext>) -> Response {
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_BODY).into_response();
    stamp_security(response.headers_mut());
    if let Some(context) = context {
        stamp_correlation(response.headers_mut(), context);
    }
    response
}

fn stamp_security(headers: &mut HeaderMap) {
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
    );
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
}

fn stamp_correlation(headers: &mut HeaderMap, context: &RequestContext) {
    if let Ok(value) = HeaderValue::from_str(&context.request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&context.track_id) {
        headers.insert(TRACK_ID_HEADER, value);
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Panic raised inside a handler, kept as the cause of the classified error.
#[derive(Debug, thiserror::Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

/// Response for a handler panic caught below the pipeline; the pipeline then
/// emits it like any other error.
pub fn classify_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let error = ClassifiedError::technical(codes::PIPELINE_FAILURE, "Internal server error")
        .with_cause(HandlerPanic(panic_message(payload.as_ref())));

    let mut response = error.http_status().into_response();
    response
        .extensions_mut()
        .insert(PendingError(Arc::new(error)));
    response
}

/// Response for a panic caught above the pipeline.
pub fn generic_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(panic = %panic_message(payload.as_ref()), "Unhandled panic");
    fallback_response(None)
}
