use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authenticate::authenticate;
use super::handlers::lookup::lookup;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::method_not_allowed;
use super::handlers::route_not_found;
use super::middleware::authenticate as auth_middleware;
use super::pipeline::classify_panic;
use super::pipeline::generic_panic;
use super::pipeline::propagate_errors;
use super::pipeline::ErrorPipeline;
use crate::domain::principal::ports::PrincipalServicePort;

#[derive(Clone)]
pub struct AppState {
    pub principal_service: Arc<dyn PrincipalServicePort>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    principal_service: Arc<dyn PrincipalServicePort>,
    authenticator: Arc<Authenticator>,
    pipeline: ErrorPipeline,
) -> Router {
    let state = AppState {
        principal_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(authenticate))
        .route("/api/auth/principals", post(register))
        .route("/api/auth/principals/token", put(refresh_token));

    let protected_routes = Router::new()
        .route("/api/auth/principals/:identifier", get(lookup))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .with_state(state);

    apply_error_layers(router, pipeline)
}

/// Wrap `router` in the error pipeline, tracing, CORS and panic guards.
///
/// Layers from innermost to outermost: handler panic capture (classified and
/// emitted by the pipeline), the pipeline itself, request tracing, CORS, and
/// a last-resort panic guard answering with the generic 500 envelope.
pub fn apply_error_layers(router: Router, pipeline: ErrorPipeline) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    router
        .layer(CatchPanicLayer::custom(classify_panic))
        .layer(middleware::from_fn_with_state(pipeline, propagate_errors))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(generic_panic))
}
