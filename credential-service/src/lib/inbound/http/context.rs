use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::Request;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const TRACK_ID_HEADER: HeaderName = HeaderName::from_static("x-track-id");

// Legacy spellings still sent by older clients.
const LEGACY_REQUEST_ID_HEADER: &str = "xrequestid";
const LEGACY_TRACK_ID_HEADER: &str = "xtrackid";

const MAX_ID_LENGTH: usize = 128;

/// Correlation data for one request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub track_id: String,
    pub method: String,
    pub endpoint: String,
}

impl RequestContext {
    /// Read correlation ids from the request, generating any that are absent.
    /// The track id defaults to the request id.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request.headers();

        let request_id = header_id(headers, REQUEST_ID_HEADER.as_str(), LEGACY_REQUEST_ID_HEADER)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let track_id = header_id(headers, TRACK_ID_HEADER.as_str(), LEGACY_TRACK_ID_HEADER)
            .unwrap_or_else(|| request_id.clone());

        Self {
            request_id,
            track_id,
            method: request.method().to_string(),
            endpoint: request.uri().path().to_string(),
        }
    }
}

fn header_id(headers: &HeaderMap, primary: &str, legacy: &str) -> Option<String> {
    headers
        .get(primary)
        .or_else(|| headers.get(legacy))
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_ID_LENGTH)
        .filter(|value| value.chars().all(|c| c.is_ascii_graphic()))
        .map(str::to_string)
}
