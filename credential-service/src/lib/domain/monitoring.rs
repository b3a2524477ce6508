use http::StatusCode;

use crate::domain::errors::ClassifiedError;
use crate::domain::errors::ErrorKind;

/// Failure report handed to the monitoring sink, keyed by error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringEvent {
    pub code: &'static str,
    pub kind: ErrorKind,
    pub http_status: StatusCode,
    /// Redacted one-line description, safe to ship off-host.
    pub summary: String,
    pub request_id: String,
    pub endpoint: String,
}

impl MonitoringEvent {
    pub fn from_error(error: &ClassifiedError, request_id: &str, endpoint: &str) -> Self {
        Self {
            code: error.code(),
            kind: error.kind(),
            http_status: error.http_status(),
            summary: redact(error.message()),
            request_id: request_id.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Code namespace (`AUTH` for `AUTH.001`).
    pub fn namespace(&self) -> &'static str {
        self.code.split('.').next().unwrap_or(self.code)
    }
}

/// Port for error monitoring sinks.
pub trait Monitor: Send + Sync + 'static {
    fn record(&self, event: &MonitoringEvent);
}

/// Mask anything shaped like a bearer token (three base64url segments
/// joined by dots) so it never leaves the process.
///
/// Candidates are maximal runs of base64url characters and dots, so quotes,
/// `=` or commas around a token do not hide it.
pub fn redact(text: &str) -> String {
    let mut redacted = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(is_token_char) {
        redacted.push_str(&rest[..start]);

        let candidate = &rest[start..];
        let end = candidate
            .find(|c: char| !is_token_char(c))
            .unwrap_or(candidate.len());
        let word = &candidate[..end];

        // Sentence punctuation is not part of the token.
        let core = word.trim_matches('.');
        if looks_like_token(core) {
            redacted.push_str(&word.replacen(core, "[REDACTED]", 1));
        } else {
            redacted.push_str(word);
        }

        rest = &candidate[end..];
    }

    redacted.push_str(rest);
    redacted
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn looks_like_token(word: &str) -> bool {
    let segments: Vec<&str> = word.split('.').collect();
    segments.len() == 3 && segments.iter().all(|segment| segment.len() >= 8)
}
