use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by every issued token.
///
/// Fields are optional on the way in so that a token missing one is reported
/// as a missing claim rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (principal identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create claims for a principal, valid for `lifetime` from now.
    pub fn for_principal(identifier: impl ToString, lifetime: Duration) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: Some(identifier.to_string()),
            exp: Some(now + lifetime.num_seconds()),
            iat: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_principal() {
        let claims = Claims::for_principal("alice", Duration::hours(1));

        assert_eq!(claims.sub, Some("alice".to_string()));
        let exp = claims.exp.unwrap();
        let iat = claims.iat.unwrap();
        assert_eq!(exp - iat, 60 * 60);
    }

    #[test]
    fn test_absent_claims_are_not_serialized() {
        let claims = Claims {
            sub: Some("alice".to_string()),
            ..Claims::default()
        };
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json, serde_json::json!({ "sub": "alice" }));
    }

    #[test]
    fn test_missing_claims_decode_as_none() {
        let claims: Claims = serde_json::from_str(r#"{"exp": 1000}"#).unwrap();

        assert_eq!(claims.sub, None);
        assert_eq!(claims.exp, Some(1000));
    }
}
