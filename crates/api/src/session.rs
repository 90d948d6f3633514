use crate::handlers::{error_response, ApiError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use media_models::MediaError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";
const MAX_SESSION_LEN: usize = 128;

/// Session a request acts for, taken from the `X-Session-ID` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    /// Trims the header value; a missing or blank header means the shared
    /// `default` session.
    pub fn parse(raw: Option<&str>) -> Result<Self, MediaError> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Ok(Self(DEFAULT_SESSION.to_string()));
        }
        if value.chars().count() > MAX_SESSION_LEN {
            return Err(MediaError::InvalidSession {
                reason: format!("longer than {MAX_SESSION_LEN} characters"),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = match parts.headers.get(SESSION_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                error_response(&MediaError::InvalidSession {
                    reason: "header is not valid text".to_string(),
                })
            })?),
            None => None,
        };
        SessionId::parse(raw).map_err(|e| error_response(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_missing_is_default() {
        assert_eq!(SessionId::parse(None).unwrap().as_str(), "default");
        assert_eq!(SessionId::parse(Some("   ")).unwrap().as_str(), "default");
    }

    #[test]
    fn trims_value() {
        assert_eq!(SessionId::parse(Some("  abc-123 ")).unwrap().as_str(), "abc-123");
    }

    #[test]
    fn rejects_overlong_ids() {
        assert!(SessionId::parse(Some(&"a".repeat(128))).is_ok());
        assert!(matches!(
            SessionId::parse(Some(&"a".repeat(129))),
            Err(MediaError::InvalidSession { .. })
        ));
    }
}
