//! Request lifecycle observability
//!
//! The HTTP client reports three lifecycle points to a [`RequestObserver`]:
//! the request was built, a response arrived, an error was detected. The
//! default [`TracingObserver`] turns these into `tracing` events; tests can
//! plug in their own observer to count or inspect calls.

use reqwest::StatusCode;

use super::error::ProviderError;
use super::rest::RestCall;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() && c != ' ', "")
}

/// Hook called at the defined points of every outbound request
pub trait RequestObserver: Send + Sync + std::fmt::Debug {
    /// The request is about to be sent
    fn request_built(&self, call: &RestCall, url: &str);

    /// A response arrived (any status)
    fn response_received(&self, call: &RestCall, status: StatusCode, body: &str);

    /// The operation failed
    fn error_detected(&self, call: &RestCall, error: &ProviderError);
}

/// Observer that emits structured `tracing` events
///
/// Bodies of [sensitive](RestCall::is_sensitive) calls are reduced to their
/// length, and their errors to the category summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn request_built(&self, call: &RestCall, url: &str) {
        tracing::debug!(operation = call.operation(), method = %call.method(), url, "sending request");
    }

    fn response_received(&self, call: &RestCall, status: StatusCode, body: &str) {
        if call.is_sensitive() {
            tracing::debug!(
                operation = call.operation(),
                status = status.as_u16(),
                body_len = body.len(),
                "received response"
            );
            return;
        }

        tracing::debug!(
            operation = call.operation(),
            status = status.as_u16(),
            body = %sanitize_for_log(body),
            "received response"
        );
    }

    fn error_detected(&self, call: &RestCall, error: &ProviderError) {
        let operation = call.operation();
        match error {
            // 404 drives state removal, it is not a failure by itself
            ProviderError::NotFound { url, .. } => {
                tracing::info!(operation, url, "remote entity not found");
            }
            ProviderError::Cancelled { .. } | ProviderError::DeadlineExceeded { .. } => {
                tracing::warn!(operation, error = %error, "request aborted");
            }
            ProviderError::Api { status, body, .. } if call.is_sensitive() => {
                tracing::error!(
                    operation,
                    status = status.as_u16(),
                    body_len = body.len(),
                    "API request failed"
                );
            }
            ProviderError::Api { status, body, .. } => {
                tracing::error!(
                    operation,
                    status = status.as_u16(),
                    body = %sanitize_for_log(body),
                    "API request failed"
                );
            }
            _ if call.is_sensitive() => {
                tracing::error!(operation, error = error.summary(), "request failed");
            }
            _ => {
                tracing::error!(operation, error = %error, "request failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_short_body_unchanged() {
        assert_eq!(sanitize_for_log(r#"{"ok":true}"#), r#"{"ok":true}"#);
    }

    #[test]
    fn test_sanitize_truncates_long_body() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_newlines() {
        assert_eq!(sanitize_for_log("line1\nline2\r\n"), "line1line2");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 300 bytes total]"));
    }
}
