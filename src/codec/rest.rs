//! REST binding codec: HTTP status mapping, error envelope, and
//! pagination validation.
//!
//! REST errors travel as a JSON body `{"code", "message", "data"}` (the
//! same shape as a JSON-RPC error object) under a mapped HTTP status. The
//! body's code is authoritative on decode; the HTTP status is only a
//! fallback when no parseable body is present.

use base64::Engine;

use crate::error::{A2AError, A2AResult};
use crate::types::JsonRpcError;

/// Largest accepted `pageSize` for list operations.
pub const MAX_PAGE_SIZE: i32 = 1000;

/// The HTTP status the REST binding sends for an error.
///
/// Many-to-one by design; the error code in the body disambiguates.
pub fn http_status(err: &A2AError) -> u16 {
    match err {
        A2AError::ParseError { .. }
        | A2AError::InvalidRequest { .. }
        | A2AError::InvalidParams { .. }
        | A2AError::ContentTypeNotSupported { .. } => 400,
        A2AError::TaskNotFound { .. }
        | A2AError::MethodNotFound { .. }
        | A2AError::AuthenticatedExtendedCardNotConfigured { .. } => 404,
        A2AError::TaskNotCancelable { .. } => 409,
        A2AError::UnsupportedOperation { .. } | A2AError::PushNotificationNotSupported { .. } => {
            501
        }
        _ => 500,
    }
}

/// Encode an error as the REST error envelope body.
pub fn error_body(err: &A2AError) -> JsonRpcError {
    err.clone().into()
}

/// Decode a non-2xx REST response into an error.
///
/// Prefers the structured body; falls back to the raw HTTP status when the
/// body is not a valid error envelope.
pub fn error_from_response(status: u16, body: &str) -> A2AError {
    match serde_json::from_str::<JsonRpcError>(body) {
        Ok(envelope) => A2AError::from_code(envelope.code, envelope.message, envelope.data),
        Err(_) => A2AError::Http {
            status,
            body: body.to_string(),
        },
    }
}

/// Validate list-operation pagination parameters.
///
/// `page_size` must be in `0..=MAX_PAGE_SIZE` (0 means server default);
/// `page_token` must be valid base64. Violations are `InvalidParams`.
pub fn validate_pagination(page_size: Option<i32>, page_token: Option<&str>) -> A2AResult<()> {
    if let Some(size) = page_size {
        if !(0..=MAX_PAGE_SIZE).contains(&size) {
            return Err(A2AError::invalid_params(format!(
                "pageSize must be between 0 and {}, got {}",
                MAX_PAGE_SIZE, size
            )));
        }
    }
    if let Some(token) = page_token {
        if base64::engine::general_purpose::STANDARD.decode(token).is_err() {
            return Err(A2AError::invalid_params(format!(
                "pageToken is not valid base64: '{}'",
                token
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert_eq!(http_status(&A2AError::parse_error("x")), 400);
        assert_eq!(http_status(&A2AError::invalid_params("x")), 400);
        assert_eq!(http_status(&A2AError::task_not_found("x")), 404);
        assert_eq!(http_status(&A2AError::method_not_found("x")), 404);
        assert_eq!(
            http_status(&A2AError::authenticated_extended_card_not_configured("x")),
            404
        );
        assert_eq!(http_status(&A2AError::task_not_cancelable("x")), 409);
        assert_eq!(http_status(&A2AError::unsupported_operation("x")), 501);
        assert_eq!(
            http_status(&A2AError::push_notification_not_supported("x")),
            501
        );
        assert_eq!(http_status(&A2AError::internal_error("x")), 500);
        assert_eq!(http_status(&A2AError::Transport("x".into())), 500);
    }

    #[test]
    fn body_code_wins_over_http_status() {
        // A 404 carrying the TaskNotCancelable code decodes by code, not status.
        let body = serde_json::json!({"code": -32002, "message": "nope"}).to_string();
        let err = error_from_response(404, &body);
        assert!(matches!(err, A2AError::TaskNotCancelable { .. }));
    }

    #[test]
    fn unparseable_body_falls_back_to_http_error() {
        let err = error_from_response(502, "<html>bad gateway</html>");
        match err {
            A2AError::Http { status, .. } => assert_eq!(status, 502),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn error_envelope_round_trips_identity() {
        let original = A2AError::InvalidParams {
            message: "missing message.parts".to_string(),
            data: Some(serde_json::json!({"field": "parts"})),
        };
        let status = http_status(&original);
        let body = serde_json::to_string(&error_body(&original)).unwrap();
        let decoded = error_from_response(status, &body);
        assert_eq!(decoded.code(), original.code());
        assert_eq!(decoded.data(), original.data());
    }

    #[test]
    fn pagination_bounds() {
        assert!(validate_pagination(Some(0), None).is_ok());
        assert!(validate_pagination(Some(1000), None).is_ok());
        assert!(validate_pagination(Some(1001), None).is_err());
        assert!(validate_pagination(Some(-1), None).is_err());
    }

    #[test]
    fn pagination_token_must_be_base64() {
        assert!(validate_pagination(None, Some("bmV4dA==")).is_ok());
        assert!(validate_pagination(None, Some("not!!base64")).is_err());
    }
}
