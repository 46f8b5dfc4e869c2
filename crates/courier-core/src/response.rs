//! The result of an exchange.
//!
//! A [`Response`] is produced exactly once per dispatch by the terminal
//! middleware and flows back up the chain, possibly transformed on the
//! return leg (e.g. by deserialization middleware), until it reaches the
//! caller. It keeps a back-reference to the request that produced it so
//! failures can be diagnosed without outside context.

use std::fmt;

use http::{HeaderMap, StatusCode};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::body::Body;
use crate::request::{HeadersView, Request};

/// The result of one exchange.
pub struct Response {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Tri-state success indication.
    ///
    /// `Some(false)` marks an explicit failure. Successful exchanges leave
    /// this *unset* (`None`) rather than `Some(true)` - see
    /// [`is_success`](crate::is_success) - and anything that is not
    /// explicitly false counts as success.
    pub success: Option<bool>,
    /// The status message (canonical reason phrase).
    pub message: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// The response body, if any.
    pub body: Option<Body>,
    /// The request that produced this response.
    pub request: Request,
}

impl Response {
    /// Returns `true` unless the success indication is explicitly false.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("success", &self.success)
            .field("message", &self.message)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("request", &self.request)
            .finish()
    }
}

// The diagnostics view embedded in validation errors. The request
// back-reference is rendered separately by the error message, so it is
// omitted here; an unset success indication is omitted the same way the
// original wire format omits absent keys.
impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(success) = self.success {
            map.serialize_entry("success", &success)?;
        }
        map.serialize_entry("status", &self.status.as_u16())?;
        if !self.message.is_empty() {
            map.serialize_entry("message", &self.message)?;
        }
        if !self.headers.is_empty() {
            map.serialize_entry("headers", &HeadersView(&self.headers))?;
        }
        match &self.body {
            Some(Body::Text(text)) => map.serialize_entry("body", text)?,
            Some(Body::Json(value)) => map.serialize_entry("body", value)?,
            _ => {}
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(success: Option<bool>) -> Response {
        Response {
            status: StatusCode::OK,
            success,
            message: "OK".to_string(),
            headers: HeaderMap::new(),
            body: Some(Body::Json(json!(true))),
            request: Request::delete(""),
        }
    }

    #[test]
    fn test_unset_success_counts_as_success() {
        assert!(response(None).is_success());
        assert!(response(Some(true)).is_success());
        assert!(!response(Some(false)).is_success());
    }

    #[test]
    fn test_serialize_explicit_failure() {
        let json = serde_json::to_string(&response(Some(false))).unwrap();
        assert_eq!(
            json,
            r#"{"success":false,"status":200,"message":"OK","body":true}"#
        );
    }

    #[test]
    fn test_serialize_omits_unset_success() {
        let value: serde_json::Value = serde_json::to_value(&response(None)).unwrap();
        assert!(value.get("success").is_none());
        assert_eq!(value["status"], 200);
    }

    #[test]
    fn test_serialize_omits_request_back_reference() {
        let value: serde_json::Value = serde_json::to_value(&response(None)).unwrap();
        assert!(value.get("request").is_none());
    }
}
