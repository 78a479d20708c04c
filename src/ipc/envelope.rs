//! Wire envelopes exchanged with the worker.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error message for a missing or unregistered route.
pub const UNKNOWN_ROUTE: &str = "UNKNOWN_ROUTE";

/// Error message for a request without a payload.
pub const MISSING_PAYLOAD: &str = "MISSING_PAYLOAD";

/// `{ "route": <string>, "payload": <any> }`
///
/// Both fields are optional on the wire. An explicit `null` payload
/// deserializes to `None` and is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(route: impl Into<String>, payload: Value) -> Self {
        Self {
            route: Some(route.into()),
            payload: Some(payload),
        }
    }
}

/// `{ "success": <bool>, "message": <any> }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub message: Value,
}

impl ResponseEnvelope {
    pub fn ok(message: Value) -> Self {
        Self {
            success: true,
            message,
        }
    }

    pub fn err(message: impl Into<Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_fields_are_optional() {
        let empty: RequestEnvelope = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, RequestEnvelope::default());

        let null_payload: RequestEnvelope =
            serde_json::from_value(json!({ "route": "ping", "payload": null })).unwrap();
        assert_eq!(null_payload.route.as_deref(), Some("ping"));
        assert!(null_payload.payload.is_none());
    }

    #[test]
    fn test_response_shape() {
        let encoded = serde_json::to_value(ResponseEnvelope::err(UNKNOWN_ROUTE)).unwrap();
        assert_eq!(encoded, json!({ "success": false, "message": "UNKNOWN_ROUTE" }));
    }
}
