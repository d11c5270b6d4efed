//! List response envelope

use serde_json::Value;

use super::ResourceKind;
use crate::backend::ClientError;

/// Unwrap a list response body into its items.
///
/// Enveloped endpoints answer `{ "success": bool, "data": [...] }`; the
/// navbar endpoint answers with a bare array. Both shapes are accepted for
/// every resource so a backend that changes shape does not break listing.
pub fn decode_list(kind: ResourceKind, body: Value) -> Result<Vec<Value>, ClientError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if !success {
                return Err(ClientError::Unsuccessful(kind));
            }
            match map.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(ClientError::Decode(format!(
                    "{} list data is not an array: {}",
                    kind, other
                ))),
            }
        }
        Value::Null if kind.is_bare_list() => Ok(Vec::new()),
        other => Err(ClientError::Decode(format!(
            "unexpected {} list body: {}",
            kind, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_data_is_unwrapped() {
        let items = decode_list(
            ResourceKind::Cards,
            json!({"success": true, "data": [{"id": 1}, {"id": 2}]}),
        )
        .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let items = decode_list(ResourceKind::Navbar, json!([{"id": 1, "children": []}])).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unsuccessful_envelope_is_an_error() {
        let err = decode_list(ResourceKind::Cards, json!({"success": false, "data": []})).unwrap_err();
        assert_eq!(err, ClientError::Unsuccessful(ResourceKind::Cards));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let items = decode_list(ResourceKind::AboutUs, json!({"success": true})).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_non_array_data_is_decode_error() {
        let err = decode_list(ResourceKind::Pages, json!({"success": true, "data": {"id": 1}})).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
