//! Response sanitization.
//!
//! Every decoded body passes through [`sanitize`] before any caller sees it,
//! so server-internal flags never leak into application code.

use serde_json::Value;

/// Keys removed from every object in a response, at any nesting depth.
const FORBIDDEN_KEYS: &[&str] = &["is_admin"];

/// Strip forbidden fields from a decoded JSON value.
///
/// Objects are rebuilt without the forbidden keys and every retained value is
/// sanitized in turn; arrays are mapped element-wise; scalars and `null` pass
/// through unchanged. The function is idempotent.
///
/// # Examples
/// ```
/// use nulz_mail_client::sanitize;
/// use serde_json::json;
///
/// let clean = sanitize(json!({"id": "1", "is_admin": true}));
/// assert_eq!(clean, json!({"id": "1"}));
/// ```
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(key, _)| !FORBIDDEN_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        scalar => scalar,
    }
}
