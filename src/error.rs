//! Turn arbitrary error-like values into a human-readable message.
//!
//! Dispatch is on the shape of the input:
//! - plain text is returned unchanged
//! - a `std::error::Error` yields its `Display` message
//! - a JSON value yields its `msg` field, then its `message` field, then its compact JSON
//!
//! None of the entry points fail.

use serde::Serialize;
use serde_json::Value;

/// Returned when a value cannot be serialized to JSON.
pub const UNSERIALIZABLE_PLACEHOLDER: &str = "[unserializable error]";

/// Message fields consulted on JSON objects, in priority order.
const MESSAGE_FIELDS: [&str; 2] = ["msg", "message"];

/// Borrowed view of an error-like value.
#[derive(Debug, Clone, Copy)]
pub enum ErrorLike<'a> {
    /// Already a message.
    Text(&'a str),
    /// A structured error exposing a message through `Display`.
    Error(&'a (dyn std::error::Error + 'a)),
    /// An untyped value, typically deserialized from a JSON payload.
    Value(&'a Value),
}

impl<'a> From<&'a str> for ErrorLike<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for ErrorLike<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a Value> for ErrorLike<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Value(value)
    }
}

impl<'a> From<&'a anyhow::Error> for ErrorLike<'a> {
    fn from(value: &'a anyhow::Error) -> Self {
        let inner: &(dyn std::error::Error + Send + Sync + 'static) = value.as_ref();
        Self::Error(inner)
    }
}

impl<'a> From<&'a (dyn std::error::Error + 'a)> for ErrorLike<'a> {
    fn from(value: &'a (dyn std::error::Error + 'a)) -> Self {
        Self::Error(value)
    }
}

impl<'a> From<&'a std::io::Error> for ErrorLike<'a> {
    fn from(value: &'a std::io::Error) -> Self {
        Self::Error(value)
    }
}

impl<'a> From<&'a serde_json::Error> for ErrorLike<'a> {
    fn from(value: &'a serde_json::Error) -> Self {
        Self::Error(value)
    }
}

/// Normalize an error-like value into a message.
#[must_use]
pub fn normalize_error<'a>(error: impl Into<ErrorLike<'a>>) -> String {
    match error.into() {
        ErrorLike::Text(text) => text.to_string(),
        ErrorLike::Error(err) => err.to_string(),
        ErrorLike::Value(value) => normalize_value(value),
    }
}

/// Normalize any serializable value.
///
/// The value is converted to JSON and then normalized like [`ErrorLike::Value`]. If the
/// conversion fails, [`UNSERIALIZABLE_PLACEHOLDER`] is returned.
#[must_use]
pub fn normalize_serializable<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(value) => normalize_value(&value),
        Err(err) => {
            tracing::debug!(error = %err, "error value is not serializable");
            UNSERIALIZABLE_PLACEHOLDER.to_string()
        }
    }
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(map) => MESSAGE_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .find(|field| is_truthy(field))
            .map_or_else(|| to_json(value), render_field),
        _ => to_json(value),
    }
}

fn render_field(field: &Value) -> String {
    match field {
        Value::String(text) => text.clone(),
        other => to_json(other),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "failed to serialize error value");
        UNSERIALIZABLE_PLACEHOLDER.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{ensure, Context};
    use serde::ser::Error as _;
    use serde_json::json;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cycle detected"))
        }
    }

    #[test]
    fn text_passes_through() -> anyhow::Result<()> {
        ensure!(normalize_error("boom") == "boom");
        let owned = String::from("");
        ensure!(normalize_error(&owned).is_empty());
        ensure!(normalize_error(&json!("boom")) == "boom");
        Ok(())
    }

    #[test]
    fn structured_errors_use_their_message() -> anyhow::Result<()> {
        let boom = Boom;
        let dyn_err: &dyn std::error::Error = &boom;
        ensure!(normalize_error(dyn_err) == "boom");

        let io = std::io::Error::other("boom");
        ensure!(normalize_error(&io) == "boom");

        let wrapped = anyhow::anyhow!("boom");
        ensure!(normalize_error(&wrapped) == "boom");

        let Err(with_context) = Err::<(), _>(Boom).context("load config") else {
            anyhow::bail!("expected an error");
        };
        ensure!(normalize_error(&with_context) == "load config");
        Ok(())
    }

    #[test]
    fn objects_prefer_msg_then_message() -> anyhow::Result<()> {
        ensure!(normalize_error(&json!({ "msg": "oops" })) == "oops");
        ensure!(normalize_error(&json!({ "message": "bad" })) == "bad");
        ensure!(normalize_error(&json!({ "msg": "first", "message": "second" })) == "first");
        ensure!(normalize_error(&json!({ "msg": "", "message": "second" })) == "second");
        ensure!(normalize_error(&json!({ "msg": null, "message": "second" })) == "second");
        ensure!(normalize_error(&json!({ "msg": 42 })) == "42");
        ensure!(normalize_error(&json!({ "message": { "code": 7 } })) == r#"{"code":7}"#);
        Ok(())
    }

    #[test]
    fn everything_else_serializes_to_json() -> anyhow::Result<()> {
        ensure!(normalize_error(&json!({ "foo": 1 })) == r#"{"foo":1}"#);
        ensure!(
            normalize_error(&json!({ "msg": 0, "message": false })) == r#"{"msg":0,"message":false}"#
        );
        ensure!(normalize_error(&json!([1, 2])) == "[1,2]");
        ensure!(normalize_error(&json!(3)) == "3");
        ensure!(normalize_error(&Value::Null) == "null");
        Ok(())
    }

    #[test]
    fn object_fallback_keeps_key_order() -> anyhow::Result<()> {
        let raw = r#"{"zeta":1,"alpha":2,"code":{"b":true,"a":null}}"#;
        let value: Value = serde_json::from_str(raw)?;
        ensure!(normalize_error(&value) == raw);
        Ok(())
    }

    #[test]
    fn serializable_values_are_normalized_safely() -> anyhow::Result<()> {
        #[derive(Serialize)]
        struct ApiError {
            msg: &'static str,
            code: u16,
        }

        ensure!(normalize_serializable(&ApiError { msg: "denied", code: 403 }) == "denied");
        ensure!(normalize_serializable("plain") == "plain");
        ensure!(normalize_serializable(&Unserializable) == UNSERIALIZABLE_PLACEHOLDER);
        Ok(())
    }
}
