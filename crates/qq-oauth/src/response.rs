//! Provider response decoding
//!
//! The provider answers in one of two shapes depending on endpoint and
//! outcome: a JSON object (sometimes wrapped as `callback( {...} );`) or
//! `application/x-www-form-urlencoded` pairs. The shape is detected from the
//! body itself; the `Content-Type` header is not trusted.

use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Longest body excerpt carried in an error message
const BODY_EXCERPT_LEN: usize = 200;

/// Wire format a response body was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponseFormat {
    Json,
    Form,
}

/// Decode a body as a flat field map, JSON first, then form-encoded.
///
/// Form values come back as `Value::String`. Fails only if the body is
/// blank; a body that decodes to unrelated keys is left for the caller to
/// reject once it finds none of the fields it needs.
pub(crate) fn decode_fields(body: &str) -> Result<(ResponseFormat, Map<String, Value>)> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::MalformedResponse("empty response body".into()));
    }

    let json_candidate = unwrap_jsonp(body).unwrap_or(body);
    if let Ok(fields) = serde_json::from_str::<Map<String, Value>>(json_candidate) {
        return Ok((ResponseFormat::Json, fields));
    }

    let fields: Map<String, Value> = url::form_urlencoded::parse(body.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();
    if fields.is_empty() {
        return Err(Error::MalformedResponse(format!(
            "body is neither JSON nor form-encoded: {}",
            excerpt(body)
        )));
    }
    Ok((ResponseFormat::Form, fields))
}

/// Strip a `callback( ... );` wrapper, returning the inner payload.
fn unwrap_jsonp(body: &str) -> Option<&str> {
    let rest = body.strip_prefix("callback")?.trim_start().strip_prefix('(')?;
    let end = rest.rfind(')')?;
    Some(rest[..end].trim())
}

/// First of `keys` present in `fields` with a scalar value, as a string.
///
/// Numbers are rendered in their JSON form so `100019` and `"100019"` read
/// the same. Null, arrays and objects count as absent.
pub(crate) fn scalar_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Whether a provider error code signals a failure.
///
/// Empty and any numeric zero (`0`, `0.0`, `-0`) mean OK.
pub(crate) fn is_error_code(code: &str) -> bool {
    let code = code.trim();
    if code.is_empty() {
        return false;
    }
    match code.parse::<f64>() {
        Ok(n) => n != 0.0,
        Err(_) => true,
    }
}

/// First of `keys` whose value is a failing error code.
///
/// Each key is checked on its own, so `{"code":0,"error":"invalid_grant"}`
/// reports `invalid_grant`.
pub(crate) fn error_code(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| scalar_field(fields, &[*key]).filter(|code| is_error_code(code)))
}

/// Provider error for a non-2xx reply that carried no error fields.
pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
    let body = body.trim();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("no body").to_string()
    } else {
        excerpt(body).to_string()
    };
    Error::Provider {
        code: status.as_u16().to_string(),
        message,
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
