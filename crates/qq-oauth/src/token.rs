//! Authorization code exchange
//!
//! POSTs the code to the token endpoint as a form and decodes the reply.
//! Depending on outcome the provider answers with form pairs, plain JSON or
//! JSONP, so the body shape decides the decoder (see [`crate::response`]).

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{OAuthClient, transport_error};
use crate::error::{Error, Result};
use crate::response::{decode_fields, error_code, scalar_field, status_error};

/// Access token issued by a successful exchange.
///
/// `expires_in` is a delta in seconds from the response time; `0` when the
/// provider omitted it. The caller owns the token; nothing here stores it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Provider-specific user identifier, when the token response carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl Token {
    /// Wrap an access token obtained elsewhere.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in: 0,
            refresh_token: None,
            uid: None,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("uid", &self.uid)
            .finish()
    }
}

impl OAuthClient {
    /// Exchange an authorization code for an access token.
    ///
    /// Sends `grant_type=authorization_code` with the client credentials,
    /// `code` and `redirect_uri`. Fails with `InvalidArgument` for an empty
    /// code (no request is made), `Network` on transport failure,
    /// `Provider` when the provider rejects the exchange, and
    /// `MalformedResponse` when the body decodes to neither a token nor an
    /// error.
    pub fn exchange_code(&self, code: &str) -> Result<Token> {
        if code.is_empty() {
            return Err(Error::InvalidArgument(
                "authorization code must not be empty".into(),
            ));
        }

        debug!(endpoint = %self.endpoints.token, "exchanging authorization code");
        let response = self
            .http
            .post(self.endpoints.token.as_str())
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose().as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .map_err(|e| transport_error("token exchange request", e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| transport_error("reading token response", e))?;

        parse_token_response(status, &body)
    }
}

/// Turn a token endpoint reply into a `Token` or the error it signals.
///
/// Provider error fields win over the HTTP status: a 400 carrying
/// `{"error":100019,...}` reports `100019`, not `400`.
fn parse_token_response(status: StatusCode, body: &str) -> Result<Token> {
    let decoded = decode_fields(body);

    if let Ok((format, fields)) = &decoded {
        debug!(?format, %status, "decoded token response");
        if let Some(err) = provider_error(fields) {
            if let Error::Provider { code, .. } = &err {
                warn!(%status, code = %code, "token endpoint rejected code exchange");
            }
            return Err(err);
        }
    }

    if !status.is_success() {
        warn!(%status, "token endpoint returned non-success status");
        return Err(status_error(status, body));
    }

    let (_, fields) = decoded?;
    token_from_fields(&fields)
}

fn provider_error(fields: &Map<String, Value>) -> Option<Error> {
    let code = error_code(fields, &["code", "error"])?;
    let message = scalar_field(fields, &["msg", "error_description", "message"]).unwrap_or_default();
    Some(Error::Provider { code, message })
}

fn token_from_fields(fields: &Map<String, Value>) -> Result<Token> {
    let access_token = scalar_field(fields, &["access_token"])
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            Error::MalformedResponse(
                "token response carries neither access_token nor an error code".into(),
            )
        })?;

    let expires_in = match scalar_field(fields, &["expires_in"]) {
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
            Error::MalformedResponse(format!("expires_in {raw:?} is not an integer: {e}"))
        })?,
        None => {
            debug!("token response has no expires_in");
            0
        }
    };

    Ok(Token {
        access_token,
        expires_in,
        refresh_token: non_empty_field(fields, &["refresh_token"]),
        uid: non_empty_field(fields, &["uid", "openid"]),
    })
}

fn non_empty_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    scalar_field(fields, keys).filter(|v| !v.is_empty())
}
