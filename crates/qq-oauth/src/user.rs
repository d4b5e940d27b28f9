//! Profile lookup with an issued access token

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{OAuthClient, transport_error};
use crate::error::{Error, Result};
use crate::response::{error_code, scalar_field, status_error};
use crate::token::Token;

/// Basic profile returned by the user-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "url", default)]
    pub profile_url: String,
}

impl OAuthClient {
    /// Fetch the profile of `uid` using `token`.
    ///
    /// GETs the user-info endpoint with `access_token` and `uid` as query
    /// parameters. Fails with `InvalidArgument` if the token's access token
    /// or `uid` is empty (no request is made). Single attempt, no retry.
    pub fn fetch_user_info(&self, token: &Token, uid: &str) -> Result<UserInfo> {
        if token.access_token.is_empty() {
            return Err(Error::InvalidArgument(
                "token must carry a non-empty access_token".into(),
            ));
        }
        if uid.is_empty() {
            return Err(Error::InvalidArgument("uid must not be empty".into()));
        }

        let mut url = self.endpoints.user_info.clone();
        url.query_pairs_mut()
            .append_pair("access_token", &token.access_token)
            .append_pair("uid", uid);

        debug!(endpoint = %self.endpoints.user_info, uid, "fetching user info");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| transport_error("user info request", e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| transport_error("reading user info response", e))?;

        parse_user_info(status, &body)
    }
}

/// Decode a user-info reply.
///
/// The provider signals failures with an `{"error": .., "error_code": ..}`
/// envelope, sometimes under a 200.
fn parse_user_info(status: StatusCode, body: &str) -> Result<UserInfo> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => return Err(status_error(status, body)),
        Err(e) => {
            return Err(Error::MalformedResponse(format!(
                "user info is not valid JSON: {e}"
            )));
        }
    };

    if let Value::Object(fields) = &value {
        if let Some(code) = error_code(fields, &["error_code", "error"]) {
            let message = scalar_field(fields, &["error", "error_description", "msg"])
                .unwrap_or_default();
            warn!(%status, code = %code, "user info endpoint rejected request");
            return Err(Error::Provider { code, message });
        }
    }

    if !status.is_success() {
        warn!(%status, "user info endpoint returned non-success status");
        return Err(status_error(status, body));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::MalformedResponse(format!("unexpected user info shape: {e}")))
}
