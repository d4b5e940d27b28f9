//! QQ OAuth client library
//!
//! Client side of the provider's OAuth2 authorization-code flow. Holds the
//! registered application's credentials and performs blocking HTTP calls;
//! the host application owns the redirect endpoint and any session or
//! token storage.
//!
//! Flow:
//! 1. Host generates a `state` with `state::generate_state()` and keeps it
//! 2. User is sent to `OAuthClient::build_authorization_url(state)`
//! 3. Host receives `code` + `state` on its redirect endpoint and checks `state`
//! 4. `OAuthClient::exchange_code(code)` returns a `Token`
//! 5. `OAuthClient::fetch_user_info(&token, uid)` returns the `UserInfo`

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
mod response;
pub mod state;
pub mod token;
pub mod user;

#[cfg(test)]
mod test_support;

pub use client::{Endpoints, OAuthClient, OAuthClientBuilder};
pub use config::ClientConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use state::generate_state;
pub use token::Token;
pub use user::UserInfo;
