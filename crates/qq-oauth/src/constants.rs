//! Provider endpoints and wire constants
//!
//! Authorization and token exchange go through QQ Connect; the profile
//! lookup uses the provider's `users/show` endpoint.

/// Browser-facing authorization endpoint
pub const AUTHORIZE_ENDPOINT: &str = "https://graph.qq.com/oauth2.0/authorize";

/// Token endpoint for authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://graph.qq.com/oauth2.0/token";

/// Profile lookup endpoint
pub const USER_INFO_ENDPOINT: &str = "https://api.weibo.com/2/users/show.json";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides the configured client secret
pub const CLIENT_SECRET_ENV: &str = "QQ_OAUTH_CLIENT_SECRET";
