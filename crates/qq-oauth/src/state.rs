//! Anti-forgery `state` values
//!
//! The authorization server echoes `state` back on the redirect. The host
//! stores the value it generated (usually in the user's session) and
//! rejects callbacks whose `state` does not match.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

/// Generate a cryptographically random `state` value.
///
/// 32 random bytes encoded as URL-safe base64 without padding (43 chars),
/// so the value survives query-string round trips unchanged.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
