//! Credential material generation and wire shapes.
//!
//! API keys travel as `plk_<prefix><body>`: an 8-hex-char clear prefix used
//! for indexed lookup followed by a 64-hex-char secret body. Refresh tokens
//! are opaque 64-hex-char strings; only their SHA-256 lookup hash is stored.

use rand::Rng;
use sha2::{Digest, Sha256};

use pulselog_shared::constants::{
    API_KEY_PREFIX_LEN, API_KEY_SCHEME, API_KEY_SECRET_BYTES, REFRESH_TOKEN_BYTES,
};

/// Freshly generated API key material. `plaintext` is handed to the caller
/// exactly once; only `prefix` and a one-way hash of `secret` are stored.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    pub prefix: String,
    pub secret: String,
    pub plaintext: String,
}

pub fn generate_api_key() -> GeneratedApiKey {
    let mut rng = rand::rng();
    let prefix = hex::encode(rng.random::<[u8; API_KEY_PREFIX_LEN / 2]>());
    let secret = hex::encode(rng.random::<[u8; API_KEY_SECRET_BYTES]>());
    let plaintext = format!("{API_KEY_SCHEME}{prefix}{secret}");
    GeneratedApiKey {
        prefix,
        secret,
        plaintext,
    }
}

/// Generate a cryptographically random opaque refresh token.
pub fn generate_refresh_token() -> String {
    let mut rng = rand::rng();
    hex::encode(rng.random::<[u8; REFRESH_TOKEN_BYTES]>())
}

/// SHA-256 hash of a raw token, hex-encoded. This is the stored lookup
/// index; the raw token itself is never persisted.
pub fn lookup_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether a presented credential has the API key scheme tag. Anything else
/// is treated as a session credential.
pub fn looks_like_api_key(credential: &str) -> bool {
    credential.starts_with(API_KEY_SCHEME)
}

/// Split a presented API key into `(prefix, secret)`. Returns `None` when
/// the string does not parse into the documented shape.
pub fn parse_api_key(presented: &str) -> Option<(&str, &str)> {
    let rest = presented.strip_prefix(API_KEY_SCHEME)?;
    if rest.len() <= API_KEY_PREFIX_LEN || !rest.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(rest.split_at(API_KEY_PREFIX_LEN))
}

/// Shape check for a presented refresh token.
pub fn is_well_formed_refresh_token(presented: &str) -> bool {
    presented.len() == REFRESH_TOKEN_BYTES * 2
        && presented.bytes().all(|b| b.is_ascii_hexdigit())
}
