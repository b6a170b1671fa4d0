//! Application-wide constants

/// Scheme tag prefixed to every issued API key.
pub const API_KEY_SCHEME: &str = "plk_";
/// Length of the clear-text lookup prefix, in hex characters.
pub const API_KEY_PREFIX_LEN: usize = 8;
/// Random bytes in the secret body of an API key.
pub const API_KEY_SECRET_BYTES: usize = 32;
/// Random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;
/// Request header API keys travel in.
pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_REFRESH_TOKEN_TTL_HOURS: i64 = 168;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
