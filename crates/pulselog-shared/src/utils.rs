//! Utility functions

use crate::constants::{API_KEY_PREFIX_LEN, API_KEY_SCHEME};

/// Mask a presented credential for logging: keep the scheme tag and lookup
/// prefix, hide everything secret.
pub fn mask_credential(credential: &str) -> String {
    if let Some(rest) = credential.strip_prefix(API_KEY_SCHEME) {
        let visible: String = rest.chars().take(API_KEY_PREFIX_LEN).collect();
        format!("{}{}***", API_KEY_SCHEME, visible)
    } else {
        let visible: String = credential.chars().take(4).collect();
        format!("{}***", visible)
    }
}
