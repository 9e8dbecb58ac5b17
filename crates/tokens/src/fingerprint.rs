//! Credential fingerprinting.
//!
//! Refresh credentials are never persisted raw; the session store keeps only
//! this fingerprint. Holding a fingerprint does not let anyone reconstruct or
//! replay the credential, and comparing fingerprints is how the store detects
//! replay of a rotated-out credential.

use sha2::{Digest, Sha256};

/// SHA-256 of the encoded credential, lowercase hex.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_stable_and_input_sensitive() {
        let a = fingerprint("token-a");
        assert_eq!(a, fingerprint("token-a"));
        assert_ne!(a, fingerprint("token-b"));
        assert_eq!(a.len(), 64);
    }
}
