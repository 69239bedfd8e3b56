use sha2::{Digest, Sha256};

/// Hex SHA-256 of a token; the form under which refresh tokens are stored.
pub fn token_fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
