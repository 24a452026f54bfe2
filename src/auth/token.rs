// src/auth/token.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Entropy of an issued staff token.
pub const STAFF_TOKEN_BYTES: usize = 32;

/// New bearer token for a staff account, shown once by `add-staff`.
pub fn new_staff_token() -> String {
    staff_token_from(&mut OsRng, STAFF_TOKEN_BYTES)
}

/// `nbytes` of randomness encoded for an `Authorization` header
/// (URL-safe alphabet, unpadded).
pub fn staff_token_from<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut raw = vec![0u8; nbytes];
    rng.fill_bytes(&mut raw);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&raw)
}

/// Digest stored in `staff.token_hash` and compared on every request.
/// The plain token is never persisted.
pub fn hash_token(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
