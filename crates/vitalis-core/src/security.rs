//! Password hashing and bearer token capabilities.
//!
//! Services receive these as trait objects so tests and deployments can swap
//! the cost parameters or the token source without touching business code.

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Default PBKDF2 iteration count for stored passwords.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing encoded string.
    fn hash(&self, password: &str) -> String;

    /// Check a password against an encoded hash. Malformed hashes never verify.
    fn verify(&self, password: &str, encoded: &str) -> bool;
}

/// Issues opaque bearer tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> String;
}

/// PBKDF2-HMAC-SHA256 with a random salt per password.
///
/// Encoded as `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`. Verification
/// honours the iteration count stored in the hash, so raising the default
/// does not lock out existing accounts.
#[derive(Debug, Clone)]
pub struct Pbkdf2Hasher {
    iterations: u32,
}

impl Pbkdf2Hasher {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
        let mut out = [0u8; HASH_LENGTH];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
        out
    }
}

impl Default for Pbkdf2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Pbkdf2Hasher {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        let derived = Self::derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(derived)
        )
    }

    fn verify(&self, password: &str, encoded: &str) -> bool {
        let parts: Vec<&str> = encoded.split('$').collect();
        let [scheme, iterations, salt, expected] = parts.as_slice() else {
            return false;
        };
        if *scheme != SCHEME {
            return false;
        }
        let (Ok(iterations), Ok(salt), Ok(expected)) = (
            iterations.parse::<u32>(),
            hex::decode(salt),
            hex::decode(expected),
        ) else {
            return false;
        };
        if iterations == 0 || expected.len() != HASH_LENGTH {
            return false;
        }

        let derived = Self::derive(password, &salt, iterations);
        derived.as_slice().ct_eq(expected.as_slice()).into()
    }
}

/// 32 random bytes, URL-safe base64 without padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenIssuer;

impl TokenIssuer for RandomTokenIssuer {
    fn issue(&self) -> String {
        let bytes: [u8; 32] = rand::random();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// SHA-256 hex digest of a bearer token; the only form persisted.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
