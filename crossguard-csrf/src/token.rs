//! Salt and token derivation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Capability interface for the token lifecycle.
///
/// A generator owns the server-wide secret and turns a per-session salt into
/// a presentable token. Derivation is a pure function: for a fixed salt and
/// secret it yields the same token in every process, so tokens issued by one
/// server instance validate on any other instance sharing the secret.
///
/// Alternate schemes (keyed MACs, expiring tokens) can be substituted for the
/// built-in generators as long as they keep `derive` deterministic and
/// one-way.
pub trait TokenGenerator: Send + Sync {
    /// Fresh high-entropy salt for a session. Salts must be unguessable;
    /// a predictable salt is a direct token-forgery vector.
    fn new_salt(&self) -> String;

    /// Token for the given salt. Never fails; stable across processes
    /// sharing the same secret.
    fn derive(&self, salt: &str) -> String;

    /// Compare the expected token against a client-supplied one.
    ///
    /// Constant-time over the token bytes. An empty supplied token never
    /// matches.
    fn validate(&self, expected: &str, supplied: &str) -> bool {
        if supplied.is_empty() {
            return false;
        }
        expected.as_bytes().ct_eq(supplied.as_bytes()).into()
    }
}

/// 32 bytes from the thread-local CSPRNG, URL-safe base64.
fn random_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Default generator: SHA-256 over the salt and the server secret.
#[derive(Clone)]
pub struct DefaultTokenGenerator {
    secret: String,
}

impl DefaultTokenGenerator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl TokenGenerator for DefaultTokenGenerator {
    fn new_salt(&self) -> String {
        random_salt()
    }

    fn derive(&self, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"-");
        hasher.update(self.secret.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// HMAC-SHA256 generator for deployments that prefer a keyed MAC over a
/// plain digest.
#[derive(Clone)]
pub struct HmacTokenGenerator {
    secret: String,
}

impl HmacTokenGenerator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl TokenGenerator for HmacTokenGenerator {
    fn new_salt(&self) -> String {
        random_salt()
    }

    fn derive(&self, salt: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(salt.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let generator = DefaultTokenGenerator::new("s3cr3t");
        assert_eq!(generator.derive("abc123"), generator.derive("abc123"));
    }

    #[test]
    fn test_instances_sharing_a_secret_agree() {
        let a = DefaultTokenGenerator::new("s3cr3t");
        let b = DefaultTokenGenerator::new("s3cr3t");
        assert_eq!(a.derive("abc123"), b.derive("abc123"));
    }

    #[test]
    fn test_distinct_salts_give_distinct_tokens() {
        let generator = DefaultTokenGenerator::new("s3cr3t");
        assert_ne!(generator.derive("abc123"), generator.derive("xyz999"));
    }

    #[test]
    fn test_distinct_secrets_give_distinct_tokens() {
        let a = DefaultTokenGenerator::new("s3cr3t");
        let b = DefaultTokenGenerator::new("other");
        assert_ne!(a.derive("abc123"), b.derive("abc123"));
    }

    #[test]
    fn test_salts_are_unique_and_long() {
        let generator = DefaultTokenGenerator::new("s3cr3t");
        let salt = generator.new_salt();

        // 32 random bytes -> 43 chars of unpadded base64
        assert_eq!(salt.len(), 43);
        assert_ne!(salt, generator.new_salt());
    }

    #[test]
    fn test_validate_matches_only_exactly() {
        let generator = DefaultTokenGenerator::new("s3cr3t");
        let token = generator.derive("abc123");

        assert!(generator.validate(&token, &token));
        assert!(!generator.validate(&token, &generator.derive("xyz999")));
        assert!(!generator.validate(&token, &token[..token.len() - 1]));
        assert!(!generator.validate(&token, ""));
    }

    #[test]
    fn test_hmac_generator_is_deterministic() {
        let a = HmacTokenGenerator::new("s3cr3t");
        let b = HmacTokenGenerator::new("s3cr3t");
        assert_eq!(a.derive("abc123"), b.derive("abc123"));
    }

    #[test]
    fn test_hmac_and_default_schemes_differ() {
        let hashed = DefaultTokenGenerator::new("s3cr3t");
        let keyed = HmacTokenGenerator::new("s3cr3t");
        assert_ne!(hashed.derive("abc123"), keyed.derive("abc123"));
    }
}
