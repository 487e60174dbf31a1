//! Password verification.

use std::sync::OnceLock;

/// Checks a presented secret against a stored hash.
///
/// Implementations must compare in constant time with respect to the plaintext.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool;

    /// Burn roughly the cost of one `verify` when there is no stored hash.
    ///
    /// Login calls this for unknown emails so both failure paths take the same time.
    fn verify_missing(&self, plaintext: &str) {
        let _ = plaintext;
    }
}

/// bcrypt-backed verifier.
#[derive(Debug)]
pub struct BcryptVerifier {
    cost: u32,
    decoy: OnceLock<Option<String>>,
}

impl BcryptVerifier {
    pub fn new() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Cost for the decoy hash; should match the cost stored hashes use.
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost,
            decoy: OnceLock::new(),
        }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        // A malformed stored hash is a mismatch, not an error.
        bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
    }

    fn verify_missing(&self, plaintext: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| bcrypt::hash("bookly-decoy", self.cost).ok());
        if let Some(decoy) = decoy {
            let _ = bcrypt::verify(plaintext, decoy);
        }
    }
}

/// Hash a password for storage.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, cost)
}
