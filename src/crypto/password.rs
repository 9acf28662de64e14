//! Salted password credentials.
//!
//! Stored form: `pbkdf2-sha256$<iterations>$<salt>$<hash>` with salt and
//! hash in standard base64. Verification re-derives with the stored
//! iteration count, so raising the default does not lock out old accounts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::CryptoError;

pub const SCHEME: &str = "pbkdf2-sha256";
pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// Hashes new passwords and checks submitted ones against stored credentials.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> String;
    fn verify(&self, password: &str, stored: &str) -> Result<bool, CryptoError>;
}

/// PBKDF2-HMAC-SHA256 with a random per-credential salt.
#[derive(Debug, Clone)]
pub struct Pbkdf2Verifier {
    iterations: u32,
}

impl Pbkdf2Verifier {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Verifier {
    fn default() -> Self {
        Self::new(PBKDF2_ITERATIONS)
    }
}

impl CredentialVerifier for Pbkdf2Verifier {
    fn hash(&self, password: &str) -> String {
        let salt = generate_salt();
        let derived = derive(password, &salt, self.iterations);
        format!(
            "{SCHEME}${}${}${}",
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(derived.as_slice())
        )
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, CryptoError> {
        let parsed = ParsedCredential::parse(stored)?;
        let derived = derive(password, &parsed.salt, parsed.iterations);
        Ok(derived.as_slice().ct_eq(parsed.hash.as_slice()).into())
    }
}

struct ParsedCredential {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl ParsedCredential {
    fn parse(stored: &str) -> Result<Self, CryptoError> {
        let mut parts = stored.split('$');
        let scheme = parts.next().ok_or(CryptoError::MalformedCredential)?;
        if scheme != SCHEME {
            return Err(CryptoError::UnsupportedScheme(scheme.to_string()));
        }

        let iterations = parts
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or(CryptoError::MalformedCredential)?;
        let salt = parts
            .next()
            .and_then(|s| STANDARD.decode(s).ok())
            .ok_or(CryptoError::MalformedCredential)?;
        let hash = parts
            .next()
            .and_then(|s| STANDARD.decode(s).ok())
            .filter(|h| h.len() == HASH_LENGTH)
            .ok_or(CryptoError::MalformedCredential)?;

        if parts.next().is_some() {
            return Err(CryptoError::MalformedCredential);
        }

        Ok(Self {
            iterations,
            salt,
            hash,
        })
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *out);
    out
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
