//! Claim-code generation, reversible encryption, and the single-use code
//! cache backing short-lived verification flows.
//!
//! Codes are generated per beneficiary, never per plan. The ledger stores
//! only the one-way commitment; the reversible ciphertext stays in the
//! shadow record so the code can be delivered at due time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use subtle::ConstantTimeEq;

use crate::error::CoordinatorError;
use shared::commitment::CLAIM_CODE_LEN;

/// Unambiguous alphabet: no 0/O or 1/I lookalikes
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
const NONCE_LEN: usize = 12;

/// Generate a six-character claim code from the OS secure RNG
pub fn generate_claim_code() -> String {
    let mut rng = OsRng;
    (0..CLAIM_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Authenticated encryption for claim codes at rest in the shadow store.
/// Ciphertext layout is hex(nonce || ct), nonce freshly random per call.
pub struct CodeCipher {
    cipher: ChaCha20Poly1305,
}

impl CodeCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    pub fn encrypt(&self, code: &str) -> Result<String, CoordinatorError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), code.as_bytes())
            .map_err(|_| CoordinatorError::Crypto {})?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(hex::encode(out))
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String, CoordinatorError> {
        let bytes = hex::decode(encrypted).map_err(|_| CoordinatorError::Crypto {})?;
        if bytes.len() <= NONCE_LEN {
            return Err(CoordinatorError::Crypto {});
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CoordinatorError::Crypto {})?;
        String::from_utf8(plaintext).map_err(|_| CoordinatorError::Crypto {})
    }
}

/// Single-use, time-bounded codes tied to a subject key (2FA, nonces).
/// Backed by an external keyed store in production so the contract survives
/// restarts and horizontal scaling; the trait is the contract.
pub trait KeyedCodeStore: Send + Sync {
    fn put(&self, subject: &str, code: &str);

    /// Consume the code for `subject`: true exactly once for a matching,
    /// unexpired code
    fn consume(&self, subject: &str, code: &str) -> bool;
}

/// In-memory TTL cache implementation.
pub struct CodeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl CodeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl KeyedCodeStore for CodeCache {
    fn put(&self, subject: &str, code: &str) {
        let mut entries = self.entries.lock().expect("cache poisoned");
        entries.insert(subject.to_string(), (code.to_string(), Instant::now()));
    }

    fn consume(&self, subject: &str, code: &str) -> bool {
        let mut entries = self.entries.lock().expect("cache poisoned");
        match entries.remove(subject) {
            Some((stored, created)) if created.elapsed() < self.ttl => {
                // Constant-time so the comparison leaks nothing about how
                // much of a guess matched
                bool::from(stored.as_bytes().ct_eq(code.as_bytes()))
            }
            _ => false,
        }
    }
}
