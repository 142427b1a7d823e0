//! One-way commitments standing in for beneficiary PII on the ledger.
//!
//! The ledger stores only these digests; plaintext names, emails and claim
//! codes live in the off-ledger shadow record. Verification re-derives the
//! digest from claimant-supplied plaintext and compares.

use sha2::{Digest, Sha256};

// Domain separation per field so equal strings in different fields
// never produce equal commitments.
const DOMAIN_NAME: &str = "plan:name";
const DOMAIN_EMAIL: &str = "plan:email";
const DOMAIN_RELATIONSHIP: &str = "plan:relationship";
const DOMAIN_CLAIM_CODE: &str = "plan:claim-code";
const DOMAIN_IDENTITY: &str = "plan:identity";

/// Claim codes are fixed-length short secrets
pub const CLAIM_CODE_LEN: usize = 6;

fn digest_hex(domain: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn commit_name(name: &str) -> String {
    digest_hex(DOMAIN_NAME, name.trim())
}

/// Email commitments are case-insensitive so claimants are not rejected
/// over capitalization
pub fn commit_email(email: &str) -> String {
    digest_hex(DOMAIN_EMAIL, &email.trim().to_lowercase())
}

pub fn commit_relationship(relationship: &str) -> String {
    digest_hex(DOMAIN_RELATIONSHIP, relationship.trim())
}

pub fn commit_claim_code(code: &str) -> String {
    digest_hex(DOMAIN_CLAIM_CODE, &code.trim().to_uppercase())
}

/// Whole-record commitment over the three field commitments, stored alongside
/// them so verification matches on the complete identity at once
pub fn combined(name_commitment: &str, email_commitment: &str, relationship_commitment: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_IDENTITY.as_bytes());
    hasher.update(b":");
    hasher.update(name_commitment.as_bytes());
    hasher.update(email_commitment.as_bytes());
    hasher.update(relationship_commitment.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the combined commitment straight from plaintext
pub fn commit_identity(name: &str, email: &str, relationship: &str) -> String {
    combined(
        &commit_name(name),
        &commit_email(email),
        &commit_relationship(relationship),
    )
}
