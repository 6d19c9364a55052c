#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};

use wedlock_kernel_contracts::record::{PrincipalId, RecordKey};

/// Canonical key for the shared record of an unordered principal pair.
///
/// The pair is sorted before hashing, so `derive_record_key(a, b)` and
/// `derive_record_key(b, a)` always agree and either party can look up
/// the record without a central registry. Each id is length-prefixed to
/// keep the encoding injective ("ab"+"c" never collides with "a"+"bc").
pub fn derive_record_key(a: &PrincipalId, b: &PrincipalId) -> RecordKey {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update((lo.as_str().len() as u64).to_be_bytes());
    hasher.update(lo.as_str().as_bytes());
    hasher.update((hi.as_str().len() as u64).to_be_bytes());
    hasher.update(hi.as_str().as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    RecordKey::from_digest_bytes(&digest)
}
