//! Nullifiers
//!
//! ```text
//! Nullifier = Poseidon(owner_sk, nonce)
//! ```
//!
//! Once a nullifier is published, the corresponding note cannot be spent again.

use std::fmt;

use ark_bn254::Fr;

use crate::field::{field_to_bytes, field_to_decimal};
use crate::hash::{FieldHasher, HashError};

/// A nullifier - unique tag for a spent note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nullifier(pub Fr);

impl Nullifier {
    /// Convert to field element
    pub fn to_field(&self) -> Fr {
        self.0
    }

    /// 32 little-endian bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        field_to_bytes(&self.0)
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&field_to_decimal(&self.0))
    }
}

/// Derive the public nullifier of a note from its owner's private scalar
pub fn derive_nullifier(
    hasher: &FieldHasher,
    owner_private: Fr,
    nonce: Fr,
) -> Result<Nullifier, HashError> {
    hasher.hash2(owner_private, nonce).map(Nullifier)
}
