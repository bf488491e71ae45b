//! Note Commitments
//!
//! ```text
//! Commitment = Poseidon(amount, owner_pk, nonce)
//! ```
//!
//! This hides the note contents while allowing ZK proofs of knowledge. The
//! commitment is the leaf inserted into the note tree.

use std::fmt;

use ark_bn254::Fr;

use crate::field::{field_to_bytes, field_to_decimal};
use crate::hash::{FieldHasher, HashError};
use crate::note::Note;

/// A note commitment (one field element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(pub Fr);

impl Commitment {
    /// Convert to field element
    pub fn to_field(&self) -> Fr {
        self.0
    }

    /// 32 little-endian bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        field_to_bytes(&self.0)
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&field_to_decimal(&self.0))
    }
}

/// Commit to a note: C = Poseidon(amount, owner_pk, nonce)
pub fn commit(hasher: &FieldHasher, note: &Note) -> Result<Commitment, HashError> {
    hasher
        .hash3(note.amount, note.owner_public, note.nonce)
        .map(Commitment)
}
