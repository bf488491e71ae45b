//! Shielded Notes
//!
//! A Note represents value held privately in the note tree.
//!
//! ```text
//! Note = {
//!     amount: Fr,    // Amount in the smallest unit
//!     owner_pk: Fr,  // Poseidon(owner_sk)
//!     nonce: Fr,     // Per-note uniqueness, feeds the nullifier
//! }
//! ```

use std::fmt;

use ark_bn254::Fr;

use crate::commitment::{Commitment, commit};
use crate::field::{FieldRangeError, parse_field};
use crate::hash::{FieldHasher, HashError};
use crate::nullifier::{Nullifier, derive_nullifier};
use crate::secrets::DerivedSecrets;

/// A shielded note. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// The amount held in this note
    pub amount: Fr,
    /// Owner public value (who can spend this note)
    pub owner_public: Fr,
    /// Note nonce
    pub nonce: Fr,
}

impl Note {
    pub fn new(amount: Fr, owner_public: Fr, nonce: Fr) -> Self {
        Self {
            amount,
            owner_public,
            nonce,
        }
    }

    /// Create a note from base-10 strings, rejecting values `>= p`
    pub fn from_decimal(
        amount: &str,
        owner_public: &str,
        nonce: &str,
    ) -> Result<Self, FieldRangeError> {
        Ok(Self::new(
            parse_field(amount)?,
            parse_field(owner_public)?,
            parse_field(nonce)?,
        ))
    }

    /// Create a note owned by `owner`
    pub fn for_owner(
        hasher: &FieldHasher,
        amount: Fr,
        owner: &OwnerKey,
        nonce: Fr,
    ) -> Result<Self, HashError> {
        Ok(Self::new(amount, owner.public_value(hasher)?, nonce))
    }

    /// Compute the commitment for this note
    pub fn commitment(&self, hasher: &FieldHasher) -> Result<Commitment, HashError> {
        commit(hasher, self)
    }
}

/// Owner private scalar - allows spending notes
///
/// The public value is a one-way Poseidon image of it.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnerKey {
    private: Fr,
}

impl OwnerKey {
    pub fn new(private: Fr) -> Self {
        Self { private }
    }

    pub fn from_decimal(private: &str) -> Result<Self, FieldRangeError> {
        parse_field(private).map(Self::new)
    }

    /// Owner key taken from a key agreement
    pub fn from_secrets(secrets: &DerivedSecrets) -> Self {
        Self::new(secrets.owner_scalar())
    }

    pub fn private_scalar(&self) -> Fr {
        self.private
    }

    /// owner_pk = Poseidon(owner_sk)
    pub fn public_value(&self, hasher: &FieldHasher) -> Result<Fr, HashError> {
        derive_public_value(hasher, self.private)
    }

    /// Nullifier for one of this owner's notes
    pub fn nullifier(&self, hasher: &FieldHasher, note: &Note) -> Result<Nullifier, HashError> {
        derive_nullifier(hasher, self.private, note.nonce)
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerKey").finish_non_exhaustive()
    }
}

/// owner_pk = Poseidon(owner_sk)
pub fn derive_public_value(hasher: &FieldHasher, owner_private: Fr) -> Result<Fr, HashError> {
    hasher.hash1(owner_private)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BN254_FR_MODULUS;

    #[test]
    fn test_note_commitment() {
        let hasher = FieldHasher::init().unwrap();
        let owner = OwnerKey::new(Fr::from(987654321u64));
        let note = Note::for_owner(&hasher, Fr::from(1u64), &owner, Fr::from(123456u64)).unwrap();

        let c1 = note.commitment(&hasher).unwrap();
        let c2 = note.commitment(&hasher).unwrap();

        assert_eq!(c1, c2, "commitment should be deterministic");
    }

    #[test]
    fn test_owner_public_value_is_poseidon1() {
        let hasher = FieldHasher::init().unwrap();
        let owner = OwnerKey::from_decimal("987654321").unwrap();

        assert_eq!(
            owner.public_value(&hasher).unwrap(),
            hasher.hash1(Fr::from(987654321u64)).unwrap()
        );
    }

    #[test]
    fn test_nullifier_binds_owner_and_nonce() {
        let hasher = FieldHasher::init().unwrap();
        let owner = OwnerKey::new(Fr::from(987654321u64));
        let note = Note::for_owner(&hasher, Fr::from(1u64), &owner, Fr::from(123456u64)).unwrap();

        let nf = owner.nullifier(&hasher, &note).unwrap();
        assert_eq!(
            nf.to_field(),
            hasher
                .hash2(Fr::from(987654321u64), Fr::from(123456u64))
                .unwrap()
        );
    }

    #[test]
    fn test_from_decimal_rejects_out_of_range() {
        let err = Note::from_decimal("1", BN254_FR_MODULUS, "2").unwrap_err();
        assert!(matches!(err, FieldRangeError::OutOfRange(_)));

        assert!(OwnerKey::from_decimal("abc").is_err());
    }

    #[test]
    fn test_owner_from_secrets() {
        let secrets = DerivedSecrets::from_shared(&[9u8; 32]).unwrap();
        let owner = OwnerKey::from_secrets(&secrets);
        assert_eq!(owner.private_scalar(), secrets.owner_scalar());
    }
}
