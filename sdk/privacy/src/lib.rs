//! zknote Privacy SDK
//!
//! Note-based privacy primitives for a single shielded spend.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Sender / Recipient                         │
//! │   X25519 ECDH ──► HKDF-SHA256 ──► (secret, nullifier seed)    │
//! │                                        │                      │
//! │                                        ▼                      │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  Note        │  │  Commitment  │  │  Nullifier          │  │
//! │  │ (amt,pk,nc)  │─►│  Poseidon3   │  │  Poseidon2(sk, nc)  │  │
//! │  └──────────────┘  └──────────────┘  └─────────────────────┘  │
//! │                           │                                   │
//! │                           ▼                                   │
//! │              Fixed-depth Merkle tree (Poseidon2)              │
//! │              root + authentication path                       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All hashing goes through a [`FieldHasher`] obtained from
//! [`FieldHasher::init`].

pub mod commitment;
pub mod field;
pub mod hash;
pub mod merkle;
pub mod note;
pub mod nullifier;
pub mod secrets;

pub use commitment::{Commitment, commit};
pub use field::{
    BN254_FR_MODULUS, FieldRangeError, field_from_be_bytes_reduced, field_to_bytes,
    field_to_decimal, parse_field,
};
pub use hash::{FieldHasher, HashError};
pub use merkle::{
    DEFAULT_TREE_DEPTH, FullTree, MAX_TREE_DEPTH, MerklePath, MerkleTree, PaddedPath,
    TreeCapacityError,
};
pub use note::{Note, OwnerKey, derive_public_value};
pub use nullifier::{Nullifier, derive_nullifier};
pub use secrets::{
    DerivedSecrets, KEY_LENGTH, KeyAgreementError, RecipientKeypair, derive_secrets,
    parse_key_hex, recipient_derive, sender_derive,
};

/// Field element type used throughout
pub use ark_bn254::Fr;
