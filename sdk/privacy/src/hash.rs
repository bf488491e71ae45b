//! Poseidon Hash
//!
//! circomlib-compatible Poseidon over the BN254 scalar field.
//!
//! ```text
//! owner_pk   = Poseidon(owner_sk)                 arity 1
//! node       = Poseidon(left, right)              arity 2
//! nullifier  = Poseidon(owner_sk, nonce)          arity 2
//! commitment = Poseidon(amount, owner_pk, nonce)  arity 3
//! ```
//!
//! IMPORTANT: the note circuit implements the identical hash. Every call site
//! goes through [`FieldHasher`] so no other hash family can slip in.

use std::fmt;
use std::sync::Mutex;

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonError, PoseidonHasher};
use thiserror::Error;
use tracing::debug;

use crate::field::{field_to_decimal, parse_field};

/// Known answers from circomlibjs `poseidon([1])`, `poseidon([1, 2])` and
/// `poseidon([1, 1, 1])`
const KNOWN_ANSWERS: [(&[u64], &str); 3] = [
    (
        &[1],
        "18586133768512220936620570745912940619677854269274689475585506675881198879027",
    ),
    (
        &[1, 2],
        "7853200120776062878684798364095072458815029376092732009249414926327459813530",
    ),
    (
        &[1, 1, 1],
        "1243904711429961858774220647610724273798918457991486031567244100767259239747",
    ),
];

/// Largest arity in use (commitments)
const MAX_ARITY: usize = 3;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("poseidon parameters unavailable: {0}")]
    Poseidon(#[from] PoseidonError),

    #[error("poseidon self-test failed for arity {arity}: expected {expected}, got {actual}")]
    SelfTest {
        arity: usize,
        expected: String,
        actual: String,
    },

    #[error("no poseidon instance for arity {0}")]
    Arity(usize),

    #[error("poseidon state lock poisoned")]
    Poisoned,
}

/// Ready-to-use Poseidon handle.
///
/// Built once at start-up by [`FieldHasher::init`], which loads the circom
/// parameters for every arity and runs a known-answer check; afterwards it is
/// passed by reference to every component that hashes.
pub struct FieldHasher {
    /// One instance per arity, `poseidon[n - 1]` hashes `n` inputs
    poseidon: [Mutex<Poseidon<Fr>>; MAX_ARITY],
}

impl fmt::Debug for FieldHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHasher")
            .field("arities", &(1..=MAX_ARITY))
            .finish()
    }
}

impl FieldHasher {
    /// Load parameters for every arity in use and check bit-exactness.
    pub fn init() -> Result<Self, HashError> {
        let hasher = Self {
            poseidon: [
                Mutex::new(Poseidon::<Fr>::new_circom(1)?),
                Mutex::new(Poseidon::<Fr>::new_circom(2)?),
                Mutex::new(Poseidon::<Fr>::new_circom(3)?),
            ],
        };

        for (inputs, expected) in KNOWN_ANSWERS {
            let inputs: Vec<Fr> = inputs.iter().map(|v| Fr::from(*v)).collect();
            let actual = hasher.hash_slice(&inputs)?;
            let mismatch = || HashError::SelfTest {
                arity: inputs.len(),
                expected: expected.to_string(),
                actual: field_to_decimal(&actual),
            };
            if parse_field(expected).map_err(|_| mismatch())? != actual {
                return Err(mismatch());
            }
        }

        debug!("poseidon parameters loaded, self-test passed");
        Ok(hasher)
    }

    /// Poseidon with one input (owner public value)
    pub fn hash1(&self, input: Fr) -> Result<Fr, HashError> {
        self.hash_slice(&[input])
    }

    /// Poseidon with two inputs (tree nodes, nullifiers)
    pub fn hash2(&self, left: Fr, right: Fr) -> Result<Fr, HashError> {
        self.hash_slice(&[left, right])
    }

    /// Poseidon with three inputs (note commitments)
    pub fn hash3(&self, a: Fr, b: Fr, c: Fr) -> Result<Fr, HashError> {
        self.hash_slice(&[a, b, c])
    }

    fn hash_slice(&self, inputs: &[Fr]) -> Result<Fr, HashError> {
        let slot = inputs
            .len()
            .checked_sub(1)
            .and_then(|i| self.poseidon.get(i))
            .ok_or(HashError::Arity(inputs.len()))?;
        let mut poseidon = slot.lock().map_err(|_| HashError::Poisoned)?;
        Ok(poseidon.hash(inputs)?)
    }
}
