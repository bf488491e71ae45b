//! Witness builder for the note spend circuit
//!
//! Builds witness data for one note: commitment, tree placement, padded
//! authentication path and the public outputs.

use ark_bn254::Fr;
use tracing::info;
use zknote_privacy::{
    DEFAULT_TREE_DEPTH, DerivedSecrets, FieldHasher, FullTree, Note, OwnerKey, TreeCapacityError,
    field_to_decimal,
};

use crate::constants::{DEFAULT_LEAF_INDEX, DEFAULT_PUBLIC_RECIPIENT, MAX_CIRCUIT_DEPTH};
use crate::witness::{WitnessError, WitnessRecord};

/// Tree and circuit shape for one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteWitnessParams {
    /// Deployment tree depth (capacity 2^depth)
    pub tree_depth: usize,
    /// Circuit path length
    pub max_depth: usize,
    /// Slot holding the real commitment
    pub leaf_index: u64,
    /// Value of every other slot, also used as path padding
    pub empty_leaf: Fr,
    pub public_recipient: Fr,
}

impl Default for NoteWitnessParams {
    fn default() -> Self {
        Self {
            tree_depth: DEFAULT_TREE_DEPTH,
            max_depth: MAX_CIRCUIT_DEPTH,
            leaf_index: DEFAULT_LEAF_INDEX,
            empty_leaf: Fr::from(0u64),
            public_recipient: Fr::from(DEFAULT_PUBLIC_RECIPIENT),
        }
    }
}

pub struct NoteWitnessBuilder<'h> {
    hasher: &'h FieldHasher,
    params: NoteWitnessParams,
}

impl<'h> NoteWitnessBuilder<'h> {
    pub fn new(hasher: &'h FieldHasher, params: NoteWitnessParams) -> Self {
        Self { hasher, params }
    }

    pub fn params(&self) -> &NoteWitnessParams {
        &self.params
    }

    /// Build the witness for a note of `amount` owned by `owner`
    pub fn build(
        &self,
        amount: Fr,
        owner: &OwnerKey,
        nonce: Fr,
    ) -> Result<WitnessRecord, WitnessError> {
        let hasher = self.hasher;
        let params = &self.params;

        // Filling 2^depth slots is the expensive part, reject before it
        if params.tree_depth > params.max_depth {
            return Err(TreeCapacityError::DepthExceedsCircuit {
                depth: params.tree_depth,
                max_depth: params.max_depth,
            }
            .into());
        }

        let note = Note::for_owner(hasher, amount, owner, nonce)?;
        let commitment = note.commitment(hasher)?;

        let tree = FullTree::with_single_leaf(
            hasher,
            params.tree_depth,
            params.empty_leaf,
            params.leaf_index,
            commitment.to_field(),
        )?;
        let root = tree.root();

        let path = tree.proof(params.leaf_index)?;
        if !path.verify(hasher, commitment.to_field(), root)? {
            return Err(WitnessError::PathVerification {
                leaf_index: params.leaf_index,
            });
        }
        let padded = path.pad_to(params.max_depth, params.empty_leaf)?;

        let nullifier = owner.nullifier(hasher, &note)?;

        info!(
            commitment = %commitment,
            root = %field_to_decimal(&root),
            leaf_index = params.leaf_index,
            depth = padded.actual_depth,
            "note witness built"
        );

        Ok(WitnessRecord {
            leaf_index: params.leaf_index,
            actual_tree_depth: padded.actual_depth,
            merkle_path: padded.siblings,
            merkle_path_indices: padded.path_indices,
            note_amount: note.amount,
            note_nonce: note.nonce,
            note_owner_privkey: owner.private_scalar(),
            note_owner_pubkey: note.owner_public,
            public_merkle_root: root,
            public_nullifier: nullifier.to_field(),
            public_recipient: params.public_recipient,
        })
    }

    /// Build the witness for a note whose owner key and nonce come from a key
    /// agreement
    pub fn build_from_secrets(
        &self,
        amount: Fr,
        secrets: &DerivedSecrets,
    ) -> Result<WitnessRecord, WitnessError> {
        self.build(amount, &OwnerKey::from_secrets(secrets), secrets.note_nonce())
    }
}
