//! Merkle Tree for Note Commitments
//!
//! Fixed-depth incremental Merkle tree storing note commitments.
//! Used for proving note existence without revealing which note.
//!
//! ```text
//!                    Root
//!                   /    \
//!                 H01    H23
//!                /  \   /   \
//!               H0  H1 H2   H3
//!               |   |   |    |
//!              C0  C1  C2   C3  (Note Commitments)
//! ```
//!
//! Leaves are appended left to right. Unfilled slots hold the empty leaf, and
//! `zeros[i]` is the root of an all-empty subtree of height `i`.
//!
//! Proofs consumed by the circuit come from a [`FullTree`]: every slot is
//! filled before any path is read, so the root cannot move under a proof.

use std::collections::HashMap;

use ark_bn254::Fr;
use thiserror::Error;
use tracing::debug;

use crate::hash::{FieldHasher, HashError};

/// Deepest tree this implementation accepts (2^32 notes)
pub const MAX_TREE_DEPTH: usize = 32;

/// Deployment depth of the note tree (16 leaves)
pub const DEFAULT_TREE_DEPTH: usize = 4;

/// Tree shape errors: capacity, index, or depth mismatches
#[derive(Debug, Error)]
pub enum TreeCapacityError {
    #[error("tree depth {0} is outside 1..={MAX_TREE_DEPTH}")]
    DepthOutOfRange(usize),

    #[error("tree is full ({capacity} leaves)")]
    TreeFull { capacity: u64 },

    #[error("leaf index {index} out of range (capacity {capacity})")]
    IndexOutOfRange { index: u64, capacity: u64 },

    #[error("leaf index {index} was never inserted (next free index {next_index})")]
    NotInserted { index: u64, next_index: u64 },

    #[error("tree depth {depth} exceeds the circuit maximum depth {max_depth}")]
    DepthExceedsCircuit { depth: usize, max_depth: usize },

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// A Merkle path proving inclusion of a leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    /// Sibling hashes from leaf to root
    pub siblings: Vec<Fr>,
    /// Position bits (false = current node is the left child, true = right)
    pub path_indices: Vec<bool>,
    /// The leaf position
    pub leaf_index: u64,
}

impl MerklePath {
    /// Number of levels covered by this path
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Compute root from leaf and authentication path
    pub fn compute_root(&self, hasher: &FieldHasher, leaf: Fr) -> Result<Fr, HashError> {
        let mut current = leaf;

        for (sibling, is_right) in self.siblings.iter().zip(self.path_indices.iter()) {
            current = if *is_right {
                hasher.hash2(*sibling, current)?
            } else {
                hasher.hash2(current, *sibling)?
            };
        }

        Ok(current)
    }

    /// Verify that this path proves inclusion of `leaf` in `root`
    pub fn verify(&self, hasher: &FieldHasher, leaf: Fr, root: Fr) -> Result<bool, HashError> {
        Ok(self.compute_root(hasher, leaf)? == root)
    }

    /// Pad the path to the circuit's fixed depth.
    ///
    /// Extra levels carry `filler` as sibling and "left" as direction; the
    /// circuit stops at `actual_depth`.
    pub fn pad_to(&self, max_depth: usize, filler: Fr) -> Result<PaddedPath, TreeCapacityError> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(TreeCapacityError::DepthExceedsCircuit { depth, max_depth });
        }

        let mut siblings = self.siblings.clone();
        siblings.resize(max_depth, filler);
        let mut path_indices = self.path_indices.clone();
        path_indices.resize(max_depth, false);

        Ok(PaddedPath {
            siblings,
            path_indices,
            actual_depth: depth,
        })
    }
}

/// An authentication path padded to the circuit depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedPath {
    /// Exactly `max_depth` siblings
    pub siblings: Vec<Fr>,
    /// Exactly `max_depth` direction bits
    pub path_indices: Vec<bool>,
    /// Number of real levels at the front
    pub actual_depth: usize,
}

/// Incremental Merkle tree for note commitments
///
/// Stores only the nodes touched by insertions; everything else is an
/// empty-subtree root.
#[derive(Debug)]
pub struct MerkleTree<'h> {
    hasher: &'h FieldHasher,
    depth: usize,
    /// Non-empty nodes: (level, index) -> hash
    nodes: HashMap<(usize, u64), Fr>,
    /// Empty subtree roots, zeros[0] is the empty leaf
    zeros: Vec<Fr>,
    /// Next available leaf position
    next_index: u64,
    /// Current root
    root: Fr,
}

impl<'h> MerkleTree<'h> {
    /// Create a new empty tree of `depth` levels
    pub fn new(
        hasher: &'h FieldHasher,
        depth: usize,
        empty_leaf: Fr,
    ) -> Result<Self, TreeCapacityError> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(TreeCapacityError::DepthOutOfRange(depth));
        }

        let mut zeros = Vec::with_capacity(depth + 1);
        zeros.push(empty_leaf);
        for level in 0..depth {
            let prev = zeros[level];
            zeros.push(hasher.hash2(prev, prev)?);
        }
        let root = zeros[depth];

        Ok(Self {
            hasher,
            depth,
            nodes: HashMap::new(),
            zeros,
            next_index: 0,
            root,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf slots (2^depth)
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    /// Number of inserted leaves
    pub fn len(&self) -> u64 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn is_full(&self) -> bool {
        self.next_index == self.capacity()
    }

    /// Get current root
    pub fn root(&self) -> Fr {
        self.root
    }

    /// The empty leaf value
    pub fn empty_leaf(&self) -> Fr {
        self.zeros[0]
    }

    /// Root of an empty subtree of height `level`
    pub fn zero(&self, level: usize) -> Option<Fr> {
        self.zeros.get(level).copied()
    }

    /// Get leaf at position
    pub fn leaf(&self, index: u64) -> Option<Fr> {
        self.nodes.get(&(0, index)).copied()
    }

    /// Insert a leaf at the next free position and return that position
    pub fn insert(&mut self, leaf: Fr) -> Result<u64, TreeCapacityError> {
        let capacity = self.capacity();
        if self.next_index >= capacity {
            return Err(TreeCapacityError::TreeFull { capacity });
        }

        let position = self.next_index;
        self.nodes.insert((0, position), leaf);

        // Update path to root
        let mut current_index = position;
        let mut current_hash = leaf;

        for level in 0..self.depth {
            let is_right = current_index & 1 == 1;
            let sibling = self.sibling(level, current_index);

            current_hash = if is_right {
                self.hasher.hash2(sibling, current_hash)?
            } else {
                self.hasher.hash2(current_hash, sibling)?
            };
            current_index >>= 1;

            self.nodes.insert((level + 1, current_index), current_hash);
        }

        self.root = current_hash;
        self.next_index += 1;
        Ok(position)
    }

    /// Fill every remaining slot with the empty leaf and seal the tree
    pub fn fill_remaining_with_empty_leaf(mut self) -> Result<FullTree<'h>, TreeCapacityError> {
        let padding = self.capacity() - self.next_index;
        let empty = self.empty_leaf();
        while !self.is_full() {
            self.insert(empty)?;
        }

        debug!(depth = self.depth, padding, "tree filled with empty leaves");
        Ok(FullTree { tree: self })
    }

    /// Get Merkle path for a position
    pub fn proof(&self, index: u64) -> Result<MerklePath, TreeCapacityError> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(TreeCapacityError::IndexOutOfRange { index, capacity });
        }
        if index >= self.next_index {
            return Err(TreeCapacityError::NotInserted {
                index,
                next_index: self.next_index,
            });
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut path_indices = Vec::with_capacity(self.depth);
        let mut current_index = index;

        for level in 0..self.depth {
            path_indices.push(current_index & 1 == 1);
            siblings.push(self.sibling(level, current_index));
            current_index >>= 1;
        }

        Ok(MerklePath {
            siblings,
            path_indices,
            leaf_index: index,
        })
    }

    fn sibling(&self, level: usize, index: u64) -> Fr {
        self.nodes
            .get(&(level, index ^ 1))
            .copied()
            .unwrap_or(self.zeros[level])
    }
}

/// A tree whose every slot has been filled exactly once
#[derive(Debug)]
pub struct FullTree<'h> {
    tree: MerkleTree<'h>,
}

impl<'h> FullTree<'h> {
    /// Build a full tree holding `leaf` at `leaf_index` and the empty leaf
    /// everywhere else
    pub fn with_single_leaf(
        hasher: &'h FieldHasher,
        depth: usize,
        empty_leaf: Fr,
        leaf_index: u64,
        leaf: Fr,
    ) -> Result<Self, TreeCapacityError> {
        let mut tree = MerkleTree::new(hasher, depth, empty_leaf)?;
        let capacity = tree.capacity();
        if leaf_index >= capacity {
            return Err(TreeCapacityError::IndexOutOfRange {
                index: leaf_index,
                capacity,
            });
        }

        while tree.len() < leaf_index {
            tree.insert(empty_leaf)?;
        }
        tree.insert(leaf)?;
        tree.fill_remaining_with_empty_leaf()
    }

    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn capacity(&self) -> u64 {
        self.tree.capacity()
    }

    pub fn leaf(&self, index: u64) -> Option<Fr> {
        self.tree.leaf(index)
    }

    pub fn empty_leaf(&self) -> Fr {
        self.tree.empty_leaf()
    }

    pub fn proof(&self, index: u64) -> Result<MerklePath, TreeCapacityError> {
        self.tree.proof(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero() -> Fr {
        Fr::from(0u64)
    }

    #[test]
    fn test_empty_tree() {
        let hasher = FieldHasher::init().unwrap();
        let tree = MerkleTree::new(&hasher, 4, zero()).unwrap();

        assert_eq!(tree.len(), 0);
        assert_eq!(tree.capacity(), 16);
        // Root should be the empty root
        assert_eq!(Some(tree.root()), tree.zero(4));
    }

    #[test]
    fn test_depth_bounds() {
        let hasher = FieldHasher::init().unwrap();
        assert!(matches!(
            MerkleTree::new(&hasher, 0, zero()),
            Err(TreeCapacityError::DepthOutOfRange(0))
        ));
        assert!(matches!(
            MerkleTree::new(&hasher, 33, zero()),
            Err(TreeCapacityError::DepthOutOfRange(33))
        ));
    }

    #[test]
    fn test_insert_and_path() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 4, zero()).unwrap();

        let c1 = Fr::from(11u64);
        let c2 = Fr::from(22u64);

        assert_eq!(tree.insert(c1).unwrap(), 0);
        assert_eq!(tree.insert(c2).unwrap(), 1);

        // Get and verify paths
        let path1 = tree.proof(0).unwrap();
        assert!(path1.verify(&hasher, c1, tree.root()).unwrap());

        let path2 = tree.proof(1).unwrap();
        assert!(path2.verify(&hasher, c2, tree.root()).unwrap());
        assert_eq!(path2.path_indices, vec![true, false, false, false]);
    }

    #[test]
    fn test_path_invalid_leaf() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 4, zero()).unwrap();
        tree.insert(Fr::from(1u64)).unwrap();

        let path = tree.proof(0).unwrap();
        assert!(!path.verify(&hasher, Fr::from(99u64), tree.root()).unwrap());
    }

    #[test]
    fn test_root_changes() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 4, zero()).unwrap();
        let root0 = tree.root();

        tree.insert(Fr::from(1u64)).unwrap();
        let root1 = tree.root();
        assert_ne!(root0, root1, "root should change after insert");

        tree.insert(Fr::from(2u64)).unwrap();
        assert_ne!(root1, tree.root(), "root should change after each insert");
    }

    #[test]
    fn test_root_matches_bottom_up_rebuild() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 3, zero()).unwrap();
        let leaves: Vec<Fr> = (1..=8u64).map(Fr::from).collect();
        for leaf in &leaves {
            tree.insert(*leaf).unwrap();
        }

        let mut level = leaves;
        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| hasher.hash2(pair[0], pair[1]).unwrap())
                .collect();
        }
        assert_eq!(tree.root(), level[0]);
    }

    #[test]
    fn test_tree_full() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 4, zero()).unwrap();
        for i in 0..16u64 {
            tree.insert(Fr::from(i)).unwrap();
        }
        assert!(tree.is_full());

        let err = tree.insert(Fr::from(17u64)).unwrap_err();
        assert!(matches!(err, TreeCapacityError::TreeFull { capacity: 16 }));
    }

    #[test]
    fn test_proof_index_checks() {
        let hasher = FieldHasher::init().unwrap();
        let mut tree = MerkleTree::new(&hasher, 4, zero()).unwrap();
        tree.insert(Fr::from(1u64)).unwrap();

        assert!(matches!(
            tree.proof(3),
            Err(TreeCapacityError::NotInserted {
                index: 3,
                next_index: 1
            })
        ));

        let full = tree.fill_remaining_with_empty_leaf().unwrap();
        assert!(matches!(
            full.proof(16),
            Err(TreeCapacityError::IndexOutOfRange {
                index: 16,
                capacity: 16
            })
        ));
    }

    #[test]
    fn test_every_proof_verifies_in_full_tree() {
        let hasher = FieldHasher::init().unwrap();
        let full = FullTree::with_single_leaf(&hasher, 4, zero(), 5, Fr::from(77u64)).unwrap();

        for index in 0..full.capacity() {
            let leaf = full.leaf(index).unwrap();
            let path = full.proof(index).unwrap();
            assert!(
                path.verify(&hasher, leaf, full.root()).unwrap(),
                "proof for leaf {index} should verify"
            );
        }
    }

    #[test]
    fn test_single_leaf_placement() {
        let hasher = FieldHasher::init().unwrap();
        let full = FullTree::with_single_leaf(&hasher, 4, zero(), 5, Fr::from(77u64)).unwrap();

        assert_eq!(full.leaf(5), Some(Fr::from(77u64)));
        assert_eq!(full.leaf(4), Some(zero()));
        assert_eq!(full.leaf(15), Some(zero()));

        // 5 = 0b0101 -> right, left, right, left
        let path = full.proof(5).unwrap();
        assert_eq!(path.path_indices, vec![true, false, true, false]);

        assert!(matches!(
            FullTree::with_single_leaf(&hasher, 4, zero(), 16, Fr::from(1u64)),
            Err(TreeCapacityError::IndexOutOfRange { index: 16, .. })
        ));
    }

    #[test]
    fn test_padding() {
        let hasher = FieldHasher::init().unwrap();
        let full = FullTree::with_single_leaf(&hasher, 4, zero(), 5, Fr::from(77u64)).unwrap();
        let path = full.proof(5).unwrap();

        let padded = path.pad_to(16, zero()).unwrap();
        assert_eq!(padded.actual_depth, 4);
        assert_eq!(padded.siblings.len(), 16);
        assert_eq!(padded.path_indices.len(), 16);
        assert_eq!(&padded.siblings[..4], path.siblings.as_slice());
        assert!(padded.siblings[4..].iter().all(|s| *s == zero()));
        assert!(padded.path_indices[4..].iter().all(|b| !*b));

        assert!(matches!(
            path.pad_to(3, zero()),
            Err(TreeCapacityError::DepthExceedsCircuit {
                depth: 4,
                max_depth: 3
            })
        ));
    }
}
