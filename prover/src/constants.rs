/// Maximum Merkle depth the note circuit accepts.
/// Shorter paths are padded up to this length.
pub const MAX_CIRCUIT_DEPTH: usize = 16;

/// Leaf slot holding the real commitment in the single-note tree
pub const DEFAULT_LEAF_INDEX: u64 = 5;

/// Public recipient identifier bound into the proof
pub const DEFAULT_PUBLIC_RECIPIENT: u64 = 999_999;
