//! Circuit input schema
//!
//! The consuming circuit declares the name and type of every input. The
//! witness serializer checks each value against this declaration before
//! anything is rendered, so a boolean encoding or array length disagreement
//! is an error rather than a silently broken Prover.toml.

use std::fmt;
use std::str::FromStr;

/// How a boolean array is declared by the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexEncoding {
    /// `[bool; N]`, rendered as `[true, false, ...]`
    #[default]
    Native,
    /// `[u1; N]` / string digits, rendered as `["1", "0", ...]`
    Digit,
}

impl IndexEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexEncoding::Native => "native",
            IndexEncoding::Digit => "digit",
        }
    }
}

impl fmt::Display for IndexEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "bool" => Ok(IndexEncoding::Native),
            "digit" | "string" => Ok(IndexEncoding::Digit),
            other => Err(format!(
                "unknown index encoding {other:?} (expected \"native\" or \"digit\")"
            )),
        }
    }
}

/// Declared type of a single circuit input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Field,
    FieldArray(usize),
    BoolArray(usize, IndexEncoding),
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Field => write!(f, "Field"),
            InputKind::FieldArray(len) => write!(f, "[Field; {len}]"),
            InputKind::BoolArray(len, encoding) => write!(f, "[bool; {len}] ({encoding})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitInput {
    pub name: String,
    pub kind: InputKind,
}

/// Ordered input declaration of a circuit. Prover.toml keys follow this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitSchema {
    inputs: Vec<CircuitInput>,
}

impl CircuitSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an input declaration
    pub fn with(mut self, name: impl Into<String>, kind: InputKind) -> Self {
        self.inputs.push(CircuitInput {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn inputs(&self) -> &[CircuitInput] {
        &self.inputs
    }

    pub fn get(&self, name: &str) -> Option<&CircuitInput> {
        self.inputs.iter().find(|input| input.name == name)
    }

    /// Inputs of the note spend circuit.
    ///
    /// `leaf_index` is only declared by circuits that take the position as a
    /// separate input instead of recovering it from the path bits.
    pub fn note_spend(max_depth: usize, encoding: IndexEncoding, with_leaf_index: bool) -> Self {
        let mut schema = Self::new().with("actual_tree_depth", InputKind::Field);
        if with_leaf_index {
            schema = schema.with("leaf_index", InputKind::Field);
        }

        schema
            .with("merkle_path", InputKind::FieldArray(max_depth))
            .with(
                "merkle_path_indices",
                InputKind::BoolArray(max_depth, encoding),
            )
            .with("note_amount", InputKind::Field)
            .with("note_nonce", InputKind::Field)
            .with("note_owner_privkey", InputKind::Field)
            .with("note_owner_pubkey", InputKind::Field)
            .with("public_merkle_root", InputKind::Field)
            .with("public_nullifier", InputKind::Field)
            .with("public_recipient", InputKind::Field)
    }
}
