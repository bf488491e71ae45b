use std::fs;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use thiserror::Error;
use toml::{Table, Value};
use tracing::debug;
use zknote_privacy::{FieldRangeError, HashError, TreeCapacityError, field_to_decimal};

use crate::schema::{CircuitSchema, IndexEncoding, InputKind};

#[derive(Debug, Error)]
pub enum WitnessError {
    #[error(transparent)]
    Hash(#[from] HashError),

    #[error(transparent)]
    Tree(#[from] TreeCapacityError),

    #[error(transparent)]
    Field(#[from] FieldRangeError),

    #[error("schema mismatch for `{field}`: circuit declares {expected}, witness has {found}")]
    SchemaMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("authentication path for leaf {leaf_index} does not reproduce the tree root")]
    PathVerification { leaf_index: u64 },

    #[error("Failed to serialize inputs: {0}")]
    SerializeInputs(#[from] toml::ser::Error),

    #[error("Failed to write {path}: {source}")]
    WriteProverToml {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single typed witness value before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessValue {
    Field(Fr),
    FieldArray(Vec<Fr>),
    BoolArray(Vec<bool>),
}

impl WitnessValue {
    fn describe(&self) -> String {
        match self {
            WitnessValue::Field(_) => "Field".to_string(),
            WitnessValue::FieldArray(v) => format!("[Field; {}]", v.len()),
            WitnessValue::BoolArray(v) => format!("[bool; {}]", v.len()),
        }
    }
}

/// Every private and public input of one note spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessRecord {
    // Private
    pub leaf_index: u64,
    pub actual_tree_depth: usize,
    /// Padded to the circuit depth
    pub merkle_path: Vec<Fr>,
    /// Padded to the circuit depth (true = right child)
    pub merkle_path_indices: Vec<bool>,
    pub note_amount: Fr,
    pub note_nonce: Fr,
    pub note_owner_privkey: Fr,
    pub note_owner_pubkey: Fr,

    // Public
    pub public_merkle_root: Fr,
    pub public_nullifier: Fr,
    pub public_recipient: Fr,
}

impl WitnessRecord {
    /// Look up a witness value by its circuit input name
    pub fn value(&self, name: &str) -> Option<WitnessValue> {
        let value = match name {
            "leaf_index" => WitnessValue::Field(Fr::from(self.leaf_index)),
            "actual_tree_depth" => WitnessValue::Field(Fr::from(self.actual_tree_depth as u64)),
            "merkle_path" => WitnessValue::FieldArray(self.merkle_path.clone()),
            "merkle_path_indices" => WitnessValue::BoolArray(self.merkle_path_indices.clone()),
            "note_amount" => WitnessValue::Field(self.note_amount),
            "note_nonce" => WitnessValue::Field(self.note_nonce),
            "note_owner_privkey" => WitnessValue::Field(self.note_owner_privkey),
            "note_owner_pubkey" => WitnessValue::Field(self.note_owner_pubkey),
            "public_merkle_root" => WitnessValue::Field(self.public_merkle_root),
            "public_nullifier" => WitnessValue::Field(self.public_nullifier),
            "public_recipient" => WitnessValue::Field(self.public_recipient),
            _ => return None,
        };
        Some(value)
    }

    /// Render as Prover.toml for `schema`.
    ///
    /// Every declared input is checked before anything is rendered; keys come
    /// out in schema order. Same record and schema give byte-identical text.
    pub fn to_prover_toml(&self, schema: &CircuitSchema) -> Result<String, WitnessError> {
        let mut table = Table::new();

        for input in schema.inputs() {
            let value = self
                .value(&input.name)
                .ok_or_else(|| WitnessError::SchemaMismatch {
                    field: input.name.clone(),
                    expected: input.kind.to_string(),
                    found: "no such witness".to_string(),
                })?;
            table.insert(input.name.clone(), render(&input.name, input.kind, value)?);
        }

        let toml_content = toml::to_string(&table)?;
        debug!(
            inputs = schema.inputs().len(),
            bytes = toml_content.len(),
            "rendered Prover.toml"
        );
        Ok(toml_content)
    }
}

fn render(name: &str, kind: InputKind, value: WitnessValue) -> Result<Value, WitnessError> {
    let mismatch = |found: &WitnessValue| WitnessError::SchemaMismatch {
        field: name.to_string(),
        expected: kind.to_string(),
        found: found.describe(),
    };

    match (kind, &value) {
        (InputKind::Field, WitnessValue::Field(f)) => Ok(decimal(f)),
        (InputKind::FieldArray(len), WitnessValue::FieldArray(items)) if items.len() == len => {
            Ok(Value::Array(items.iter().map(decimal).collect()))
        }
        (InputKind::BoolArray(len, encoding), WitnessValue::BoolArray(bits))
            if bits.len() == len =>
        {
            Ok(Value::Array(
                bits.iter().map(|bit| encode_bit(*bit, encoding)).collect(),
            ))
        }
        _ => Err(mismatch(&value)),
    }
}

fn decimal(value: &Fr) -> Value {
    Value::String(field_to_decimal(value))
}

fn encode_bit(bit: bool, encoding: IndexEncoding) -> Value {
    match encoding {
        IndexEncoding::Native => Value::Boolean(bit),
        IndexEncoding::Digit => Value::String(if bit { "1" } else { "0" }.to_string()),
    }
}

/// Write rendered inputs to `path`.
///
/// Goes through a sibling temp file and a rename, so the target is either the
/// complete new file or untouched.
pub fn write_prover_toml(path: &Path, contents: &str) -> Result<(), WitnessError> {
    let io_err = |source| WitnessError::WriteProverToml {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents).map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }

    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
