//! Witness generation: config + flags -> Prover.toml

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;
use zknote_config::{IndexEncodingToml, ZknoteConfig};
use zknote_privacy::{DerivedSecrets, FieldHasher, Fr, OwnerKey, parse_field};
use zknote_prover::{
    CircuitSchema, IndexEncoding, NoteWitnessBuilder, NoteWitnessParams, WitnessRecord,
    write_prover_toml,
};

/// Tree, circuit and output flags shared by every witness-producing command
#[derive(Args, Debug, Clone, Default)]
pub struct WitnessArgs {
    /// Output file (default from config: Prover.toml)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Merkle tree depth
    #[arg(long)]
    pub tree_depth: Option<usize>,

    /// Maximum path length accepted by the circuit
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Leaf slot holding the note commitment
    #[arg(long)]
    pub leaf_index: Option<u64>,

    /// Encoding of merkle_path_indices declared by the circuit (native | digit)
    #[arg(long)]
    pub index_encoding: Option<IndexEncoding>,

    /// Emit leaf_index as a circuit input
    #[arg(long)]
    pub include_leaf_index: bool,

    /// Note amount (base 10)
    #[arg(long)]
    pub amount: Option<String>,
}

/// Everything needed to build and write one witness
#[derive(Debug, Clone)]
pub struct WitnessPlan {
    pub params: NoteWitnessParams,
    pub schema: CircuitSchema,
    pub output: PathBuf,
    pub amount: Fr,
}

fn encoding_from_config(encoding: IndexEncodingToml) -> IndexEncoding {
    match encoding {
        IndexEncodingToml::Native => IndexEncoding::Native,
        IndexEncodingToml::Digit => IndexEncoding::Digit,
    }
}

impl WitnessPlan {
    /// Flags override configuration
    pub fn resolve(config: &ZknoteConfig, args: &WitnessArgs) -> Result<Self> {
        let max_depth = args.max_depth.unwrap_or(config.tree.max_depth);
        let tree_depth = args.tree_depth.unwrap_or(config.tree.depth);
        if tree_depth > max_depth {
            bail!("Tree depth {tree_depth} exceeds the circuit maximum depth {max_depth}");
        }
        let encoding = args
            .index_encoding
            .unwrap_or_else(|| encoding_from_config(config.circuit.index_encoding));
        let with_leaf_index = args.include_leaf_index || config.circuit.include_leaf_index;

        let public_recipient = parse_field(&config.circuit.public_recipient)
            .context("Invalid circuit.public_recipient")?;
        let amount_str = args.amount.as_deref().unwrap_or(&config.note.amount);
        let amount = parse_field(amount_str).context("Invalid note amount")?;

        Ok(Self {
            params: NoteWitnessParams {
                tree_depth,
                max_depth,
                leaf_index: args.leaf_index.unwrap_or(config.tree.leaf_index),
                empty_leaf: Fr::from(0u64),
                public_recipient,
            },
            schema: CircuitSchema::note_spend(max_depth, encoding, with_leaf_index),
            output: args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.path)),
            amount,
        })
    }

    /// Render and write the record. Nothing is written if rendering fails.
    pub fn emit(&self, record: &WitnessRecord) -> Result<()> {
        let text = record.to_prover_toml(&self.schema)?;
        write_prover_toml(&self.output, &text)?;

        info!(
            path = %self.output.display(),
            inputs = self.schema.inputs().len(),
            "witness written"
        );
        println!("✅ Wrote witness to {}", self.output.display());
        Ok(())
    }

    /// Witness for explicitly configured note fields
    pub fn run_configured(
        &self,
        hasher: &FieldHasher,
        config: &ZknoteConfig,
    ) -> Result<WitnessRecord> {
        let owner = OwnerKey::from_decimal(&config.note.owner_privkey)
            .context("Invalid note.owner_privkey")?;
        let nonce = parse_field(&config.note.nonce).context("Invalid note.nonce")?;

        let record = NoteWitnessBuilder::new(hasher, self.params.clone())
            .build(self.amount, &owner, nonce)?;
        self.emit(&record)?;
        Ok(record)
    }

    /// Witness for a note whose key and nonce come from a key agreement
    pub fn run_derived(
        &self,
        hasher: &FieldHasher,
        secrets: &DerivedSecrets,
    ) -> Result<WitnessRecord> {
        let record = NoteWitnessBuilder::new(hasher, self.params.clone())
            .build_from_secrets(self.amount, secrets)?;
        self.emit(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use zknote_privacy::field_to_decimal;

    #[test]
    fn test_resolve_defaults() {
        let plan = WitnessPlan::resolve(&ZknoteConfig::default(), &WitnessArgs::default()).unwrap();

        assert_eq!(plan.params, NoteWitnessParams::default());
        assert_eq!(plan.output, PathBuf::from("Prover.toml"));
        assert_eq!(plan.amount, Fr::from(1u64));
        assert_eq!(
            plan.schema,
            CircuitSchema::note_spend(16, IndexEncoding::Native, false)
        );
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = ZknoteConfig::default();
        config.circuit.index_encoding = IndexEncodingToml::Digit;

        let args = WitnessArgs {
            tree_depth: Some(3),
            max_depth: Some(8),
            index_encoding: Some(IndexEncoding::Native),
            include_leaf_index: true,
            amount: Some("42".into()),
            ..WitnessArgs::default()
        };
        let plan = WitnessPlan::resolve(&config, &args).unwrap();

        assert_eq!(plan.params.tree_depth, 3);
        assert_eq!(plan.params.max_depth, 8);
        assert_eq!(plan.amount, Fr::from(42u64));
        assert_eq!(
            plan.schema,
            CircuitSchema::note_spend(8, IndexEncoding::Native, true)
        );
    }

    #[test]
    fn test_tree_deeper_than_circuit_rejected() {
        let args = WitnessArgs {
            tree_depth: Some(20),
            ..WitnessArgs::default()
        };
        let err = WitnessPlan::resolve(&ZknoteConfig::default(), &args).unwrap_err();
        assert!(err.to_string().contains("exceeds the circuit maximum depth 16"));

        let mut config = ZknoteConfig::default();
        config.tree.depth = 17;
        assert!(WitnessPlan::resolve(&config, &WitnessArgs::default()).is_err());
    }

    #[test]
    fn test_bad_amount_rejected() {
        let args = WitnessArgs {
            amount: Some("-5".into()),
            ..WitnessArgs::default()
        };
        assert!(WitnessPlan::resolve(&ZknoteConfig::default(), &args).is_err());
    }

    #[test]
    fn test_run_configured_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = WitnessArgs {
            output: Some(dir.path().join("Prover.toml")),
            ..WitnessArgs::default()
        };
        let config = ZknoteConfig::default();
        let plan = WitnessPlan::resolve(&config, &args).unwrap();
        let hasher = FieldHasher::init().unwrap();

        let record = plan.run_configured(&hasher, &config).unwrap();

        let text = fs::read_to_string(dir.path().join("Prover.toml")).unwrap();
        assert!(text.contains("actual_tree_depth = \"4\""));
        assert!(text.contains(&format!(
            "public_nullifier = \"{}\"",
            field_to_decimal(&record.public_nullifier)
        )));
    }

    #[test]
    fn test_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Prover.toml");
        let args = WitnessArgs {
            output: Some(out.clone()),
            leaf_index: Some(16),
            ..WitnessArgs::default()
        };
        let config = ZknoteConfig::default();
        let plan = WitnessPlan::resolve(&config, &args).unwrap();
        let hasher = FieldHasher::init().unwrap();

        assert!(plan.run_configured(&hasher, &config).is_err());
        assert!(!out.exists());
    }
}
