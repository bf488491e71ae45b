//! # zknote
//!
//! Derives a shielded note, places its commitment in the note tree and
//! writes the circuit inputs to Prover.toml.
//!
//! ```text
//! keygen   ──► recipient X25519 keypair
//! send     ──► ECDH(ephemeral, recipient_pk) ──► HKDF ──► note ──► Prover.toml
//! receive  ──► ECDH(recipient_sk, epk)       ──► HKDF ──► note ──► Prover.toml
//! witness  ──► configured note fields                  ──► note ──► Prover.toml
//! verifier ──► bb write_solidity_verifier
//! ```

mod keys;
mod witness;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use zknote_config::ZknoteConfig;
use zknote_privacy::FieldHasher;
use zknote_prover::{BbVerifierGenerator, VerifierGenerator};

use witness::{WitnessArgs, WitnessPlan};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "zknote")]
#[command(about = "Shielded note derivation and witness generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (otherwise ZKNOTE_CONFIG, ./zknote.toml, ~/.zknote/zknote.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a recipient X25519 keypair
    Keygen,

    /// Sender side: derive a note for a recipient and write its witness
    Send {
        /// Recipient public key (hex)
        #[arg(long, env = "ZKNOTE_RECIPIENT_PUBKEY")]
        recipient_pubkey: String,

        #[command(flatten)]
        witness: WitnessArgs,
    },

    /// Recipient side: recompute the note from the published ephemeral key
    Receive {
        /// Ephemeral public key published by the sender (hex)
        #[arg(long)]
        ephemeral_pubkey: String,

        /// Recipient private key (hex)
        #[arg(long, env = "ZKNOTE_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        #[command(flatten)]
        witness: WitnessArgs,
    },

    /// Write the witness for the configured note fields
    Witness {
        #[command(flatten)]
        witness: WitnessArgs,
    },

    /// Generate the Solidity verifier from a verifying key
    Verifier {
        /// Verifying key path
        #[arg(long)]
        vk: Option<PathBuf>,

        /// Output contract path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print a sample configuration file
    ConfigSample,
}

fn load_config(path: Option<&PathBuf>) -> Result<ZknoteConfig> {
    match path {
        Some(path) => ZknoteConfig::load_from(path),
        None => ZknoteConfig::load(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zknote=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Keygen => {
            keys::keygen();
        }
        Command::ConfigSample => {
            print!("{}", ZknoteConfig::generate_sample());
        }
        Command::Verifier { vk, out } => {
            let config = load_config(cli.config.as_ref())?;
            let vk = vk.unwrap_or_else(|| PathBuf::from(&config.verifier.vk_path));
            let out = out.unwrap_or_else(|| PathBuf::from(&config.verifier.out_path));

            BbVerifierGenerator::new(&config.verifier.bb_binary)
                .generate(&vk, &out)
                .context("Verifier generation failed")?;
            println!("✅ Wrote verifier to {}", out.display());
        }
        Command::Send {
            recipient_pubkey,
            witness,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let plan = WitnessPlan::resolve(&config, &witness)?;
            let hasher = FieldHasher::init().context("Poseidon initialization failed")?;

            let (_epk, secrets) = keys::send(&hasher, &recipient_pubkey)?;
            plan.run_derived(&hasher, &secrets)?;
        }
        Command::Receive {
            ephemeral_pubkey,
            private_key,
            witness,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let plan = WitnessPlan::resolve(&config, &witness)?;
            let hasher = FieldHasher::init().context("Poseidon initialization failed")?;

            let secrets = keys::receive(&hasher, &ephemeral_pubkey, &private_key)?;
            plan.run_derived(&hasher, &secrets)?;
        }
        Command::Witness { witness } => {
            let config = load_config(cli.config.as_ref())?;
            let plan = WitnessPlan::resolve(&config, &witness)?;
            let hasher = FieldHasher::init().context("Poseidon initialization failed")?;

            let record = plan.run_configured(&hasher, &config)?;
            info!(leaf_index = record.leaf_index, "done");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_witness_flags() {
        let cli = Cli::try_parse_from([
            "zknote",
            "witness",
            "--tree-depth",
            "3",
            "--index-encoding",
            "digit",
            "--include-leaf-index",
        ])
        .unwrap();

        match cli.command {
            Command::Witness { witness } => {
                assert_eq!(witness.tree_depth, Some(3));
                assert_eq!(
                    witness.index_encoding,
                    Some(zknote_prover::IndexEncoding::Digit)
                );
                assert!(witness.include_leaf_index);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_bad_encoding_rejected() {
        assert!(Cli::try_parse_from(["zknote", "witness", "--index-encoding", "yes"]).is_err());
    }
}
