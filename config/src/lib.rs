//! zknote Configuration
//!
//! Handles loading configuration from:
//! 1. ZKNOTE_CONFIG env var (explicit path)
//! 2. ./zknote.toml (current directory)
//! 3. ~/.zknote/zknote.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "zknote.toml";
const CONFIG_DIR_NAME: &str = ".zknote";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_TREE_DEPTH: usize = 4;
const DEFAULT_MAX_DEPTH: usize = 16;
const DEFAULT_LEAF_INDEX: u64 = 5;

const DEFAULT_AMOUNT: &str = "1";
const DEFAULT_NONCE: &str = "123456";
const DEFAULT_OWNER_PRIVKEY: &str = "987654321";
const DEFAULT_PUBLIC_RECIPIENT: &str = "999999";

const DEFAULT_OUTPUT_PATH: &str = "Prover.toml";

const DEFAULT_BB_BINARY: &str = "bb";
const DEFAULT_VK_PATH: &str = "target/vk";
const DEFAULT_VERIFIER_OUT: &str = "target/Verifier.sol";

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZknoteConfig {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub note: NoteConfig,
    #[serde(default)]
    pub circuit: CircuitConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
}

/// Merkle tree shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeConfig {
    #[serde(default = "default_tree_depth")]
    pub depth: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_leaf_index")]
    pub leaf_index: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_TREE_DEPTH,
            max_depth: DEFAULT_MAX_DEPTH,
            leaf_index: DEFAULT_LEAF_INDEX,
        }
    }
}

fn default_tree_depth() -> usize {
    DEFAULT_TREE_DEPTH
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_leaf_index() -> u64 {
    DEFAULT_LEAF_INDEX
}

/// Note fields as base-10 strings (field elements may exceed u64)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteConfig {
    #[serde(default = "default_amount")]
    pub amount: String,
    #[serde(default = "default_nonce")]
    pub nonce: String,
    #[serde(default = "default_owner_privkey")]
    pub owner_privkey: String,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT.into(),
            nonce: DEFAULT_NONCE.into(),
            owner_privkey: DEFAULT_OWNER_PRIVKEY.into(),
        }
    }
}

fn default_amount() -> String {
    DEFAULT_AMOUNT.into()
}
fn default_nonce() -> String {
    DEFAULT_NONCE.into()
}
fn default_owner_privkey() -> String {
    DEFAULT_OWNER_PRIVKEY.into()
}

/// Boolean encoding of `merkle_path_indices` for TOML config
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexEncodingToml {
    #[default]
    Native,
    Digit,
}

impl std::str::FromStr for IndexEncodingToml {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "digit" => Ok(Self::Digit),
            other => Err(format!("unknown index encoding: {other}")),
        }
    }
}

/// Declared inputs of the consuming circuit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircuitConfig {
    #[serde(default)]
    pub index_encoding: IndexEncodingToml,
    #[serde(default)]
    pub include_leaf_index: bool,
    #[serde(default = "default_public_recipient")]
    pub public_recipient: String,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            index_encoding: IndexEncodingToml::Native,
            include_leaf_index: false,
            public_recipient: DEFAULT_PUBLIC_RECIPIENT.into(),
        }
    }
}

fn default_public_recipient() -> String {
    DEFAULT_PUBLIC_RECIPIENT.into()
}

/// Witness file location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.into(),
        }
    }
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.into()
}

/// Solidity verifier generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifierConfig {
    #[serde(default = "default_bb_binary")]
    pub bb_binary: String,
    #[serde(default = "default_vk_path")]
    pub vk_path: String,
    #[serde(default = "default_verifier_out")]
    pub out_path: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            bb_binary: DEFAULT_BB_BINARY.into(),
            vk_path: DEFAULT_VK_PATH.into(),
            out_path: DEFAULT_VERIFIER_OUT.into(),
        }
    }
}

fn default_bb_binary() -> String {
    DEFAULT_BB_BINARY.into()
}
fn default_vk_path() -> String {
    DEFAULT_VK_PATH.into()
}
fn default_verifier_out() -> String {
    DEFAULT_VERIFIER_OUT.into()
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(lookup: &impl Fn(&str) -> Option<String>, key: &str, field: &mut String) {
    if let Some(v) = lookup(key) {
        *field = v;
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &mut T,
) {
    if let Some(parsed) = lookup(key).and_then(|v| v.parse().ok()) {
        *field = parsed;
    } else if lookup(key).is_some() {
        log::warn!("Ignoring unparseable value for {}", key);
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl ZknoteConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::parse_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check ZKNOTE_CONFIG env var
        if let Ok(path) = env::var("ZKNOTE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("ZKNOTE_CONFIG points to missing file: {}", path.display());
        }

        // 2. Check ./zknote.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.zknote/zknote.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from any key/value source
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Tree
        env_parse(&lookup, "ZKNOTE_TREE_DEPTH", &mut self.tree.depth);
        env_parse(&lookup, "ZKNOTE_MAX_DEPTH", &mut self.tree.max_depth);
        env_parse(&lookup, "ZKNOTE_LEAF_INDEX", &mut self.tree.leaf_index);

        // Circuit
        env_parse(&lookup, "ZKNOTE_INDEX_ENCODING", &mut self.circuit.index_encoding);
        env_string(&lookup, "ZKNOTE_RECIPIENT", &mut self.circuit.public_recipient);

        // Output
        env_string(&lookup, "ZKNOTE_OUTPUT", &mut self.output.path);

        // Verifier
        env_string(&lookup, "ZKNOTE_BB", &mut self.verifier.bb_binary);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
