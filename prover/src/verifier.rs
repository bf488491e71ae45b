//! Solidity verifier generation
//!
//! One-shot transform of a verifying key into an on-chain verifier contract,
//! delegated to the proof-system toolchain. Failures are reported, never
//! retried.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("Verifying key not found: {0}")]
    VerifyingKeyNotFound(PathBuf),

    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Verifier generation failed: {0}")]
    ToolchainFailed(String),

    #[error("Verifier output not found: {0}")]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait VerifierGenerator {
    /// Produce the verifier artifact at `out_path` from the key at `vk_path`
    fn generate(&self, vk_path: &Path, out_path: &Path) -> Result<(), VerifierError>;
}

/// Runs `bb write_solidity_verifier -k <vk> -o <out>`
#[derive(Debug, Clone)]
pub struct BbVerifierGenerator {
    binary: PathBuf,
}

impl BbVerifierGenerator {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for BbVerifierGenerator {
    fn default() -> Self {
        Self::new("bb")
    }
}

impl VerifierGenerator for BbVerifierGenerator {
    fn generate(&self, vk_path: &Path, out_path: &Path) -> Result<(), VerifierError> {
        if !vk_path.is_file() {
            return Err(VerifierError::VerifyingKeyNotFound(vk_path.to_path_buf()));
        }

        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        debug!(
            "Running {} write_solidity_verifier -k {} -o {}",
            self.binary.display(),
            vk_path.display(),
            out_path.display()
        );
        let output = Command::new(&self.binary)
            .arg("write_solidity_verifier")
            .arg("-k")
            .arg(vk_path)
            .arg("-o")
            .arg(out_path)
            .output()
            .map_err(|source| VerifierError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VerifierError::ToolchainFailed(stderr.trim().to_string()));
        }

        if !out_path.exists() {
            return Err(VerifierError::OutputMissing(out_path.to_path_buf()));
        }

        info!("Verifier written to {}", out_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_vk() {
        let dir = tempfile::tempdir().unwrap();
        let generator = BbVerifierGenerator::default();

        let err = generator
            .generate(&dir.path().join("vk"), &dir.path().join("Verifier.sol"))
            .unwrap_err();
        assert!(matches!(err, VerifierError::VerifyingKeyNotFound(_)));
    }

    #[test]
    fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let vk = dir.path().join("vk");
        fs::write(&vk, b"vk").unwrap();

        let generator = BbVerifierGenerator::new(dir.path().join("no-such-bb"));
        let err = generator
            .generate(&vk, &dir.path().join("Verifier.sol"))
            .unwrap_err();
        assert!(matches!(err, VerifierError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_toolchain_failure() {
        let dir = tempfile::tempdir().unwrap();
        let vk = dir.path().join("vk");
        fs::write(&vk, b"vk").unwrap();

        let generator = BbVerifierGenerator::new("false");
        let err = generator
            .generate(&vk, &dir.path().join("out").join("Verifier.sol"))
            .unwrap_err();
        assert!(matches!(err, VerifierError::ToolchainFailed(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let vk = dir.path().join("vk");
        fs::write(&vk, b"vk").unwrap();

        // `true` exits 0 but writes nothing
        let generator = BbVerifierGenerator::new("true");
        let err = generator
            .generate(&vk, &dir.path().join("Verifier.sol"))
            .unwrap_err();
        assert!(matches!(err, VerifierError::OutputMissing(_)));
    }
}
