//! Secret Derivation
//!
//! Derives the note secrets from an X25519 key agreement.
//!
//! ```text
//! Flow:
//! 1. Sender generates ephemeral keypair (epk, esk)
//! 2. Shared secret = X25519(esk, recipient_pk)
//! 3. prk = HMAC-SHA256(salt = 0^32, shared)
//! 4. secret         = HKDF-Expand(prk, "string1", 32)
//!    nullifier_seed = HKDF-Expand(prk, "string2", 32)
//! 5. Sender publishes epk only
//! 6. Recipient recomputes shared = X25519(recipient_sk, epk)
//! ```

use std::fmt;

use ark_bn254::Fr;
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use thiserror::Error;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::field::field_from_be_bytes_reduced;
use crate::hash::{FieldHasher, HashError};

/// X25519 scalar and point size
pub const KEY_LENGTH: usize = 32;

/// Domain separation label for the spending secret
pub const SECRET_LABEL: &[u8] = b"string1";

/// Domain separation label for the nullifier seed
pub const NULLIFIER_LABEL: &[u8] = b"string2";

/// Malformed or degenerate key material
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyAgreementError {
    #[error("invalid hex key encoding: {0}")]
    InvalidHex(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("key agreement produced a low-order (all-zero) shared secret")]
    LowOrderPoint,

    #[error("HKDF expand failed for label {0:?}")]
    Expand(String),
}

/// The two 32-byte outputs of one key agreement
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedSecrets {
    secret: [u8; KEY_LENGTH],
    nullifier_seed: [u8; KEY_LENGTH],
}

impl fmt::Debug for DerivedSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedSecrets").finish_non_exhaustive()
    }
}

impl DerivedSecrets {
    /// Run extract + expand over a raw shared secret.
    pub fn from_shared(shared: &[u8; KEY_LENGTH]) -> Result<Self, KeyAgreementError> {
        if shared.iter().all(|b| *b == 0) {
            return Err(KeyAgreementError::LowOrderPoint);
        }

        let hk = Hkdf::<Sha256>::new(Some(&[0u8; 32]), shared);
        Ok(Self {
            secret: expand(&hk, SECRET_LABEL)?,
            nullifier_seed: expand(&hk, NULLIFIER_LABEL)?,
        })
    }

    /// Spending secret
    pub fn secret(&self) -> &[u8; KEY_LENGTH] {
        &self.secret
    }

    /// Nullifier seed
    pub fn nullifier_seed(&self) -> &[u8; KEY_LENGTH] {
        &self.nullifier_seed
    }

    /// Owner private scalar of the note: the secret reduced into the field
    pub fn owner_scalar(&self) -> Fr {
        field_from_be_bytes_reduced(&self.secret)
    }

    /// Note nonce: the nullifier seed reduced into the field
    pub fn note_nonce(&self) -> Fr {
        field_from_be_bytes_reduced(&self.nullifier_seed)
    }

    /// Tag = Poseidon(secret, nullifier_seed)
    ///
    /// Both parties compute it to confirm they agree without revealing either
    /// secret.
    pub fn secret_tag(&self, hasher: &FieldHasher) -> Result<Fr, HashError> {
        hasher.hash2(self.owner_scalar(), self.note_nonce())
    }
}

fn expand(hk: &Hkdf<Sha256>, label: &[u8]) -> Result<[u8; KEY_LENGTH], KeyAgreementError> {
    let mut out = [0u8; KEY_LENGTH];
    hk.expand(label, &mut out)
        .map_err(|_| KeyAgreementError::Expand(String::from_utf8_lossy(label).into_owned()))?;
    Ok(out)
}

fn to_key_bytes(key: &[u8]) -> Result<[u8; KEY_LENGTH], KeyAgreementError> {
    key.try_into()
        .map_err(|_| KeyAgreementError::InvalidKeyLength {
            expected: KEY_LENGTH,
            actual: key.len(),
        })
}

/// Decode a hex key (optional `0x` prefix) and enforce the X25519 size
pub fn parse_key_hex(encoded: &str) -> Result<[u8; KEY_LENGTH], KeyAgreementError> {
    let trimmed = encoded.trim();
    let hex_str = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_str).map_err(|e| KeyAgreementError::InvalidHex(e.to_string()))?;
    to_key_bytes(&bytes)
}

fn shared_to_secrets(
    shared: x25519_dalek::SharedSecret,
) -> Result<DerivedSecrets, KeyAgreementError> {
    if !shared.was_contributory() {
        return Err(KeyAgreementError::LowOrderPoint);
    }
    DerivedSecrets::from_shared(shared.as_bytes())
}

/// Derive (secret, nullifier_seed) from a local private key and a peer public key
pub fn derive_secrets(
    local_private_key: &[u8],
    peer_public_key: &[u8],
) -> Result<DerivedSecrets, KeyAgreementError> {
    let secret = StaticSecret::from(to_key_bytes(local_private_key)?);
    let peer = PublicKey::from(to_key_bytes(peer_public_key)?);
    shared_to_secrets(secret.diffie_hellman(&peer))
}

/// Sender half: fresh ephemeral key against the recipient's static key.
///
/// Returns the ephemeral public key (to publish) and the derived secrets.
pub fn sender_derive<R: RngCore + CryptoRng>(
    recipient_public_key: &[u8],
    rng: &mut R,
) -> Result<([u8; KEY_LENGTH], DerivedSecrets), KeyAgreementError> {
    let recipient = PublicKey::from(to_key_bytes(recipient_public_key)?);
    let ephemeral_secret = EphemeralSecret::random_from_rng(rng);
    let ephemeral_pk = PublicKey::from(&ephemeral_secret);

    let secrets = shared_to_secrets(ephemeral_secret.diffie_hellman(&recipient))?;
    Ok((*ephemeral_pk.as_bytes(), secrets))
}

/// Recipient half: static private key against the published ephemeral key
pub fn recipient_derive(
    recipient_private_key: &[u8],
    ephemeral_public_key: &[u8],
) -> Result<DerivedSecrets, KeyAgreementError> {
    derive_secrets(recipient_private_key, ephemeral_public_key)
}

/// Long-term X25519 key pair for a note recipient
pub struct RecipientKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl RecipientKeypair {
    /// Generate a random key pair
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = StaticSecret::random_from_rng(rng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Restore from raw private key bytes
    pub fn from_private_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn private_bytes(&self) -> [u8; KEY_LENGTH] {
        self.secret.to_bytes()
    }

    pub fn public_bytes(&self) -> [u8; KEY_LENGTH] {
        *self.public.as_bytes()
    }

    pub fn private_hex(&self) -> String {
        hex::encode(self.private_bytes())
    }

    pub fn public_hex(&self) -> String {
        hex::encode(self.public_bytes())
    }
}

impl fmt::Debug for RecipientKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKeypair")
            .field("public", &self.public_hex())
            .finish_non_exhaustive()
    }
}
