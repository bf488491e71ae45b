//! Recipient keys and the two halves of the note key agreement

use anyhow::{Context, Result};
use rand::rngs::OsRng;
use tracing::info;
use zknote_privacy::{
    DerivedSecrets, FieldHasher, KEY_LENGTH, RecipientKeypair, field_to_decimal, parse_key_hex,
    recipient_derive, sender_derive,
};

/// Generate and print a recipient key pair
pub fn keygen() -> RecipientKeypair {
    println!("🔐 Generating new X25519 keypair...");
    let keypair = RecipientKeypair::random(&mut OsRng);

    println!("🔑 Public key:  {}", keypair.public_hex());
    println!("🗝️  Private key: {}", keypair.private_hex());
    keypair
}

/// Sender half: agree on secrets with the recipient's public key.
///
/// Returns the ephemeral public key to publish alongside the note.
pub fn send(
    hasher: &FieldHasher,
    recipient_pubkey_hex: &str,
) -> Result<([u8; KEY_LENGTH], DerivedSecrets)> {
    let recipient_pk =
        parse_key_hex(recipient_pubkey_hex).context("Invalid recipient public key")?;
    let (epk, secrets) = sender_derive(&recipient_pk, &mut OsRng)?;

    let tag = secrets.secret_tag(hasher)?;
    info!(tag = %field_to_decimal(&tag), "sender secrets derived");
    println!("📤 Ephemeral public key: {}", hex::encode(epk));
    println!("🏷️  Secret tag: {}", field_to_decimal(&tag));

    Ok((epk, secrets))
}

/// Recipient half: recompute the sender's secrets
pub fn receive(
    hasher: &FieldHasher,
    ephemeral_pubkey_hex: &str,
    private_key_hex: &str,
) -> Result<DerivedSecrets> {
    let epk = parse_key_hex(ephemeral_pubkey_hex).context("Invalid ephemeral public key")?;
    let sk = parse_key_hex(private_key_hex).context("Invalid recipient private key")?;
    let secrets = recipient_derive(&sk, &epk)?;

    let tag = secrets.secret_tag(hasher)?;
    info!(tag = %field_to_decimal(&tag), "recipient secrets derived");
    println!("🏷️  Secret tag: {}", field_to_decimal(&tag));

    Ok(secrets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_receive_roundtrip() {
        let hasher = FieldHasher::init().unwrap();
        let keypair = keygen();

        let (epk, sent) = send(&hasher, &keypair.public_hex()).unwrap();
        let received = receive(&hasher, &hex::encode(epk), &keypair.private_hex()).unwrap();

        assert_eq!(sent, received, "both halves must derive identical secrets");
        assert_eq!(
            sent.secret_tag(&hasher).unwrap(),
            received.secret_tag(&hasher).unwrap()
        );
    }

    #[test]
    fn test_bad_keys_rejected() {
        let hasher = FieldHasher::init().unwrap();

        assert!(send(&hasher, "zz").is_err());
        assert!(send(&hasher, "00ff").is_err());

        let keypair = keygen();
        // All-zero public key is a low-order point
        let zero_pk = "00".repeat(KEY_LENGTH);
        assert!(receive(&hasher, &zero_pk, &keypair.private_hex()).is_err());
    }
}
