//! Field Elements
//!
//! BN254 scalar field helpers shared by notes, the Merkle tree and the
//! witness serializer. Noir/nargo expects Field values as base-10 integers,
//! so every value that leaves this crate goes through [`field_to_decimal`].

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use thiserror::Error;

/// BN254 scalar field modulus (Fr), base 10
pub const BN254_FR_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// A numeric input that cannot be represented as a field element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldRangeError {
    #[error("not a base-10 integer: {0:?}")]
    NotDecimal(String),

    #[error("value {0} is not below the BN254 scalar field modulus")]
    OutOfRange(String),
}

/// The field modulus as an arbitrary-precision integer
pub fn modulus() -> BigUint {
    BigUint::from(Fr::MODULUS)
}

/// Parse a base-10 string into a field element.
///
/// Values are never reduced: anything `>= p` is rejected.
pub fn parse_field(value: &str) -> Result<Fr, FieldRangeError> {
    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldRangeError::NotDecimal(value.to_string()));
    }

    let parsed = BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| FieldRangeError::NotDecimal(value.to_string()))?;
    if parsed >= modulus() {
        return Err(FieldRangeError::OutOfRange(digits.to_string()));
    }

    Ok(Fr::from_le_bytes_mod_order(&parsed.to_bytes_le()))
}

/// Render a field element as a canonical base-10 string ("0" for zero)
pub fn field_to_decimal(value: &Fr) -> String {
    BigUint::from(value.into_bigint()).to_string()
}

/// Interpret 32 bytes as a big-endian integer reduced into the field
pub fn field_from_be_bytes_reduced(bytes: &[u8; 32]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Convert field element to 32 little-endian bytes
pub fn field_to_bytes(value: &Fr) -> [u8; 32] {
    let le_bytes = value.into_bigint().to_bytes_le();
    let mut result = [0u8; 32];
    let len = le_bytes.len().min(32);
    result[..len].copy_from_slice(&le_bytes[..len]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let f = parse_field("987654321").unwrap();
        assert_eq!(f, Fr::from(987654321u64));
        assert_eq!(field_to_decimal(&f), "987654321");
    }

    #[test]
    fn test_zero_renders_as_zero() {
        assert_eq!(field_to_decimal(&Fr::from(0u64)), "0");
        assert_eq!(parse_field("0").unwrap(), Fr::from(0u64));
    }

    #[test]
    fn test_modulus_constant_matches_field() {
        assert_eq!(modulus().to_string(), BN254_FR_MODULUS);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = parse_field(BN254_FR_MODULUS).unwrap_err();
        assert!(matches!(err, FieldRangeError::OutOfRange(_)));

        // p - 1 is the largest valid element
        let max = (modulus() - 1u32).to_string();
        let f = parse_field(&max).unwrap();
        assert_eq!(field_to_decimal(&f), max);
    }

    #[test]
    fn test_non_decimal_rejected() {
        for bad in ["", "0x10", "-1", "12a", "1.5"] {
            assert!(
                matches!(parse_field(bad), Err(FieldRangeError::NotDecimal(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_bytes_reduction() {
        let mut bytes = [0u8; 32];
        bytes[31] = 7;
        assert_eq!(field_from_be_bytes_reduced(&bytes), Fr::from(7u64));

        let le = field_to_bytes(&Fr::from(7u64));
        assert_eq!(le[0], 7);
        assert!(le[1..].iter().all(|b| *b == 0));
    }
}
