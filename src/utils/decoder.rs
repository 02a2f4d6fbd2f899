//! Wire decoding helpers
//!
//! Amount fields arrive as decimal strings (sometimes bare numbers). They are
//! parsed straight into `U256` and never pass through `f64`.

use alloy_primitives::U256;
use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;
use std::fmt;

use crate::models::errors::{AppError, AppResult};

/// Parse a decimal-string token amount at full precision
pub fn parse_amount(raw: &str) -> AppResult<U256> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_response("empty amount field"));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|e| AppError::invalid_response(format!("invalid amount {:?}: {}", trimmed, e)))
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Option<U256>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal string or unsigned integer amount")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_amount(v).map(Some).map_err(|e| E::custom(e.message))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(U256::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(|v| Some(U256::from(v)))
            .map_err(|_| E::custom(format!("negative amount {}", v)))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(AmountVisitor)
    }
}

/// `#[serde(deserialize_with)]` for optional amount fields
pub fn deserialize_opt_amount<'de, D>(d: D) -> Result<Option<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_option(AmountVisitor)
}

/// `#[serde(deserialize_with)]` for required amount fields
pub fn deserialize_amount<'de, D>(d: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_opt_amount(d)?.ok_or_else(|| de::Error::custom("missing amount"))
}

/// Amounts go back out as decimal strings, same as the ledger sends them
pub fn serialize_amount<S: Serializer>(amount: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(amount)
}

pub fn serialize_opt_amount<S: Serializer>(amount: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
    match amount {
        Some(a) => s.collect_str(a),
        None => s.serialize_none(),
    }
}

/// Fail fast on empty identifiers before anything is queued
pub fn require_identifier<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_identifier(what));
    }
    Ok(trimmed)
}

/// Short form for logs and alert text: `ABCD…WXYZ`
pub fn short_identity(identity: &str) -> String {
    let chars: Vec<char> = identity.chars().collect();
    if chars.len() <= 10 {
        return identity.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Integer amount divided into display units, converted to f64 only here
pub fn to_display_units(amount: U256, divisor: u64) -> f64 {
    let divisor = U256::from(divisor.max(1));
    let whole = amount / divisor;
    let rem = amount % divisor;
    u256_to_f64(whole) + u256_to_f64(rem) / u256_to_f64(divisor)
}

/// Lossy conversion for presentation values
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0_f64, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_beyond_u64() {
        let big = "340282366920938463463374607431768211456"; // 2^128
        let parsed = parse_amount(big).unwrap();
        assert_eq!(parsed, U256::from(1u8) << 128);
        assert_eq!(parsed.to_string(), big);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("12.5").is_err());
        assert!(parse_amount("-3").is_err());
    }

    #[test]
    fn test_require_identifier() {
        assert_eq!(require_identifier("  ABC ", "identity").unwrap(), "ABC");
        let err = require_identifier("   ", "identity").unwrap_err();
        assert_eq!(err.code_str(), "VALIDATION_MISSING_ID");
    }

    #[test]
    fn test_short_identity() {
        assert_eq!(short_identity("ABCDEFGHIJKLMNOP"), "ABCD…MNOP");
        assert_eq!(short_identity("SHORT"), "SHORT");
    }

    #[test]
    fn test_display_units() {
        assert_eq!(to_display_units(U256::from(2_500_000u64), 1_000_000), 2.5);
        assert_eq!(to_display_units(U256::from(7u64), 0), 7.0);
        assert_eq!(u256_to_f64(U256::from(1u8) << 64), 18_446_744_073_709_551_616.0);
    }
}
