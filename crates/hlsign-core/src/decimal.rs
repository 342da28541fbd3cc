//! Validated decimal strings for the wire.
//!
//! Prices, sizes and amounts travel as strings. Two spellings of the same
//! number (`"0.010"` vs `"0.01"`) would hash differently, so every value is
//! parsed with `rust_decimal` and re-rendered in normalized form.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Strictly positive decimal rendered as its normalized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireDecimal(Decimal);

impl WireDecimal {
    /// Parse a user-supplied decimal string.
    ///
    /// # Errors
    /// `CoreError::InvalidDecimal` if the string is not a plain decimal or is
    /// not strictly positive.
    pub fn parse(field: &str, raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();
        let value = Decimal::from_str(trimmed)
            .map_err(|e| CoreError::InvalidDecimal(format!("{field}={raw:?}: {e}")))?;
        Self::from_decimal(field, value)
    }

    /// # Errors
    /// `CoreError::InvalidDecimal` if `value <= 0`.
    pub fn from_decimal(field: &str, value: Decimal) -> CoreResult<Self> {
        if value.is_sign_negative() || value.is_zero() {
            return Err(CoreError::InvalidDecimal(format!(
                "{field} must be positive, got {value}"
            )));
        }
        Ok(Self(value.normalize()))
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    /// Wire representation (no trailing fractional zeros).
    pub fn to_wire(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for WireDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for WireDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalizes_trailing_zeros() {
        assert_eq!(WireDecimal::parse("sz", "0.0100").unwrap().to_wire(), "0.01");
        assert_eq!(WireDecimal::parse("px", "50000").unwrap().to_wire(), "50000");
        assert_eq!(WireDecimal::parse("px", "105.00").unwrap().to_wire(), "105");
    }

    #[test]
    fn test_same_value_same_wire() {
        let a = WireDecimal::parse("sz", "1.50").unwrap();
        let b = WireDecimal::from_decimal("sz", dec!(1.5)).unwrap();
        assert_eq!(a.to_wire(), b.to_wire());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            WireDecimal::parse("amount", "12,5"),
            Err(CoreError::InvalidDecimal(_))
        ));
        assert!(WireDecimal::parse("amount", "").is_err());
        assert!(WireDecimal::parse("amount", "abc").is_err());
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(WireDecimal::parse("sz", "0").is_err());
        assert!(WireDecimal::parse("sz", "-1").is_err());
        assert!(WireDecimal::from_decimal("sz", dec!(-0.5)).is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let px = WireDecimal::parse("px", "99.90").unwrap();
        assert_eq!(serde_json::to_string(&px).unwrap(), r#""99.9""#);
    }
}
