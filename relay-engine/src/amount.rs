use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/*----- */
// Unit scale
/*----- */
// Number of decimals the destination ledger keeps, e.g. 12 for a 10^12 unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScale(u32);

impl UnitScale {
    pub fn new(decimals: u32) -> Self {
        Self(decimals)
    }

    pub fn decimals(&self) -> u32 {
        self.0
    }
}

/*----- */
// Scaled amount
/*----- */
/// Fixed-point amount: a decimal value multiplied by 10^decimals. Conversion
/// truncates toward zero and never rounds; fractional digits past the scale
/// are discarded, so sub-unit amounts vanish to 0.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ScaledAmount(u128);

impl ScaledAmount {
    /// Parse a positive decimal string digit-wise. Parsing through a binary
    /// float first would corrupt values like "0.0031" before scaling.
    pub fn from_decimal_str(value: &str, scale: UnitScale) -> Result<Self, AmountError> {
        let value = value.trim();
        let (int_part, frac_part) = match value.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (value, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Empty);
        }

        let mut scaled: u128 = 0;
        for c in int_part.chars() {
            let digit = c.to_digit(10).ok_or(AmountError::InvalidCharacter(c))? as u128;
            scaled = scaled
                .checked_mul(10)
                .and_then(|value| value.checked_add(digit))
                .ok_or(AmountError::Overflow)?;
        }

        let decimals = scale.decimals() as usize;
        let mut frac_digits: usize = 0;
        for c in frac_part.chars() {
            let digit = c.to_digit(10).ok_or(AmountError::InvalidCharacter(c))? as u128;
            // Digits past the scale are truncated but still have to be valid
            if frac_digits < decimals {
                scaled = scaled
                    .checked_mul(10)
                    .and_then(|value| value.checked_add(digit))
                    .ok_or(AmountError::Overflow)?;
                frac_digits += 1;
            }
        }

        if frac_digits < decimals {
            let padding = 10u128
                .checked_pow((decimals - frac_digits) as u32)
                .ok_or(AmountError::Overflow)?;
            scaled = scaled.checked_mul(padding).ok_or(AmountError::Overflow)?;
        }

        Ok(Self(scaled))
    }

    pub fn value(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Display for ScaledAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
