//! Money amounts with two decimal places, stored as whole kopecks.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;

/// The maximum number of digits after the decimal point.
pub const DECIMAL_PLACES: u32 = 2;
/// The maximum number of digits in total.
pub const MAX_DIGITS: u32 = 15;

/// The ways an amount typed into a form can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The text is not a decimal number.
    #[error("Enter a number.")]
    NotANumber,

    /// More than [MAX_DIGITS] digits.
    #[error("Ensure that there are no more than 15 digits in total.")]
    TooManyDigits,

    /// More than [DECIMAL_PLACES] digits after the decimal point.
    #[error("Ensure that there are no more than 2 decimal places.")]
    TooManyDecimalPlaces,

    /// More than `MAX_DIGITS - DECIMAL_PLACES` digits before the decimal point.
    #[error("Ensure that there are no more than 13 digits before the decimal point.")]
    TooManyWholeDigits,
}

/// A validated amount of money in roubles.
///
/// The amount never has more than two decimal places, so it converts to a
/// whole number of kopecks without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Validate `value` against the digit limits.
    ///
    /// # Errors
    /// Returns an [AmountError] describing the first limit that `value` breaks.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let scale = value.scale();
        let mantissa_digits = count_digits(value.mantissa().unsigned_abs());

        let (digits, decimals) = if scale == 0 {
            (mantissa_digits, 0)
        } else if scale > mantissa_digits {
            (scale, scale)
        } else {
            (mantissa_digits, scale)
        };
        let whole_digits = digits - decimals;

        if digits > MAX_DIGITS {
            Err(AmountError::TooManyDigits)
        } else if decimals > DECIMAL_PLACES {
            Err(AmountError::TooManyDecimalPlaces)
        } else if whole_digits > MAX_DIGITS - DECIMAL_PLACES {
            Err(AmountError::TooManyWholeDigits)
        } else {
            let mut value = value;
            value.rescale(DECIMAL_PLACES);
            Ok(Self(value))
        }
    }

    /// Create an amount from a whole number of kopecks.
    pub fn from_minor_units(kopecks: i64) -> Self {
        Self(Decimal::new(kopecks, DECIMAL_PLACES))
    }

    /// The amount as a whole number of kopecks.
    pub fn as_minor_units(&self) -> i64 {
        // Validation caps the amount at 15 digits, which always fits in an i64.
        self.0.mantissa() as i64
    }

    /// Format the amount for display in lists, e.g. "1 234 567.80 ₽".
    pub fn format_amount(&self) -> String {
        let kopecks = self.as_minor_units();
        let whole = (kopecks / 100).unsigned_abs();
        let fraction = (kopecks % 100).unsigned_abs();
        let sign = if kopecks < 0 { "-" } else { "" };

        format!("{sign}{}.{fraction:02} ₽", group_thousands(whole))
    }
}

/// Write `number` with a space between each group of three digits.
fn group_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(' ');
        }

        grouped.push(digit);
    }

    grouped
}

fn count_digits(mut number: u128) -> u32 {
    let mut digits = 1;

    while number >= 10 {
        number /= 10;
        digits += 1;
    }

    digits
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| AmountError::NotANumber)?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_minor_units()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Amount::from_minor_units)
    }
}
