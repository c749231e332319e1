//! CUIT number validation
//!
//! A CUIT is the Argentine tax identifier: 11 digits, optionally separated
//! by dashes, where the last digit is a weighted checksum of the first ten.

use std::fmt;
use std::str::FromStr;

const CHECKSUM_FACTORS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

/// A validated CUIT number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuitNumber {
    original: String,
    simplified: String,
}

impl CuitNumber {
    /// Validate `input`, keeping the caller's formatting in `original` and
    /// the dashes-stripped digits in `simplified`.
    pub fn parse(input: &str) -> Result<Self, CuitValidationError> {
        let simplified: String = input.chars().filter(|c| *c != '-').collect();

        if simplified.trim().is_empty() {
            return Err(CuitValidationError::Empty);
        }

        if !simplified.chars().all(|c| c.is_ascii_digit()) {
            return Err(CuitValidationError::InvalidCharacters);
        }

        if simplified.len() != 11 {
            return Err(CuitValidationError::WrongLength);
        }

        if !verification_digit_is_valid(&simplified) {
            return Err(CuitValidationError::WrongVerificationDigit);
        }

        Ok(Self { original: input.to_string(), simplified })
    }

    /// The value as the caller supplied it, dashes included.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The 11 digits with dashes stripped.
    pub fn simplified(&self) -> &str {
        &self.simplified
    }
}

impl FromStr for CuitNumber {
    type Err = CuitValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CuitNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

fn verification_digit_is_valid(digits: &str) -> bool {
    let digit_at = |i: usize| u32::from(digits.as_bytes()[i] - b'0');

    let accumulated: u32 = CHECKSUM_FACTORS
        .iter()
        .enumerate()
        .map(|(i, factor)| digit_at(i) * factor)
        .sum();

    let mut expected = 11 - (accumulated % 11);
    if expected == 11 {
        expected = 0;
    }

    digit_at(10) == expected
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CuitValidationError {
    #[error("The CUIT number cannot be empty.")]
    Empty,
    #[error("The CUIT number cannot have other characters than numbers and dashes.")]
    InvalidCharacters,
    #[error("The CUIT number must have 11 digits.")]
    WrongLength,
    #[error("The CUIT's verification digit is wrong.")]
    WrongVerificationDigit,
}
