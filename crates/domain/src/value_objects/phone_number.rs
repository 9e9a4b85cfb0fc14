//! Phone number value object
//!
//! WhatsApp addresses recipients by their international number written as
//! plain digits (country code included, no `+`). Any formatting the user typed
//! is stripped before validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Minimum number of digits in a valid number
pub const MIN_DIGITS: usize = 10;
/// Maximum number of digits in a valid number (E.164 upper bound)
pub const MAX_DIGITS: usize = 15;

/// A validated phone number consisting of 10-15 ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber {
    digits: String,
}

impl PhoneNumber {
    /// Create a new phone number
    ///
    /// All non-digit characters (`+`, spaces, dashes, parentheses, ...) are
    /// removed first; the remainder must be 10-15 digits long.
    pub fn new(number: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = number.as_ref();
        let digits = Self::normalize(raw);

        if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
            return Err(DomainError::InvalidPhoneNumber(format!(
                "'{raw}' must contain {MIN_DIGITS}-{MAX_DIGITS} digits, found {}",
                digits.len()
            )));
        }

        Ok(Self { digits })
    }

    /// Strip every non-digit character
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(char::is_ascii_digit).collect()
    }

    /// Get the digits
    pub fn as_str(&self) -> &str {
        &self.digits
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.digits
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.digits
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn valid_lengths_accepted(digits in "[0-9]{10,15}") {
            let phone = PhoneNumber::new(&digits).unwrap();
            prop_assert_eq!(phone.as_str(), digits.as_str());
        }

        #[test]
        fn short_numbers_rejected(digits in "[0-9]{0,9}") {
            prop_assert!(PhoneNumber::new(&digits).is_err());
        }

        #[test]
        fn long_numbers_rejected(digits in "[0-9]{16,24}") {
            prop_assert!(PhoneNumber::new(&digits).is_err());
        }

        #[test]
        fn separators_do_not_change_result(
            cc in "[0-9]{1,3}",
            area in "[0-9]{3}",
            number in "[0-9]{7}"
        ) {
            let formatted = format!("+{cc} ({area}) {}-{}", &number[..3], &number[3..]);
            let plain = format!("{cc}{area}{number}");
            let a = PhoneNumber::new(&formatted).unwrap();
            let b = PhoneNumber::new(&plain).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn result_contains_only_digits(input in ".{0,40}") {
            if let Ok(phone) = PhoneNumber::new(&input) {
                prop_assert!(phone.as_str().chars().all(|c| c.is_ascii_digit()));
                prop_assert!((MIN_DIGITS..=MAX_DIGITS).contains(&phone.as_str().len()));
            }
        }
    }
}
