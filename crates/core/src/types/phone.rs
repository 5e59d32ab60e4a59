//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty (after trimming).
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number may only contain digits, spaces, dashes, and a leading +")]
    InvalidCharacter,
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A buyer's phone number, normalised to digits with an optional leading `+`.
///
/// Spaces, dashes, dots, and parentheses are accepted on input and stripped.
/// No country-specific rules are applied; buyers type local (`0811...`) and
/// international (`+62 811...`) numbers alike.
///
/// ```
/// use endulque_core::Phone;
///
/// assert_eq!(Phone::parse("0811-2233-44").unwrap().as_str(), "0811223344");
/// assert_eq!(Phone::parse("+62 811 2233 44").unwrap().as_str(), "+62811223344");
/// assert!(Phone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 4;
    /// Maximum number of digits (E.164 allows 15; leave room for local prefixes).
    pub const MAX_DIGITS: usize = 20;

    /// Parse and normalise a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or other
    /// symbols, or has a digit count outside the allowed range.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (plus, rest) = trimmed
            .strip_prefix('+')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len() + 1);
        if plus {
            digits.push('+');
        }
        for ch in rest.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        let count = digits.len() - usize::from(plus);
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the normalised number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Rows written before normalisation existed are passed through as-is
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
