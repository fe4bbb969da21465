// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The validated key type and its digit alphabet.

use alloc::string::{String, ToString};
use core::fmt;

use crate::error::KeyError;

/// Base-62 digit alphabet, in ascending order.
pub(crate) const DIGITS: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub(crate) const ZERO: u8 = DIGITS[0];
pub(crate) const LAST: u8 = DIGITS[61];

/// The integer part of the smallest representable integer; it can only be
/// extended by a fraction and is never a valid key on its own.
pub(crate) const SMALLEST_INTEGER: &str = "A00000000000000000000000000";

/// A validated fractional index.
///
/// Ordering is plain byte order of the underlying string, which is the
/// sequence order. Two keys are equal only if they are the same string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FractionalIndex(String);

impl FractionalIndex {
    /// Parse and validate a key.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        validate_key(key.as_bytes())?;
        Ok(Self(key.to_string()))
    }

    /// Wrap bytes produced by the generator, which are valid by construction.
    pub(crate) fn from_generated(bytes: alloc::vec::Vec<u8>) -> Self {
        // Only ASCII digits are ever produced.
        Self(bytes.into_iter().map(char::from).collect())
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for FractionalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for FractionalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for FractionalIndex {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for FractionalIndex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of `d` in [`DIGITS`].
pub(crate) fn digit_value(d: u8) -> Option<usize> {
    match d {
        b'0'..=b'9' => Some(usize::from(d - b'0')),
        b'A'..=b'Z' => Some(usize::from(d - b'A') + 10),
        b'a'..=b'z' => Some(usize::from(d - b'a') + 36),
        _ => None,
    }
}

/// Length of the integer part announced by its head character.
pub(crate) fn integer_len(head: u8) -> Result<usize, KeyError> {
    match head {
        b'a'..=b'z' => Ok(usize::from(head - b'a') + 2),
        b'A'..=b'Z' => Ok(usize::from(b'Z' - head) + 2),
        _ => Err(KeyError::InvalidHead(char::from(head))),
    }
}

/// Split a key into its integer part and its fraction.
pub(crate) fn split_key(key: &[u8]) -> Result<(&[u8], &[u8]), KeyError> {
    let head = *key.first().ok_or(KeyError::Empty)?;
    let len = integer_len(head)?;
    if len > key.len() {
        return Err(invalid(key));
    }
    Ok(key.split_at(len))
}

pub(crate) fn validate_integer(int: &[u8]) -> Result<(), KeyError> {
    let head = *int.first().ok_or(KeyError::Empty)?;
    if int.len() != integer_len(head)? {
        return Err(invalid(int));
    }
    Ok(())
}

fn validate_key(key: &[u8]) -> Result<(), KeyError> {
    if key == SMALLEST_INTEGER.as_bytes() {
        return Err(invalid(key));
    }
    let (int, frac) = split_key(key)?;
    if int[1..].iter().chain(frac).any(|d| digit_value(*d).is_none()) {
        return Err(invalid(key));
    }
    if frac.last() == Some(&ZERO) {
        return Err(invalid(key));
    }
    Ok(())
}

pub(crate) fn invalid(key: &[u8]) -> KeyError {
    KeyError::InvalidKey(String::from_utf8_lossy(key).into_owned())
}
