// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors produced while validating or generating keys.

use alloc::string::String;

use thiserror::Error;

/// Reasons a key is rejected or cannot be generated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key is empty.
    #[error("empty order key")]
    Empty,
    /// The first character does not encode an integer length.
    #[error("invalid order key head: {0:?}")]
    InvalidHead(char),
    /// The key is structurally invalid (too short, bad digit, trailing zero, reserved).
    #[error("invalid order key: {0}")]
    InvalidKey(String),
    /// The lower bound is not strictly below the upper bound.
    #[error("{lower} >= {upper}")]
    NotOrdered {
        /// Requested lower bound.
        lower: String,
        /// Requested upper bound.
        upper: String,
    },
    /// No integer exists below the smallest one.
    #[error("cannot decrement any more")]
    Underflow,
    /// No integer exists above the largest one.
    #[error("cannot increment any more")]
    Overflow,
}
