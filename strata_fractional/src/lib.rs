// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Fractional: sortable position keys for ordered sequences.
//!
//! A fractional index is a short ASCII string whose byte order is the
//! sequence order. A new key can always be generated strictly between any two
//! existing keys, so inserting or moving an item only re-stamps that item and
//! never renumbers its neighbors. Independent writers that each produce
//! well-ordered keys can later be merged by sorting on the key alone.
//!
//! - [`FractionalIndex`]: a validated key.
//! - [`key_between`]: one key in the open interval between two optional bounds.
//! - [`n_keys_between`]: `n` increasing keys in the same interval, balanced so
//!   that key length grows logarithmically in `n`.
//! - [`KeyError`]: why a key was rejected or no key could be produced.
//!
//! ## Key format
//!
//! Digits are base 62 (`0-9A-Za-z`). A key is an *integer part* followed by an
//! optional *fraction*. The head character of the integer part encodes its
//! length: `a`..`z` are 2..27 characters long (non-negative integers),
//! `A`..`Z` are 27..2 characters long (negative integers). The fraction never
//! ends in `0`, which keeps every key unique for the value it represents.
//!
//! # Example
//!
//! ```rust
//! use strata_fractional::{key_between, n_keys_between};
//!
//! let first = key_between(None, None).unwrap();
//! assert_eq!(first.as_str(), "a0");
//!
//! let after = key_between(Some(&first), None).unwrap();
//! let middle = key_between(Some(&first), Some(&after)).unwrap();
//! assert!(first < middle && middle < after);
//!
//! let run = n_keys_between(Some(&first), Some(&middle), 3).unwrap();
//! assert!(run.windows(2).all(|w| w[0] < w[1]));
//! assert!(first < run[0] && run[2] < middle);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod generate;
mod key;

pub use error::KeyError;
pub use generate::{key_between, n_keys_between};
pub use key::FractionalIndex;
