// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key generation between optional bounds.

use alloc::vec::Vec;
use alloc::{string::ToString, vec};

use crate::error::KeyError;
use crate::key::{
    DIGITS, FractionalIndex, LAST, SMALLEST_INTEGER, ZERO, digit_value, invalid, split_key,
    validate_integer,
};

/// Generate a key strictly between `a` and `b`.
///
/// `None` means unbounded on that side. With both bounds absent the first key
/// (`"a0"`) is returned. Fails when `a >= b`, or when the integer space is
/// exhausted in the requested direction.
pub fn key_between(
    a: Option<&FractionalIndex>,
    b: Option<&FractionalIndex>,
) -> Result<FractionalIndex, KeyError> {
    if let (Some(a), Some(b)) = (a, b)
        && a >= b
    {
        return Err(KeyError::NotOrdered {
            lower: a.as_str().to_string(),
            upper: b.as_str().to_string(),
        });
    }

    let bytes = match (a, b) {
        (None, None) => vec![b'a', ZERO],
        (None, Some(b)) => {
            let (ib, fb) = split_key(b.as_bytes())?;
            if ib == SMALLEST_INTEGER.as_bytes() {
                let mut out = ib.to_vec();
                out.extend(midpoint(&[], Some(fb))?);
                out
            } else if !fb.is_empty() {
                // The bare integer part sorts below any key extending it.
                ib.to_vec()
            } else {
                decrement_integer(ib)?.ok_or(KeyError::Underflow)?
            }
        }
        (Some(a), None) => {
            let (ia, fa) = split_key(a.as_bytes())?;
            match increment_integer(ia)? {
                Some(next) => next,
                None => {
                    let mut out = ia.to_vec();
                    out.extend(midpoint(fa, None)?);
                    out
                }
            }
        }
        (Some(a), Some(b)) => {
            let (ia, fa) = split_key(a.as_bytes())?;
            let (ib, fb) = split_key(b.as_bytes())?;
            if ia == ib {
                let mut out = ia.to_vec();
                out.extend(midpoint(fa, Some(fb))?);
                out
            } else {
                let next = increment_integer(ia)?.ok_or(KeyError::Overflow)?;
                if next.as_slice() < b.as_bytes() {
                    next
                } else {
                    let mut out = ia.to_vec();
                    out.extend(midpoint(fa, None)?);
                    out
                }
            }
        }
    };
    Ok(FractionalIndex::from_generated(bytes))
}

/// Generate `n` increasing keys strictly between `a` and `b`.
///
/// With both bounds present the keys are produced by bisection, so their
/// length grows with `log2(n)` rather than `n`.
pub fn n_keys_between(
    a: Option<&FractionalIndex>,
    b: Option<&FractionalIndex>,
    n: usize,
) -> Result<Vec<FractionalIndex>, KeyError> {
    match n {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![key_between(a, b)?]),
        _ => {}
    }
    match (a, b) {
        (_, None) => {
            let mut out = Vec::with_capacity(n);
            let mut current = key_between(a, None)?;
            for _ in 1..n {
                let next = key_between(Some(&current), None)?;
                out.push(core::mem::replace(&mut current, next));
            }
            out.push(current);
            Ok(out)
        }
        (None, Some(_)) => {
            let mut out = Vec::with_capacity(n);
            let mut current = key_between(None, b)?;
            for _ in 1..n {
                let next = key_between(None, Some(&current))?;
                out.push(core::mem::replace(&mut current, next));
            }
            out.push(current);
            out.reverse();
            Ok(out)
        }
        (Some(_), Some(_)) => {
            let mid = n / 2;
            let pivot = key_between(a, b)?;
            let mut out = n_keys_between(a, Some(&pivot), mid)?;
            let upper = n_keys_between(Some(&pivot), b, n - mid - 1)?;
            out.push(pivot);
            out.extend(upper);
            Ok(out)
        }
    }
}

/// Digit string strictly between two fractions, `b = None` meaning "1.0".
fn midpoint(a: &[u8], b: Option<&[u8]>) -> Result<Vec<u8>, KeyError> {
    if let Some(b) = b
        && a >= b
    {
        return Err(KeyError::NotOrdered {
            lower: alloc::string::String::from_utf8_lossy(a).into_owned(),
            upper: alloc::string::String::from_utf8_lossy(b).into_owned(),
        });
    }
    if a.last() == Some(&ZERO) {
        return Err(invalid(a));
    }
    if let Some(b) = b
        && b.last() == Some(&ZERO)
    {
        return Err(invalid(b));
    }

    if let Some(b) = b {
        // Strip the common prefix, reading `a` as zero-padded.
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(ZERO) == b[n] {
            n += 1;
        }
        if n > 0 {
            let mut out = b[..n].to_vec();
            out.extend(midpoint(a.get(n..).unwrap_or(&[]), Some(&b[n..]))?);
            return Ok(out);
        }
    }

    let digit_a = match a.first() {
        Some(d) => digit_value(*d).ok_or_else(|| invalid(a))?,
        None => 0,
    };
    let digit_b = match b.and_then(<[u8]>::first) {
        Some(d) => digit_value(*d).ok_or_else(|| invalid(b.unwrap_or_default()))?,
        None => DIGITS.len(),
    };

    if digit_b - digit_a > 1 {
        // Round half up.
        let mid = (digit_a + digit_b).div_ceil(2);
        Ok(vec![DIGITS[mid]])
    } else if let Some(b) = b
        && b.len() > 1
    {
        Ok(b[..1].to_vec())
    } else {
        let mut out = vec![DIGITS[digit_a]];
        out.extend(midpoint(a.get(1..).unwrap_or(&[]), None)?);
        Ok(out)
    }
}

/// The next integer, or `None` past the largest one.
fn increment_integer(int: &[u8]) -> Result<Option<Vec<u8>>, KeyError> {
    validate_integer(int)?;
    let head = int[0];
    let mut digits = int[1..].to_vec();
    let mut carry = true;
    for d in digits.iter_mut().rev() {
        let v = digit_value(*d).ok_or_else(|| invalid(int))? + 1;
        if v == DIGITS.len() {
            *d = ZERO;
        } else {
            *d = DIGITS[v];
            carry = false;
            break;
        }
    }
    if !carry {
        let mut out = vec![head];
        out.extend(digits);
        return Ok(Some(out));
    }
    match head {
        b'Z' => Ok(Some(vec![b'a', ZERO])),
        b'z' => Ok(None),
        _ => {
            let next_head = head + 1;
            if next_head > b'a' {
                digits.push(ZERO);
            } else {
                digits.pop();
            }
            let mut out = vec![next_head];
            out.extend(digits);
            Ok(Some(out))
        }
    }
}

/// The previous integer, or `None` below the smallest one.
fn decrement_integer(int: &[u8]) -> Result<Option<Vec<u8>>, KeyError> {
    validate_integer(int)?;
    let head = int[0];
    let mut digits = int[1..].to_vec();
    let mut borrow = true;
    for d in digits.iter_mut().rev() {
        let v = digit_value(*d).ok_or_else(|| invalid(int))?;
        if v == 0 {
            *d = LAST;
        } else {
            *d = DIGITS[v - 1];
            borrow = false;
            break;
        }
    }
    if !borrow {
        let mut out = vec![head];
        out.extend(digits);
        return Ok(Some(out));
    }
    match head {
        b'a' => Ok(Some(vec![b'Z', LAST])),
        b'A' => Ok(None),
        _ => {
            let prev_head = head - 1;
            if prev_head < b'Z' {
                digits.push(LAST);
            } else {
                digits.pop();
            }
            let mut out = vec![prev_head];
            out.extend(digits);
            Ok(Some(out))
        }
    }
}
