//! # Prefixed Numeric Strings
//!
//! Extended integer types (`int64`, `int128`) accept their value form as a
//! string carrying an explicit radix prefix:
//!
//! - `0x…`: hexadecimal, two digits per byte.
//! - `b…`: binary, eight digits per byte.
//!
//! Digits are consumed in groups from the *end* of the string, so the first
//! group consumed becomes the lowest-order byte and the output buffer is
//! little-endian. A short leading group (e.g. the `a` in `0xabc`) is
//! zero-extended. Any other prefix is rejected with
//! [`RadixError::UnsupportedRadix`].
//!
//! The reverse direction, [`encode_trimmed_hex`], renders a little-endian
//! buffer as a `0x` string with high-order zero bytes removed.

use crate::error::RadixError;

/// Decode a `0x`/`b` prefixed numeric string into a little-endian byte buffer
/// just large enough to hold every digit group.
///
/// # Errors
///
/// - [`RadixError::UnsupportedRadix`] if the prefix is neither `0x` nor `b`.
/// - [`RadixError::Empty`] if no digits follow the prefix.
/// - [`RadixError::InvalidDigit`] if a digit is outside the radix.
pub fn decode_prefixed(input: &str) -> Result<Vec<u8>, RadixError> {
    let (digits, radix, group) = if let Some(rest) = input.strip_prefix("0x") {
        (rest, 16, 2)
    } else if let Some(rest) = input.strip_prefix('b') {
        (rest, 2, 8)
    } else {
        return Err(RadixError::UnsupportedRadix {
            input: input.to_string(),
        });
    };

    if digits.is_empty() {
        return Err(RadixError::Empty {
            input: input.to_string(),
        });
    }

    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(RadixError::InvalidDigit {
            input: input.to_string(),
            digit: bad,
        });
    }

    // All digits are ASCII past this point, so byte slicing is char-safe.
    let mut bytes = Vec::with_capacity(digits.len().div_ceil(group));
    let mut end = digits.len();
    while end > 0 {
        let start = end.saturating_sub(group);
        let byte = u8::from_str_radix(&digits[start..end], radix).map_err(|_| {
            RadixError::InvalidDigit {
                input: input.to_string(),
                digit: digits[start..end].chars().next().unwrap_or('?'),
            }
        })?;
        bytes.push(byte);
        end = start;
    }

    Ok(bytes)
}

/// Decode a prefixed numeric string into exactly `N` little-endian bytes.
///
/// Shorter values are zero-padded at the high end. Longer values are
/// accepted only when every byte beyond `N` is zero.
///
/// # Errors
///
/// Everything [`decode_prefixed`] returns, plus [`RadixError::Overflow`]
/// when a non-zero byte falls outside the target width.
pub fn decode_prefixed_fixed<const N: usize>(input: &str) -> Result<[u8; N], RadixError> {
    let bytes = decode_prefixed(input)?;
    if bytes.len() > N && bytes[N..].iter().any(|b| *b != 0) {
        return Err(RadixError::Overflow {
            input: input.to_string(),
            needed: significant_len(&bytes),
            capacity: N,
        });
    }

    let mut out = [0u8; N];
    let n = bytes.len().min(N);
    out[..n].copy_from_slice(&bytes[..n]);
    Ok(out)
}

/// Render a little-endian byte buffer as a `0x` hex string, most significant
/// byte first, with high-order zero bytes trimmed.
///
/// At least one byte is always emitted: an all-zero (or empty) buffer
/// renders as `"0x00"`.
pub fn encode_trimmed_hex(bytes_le: &[u8]) -> String {
    let len = significant_len(bytes_le).max(1);
    let mut be: Vec<u8> = bytes_le.iter().take(len).copied().collect();
    be.resize(len, 0);
    be.reverse();
    format!("0x{}", hex::encode(be))
}

/// Number of bytes up to and including the highest non-zero byte.
fn significant_len(bytes_le: &[u8]) -> usize {
    bytes_le
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |i| i + 1)
}
