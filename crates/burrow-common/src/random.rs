//! Cryptographically random alphanumeric tokens.

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{BurrowError, Result};

const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are rejected so that `byte % 62` stays uniform.
const REJECTION_BOUND: u8 = 248;

/// Generates a random string of `length` characters drawn uniformly from `[A-Za-z0-9]`.
///
/// Bytes come straight from the operating system generator; there is no
/// fallback to a weaker source.
///
/// # Errors
///
/// Returns [`BurrowError::InvalidArgument`] if `length` is zero and
/// [`BurrowError::Randomness`] if the OS generator fails.
pub fn alphanumeric(length: usize) -> Result<String> {
    if length == 0 {
        return Err(BurrowError::InvalidArgument {
            message: "identifier length must be greater than 0".into(),
        });
    }

    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];
    while out.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| BurrowError::Randomness {
                message: e.to_string(),
            })?;
        for &byte in buf.iter().filter(|&&b| b < REJECTION_BOUND) {
            if out.len() == length {
                break;
            }
            out.push(char::from(ALPHABET[usize::from(byte % 62)]));
        }
    }
    Ok(out)
}
