//! Room code generation and normalization.
//!
//! Codes are not checked for collisions; two rooms created with the same code
//! share one ledger.

use crate::ledger::{LedgerError, LedgerResult};
use crate::types::RoomCode;
use rand::Rng;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;
const MAX_CODE_LENGTH: usize = 32;

/// Generate a random room code (6 characters)
pub fn generate() -> RoomCode {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Normalize a code typed by a user: trimmed and uppercased.
///
/// Codes end up in file names and URL paths, so only ASCII letters, digits,
/// `-` and `_` are accepted.
pub fn normalize(input: &str) -> LedgerResult<RoomCode> {
    let code = input.trim().to_ascii_uppercase();

    if code.is_empty() {
        return Err(LedgerError::InvalidInput(
            "Room code cannot be blank".to_string(),
        ));
    }
    if code.len() > MAX_CODE_LENGTH {
        return Err(LedgerError::InvalidInput(format!(
            "Room code is longer than {} characters",
            MAX_CODE_LENGTH
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::InvalidInput(format!(
            "Room code '{}' contains invalid characters",
            code
        )));
    }

    Ok(code)
}
