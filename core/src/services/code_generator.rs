//! Random numeric code generation

use rand::{rngs::OsRng, Rng};
use tfa_shared::config::two_factor::MAX_CODE_LENGTH;

use crate::errors::{DomainError, DomainResult};

/// Generate a code of exactly `length` digits with no leading zero
///
/// Draws uniformly from `[10^(length-1), 10^length - 1]` using the OS CSPRNG.
pub fn generate(length: usize) -> DomainResult<String> {
    if length == 0 || length > MAX_CODE_LENGTH {
        return Err(DomainError::Configuration {
            message: format!(
                "code length must be between 1 and {}, got {}",
                MAX_CODE_LENGTH, length
            ),
        });
    }

    let low = 10u64.pow(length as u32 - 1);
    let high = 10u64.pow(length as u32) - 1;
    let code = OsRng.gen_range(low..=high);
    Ok(code.to_string())
}
