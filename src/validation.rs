//! Validation of user-supplied simulation sizes.
//!
//! Shared by the `/start` endpoint and the CLI so both report the same
//! messages for the same mistakes.

use crate::config::Limits;
use crate::error::ApiError;

/// Parse and range-check a philosopher count.
///
/// # Arguments
///
/// * `raw` - The value as typed by the user
/// * `limits` - Accepted range
///
/// # Returns
///
/// * `Ok(n)` if `raw` is an integer inside the range
/// * `Err(ApiError::InvalidParameter)` naming parameter `n` otherwise
pub fn parse_philosophers(raw: &str, limits: &Limits) -> Result<usize, ApiError> {
    let n: i64 = raw
        .parse()
        .map_err(|_| ApiError::invalid("n", format!("must be an integer, got '{raw}'")))?;
    if n < to_i64(limits.min_philosophers as u64) {
        return Err(ApiError::invalid(
            "n",
            format!("must be at least {} philosophers", limits.min_philosophers),
        ));
    }
    if n > to_i64(limits.max_philosophers as u64) {
        return Err(ApiError::invalid(
            "n",
            format!("maximum {} philosophers allowed", limits.max_philosophers),
        ));
    }
    // In range, so non-negative and at most max_philosophers.
    Ok(n as usize)
}

/// Parse and range-check a run length in whole seconds.
pub fn parse_duration_secs(raw: &str, limits: &Limits) -> Result<u64, ApiError> {
    let secs: i64 = raw.parse().map_err(|_| {
        ApiError::invalid(
            "duration",
            format!("must be an integer (seconds), got '{raw}'"),
        )
    })?;
    if secs < to_i64(limits.min_duration_secs) {
        return Err(ApiError::invalid(
            "duration",
            format!("minimum {} seconds", limits.min_duration_secs),
        ));
    }
    if secs > to_i64(limits.max_duration_secs) {
        return Err(ApiError::invalid(
            "duration",
            format!("maximum {} seconds allowed", limits.max_duration_secs),
        ));
    }
    Ok(secs as u64)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Clap value parser for philosopher counts, using the default limits.
pub fn clap_philosophers_validator(s: &str) -> Result<usize, String> {
    parse_philosophers(s, &Limits::default()).map_err(|e| e.to_string())
}

/// Clap value parser for durations in seconds, using the default limits.
pub fn clap_duration_validator(s: &str) -> Result<u64, String> {
    parse_duration_secs(s, &Limits::default()).map_err(|e| e.to_string())
}
