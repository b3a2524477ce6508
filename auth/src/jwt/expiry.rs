use chrono::Duration;

use super::errors::ExpiryError;

/// Parse a token lifetime such as `"1h"`, `"30m"`, `"45s"` or `"7d"`.
///
/// A bare number is read as seconds.
///
/// # Errors
/// * `Empty` - Input is blank
/// * `InvalidFormat` - Unknown unit or non-numeric amount
/// * `NotPositive` - Lifetime of zero
pub fn parse_lifetime(input: &str) -> Result<Duration, ExpiryError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ExpiryError::Empty);
    }

    let split_at = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (amount, unit) = input.split_at(split_at);

    let amount: i64 = amount
        .parse()
        .map_err(|_| ExpiryError::InvalidFormat(input.to_string()))?;

    if amount == 0 {
        return Err(ExpiryError::NotPositive);
    }

    let seconds_per_unit = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(ExpiryError::InvalidFormat(input.to_string())),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::seconds)
        .ok_or_else(|| ExpiryError::InvalidFormat(input.to_string()))
}
