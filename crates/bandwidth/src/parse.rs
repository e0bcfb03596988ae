use std::num::NonZeroU64;
use thiserror::Error;

/// Smallest accepted non-zero rate in bytes per second.
pub const MINIMUM_RATE: u64 = 512;

/// Errors returned when parsing a bandwidth limit fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum BandwidthParseError {
    /// The argument did not follow `NUMBER[.FRACTION][SUFFIX]`.
    #[error("invalid bandwidth limit syntax")]
    Invalid,
    /// The rate is non-zero but below [`MINIMUM_RATE`].
    #[error("bandwidth limit is below the minimum of {MINIMUM_RATE} bytes per second")]
    TooSmall,
    /// The rate does not fit in 64 bits.
    #[error("bandwidth limit exceeds the supported range")]
    TooLarge,
}

/// Parses a `--bwlimit` argument into a byte-per-second rate.
///
/// Bare numbers are KiB/s. `K`, `M` and `G` (case-insensitive, optionally
/// followed by `B` or `iB`) select powers of 1024; a lone `b` means bytes.
/// A fractional part is allowed. Zero disables the limit and yields `None`.
///
/// # Examples
///
/// ```
/// use bandwidth::parse_bandwidth_limit;
///
/// assert_eq!(parse_bandwidth_limit("0").unwrap(), None);
/// assert_eq!(parse_bandwidth_limit("2").unwrap().unwrap().get(), 2048);
/// assert_eq!(parse_bandwidth_limit("1.5M").unwrap().unwrap().get(), 1_572_864);
/// ```
pub fn parse_bandwidth_limit(text: &str) -> Result<Option<NonZeroU64>, BandwidthParseError> {
    let text = text.trim();
    let split = text
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);

    let multiplier = unit_multiplier(suffix)?;
    let (whole, fraction) = split_number(number)?;

    let mut scale: u128 = 1;
    let mut mantissa: u128 = 0;
    for digit in whole.bytes().chain(fraction.bytes()) {
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|value| value.checked_add(u128::from(digit - b'0')))
            .ok_or(BandwidthParseError::TooLarge)?;
    }
    for _ in 0..fraction.len() {
        scale = scale
            .checked_mul(10)
            .ok_or(BandwidthParseError::TooLarge)?;
    }

    let bytes = mantissa
        .checked_mul(multiplier)
        .ok_or(BandwidthParseError::TooLarge)?
        / scale;
    if bytes == 0 {
        return if mantissa == 0 {
            Ok(None)
        } else {
            Err(BandwidthParseError::TooSmall)
        };
    }
    if bytes < u128::from(MINIMUM_RATE) {
        return Err(BandwidthParseError::TooSmall);
    }
    let bytes = u64::try_from(bytes).map_err(|_| BandwidthParseError::TooLarge)?;
    Ok(NonZeroU64::new(bytes))
}

fn split_number(number: &str) -> Result<(&str, &str), BandwidthParseError> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.contains('.') {
                return Err(BandwidthParseError::Invalid);
            }
            (whole, fraction)
        }
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(BandwidthParseError::Invalid);
    }
    Ok((whole, fraction))
}

fn unit_multiplier(suffix: &str) -> Result<u128, BandwidthParseError> {
    let lower = suffix.to_ascii_lowercase();
    let exponent = match lower.as_str() {
        "b" => 0,
        "" | "k" | "kb" | "kib" => 1,
        "m" | "mb" | "mib" => 2,
        "g" | "gb" | "gib" => 3,
        _ => return Err(BandwidthParseError::Invalid),
    };
    Ok(1024u128.pow(exponent))
}
