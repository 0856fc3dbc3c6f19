//! Exact conversions from base units and unix timestamps to display strings.
//!
//! Amounts go through `rust_decimal` so 18-decimal values never touch binary
//! floating point. None of these functions fail: unparsable input is logged
//! and rendered as `"0"` (amounts) or `""` (timestamps).

use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Decimal places of ether: one ETH is 10^18 wei.
pub const ETH_DECIMALS: u32 = 18;

const MAX_FRACTION_DIGITS: u32 = 18;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zone used to render transaction timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Utc,
    /// The host's local zone.
    Local,
}

/// Converts an amount in base units into whole units, `10^decimals` base units
/// per whole unit.
///
/// At most 18 fractional digits are kept, trailing zeros and a trailing point
/// are removed, and the result is never in scientific notation.
pub fn base_units_to_decimal(raw: &str, decimals: u32) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return "0".to_string();
    }

    match Decimal::from_str(raw) {
        Ok(value) => match scale_down(value, decimals) {
            Some(whole) => render(whole),
            None => {
                warn!(value = raw, decimals, "Amount out of decimal range");
                "0".to_string()
            }
        },
        // Integers wider than 96 bits still convert exactly by moving the point.
        Err(e) => shift_integer_digits(raw, decimals).unwrap_or_else(|| {
            warn!(value = raw, error = %e, "Failed to convert base units");
            "0".to_string()
        }),
    }
}

/// Total fee in ETH for `gas_used` units of gas at `gas_price` wei each.
pub fn gas_fee(gas_used: &str, gas_price: &str) -> String {
    let (gas_used, gas_price) = (gas_used.trim(), gas_price.trim());
    if gas_used.is_empty() || gas_price.is_empty() {
        return "0".to_string();
    }

    if let (Ok(used), Ok(price)) = (gas_used.parse::<u128>(), gas_price.parse::<u128>()) {
        if let Some(fee) = used.checked_mul(price) {
            return base_units_to_decimal(&fee.to_string(), ETH_DECIMALS);
        }
    }

    match (Decimal::from_str(gas_used), Decimal::from_str(gas_price)) {
        (Ok(used), Ok(price)) => match used.checked_mul(price) {
            Some(fee) => base_units_to_decimal(&fee.to_string(), ETH_DECIMALS),
            None => {
                warn!(gas_used, gas_price, "Gas fee out of decimal range");
                "0".to_string()
            }
        },
        _ => {
            warn!(gas_used, gas_price, "Failed to calculate gas fee");
            "0".to_string()
        }
    }
}

/// Formats unix seconds as `YYYY-MM-DD HH:MM:SS` in `zone`.
pub fn format_timestamp(unix_seconds: &str, zone: TimestampZone) -> String {
    let unix_seconds = unix_seconds.trim();
    if unix_seconds.is_empty() {
        return String::new();
    }

    let Ok(seconds) = unix_seconds.parse::<i64>() else {
        warn!(timestamp = unix_seconds, "Failed to parse timestamp");
        return String::new();
    };
    let Some(instant) = DateTime::from_timestamp(seconds, 0) else {
        warn!(timestamp = unix_seconds, "Timestamp out of range");
        return String::new();
    };

    match zone {
        TimestampZone::Utc => instant.format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => instant
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    }
}

fn scale_down(value: Decimal, decimals: u32) -> Option<Decimal> {
    let mut scaled = value;
    if scaled.set_scale(value.scale() + decimals).is_ok() {
        return Some(scaled);
    }
    let unit = Decimal::try_from_i128_with_scale(1, decimals).ok()?;
    value.checked_mul(unit)
}

fn render(value: Decimal) -> String {
    value.round_dp(MAX_FRACTION_DIGITS).normalize().to_string()
}

fn shift_integer_digits(raw: &str, decimals: u32) -> Option<String> {
    if decimals > MAX_FRACTION_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = raw.trim_start_matches('0');
    if digits.is_empty() {
        return Some("0".to_string());
    }

    let decimals = decimals as usize;
    let (whole, fraction) = if digits.len() > decimals {
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        (whole.to_string(), fraction.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Some(whole)
    } else {
        Some(format!("{whole}.{fraction}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_units_to_decimal() {
        assert_eq!(base_units_to_decimal("1000000000000000000", ETH_DECIMALS), "1");
        assert_eq!(base_units_to_decimal("500000000000000000", ETH_DECIMALS), "0.5");
        assert_eq!(
            base_units_to_decimal("1", ETH_DECIMALS),
            "0.000000000000000001"
        );
        assert_eq!(
            base_units_to_decimal("123456789012345678901", ETH_DECIMALS),
            "123.456789012345678901"
        );
    }

    #[test]
    fn test_base_units_to_decimal_defaults_to_zero() {
        assert_eq!(base_units_to_decimal("0", ETH_DECIMALS), "0");
        assert_eq!(base_units_to_decimal("", ETH_DECIMALS), "0");
        assert_eq!(base_units_to_decimal("not-a-number", ETH_DECIMALS), "0");
        assert_eq!(base_units_to_decimal("000", ETH_DECIMALS), "0");
    }

    #[test]
    fn test_base_units_to_decimal_other_decimals() {
        assert_eq!(base_units_to_decimal("1500000", 6), "1.5");
        assert_eq!(base_units_to_decimal("7", 0), "7");
    }

    #[test]
    fn test_base_units_beyond_decimal_range() {
        // 10^33 wei does not fit a 96-bit mantissa
        let raw = format!("1{}", "0".repeat(33));
        assert_eq!(base_units_to_decimal(&raw, ETH_DECIMALS), "1000000000000000");

        let raw = format!("{}1", "9".repeat(35));
        assert_eq!(
            base_units_to_decimal(&raw, ETH_DECIMALS),
            format!("{}.{}1", "9".repeat(18), "9".repeat(17))
        );
    }

    #[test]
    fn test_base_units_rounds_to_eighteen_places() {
        assert_eq!(base_units_to_decimal("0.5", ETH_DECIMALS), "0");
        assert_eq!(base_units_to_decimal("1.5", ETH_DECIMALS), "0.000000000000000002");
    }

    #[test]
    fn test_gas_fee() {
        assert_eq!(gas_fee("21000", "20000000000"), "0.00042");
        assert_eq!(gas_fee("0", "20000000000"), "0");
        assert_eq!(gas_fee("20000000000", "0"), "0");
        assert_eq!(gas_fee("", "20000000000"), "0");
        assert_eq!(gas_fee("21000", "abc"), "0");
    }

    #[test]
    fn test_format_timestamp() {
        let formatted = format_timestamp("1640995200", TimestampZone::Utc);
        assert!(formatted.contains("2022-01-01"));
        assert_eq!(formatted, "2022-01-01 00:00:00");
        assert_eq!(format_timestamp("", TimestampZone::Utc), "");
        assert_eq!(format_timestamp("invalid", TimestampZone::Utc), "");
        assert_eq!(format_timestamp("99999999999999999", TimestampZone::Utc), "");
    }

    #[test]
    fn test_format_timestamp_local_has_display_shape() {
        let formatted = format_timestamp("1640995200", TimestampZone::Local);
        assert_eq!(formatted.len(), "2022-01-01 00:00:00".len());
        assert!(formatted.starts_with("202"));
    }
}
