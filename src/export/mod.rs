//! File exporters for unified transactions

pub mod csv_exporter;

pub use csv_exporter::CsvExporter;

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Builds `eth_transactions_<address>_<YYYYmmdd_HHMMSS>.<extension>`.
///
/// Addresses longer than 10 characters are shortened to `0x1234...abcd`.
pub fn generate_filename<Tz>(address: &str, generated_at: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let short_address = match (address.get(..6), address.get(address.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if address.len() > 10 => format!("{head}...{tail}"),
        _ => address.to_string(),
    };
    let timestamp = generated_at.format("%Y%m%d_%H%M%S");
    let base_name = sanitize_filename(&format!("eth_transactions_{short_address}_{timestamp}"));
    format!("{base_name}.{extension}")
}

/// Replaces characters invalid in file names with `_`, collapses runs of `_`
/// and trims leading and trailing `_` and `.`.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized = String::with_capacity(filename.len());
    for c in filename.chars() {
        let c = if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            '_'
        } else {
            c
        };
        if c == '_' && sanitized.ends_with('_') {
            continue;
        }
        sanitized.push(c);
    }
    sanitized.trim_matches(|c| c == '_' || c == '.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_generate_filename_shortens_address() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let name = generate_filename(
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
            &generated_at,
            "csv",
        );
        assert_eq!(name, "eth_transactions_0x742d...f44e_20240506_070809.csv");
    }

    #[test]
    fn test_generate_filename_keeps_short_address() {
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let name = generate_filename("0xabc", &generated_at, "csv");
        assert_eq!(name, "eth_transactions_0xabc_20240101_000000.csv");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_filename("__a//b**c.."), "a_b_c");
        assert_eq!(sanitize_filename(".hidden?"), "hidden");
    }
}
