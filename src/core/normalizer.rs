use crate::core::numeric::{
    ETH_DECIMALS, TimestampZone, base_units_to_decimal, format_timestamp, gas_fee,
};
use crate::core::transaction::{RawTransaction, TransactionCategory, UnifiedTransaction};
use anyhow::Result;

/// Symbol reported for native ether transfers.
pub const NATIVE_SYMBOL: &str = "ETH";

/// Maps one raw transaction into the unified schema.
///
/// `label` is the display label of the transaction's category. Missing fields
/// fall back to empty strings, or `"0"` for gas and value fields. Present gas
/// fields pass through as given, even when empty. An error is returned only
/// when a field holds something other than a scalar.
pub fn normalize(
    raw: &RawTransaction,
    label: &str,
    zone: TimestampZone,
) -> Result<UnifiedTransaction> {
    let asset_symbol = if label == TransactionCategory::Normal.label() {
        NATIVE_SYMBOL.to_string()
    } else {
        raw.text("tokenSymbol")?
    };
    let gas_used = raw.text_or("gasUsed", "0")?;
    let gas_price = raw.text_or("gasPrice", "0")?;

    Ok(UnifiedTransaction {
        transaction_hash: raw.text("hash")?,
        occurred_at: format_timestamp(&raw.text("timeStamp")?, zone),
        from_address: raw.text("from")?,
        to_address: raw.text("to")?,
        category_label: label.to_string(),
        contract_address: raw.text("contractAddress")?,
        asset_symbol,
        asset_name: raw.text("tokenName")?,
        token_id: raw.text("tokenID")?,
        value_amount: base_units_to_decimal(&raw.text_or("value", "0")?, ETH_DECIMALS),
        gas: raw.text_or("gas", "0")?,
        gas_fee: gas_fee(&gas_used, &gas_price),
        gas_price,
        gas_used,
        is_error: raw.text("isError")? == "1",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normal_transfer() {
        let tx = raw(json!({
            "blockNumber": "14000000",
            "timeStamp": "1640995200",
            "hash": "0xhash",
            "from": "0xfrom",
            "to": "0xto",
            "value": "1000000000000000000",
            "gas": "21000",
            "gasPrice": "20000000000",
            "gasUsed": "21000",
            "isError": "0",
            "contractAddress": ""
        }));

        let unified = normalize(&tx, "ETH Transfer", TimestampZone::Utc).unwrap();

        assert_eq!(unified.transaction_hash, "0xhash");
        assert_eq!(unified.occurred_at, "2022-01-01 00:00:00");
        assert_eq!(unified.from_address, "0xfrom");
        assert_eq!(unified.to_address, "0xto");
        assert_eq!(unified.category_label, "ETH Transfer");
        assert_eq!(unified.asset_symbol, "ETH");
        assert_eq!(unified.value_amount, "1");
        assert_eq!(unified.gas, "21000");
        assert_eq!(unified.gas_price, "20000000000");
        assert_eq!(unified.gas_used, "21000");
        assert_eq!(unified.gas_fee, "0.00042");
        assert!(!unified.is_error);
    }

    #[test]
    fn test_token_transfer_uses_token_fields() {
        let tx = raw(json!({
            "hash": "0xtoken",
            "contractAddress": "0xcontract",
            "tokenSymbol": "USDT",
            "tokenName": "Tether USD",
            "value": "2500000000000000000"
        }));

        let unified = normalize(&tx, "ERC-20 Transfer", TimestampZone::Utc).unwrap();

        assert_eq!(unified.asset_symbol, "USDT");
        assert_eq!(unified.asset_name, "Tether USD");
        assert_eq!(unified.contract_address, "0xcontract");
        assert_eq!(unified.value_amount, "2.5");
        assert_eq!(unified.token_id, "");
    }

    #[test]
    fn test_nft_transfer_keeps_token_id() {
        let tx = raw(json!({
            "hash": "0xnft",
            "tokenID": "4242",
            "tokenSymbol": "BAYC",
            "value": ""
        }));

        let unified = normalize(&tx, "ERC-721 Transfer", TimestampZone::Utc).unwrap();

        assert_eq!(unified.token_id, "4242");
        assert_eq!(unified.asset_symbol, "BAYC");
        assert_eq!(unified.value_amount, "0");
    }

    #[test]
    fn test_missing_fields_default() {
        let tx = RawTransaction::from_iter([("hash", "0xonly")]);

        let unified = normalize(&tx, "Internal Transfer", TimestampZone::Utc).unwrap();

        assert_eq!(unified.transaction_hash, "0xonly");
        assert_eq!(unified.occurred_at, "");
        assert_eq!(unified.from_address, "");
        assert_eq!(unified.to_address, "");
        assert_eq!(unified.contract_address, "");
        assert_eq!(unified.asset_symbol, "");
        assert_eq!(unified.asset_name, "");
        assert_eq!(unified.token_id, "");
        assert_eq!(unified.value_amount, "0");
        assert_eq!(unified.gas, "0");
        assert_eq!(unified.gas_price, "0");
        assert_eq!(unified.gas_used, "0");
        assert_eq!(unified.gas_fee, "0");
        assert!(!unified.is_error);
    }

    #[test]
    fn test_empty_gas_fields_pass_through() {
        let tx = RawTransaction::from_iter([
            ("hash", "0xempty"),
            ("gas", ""),
            ("gasPrice", ""),
            ("gasUsed", ""),
            ("value", ""),
        ]);

        let unified = normalize(&tx, "Internal Transfer", TimestampZone::Utc).unwrap();

        assert_eq!(unified.gas, "");
        assert_eq!(unified.gas_price, "");
        assert_eq!(unified.gas_used, "");
        assert_eq!(unified.gas_fee, "0");
        assert_eq!(unified.value_amount, "0");
    }

    #[test]
    fn test_is_error_only_for_one() {
        for (flag, expected) in [("1", true), ("0", false), ("", false), ("true", false), ("01", false)] {
            let tx = RawTransaction::from_iter([("hash", "0x1"), ("isError", flag)]);
            let unified = normalize(&tx, "ETH Transfer", TimestampZone::Utc).unwrap();
            assert_eq!(unified.is_error, expected, "isError = {flag:?}");
        }

        let tx = RawTransaction::from_iter([("hash", "0x1")]);
        assert!(!normalize(&tx, "ETH Transfer", TimestampZone::Utc).unwrap().is_error);
    }

    #[test]
    fn test_non_scalar_field_is_an_error() {
        let tx = raw(json!({ "hash": "0xbad", "value": { "amount": "1" } }));
        assert!(normalize(&tx, "ETH Transfer", TimestampZone::Utc).is_err());
    }
}
