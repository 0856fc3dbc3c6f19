//! Transaction categories and the raw and unified record shapes

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// The transaction shapes served by the explorer's account module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TransactionCategory {
    Normal,
    Internal,
    Erc20,
    Erc721,
    Erc1155,
}

impl TransactionCategory {
    /// All categories, in the order they are fetched and reported.
    pub const ALL: [TransactionCategory; 5] = [
        TransactionCategory::Normal,
        TransactionCategory::Internal,
        TransactionCategory::Erc20,
        TransactionCategory::Erc721,
        TransactionCategory::Erc1155,
    ];

    /// Key used for this category in a [`CollectionResult`].
    pub fn key(&self) -> &'static str {
        match self {
            TransactionCategory::Normal => "normal",
            TransactionCategory::Internal => "internal",
            TransactionCategory::Erc20 => "erc20",
            TransactionCategory::Erc721 => "erc721",
            TransactionCategory::Erc1155 => "erc1155",
        }
    }

    /// Etherscan `action` parameter listing this category.
    pub fn action(&self) -> &'static str {
        match self {
            TransactionCategory::Normal => "txlist",
            TransactionCategory::Internal => "txlistinternal",
            TransactionCategory::Erc20 => "tokentx",
            TransactionCategory::Erc721 => "tokennfttx",
            TransactionCategory::Erc1155 => "token1155tx",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionCategory::Normal => "ETH Transfer",
            TransactionCategory::Internal => "Internal Transfer",
            TransactionCategory::Erc20 => "ERC-20 Transfer",
            TransactionCategory::Erc721 => "ERC-721 Transfer",
            TransactionCategory::Erc1155 => "ERC-1155 Transfer",
        }
    }
}

impl Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TransactionCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionCategory::ALL
            .into_iter()
            .find(|category| category.key() == s)
            .ok_or_else(|| anyhow!("Invalid transaction category: {}", s))
    }
}

/// A transaction exactly as the explorer returned it.
///
/// The key set depends on the category and absent keys are common, so values
/// are read through [`RawTransaction::text`] which defaults instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransaction(Map<String, Value>);

impl RawTransaction {
    /// Reads a field as text. Absent and `null` fields read as empty.
    ///
    /// Fails only when the field holds a JSON array or object.
    pub fn text(&self, key: &str) -> Result<String> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(other) => bail!("Field `{}` is not a scalar value: {}", key, other),
        }
    }

    /// Like [`RawTransaction::text`], with `default` standing in for an absent
    /// or `null` field. A present empty string is returned as is.
    pub fn text_or(&self, key: &str, default: &str) -> Result<String> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(default.to_string()),
            Some(_) => self.text(key),
        }
    }

    pub fn hash(&self) -> Option<String> {
        self.text("hash").ok().filter(|hash| !hash.is_empty())
    }

    pub fn block_number(&self) -> Option<u64> {
        self.text("blockNumber").ok()?.trim().parse().ok()
    }
}

impl From<Map<String, Value>> for RawTransaction {
    fn from(fields: Map<String, Value>) -> Self {
        RawTransaction(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawTransaction {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawTransaction(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// One transaction of any category in the exported schema.
///
/// Field names double as the column names of tabular exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedTransaction {
    pub transaction_hash: String,
    pub occurred_at: String,
    pub from_address: String,
    pub to_address: String,
    pub category_label: String,
    pub contract_address: String,
    pub asset_symbol: String,
    pub asset_name: String,
    pub token_id: String,
    pub value_amount: String,
    pub gas: String,
    pub gas_price: String,
    pub gas_used: String,
    pub gas_fee: String,
    pub is_error: bool,
}

/// Raw transactions per category key, as fetched for one address.
///
/// Keyed by [`TransactionCategory::key`]; other keys may be present and are
/// ignored by analysis.
pub type CollectionResult = HashMap<String, Vec<RawTransaction>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_tables() {
        let actions: Vec<_> = TransactionCategory::ALL.iter().map(|c| c.action()).collect();
        assert_eq!(
            actions,
            vec!["txlist", "txlistinternal", "tokentx", "tokennfttx", "token1155tx"]
        );
        assert_eq!(TransactionCategory::Normal.label(), "ETH Transfer");
        assert_eq!(TransactionCategory::Erc1155.label(), "ERC-1155 Transfer");
        assert_eq!(TransactionCategory::Internal.to_string(), "Internal Transfer");
    }

    #[test]
    fn test_category_from_key() {
        assert_eq!(
            "erc721".parse::<TransactionCategory>().unwrap(),
            TransactionCategory::Erc721
        );
        assert!("NORMAL".parse::<TransactionCategory>().is_err());
        assert!("erc4626".parse::<TransactionCategory>().is_err());
    }

    #[test]
    fn test_raw_text_reads_scalars() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "hash": "0xabc",
            "blockNumber": 15,
            "isError": null,
            "flag": true,
            "logs": [1, 2]
        }))
        .unwrap();

        assert_eq!(raw.text("hash").unwrap(), "0xabc");
        assert_eq!(raw.text("blockNumber").unwrap(), "15");
        assert_eq!(raw.text("isError").unwrap(), "");
        assert_eq!(raw.text("missing").unwrap(), "");
        assert_eq!(raw.text("flag").unwrap(), "true");
        assert!(raw.text("logs").is_err());
        assert_eq!(raw.text_or("missing", "0").unwrap(), "0");
        assert_eq!(raw.text_or("isError", "0").unwrap(), "0");
        assert_eq!(raw.text_or("hash", "0").unwrap(), "0xabc");
        assert_eq!(raw.block_number(), Some(15));
    }

    #[test]
    fn test_raw_hash_ignores_empty() {
        let raw = RawTransaction::from_iter([("hash", "")]);
        assert!(raw.hash().is_none());
        assert!(RawTransaction::default().block_number().is_none());
    }
}
