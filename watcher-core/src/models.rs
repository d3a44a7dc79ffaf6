use serde::{Deserialize, Serialize};
use std::fmt;

pub const NATIVE_SYMBOL: &str = "SOL";
pub const NATIVE_DECIMALS: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Signature {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One entry of `preTokenBalances` / `postTokenBalances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub owner: Option<String>,
    pub mint: String,
    /// Raw integer amount, not scaled by decimals.
    pub amount: u64,
    pub decimals: u8,
}

/// A fetched transaction reduced to the fields classification needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub block_time: Option<i64>,
    pub err: Option<String>,
    pub log_messages: Option<Vec<String>>,
    /// Lamports per account key; index 0 is the fee payer.
    pub pre_balances: Option<Vec<u64>>,
    pub post_balances: Option<Vec<u64>>,
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    pub post_token_balances: Option<Vec<TokenBalance>>,
}

impl TransactionRecord {
    pub fn is_failed(&self) -> bool {
        self.err.is_some()
    }

    pub fn logs(&self) -> &[String] {
        self.log_messages.as_deref().unwrap_or_default()
    }

    pub fn pre_tokens(&self) -> &[TokenBalance] {
        self.pre_token_balances.as_deref().unwrap_or_default()
    }

    pub fn post_tokens(&self) -> &[TokenBalance] {
        self.post_token_balances.as_deref().unwrap_or_default()
    }
}

/// Asset the wallet's token is priced against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteAsset {
    #[default]
    Native,
    Token {
        mint: String,
        symbol: String,
        decimals: u8,
    },
}

impl QuoteAsset {
    pub fn symbol(&self) -> &str {
        match self {
            QuoteAsset::Native => NATIVE_SYMBOL,
            QuoteAsset::Token { symbol, .. } => symbol,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            QuoteAsset::Native => NATIVE_DECIMALS,
            QuoteAsset::Token { decimals, .. } => *decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accessors_default_to_empty() {
        let record = TransactionRecord::default();
        assert!(record.logs().is_empty());
        assert!(record.pre_tokens().is_empty());
        assert!(record.post_tokens().is_empty());
        assert!(!record.is_failed());
    }

    #[test]
    fn test_quote_asset_deserialization() {
        let native: QuoteAsset = serde_json::from_str(r#"{"kind":"native"}"#).unwrap();
        assert_eq!(native, QuoteAsset::Native);
        assert_eq!(native.symbol(), "SOL");
        assert_eq!(native.decimals(), 9);

        let usdc: QuoteAsset = serde_json::from_str(
            r#"{"kind":"token","mint":"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v","symbol":"USDC","decimals":6}"#,
        )
        .unwrap();
        assert_eq!(usdc.symbol(), "USDC");
        assert_eq!(usdc.decimals(), 6);
        assert_eq!(QuoteAsset::default(), QuoteAsset::Native);
    }
}
