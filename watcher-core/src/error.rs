use std::time::Duration;
use thiserror::Error;

/// Failures of a single gateway call. Scoped to the wallet whose cycle hit them.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("ledger node unavailable: {0}")]
    Unavailable(String),

    #[error("malformed transaction record: {0}")]
    Malformed(String),

    #[error("gateway call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid address {0}")]
    InvalidAddress(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("no wallets configured")]
    NoWallets,

    #[error("wallet {name} has an invalid address: {address}")]
    InvalidWallet { name: String, address: String },

    #[error("rpc endpoint is empty")]
    EmptyEndpoint,

    #[error("unknown commitment level: {0}")]
    UnknownCommitment(String),

    #[error("token quote asset requires a mint")]
    MissingQuoteMint,
}
