use crate::error::ConfigError;
use crate::models::QuoteAsset;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_signature_limit")]
    pub signature_limit: usize,
}

impl RpcConfig {
    pub fn commitment(&self) -> Result<CommitmentConfig, ConfigError> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|_| ConfigError::UnknownCommitment(self.commitment.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Emit a line for transactions whose direction could not be determined.
    #[serde(default = "default_report_unknown")]
    pub report_unknown: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            report_unknown: default_report_unknown(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatcherConfig {
    pub rpc: RpcConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub quote: QuoteAsset,
    #[serde(default)]
    pub wallets: Vec<WalletConfig>,
}

impl WatcherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_path("config/default")
    }

    /// Loads `<path>.(toml|yaml|json)` if present, then applies `WATCHER__...` overrides.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let cfg: WatcherConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        self.rpc.commitment()?;

        if let QuoteAsset::Token { mint, .. } = &self.quote {
            if mint.trim().is_empty() {
                return Err(ConfigError::MissingQuoteMint);
            }
        }

        if self.wallets.is_empty() {
            return Err(ConfigError::NoWallets);
        }
        for wallet in &self.wallets {
            if Pubkey::from_str(&wallet.address).is_err() {
                return Err(ConfigError::InvalidWallet {
                    name: wallet.name.clone(),
                    address: wallet.address.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}

fn default_commitment() -> String {
    "finalized".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_signature_limit() -> usize {
    10
}

fn default_interval_ms() -> u64 {
    3_000
}

fn default_report_unknown() -> bool {
    true
}
