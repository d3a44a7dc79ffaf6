// Solana JSON-RPC implementation of the ledger gateway.

use crate::error::GatewayError;
use crate::gateway::LedgerGateway;
use crate::models::{Signature, TokenBalance, TransactionRecord};
use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding, UiTransactionStatusMeta,
    UiTransactionTokenBalance,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct RpcGateway {
    pub rpc_client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl RpcGateway {
    pub fn new(rpc_url: &str, timeout: Duration, commitment: CommitmentConfig) -> Self {
        let rpc_client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.to_string(), timeout, commitment);
        Self {
            rpc_client: Arc::new(rpc_client),
            commitment,
        }
    }

    /// Current block height; used as a connectivity probe at startup.
    pub async fn health_check(&self) -> Result<u64, GatewayError> {
        let height = self
            .rpc_client
            .get_block_height()
            .await
            .map_err(map_client_error)?;
        Ok(height)
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn list_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Signature>, GatewayError> {
        let pubkey = Pubkey::from_str(address)
            .map_err(|_| GatewayError::InvalidAddress(address.to_string()))?;
        let cfg = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(self.commitment),
        };
        let statuses = self
            .rpc_client
            .get_signatures_for_address_with_config(&pubkey, cfg)
            .await
            .map_err(map_client_error)?;

        Ok(statuses
            .into_iter()
            .map(|s| Signature::new(s.signature))
            .collect())
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionRecord>, GatewayError> {
        let cfg = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        // `send` with an Option target so an unknown signature comes back as null, not an error.
        let tx: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .rpc_client
            .send(
                RpcRequest::GetTransaction,
                serde_json::json!([signature.as_str(), cfg]),
            )
            .await
            .map_err(map_client_error)?;

        let Some(tx) = tx else {
            debug!(signature = %signature, "transaction not found");
            return Ok(None);
        };

        let meta = tx
            .transaction
            .meta
            .as_ref()
            .ok_or_else(|| GatewayError::Malformed(format!("{signature}: missing meta")))?;

        record_from_meta(signature, tx.block_time, meta).map(Some)
    }
}

fn map_client_error(err: ClientError) -> GatewayError {
    match err.kind() {
        ClientErrorKind::SerdeJson(e) => GatewayError::Malformed(e.to_string()),
        _ => GatewayError::Unavailable(err.to_string()),
    }
}

fn option_of<T: Clone>(value: &OptionSerializer<T>) -> Option<T> {
    match value {
        OptionSerializer::Some(v) => Some(v.clone()),
        _ => None,
    }
}

pub fn record_from_meta(
    signature: &Signature,
    block_time: Option<i64>,
    meta: &UiTransactionStatusMeta,
) -> Result<TransactionRecord, GatewayError> {
    let pre_token_balances = match &meta.pre_token_balances {
        OptionSerializer::Some(balances) => Some(convert_token_balances(balances)?),
        _ => None,
    };
    let post_token_balances = match &meta.post_token_balances {
        OptionSerializer::Some(balances) => Some(convert_token_balances(balances)?),
        _ => None,
    };

    Ok(TransactionRecord {
        signature: signature.to_string(),
        block_time,
        err: meta.err.as_ref().map(|e| format!("{e:?}")),
        log_messages: option_of(&meta.log_messages),
        pre_balances: Some(meta.pre_balances.clone()),
        post_balances: Some(meta.post_balances.clone()),
        pre_token_balances,
        post_token_balances,
    })
}

pub fn convert_token_balances(
    balances: &[UiTransactionTokenBalance],
) -> Result<Vec<TokenBalance>, GatewayError> {
    balances.iter().map(token_balance_from_ui).collect()
}

fn token_balance_from_ui(ui: &UiTransactionTokenBalance) -> Result<TokenBalance, GatewayError> {
    let amount = ui.ui_token_amount.amount.parse::<u64>().map_err(|_| {
        GatewayError::Malformed(format!(
            "token amount {:?} for mint {}",
            ui.ui_token_amount.amount, ui.mint
        ))
    })?;

    Ok(TokenBalance {
        owner: option_of(&ui.owner),
        mint: ui.mint.clone(),
        amount,
        decimals: ui.ui_token_amount.decimals,
    })
}
