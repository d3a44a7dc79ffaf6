use crate::error::GatewayError;
use crate::models::{Signature, TransactionRecord};
use async_trait::async_trait;

/// Read access to a ledger node.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Recent signatures for `address`, most recent first.
    async fn list_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Signature>, GatewayError>;

    /// `Ok(None)` when the node does not know the transaction.
    async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionRecord>, GatewayError>;
}
