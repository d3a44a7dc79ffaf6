use crate::balance::{
    resolve_mint_delta, resolve_native_delta, resolve_token_delta, resolve_token_delta_excluding,
    TokenDelta,
};
use crate::models::{QuoteAsset, TransactionRecord};
use serde::Serialize;
use std::fmt;
use tracing::debug;

const INPUT_MARKERS: [&str; 4] = ["input=usdc", "input=sol", "in=usdc", "in=sol"];
const OUTPUT_MARKERS: [&str; 4] = ["output=usdc", "output=sol", "out=usdc", "out=sol"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectionSource {
    Balances,
    Logs,
}

/// Quote-side magnitude of a classified swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapLeg {
    pub quote_amount: f64,
    pub quote_symbol: String,
    pub mint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Direction {
    Buy {
        leg: Option<SwapLeg>,
        source: DirectionSource,
    },
    Sell {
        leg: Option<SwapLeg>,
        source: DirectionSource,
    },
    Unknown,
}

impl Direction {
    pub fn is_known(&self) -> bool {
        !matches!(self, Direction::Unknown)
    }

    pub fn leg(&self) -> Option<&SwapLeg> {
        match self {
            Direction::Buy { leg, .. } | Direction::Sell { leg, .. } => leg.as_ref(),
            Direction::Unknown => None,
        }
    }

    /// `"Buy: 1.00 SOL <mint>"`, `"Sell"` for log-derived verdicts, `None` when unknown.
    pub fn label(&self) -> Option<String> {
        let (side, leg) = match self {
            Direction::Buy { leg, .. } => ("Buy", leg),
            Direction::Sell { leg, .. } => ("Sell", leg),
            Direction::Unknown => return None,
        };
        Some(match leg {
            Some(leg) => format!(
                "{side}: {:.2} {} {}",
                leg.quote_amount, leg.quote_symbol, leg.mint
            ),
            None => side.to_string(),
        })
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(&label),
            None => f.write_str("Unknown"),
        }
    }
}

/// Target-token and quote-asset deltas for `wallet`.
///
/// For a token-mint quote the target is the first wallet-owned account of any other mint, so
/// the two sides never resolve to the same token account.
pub fn resolve_pair(
    wallet: &str,
    record: &TransactionRecord,
    quote: &QuoteAsset,
) -> (TokenDelta, i128) {
    let pre = record.pre_tokens();
    let post = record.post_tokens();
    match quote {
        QuoteAsset::Native => {
            let token = resolve_token_delta(wallet, pre, post);
            let native = resolve_native_delta(
                record.pre_balances.as_deref(),
                record.post_balances.as_deref(),
            );
            (token, native)
        }
        QuoteAsset::Token { mint, .. } => {
            let token = resolve_token_delta_excluding(wallet, mint, pre, post);
            let quote_delta = resolve_mint_delta(wallet, mint, pre, post);
            (token, quote_delta.amount)
        }
    }
}

fn scale(amount: i128, decimals: u8) -> f64 {
    amount.unsigned_abs() as f64 / 10f64.powi(decimals as i32)
}

/// Decide the direction of `record` from `wallet`'s point of view.
///
/// Never fails: a failed transaction or inconclusive evidence yields [`Direction::Unknown`].
pub fn classify(wallet: &str, record: &TransactionRecord, quote: &QuoteAsset) -> Direction {
    if record.is_failed() {
        return Direction::Unknown;
    }

    let (token, quote_delta) = resolve_pair(wallet, record, quote);
    debug!(
        wallet = %wallet,
        signature = %record.signature,
        mint = %token.mint,
        token_delta = %token.amount,
        quote_delta = %quote_delta,
        "resolved balance deltas"
    );

    if token.is_determinate() {
        let leg = || SwapLeg {
            quote_amount: scale(quote_delta, quote.decimals()),
            quote_symbol: quote.symbol().to_string(),
            mint: token.mint.clone(),
        };
        if token.amount > 0 && quote_delta < 0 {
            return Direction::Buy {
                leg: Some(leg()),
                source: DirectionSource::Balances,
            };
        }
        if token.amount < 0 && quote_delta > 0 {
            return Direction::Sell {
                leg: Some(leg()),
                source: DirectionSource::Balances,
            };
        }
    }

    classify_from_logs(record.logs())
}

/// Fallback on program log text; the first `swap` line carrying a marker decides.
pub fn classify_from_logs(logs: &[String]) -> Direction {
    for line in logs {
        let line = line.to_lowercase();
        if !line.contains("swap") {
            continue;
        }
        if INPUT_MARKERS.iter().any(|m| line.contains(m)) {
            return Direction::Buy {
                leg: None,
                source: DirectionSource::Logs,
            };
        }
        if OUTPUT_MARKERS.iter().any(|m| line.contains(m)) {
            return Direction::Sell {
                leg: None,
                source: DirectionSource::Logs,
            };
        }
    }
    Direction::Unknown
}
