// Signed balance deltas from a transaction's pre/post snapshots.

use crate::models::TokenBalance;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenDelta {
    /// Empty when the wallet holds no token account in either snapshot.
    pub mint: String,
    pub amount: i128,
}

impl TokenDelta {
    pub fn is_determinate(&self) -> bool {
        !self.mint.is_empty() && self.amount != 0
    }
}

fn owned_by(entry: &TokenBalance, wallet: &str) -> bool {
    entry.owner.as_deref() == Some(wallet)
}

fn find_balance<'a, F>(balances: &'a [TokenBalance], pred: F) -> Option<&'a TokenBalance>
where
    F: Fn(&TokenBalance) -> bool,
{
    balances.iter().find(|&entry| pred(entry))
}

fn delta_from<F>(pre: &[TokenBalance], post: &[TokenBalance], pred: F) -> TokenDelta
where
    F: Fn(&TokenBalance) -> bool,
{
    let before = find_balance(pre, &pred);
    let after = find_balance(post, &pred);

    let pre_amount = before.map(|b| b.amount as i128).unwrap_or(0);
    let post_amount = after.map(|b| b.amount as i128).unwrap_or(0);

    // A token account created by this transaction only shows up post-snapshot.
    let mint = match (before, after) {
        (Some(b), _) if !b.mint.is_empty() => b.mint.clone(),
        (_, Some(a)) => a.mint.clone(),
        _ => String::new(),
    };

    TokenDelta {
        mint,
        amount: post_amount - pre_amount,
    }
}

/// Delta of the first token account owned by `wallet` in each snapshot.
pub fn resolve_token_delta(wallet: &str, pre: &[TokenBalance], post: &[TokenBalance]) -> TokenDelta {
    delta_from(pre, post, |entry| owned_by(entry, wallet))
}

/// Like [`resolve_token_delta`], skipping accounts of `excluded_mint`.
pub fn resolve_token_delta_excluding(
    wallet: &str,
    excluded_mint: &str,
    pre: &[TokenBalance],
    post: &[TokenBalance],
) -> TokenDelta {
    delta_from(pre, post, |entry| {
        owned_by(entry, wallet) && entry.mint != excluded_mint
    })
}

/// Delta of the wallet's account for one specific mint.
pub fn resolve_mint_delta(
    wallet: &str,
    mint: &str,
    pre: &[TokenBalance],
    post: &[TokenBalance],
) -> TokenDelta {
    delta_from(pre, post, |entry| owned_by(entry, wallet) && entry.mint == mint)
}

/// Lamport delta of the fee payer (index 0). Missing snapshots degrade to 0.
pub fn resolve_native_delta(pre: Option<&[u64]>, post: Option<&[u64]>) -> i128 {
    match (
        pre.and_then(|p| p.first()),
        post.and_then(|p| p.first()),
    ) {
        (Some(&before), Some(&after)) => after as i128 - before as i128,
        _ => 0,
    }
}
