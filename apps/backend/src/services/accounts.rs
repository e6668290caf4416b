//! Account collaborator contract and an in-memory reference implementation.
//!
//! Bets are checked and debited at accept time, not at settlement, so a
//! player can never be dealt into a round they cannot cover. Every call is
//! atomic with respect to the player's balance.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::state::PlayerId;
use crate::errors::{GameError, ValidationKind};

#[async_trait]
pub trait Accounts: Send + Sync {
    async fn balance(&self, player: PlayerId) -> Result<u64, GameError>;

    /// Atomically check and withdraw. Rejects with `InsufficientFunds`
    /// without mutating the balance.
    async fn debit(&self, player: PlayerId, amount: u64) -> Result<(), GameError>;

    async fn credit(&self, player: PlayerId, amount: u64) -> Result<(), GameError>;
}

/// In-memory account store. Per-player atomicity comes from the map's entry
/// locks; unknown players have a zero balance.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    balances: DashMap<PlayerId, u64>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&self, player: PlayerId, amount: u64) {
        *self.balances.entry(player).or_insert(0) += amount;
    }
}

#[async_trait]
impl Accounts for InMemoryAccounts {
    async fn balance(&self, player: PlayerId) -> Result<u64, GameError> {
        Ok(self.balances.get(&player).map(|b| *b).unwrap_or(0))
    }

    async fn debit(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        let mut entry = self.balances.entry(player).or_insert(0);
        if *entry < amount {
            return Err(GameError::validation(
                ValidationKind::InsufficientFunds,
                format!("balance {} cannot cover {amount}", *entry),
            ));
        }
        *entry -= amount;
        Ok(())
    }

    async fn credit(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        *self.balances.entry(player).or_insert(0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn debit_rejects_without_mutating() {
        let accounts = InMemoryAccounts::new();
        let player = PlayerId::new_v4();
        accounts.deposit(player, 50);

        let err = accounts.debit(player, 100).await.unwrap_err();
        assert!(matches!(
            err,
            GameError::Validation(ValidationKind::InsufficientFunds, _)
        ));
        assert_eq!(accounts.balance(player).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn debit_then_credit_round_trips() {
        let accounts = InMemoryAccounts::new();
        let player = PlayerId::new_v4();
        accounts.deposit(player, 100);

        accounts.debit(player, 60).await.unwrap();
        assert_eq!(accounts.balance(player).await.unwrap(), 40);

        accounts.credit(player, 120).await.unwrap();
        assert_eq!(accounts.balance(player).await.unwrap(), 160);
    }
}
