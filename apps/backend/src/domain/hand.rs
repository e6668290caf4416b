//! Hand scoring with soft-ace adjustment.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;

/// An ordered hand of cards plus its derived score.
///
/// The total and soft-ace count are recomputed on every addition: face
/// values are summed with aces at 11, then while the total exceeds 21 and a
/// soft ace remains, one ace is demoted to 1. Recomputation is stable: the
/// score never changes absent new cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
    total: u8,
    soft_aces: u8,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card and rescore.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
        self.rescore();
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    /// Number of aces currently counted as 11.
    pub fn soft_aces(&self) -> u8 {
        self.soft_aces
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// A two-card 21. A 21 built from three or more cards is not blackjack.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.total == 21
    }

    pub fn is_busted(&self) -> bool {
        self.total > 21
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.total = 0;
        self.soft_aces = 0;
    }

    fn rescore(&mut self) {
        let mut total: u8 = 0;
        let mut soft_aces: u8 = 0;
        for card in &self.cards {
            total = total.saturating_add(card.rank.face_value());
            if card.is_ace() {
                soft_aces += 1;
            }
        }
        while total > 21 && soft_aces > 0 {
            total -= 10;
            soft_aces -= 1;
        }
        self.total = total;
        self.soft_aces = soft_aces;
    }
}
