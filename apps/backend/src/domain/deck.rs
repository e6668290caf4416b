//! Deck construction, shuffling, and tail dealing.
//!
//! A `Deck` is exclusively owned by one room's session and mutated in place;
//! it is never shared across rooms. Dealing pops from the tail, so the draw
//! order is fully determined by the shuffle.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards::{Card, Rank, Suit};

pub const DECK_SIZE: usize = 52;

const SUITS: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
const RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52-card set in canonical order (suits C,D,H,S; ranks 2..A).
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in SUITS {
            for rank in RANKS {
                cards.push(Card { suit, rank });
            }
        }
        Self { cards }
    }

    /// A standard deck permuted by an unbiased Fisher-Yates shuffle.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.cards.shuffle(rng);
        deck
    }

    /// Rebuild a deck from an explicit card order (snapshot restore, tests).
    /// Cards are drawn from the tail of `cards`.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Remove and return the top card (tail of the backing vec).
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Source of the fresh deck installed at session creation and round reset.
///
/// `Entropy` is the production setting. `Seeded` reproduces a shuffle
/// sequence from a fixed seed (replay debugging); `Scripted` hands out
/// predetermined decks in order and is used by scenario tests to arrange
/// exact deals.
pub enum Shuffler {
    Entropy,
    Seeded(ChaCha8Rng),
    Scripted(VecDeque<Deck>),
}

impl Shuffler {
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn scripted(decks: impl IntoIterator<Item = Deck>) -> Self {
        Self::Scripted(decks.into_iter().collect())
    }

    /// Produce the next fresh deck. A scripted shuffler that runs out of
    /// decks falls back to OS entropy.
    pub fn next_deck(&mut self) -> Deck {
        match self {
            Shuffler::Entropy => Deck::shuffled(&mut rand::rng()),
            Shuffler::Seeded(rng) => Deck::shuffled(rng),
            Shuffler::Scripted(decks) => decks
                .pop_front()
                .unwrap_or_else(|| Deck::shuffled(&mut rand::rng())),
        }
    }
}

impl std::fmt::Debug for Shuffler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shuffler::Entropy => f.write_str("Shuffler::Entropy"),
            Shuffler::Seeded(_) => f.write_str("Shuffler::Seeded"),
            Shuffler::Scripted(decks) => write!(f, "Shuffler::Scripted({} decks)", decks.len()),
        }
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::Entropy
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn standard_deck_has_52_unique_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        let unique: HashSet<Card> = deck.cards().iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn draw_pops_from_the_tail() {
        let mut deck = Deck::from_cards(vec![
            Card::new(Suit::Clubs, Rank::Two),
            Card::new(Suit::Hearts, Rank::Ace),
        ]);
        assert_eq!(deck.draw(), Some(Card::new(Suit::Hearts, Rank::Ace)));
        assert_eq!(deck.draw(), Some(Card::new(Suit::Clubs, Rank::Two)));
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn seeded_shuffles_are_reproducible() {
        let d1 = Shuffler::seeded(42).next_deck();
        let d2 = Shuffler::seeded(42).next_deck();
        assert_eq!(d1, d2);
    }

    #[test]
    fn seeded_shuffler_advances_between_rounds() {
        let mut shuffler = Shuffler::seeded(42);
        let d1 = shuffler.next_deck();
        let d2 = shuffler.next_deck();
        assert_ne!(d1, d2);
    }

    #[test]
    fn scripted_shuffler_hands_out_decks_in_order() {
        let rigged = Deck::from_cards(vec![Card::new(Suit::Spades, Rank::Ace)]);
        let mut shuffler = Shuffler::scripted([rigged.clone()]);
        assert_eq!(shuffler.next_deck(), rigged);
        // Exhausted script falls back to a full random deck.
        assert_eq!(shuffler.next_deck().len(), DECK_SIZE);
    }
}
