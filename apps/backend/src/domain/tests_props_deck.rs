use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::cards::Card;
use crate::domain::deck::{Deck, Shuffler, DECK_SIZE};

proptest! {
    /// Every shuffle, whatever the seed, is a permutation of the canonical
    /// 52-card set.
    #[test]
    fn shuffle_is_a_permutation(seed in any::<u64>()) {
        let deck = Shuffler::seeded(seed).next_deck();
        prop_assert_eq!(deck.len(), DECK_SIZE);

        let shuffled: HashSet<Card> = deck.cards().iter().copied().collect();
        let canonical: HashSet<Card> = Deck::standard().cards().iter().copied().collect();
        prop_assert_eq!(shuffled, canonical);
    }

    /// Drawing the whole deck yields each card exactly once.
    #[test]
    fn drawing_everything_yields_each_card_once(seed in any::<u64>()) {
        let mut deck = Shuffler::seeded(seed).next_deck();
        let mut seen = HashSet::new();
        while let Some(card) = deck.draw() {
            prop_assert!(seen.insert(card));
        }
        prop_assert_eq!(seen.len(), DECK_SIZE);
    }
}
