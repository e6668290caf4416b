use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::settlement::{classify, Outcome};
use crate::domain::state::{DealerSeat, PlayerId, Seat};

fn seat_with(ranks: &[Rank], bet: u64) -> Seat {
    let mut seat = Seat::new(PlayerId::new_v4());
    seat.bet = bet;
    for &rank in ranks {
        seat.hand.push(Card::new(Suit::Clubs, rank));
    }
    seat.blackjack = seat.hand.is_blackjack();
    seat.busted = seat.hand.is_busted();
    seat
}

fn dealer_with(ranks: &[Rank]) -> DealerSeat {
    let mut dealer = DealerSeat::default();
    for &rank in ranks {
        dealer.hand.push(Card::new(Suit::Hearts, rank));
    }
    dealer.revealed = true;
    dealer
}

#[test]
fn busted_player_loses_even_against_dealer_bust() {
    let seat = seat_with(&[Rank::Ten, Rank::Nine, Rank::Five], 100);
    let dealer = dealer_with(&[Rank::Ten, Rank::Six, Rank::King]);
    assert_eq!(classify(&seat, &dealer), Outcome::Busted);
}

#[test]
fn blackjack_beats_dealer_twenty() {
    let seat = seat_with(&[Rank::Ace, Rank::King], 100);
    let dealer = dealer_with(&[Rank::Ten, Rank::Queen]);
    assert_eq!(classify(&seat, &dealer), Outcome::Blackjack);
}

#[test]
fn blackjack_beats_dealer_three_card_21() {
    let seat = seat_with(&[Rank::Ace, Rank::King], 100);
    let dealer = dealer_with(&[Rank::Seven, Rank::Seven, Rank::Seven]);
    assert_eq!(classify(&seat, &dealer), Outcome::Blackjack);
}

#[test]
fn blackjack_against_dealer_blackjack_is_push() {
    let seat = seat_with(&[Rank::Ace, Rank::King], 100);
    let dealer = dealer_with(&[Rank::Ace, Rank::Queen]);
    assert_eq!(classify(&seat, &dealer), Outcome::Push);
}

#[test]
fn standing_hand_wins_when_dealer_busts() {
    let seat = seat_with(&[Rank::Ten, Rank::Two], 100);
    let dealer = dealer_with(&[Rank::Ten, Rank::Six, Rank::King]);
    assert_eq!(classify(&seat, &dealer), Outcome::Win);
}

#[test]
fn higher_total_wins_equal_pushes_lower_loses() {
    let dealer = dealer_with(&[Rank::Ten, Rank::Eight]);

    let higher = seat_with(&[Rank::Ten, Rank::Nine], 100);
    assert_eq!(classify(&higher, &dealer), Outcome::Win);

    let equal = seat_with(&[Rank::Ten, Rank::Eight], 100);
    assert_eq!(classify(&equal, &dealer), Outcome::Push);

    let lower = seat_with(&[Rank::Ten, Rank::Seven], 100);
    assert_eq!(classify(&lower, &dealer), Outcome::Loss);
}

#[test]
fn non_blackjack_21_pushes_against_dealer_blackjack() {
    let seat = seat_with(&[Rank::Seven, Rank::Seven, Rank::Seven], 100);
    let dealer = dealer_with(&[Rank::Ace, Rank::Queen]);
    assert_eq!(classify(&seat, &dealer), Outcome::Push);
}

#[test]
fn credit_amounts_include_the_returned_stake() {
    assert_eq!(Outcome::Win.credit(100), 200);
    assert_eq!(Outcome::Push.credit(100), 100);
    assert_eq!(Outcome::Blackjack.credit(100), 250);
    assert_eq!(Outcome::Loss.credit(100), 0);
    assert_eq!(Outcome::Busted.credit(100), 0);
}

#[test]
fn odd_blackjack_stake_rounds_the_bonus_down() {
    assert_eq!(Outcome::Blackjack.credit(101), 101 + 151);
}
