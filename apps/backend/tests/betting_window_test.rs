mod common;

use std::time::Duration;

use blackjack_backend::domain::deck::Shuffler;
use blackjack_backend::errors::ValidationKind;
use blackjack_backend::{Accounts, GameError, GameEvent};

use common::{drained_events, table, wait_for};

#[tokio::test(start_paused = true)]
async fn window_expiry_starts_round_with_bettors_only() {
    let t = table(3, 1_000, Shuffler::seeded(7)).await;
    let mut rx = t.room.subscribe();

    t.room.place_bet(t.players[0], 100).await.unwrap();
    t.room.place_bet(t.players[1], 50).await.unwrap();
    // players[2] never bets.

    let started = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundStarted { .. })).await;
    let GameEvent::RoundStarted { seats, .. } = started else {
        unreachable!()
    };
    assert_eq!(seats, vec![t.players[0], t.players[1]]);

    // The non-bettor keeps their balance and their room membership.
    assert_eq!(t.accounts.balance(t.players[2]).await.unwrap(), 1_000);
    let view = t.room.view().await.unwrap();
    assert!(view.players.contains(&t.players[2]));
    assert_eq!(view.seats.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn bets_are_debited_at_accept_time() {
    let t = table(2, 1_000, Shuffler::seeded(7)).await;

    t.room.place_bet(t.players[0], 300).await.unwrap();
    assert_eq!(t.accounts.balance(t.players[0]).await.unwrap(), 700);

    // A top-up within the window debits again and never decreases the bet.
    t.room.place_bet(t.players[0], 200).await.unwrap();
    assert_eq!(t.accounts.balance(t.players[0]).await.unwrap(), 500);

    let view = t.room.view().await.unwrap();
    assert_eq!(view.seats[0].bet, 500);
}

#[tokio::test(start_paused = true)]
async fn all_players_betting_closes_the_window_early() {
    let t = table(2, 1_000, Shuffler::seeded(7)).await;
    let mut rx = t.room.subscribe();
    let started_at = tokio::time::Instant::now();

    t.room.place_bet(t.players[0], 100).await.unwrap();
    t.room.place_bet(t.players[1], 100).await.unwrap();

    let _ = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundStarted { .. })).await;
    // No virtual time passed: the deal did not wait for the deadline.
    assert_eq!(started_at.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn a_late_bet_does_not_rearm_the_window() {
    let t = table(3, 1_000, Shuffler::seeded(7)).await;
    let mut rx = t.room.subscribe();

    t.room.place_bet(t.players[0], 100).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    // Half-way through the window a second player bets.
    t.room.place_bet(t.players[1], 100).await.unwrap();

    // The window still expires 60s after the FIRST bet.
    tokio::time::sleep(Duration::from_secs(31)).await;
    let events = drained_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundStarted { .. })),
        "fixed window must fire 60s after the first bet; got {events:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn zero_and_unfunded_bets_are_rejected_without_state_change() {
    let t = table(2, 100, Shuffler::seeded(7)).await;

    let err = t.room.place_bet(t.players[0], 0).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationKind::BadAmount, _)
    ));

    let err = t.room.place_bet(t.players[0], 500).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationKind::InsufficientFunds, _)
    ));
    assert_eq!(t.accounts.balance(t.players[0]).await.unwrap(), 100);

    // No window opened: nothing to deal, the room stays idle.
    let view = t.room.view().await.unwrap();
    assert!(view.seats.is_empty());
}

#[tokio::test(start_paused = true)]
async fn spectators_cannot_bet() {
    let t = table(1, 1_000, Shuffler::seeded(7)).await;
    let watcher = blackjack_backend::PlayerId::new_v4();
    t.room.join_spectator(watcher).await.unwrap();
    t.accounts.deposit(watcher, 1_000);

    let err = t.room.place_bet(watcher, 100).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationKind::NotSeated, _)
    ));
}

#[tokio::test(start_paused = true)]
async fn bets_during_player_turns_are_rejected() {
    let t = table(1, 1_000, Shuffler::seeded(7)).await;
    let mut rx = t.room.subscribe();

    t.room.place_bet(t.players[0], 100).await.unwrap();
    let _ = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundStarted { .. })).await;

    let err = t.room.place_bet(t.players[0], 100).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::Validation(ValidationKind::PhaseMismatch, _)
    ));
}

#[tokio::test(start_paused = true)]
async fn the_window_opens_once_with_a_deadline() {
    let t = table(2, 1_000, Shuffler::seeded(7)).await;
    let mut rx = t.room.subscribe();

    t.room.place_bet(t.players[0], 100).await.unwrap();
    t.room.place_bet(t.players[0], 100).await.unwrap();

    let mut opened = 0;
    for event in drained_events(&mut rx) {
        if matches!(event, GameEvent::BettingWindowOpened { .. }) {
            opened += 1;
        }
    }
    assert_eq!(opened, 1);
}
