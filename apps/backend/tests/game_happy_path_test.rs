mod common;

use blackjack_backend::domain::cards::{Rank, Suit};
use blackjack_backend::domain::deck::{Deck, Shuffler};
use blackjack_backend::{
    Accounts, GameError, GameEvent, Move, Outcome, PayoutKind, PlayerId, SnapshotStore,
};
use tokio::sync::broadcast;

use common::{card, drain_background_tasks, rigged_deck, table, wait_for};

async fn epoch_for(rx: &mut broadcast::Receiver<GameEvent>, player: PlayerId) -> u64 {
    let event = wait_for(rx, |e| {
        matches!(e, GameEvent::PlayerTurn { player: p, .. } if *p == player)
    })
    .await;
    match event {
        GameEvent::PlayerTurn { epoch, .. } => epoch,
        _ => unreachable!(),
    }
}

#[tokio::test(start_paused = true)]
async fn two_rounds_flow_through_one_room() {
    // Round 1: p0 17 (loses), p1 19 (wins) against a dealer 18.
    let round1 = rigged_deck(&[
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Ten),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
    ]);
    // Round 2: p0 is dealt blackjack, p1's 16 loses to the dealer's 18.
    let round2 = rigged_deck(&[
        card(Suit::Clubs, Rank::Ace),
        card(Suit::Clubs, Rank::Queen),
        card(Suit::Spades, Rank::Ten),
        card(Suit::Spades, Rank::Six),
        card(Suit::Hearts, Rank::Nine),
        card(Suit::Clubs, Rank::Nine),
    ]);
    let t = table(2, 1_000, Shuffler::scripted([round1, round2])).await;
    let mut rx = t.room.subscribe();
    let (p0, p1) = (t.players[0], t.players[1]);

    // --- Round 1 ---
    t.room.place_bet(p0, 100).await.unwrap();
    t.room.place_bet(p1, 100).await.unwrap();

    let _ = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundStarted { .. })).await;

    // Conservation: deck plus dealt hands always account for 52 cards.
    let view = t.room.view().await.unwrap();
    let dealt: usize = view.seats.iter().map(|s| s.cards.len()).sum();
    assert_eq!(view.deck_len + dealt + 2, 52);

    let e0 = epoch_for(&mut rx, p0).await;
    t.room.submit_move(p0, Move::Stand, e0).await.unwrap();
    let e1 = epoch_for(&mut rx, p1).await;
    t.room.submit_move(p1, Move::Stand, e1).await.unwrap();

    let concluded = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundConcluded { .. })).await;
    let GameEvent::RoundConcluded { outcomes, .. } = concluded else {
        unreachable!()
    };
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].outcome, Outcome::Loss);
    assert_eq!(outcomes[1].outcome, Outcome::Win);

    drain_background_tasks().await;
    assert_eq!(t.accounts.balance(p0).await.unwrap(), 900);
    assert_eq!(t.accounts.balance(p1).await.unwrap(), 1_100);

    // The post-round snapshot has the room idle with seats wiped.
    let snapshot = t
        .snapshots
        .load(t.room.room_id())
        .await
        .unwrap()
        .expect("round end must persist a snapshot");
    let session = snapshot.session.expect("session persists between rounds");
    assert!(session.seats.iter().all(|s| s.bet == 0 && s.hand.is_empty()));

    // --- Round 2 on the same room ---
    t.room.place_bet(p0, 100).await.unwrap();
    t.room.place_bet(p1, 100).await.unwrap();

    let e1 = epoch_for(&mut rx, p1).await; // p0 has blackjack, no turn
    t.room.submit_move(p1, Move::Stand, e1).await.unwrap();

    let concluded = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundConcluded { .. })).await;
    let GameEvent::RoundConcluded { outcomes, .. } = concluded else {
        unreachable!()
    };
    assert_eq!(outcomes[0].outcome, Outcome::Blackjack);
    assert_eq!(outcomes[1].outcome, Outcome::Loss);

    drain_background_tasks().await;
    assert_eq!(t.payouts.calls_for(p0, PayoutKind::Blackjack), 1);
    assert_eq!(t.accounts.balance(p0).await.unwrap(), 900 - 100 + 250);
    assert_eq!(t.accounts.balance(p1).await.unwrap(), 1_000);
}

#[tokio::test(start_paused = true)]
async fn event_stream_follows_the_round_lifecycle() {
    let deck = rigged_deck(&[
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
    ]);
    let t = table(1, 1_000, Shuffler::scripted([deck])).await;
    let mut rx = t.room.subscribe();
    let p0 = t.players[0];

    t.room.place_bet(p0, 100).await.unwrap();

    let mut seen = Vec::new();
    loop {
        let event = common::next_event(&mut rx).await;
        let done = matches!(event, GameEvent::RoundConcluded { .. });
        if let GameEvent::PlayerTurn { epoch, .. } = event {
            seen.push("player_turn");
            t.room.submit_move(p0, Move::Stand, epoch).await.unwrap();
            continue;
        }
        seen.push(match event {
            GameEvent::PlayerBet { .. } => "player_bet",
            GameEvent::BettingWindowOpened { .. } => "betting_window_opened",
            GameEvent::RoundStarted { .. } => "round_started",
            GameEvent::PlayerStand { .. } => "player_stand",
            GameEvent::DealerRevealed { .. } => "dealer_revealed",
            GameEvent::DealerStand { .. } => "dealer_stand",
            GameEvent::RoundConcluded { .. } => "round_concluded",
            _ => "other",
        });
        if done {
            break;
        }
    }

    assert_eq!(
        seen,
        vec![
            "player_bet",
            "betting_window_opened",
            "round_started",
            "player_turn",
            "player_stand",
            "dealer_revealed",
            "dealer_stand",
            "round_concluded",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn the_eighth_player_is_turned_away() {
    let t = table(7, 1_000, Shuffler::seeded(3)).await;

    let extra = PlayerId::new_v4();
    let err = t.room.join(extra).await.unwrap_err();
    assert!(matches!(err, GameError::Capacity(_)));

    // Spectating is still open.
    t.room.join_spectator(extra).await.unwrap();
    let view = t.room.view().await.unwrap();
    assert_eq!(view.players.len(), 7);
    assert!(view.spectators.contains(&extra));
}

#[tokio::test(start_paused = true)]
async fn leaving_mid_turn_stands_the_hand_and_demotes_to_spectator() {
    let deck = rigged_deck(&[
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Diamonds, Rank::Ten),
        card(Suit::Diamonds, Rank::Nine),
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
    ]);
    let t = table(2, 1_000, Shuffler::scripted([deck])).await;
    let mut rx = t.room.subscribe();
    let (p0, p1) = (t.players[0], t.players[1]);

    t.room.place_bet(p0, 100).await.unwrap();
    t.room.place_bet(p1, 100).await.unwrap();

    let _ = epoch_for(&mut rx, p0).await;
    t.room.leave_round(p0).await.unwrap();

    // The departed hand stands and play moves on immediately.
    let stand = wait_for(&mut rx, |e| matches!(e, GameEvent::PlayerStand { .. })).await;
    let GameEvent::PlayerStand { player, .. } = stand else {
        unreachable!()
    };
    assert_eq!(player, p0);

    let e1 = epoch_for(&mut rx, p1).await;
    t.room.submit_move(p1, Move::Stand, e1).await.unwrap();

    // The stake stays in play and settles normally (17 loses to 18).
    let concluded = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundConcluded { .. })).await;
    let GameEvent::RoundConcluded { outcomes, .. } = concluded else {
        unreachable!()
    };
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].player, p0);
    assert_eq!(outcomes[0].outcome, Outcome::Loss);

    let view = t.room.view().await.unwrap();
    assert!(!view.players.contains(&p0));
    assert!(view.spectators.contains(&p0));
}

#[tokio::test(start_paused = true)]
async fn deck_exhaustion_aborts_the_round_and_refunds_every_stake() {
    // Exactly the six cards the deal needs: the first hit hits an empty deck.
    let t = table(
        2,
        1_000,
        Shuffler::scripted([Deck::from_cards(vec![
            card(Suit::Clubs, Rank::Seven), // dealer hole
            card(Suit::Clubs, Rank::Ten),   // dealer upcard
            card(Suit::Diamonds, Rank::Six),
            card(Suit::Diamonds, Rank::Five),
            card(Suit::Clubs, Rank::Six),
            card(Suit::Clubs, Rank::Five), // p0's first card (drawn first)
        ])]),
    )
    .await;
    let mut rx = t.room.subscribe();
    let (p0, p1) = (t.players[0], t.players[1]);

    t.room.place_bet(p0, 100).await.unwrap();
    t.room.place_bet(p1, 100).await.unwrap();

    let epoch = epoch_for(&mut rx, p0).await;
    let err = t.room.submit_move(p0, Move::Hit, epoch).await.unwrap_err();
    assert!(matches!(err, GameError::Invariant(_)));

    let _ = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundAborted { .. })).await;

    drain_background_tasks().await;
    assert_eq!(t.accounts.balance(p0).await.unwrap(), 1_000);
    assert_eq!(t.accounts.balance(p1).await.unwrap(), 1_000);
    assert!(t.payouts.calls().is_empty());

    // The room recovered into a fresh betting cycle.
    t.room.place_bet(p0, 100).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn closed_rooms_reject_further_commands() {
    let t = table(1, 1_000, Shuffler::seeded(5)).await;
    let room_id = t.room.room_id().clone();

    t.registry.close_room(&room_id);
    let err = t.room.view().await.unwrap_err();
    assert!(matches!(err, GameError::RoomClosed));
    assert!(t.registry.get(&room_id).is_err());
}

#[tokio::test(start_paused = true)]
async fn rooms_restore_from_their_post_round_snapshot() {
    let deck = rigged_deck(&[
        card(Suit::Clubs, Rank::Ten),
        card(Suit::Clubs, Rank::Seven),
        card(Suit::Hearts, Rank::Ten),
        card(Suit::Hearts, Rank::Eight),
    ]);
    let t = table(1, 1_000, Shuffler::scripted([deck])).await;
    let mut rx = t.room.subscribe();
    let p0 = t.players[0];
    let room_id = t.room.room_id().clone();

    t.room.place_bet(p0, 100).await.unwrap();
    let epoch = epoch_for(&mut rx, p0).await;
    t.room.submit_move(p0, Move::Stand, epoch).await.unwrap();
    let _ = wait_for(&mut rx, |e| matches!(e, GameEvent::RoundConcluded { .. })).await;

    // Simulate a crash: drop the live room, rebuild from the snapshot.
    t.registry.close_room(&room_id);
    let restored = t.registry.restore_room(&room_id).await.unwrap();

    let view = restored.view().await.unwrap();
    assert_eq!(view.room_id, room_id);
    assert!(view.players.contains(&p0));
    assert!(view.seats.iter().all(|s| s.bet == 0));

    // The restored room plays on.
    restored.place_bet(p0, 50).await.unwrap();
}
