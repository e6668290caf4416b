#![allow(dead_code)]

// tests/common/mod.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use blackjack_backend::domain::cards::{Card, Rank, Suit};
use blackjack_backend::domain::deck::{Deck, Shuffler};
use blackjack_backend::infra::snapshots::SnapshotStore;
use blackjack_backend::{
    AppState, EngineConfig, GameError, GameEvent, InMemoryAccounts, PayoutKind, Payouts, PlayerId,
    ReconciliationLog, RoomHandle, RoomRegistry,
};

// Logging is auto-installed for every test binary pulling in this module.
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Payout collaborator that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingPayouts {
    calls: Mutex<Vec<(PlayerId, PayoutKind, u64)>>,
    fail: AtomicBool,
}

impl RecordingPayouts {
    pub fn fail_next_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(PlayerId, PayoutKind, u64)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, player: PlayerId, kind: PayoutKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, k, _)| *p == player && *k == kind)
            .count()
    }

    fn record(&self, player: PlayerId, kind: PayoutKind, amount: u64) -> Result<(), GameError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GameError::external("payout transaction reverted"));
        }
        self.calls.lock().unwrap().push((player, kind, amount));
        Ok(())
    }
}

#[async_trait]
impl Payouts for RecordingPayouts {
    async fn payout_win(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        self.record(player, PayoutKind::Win, amount)
    }

    async fn payout_push(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        self.record(player, PayoutKind::Push, amount)
    }

    async fn payout_blackjack(&self, player: PlayerId, amount: u64) -> Result<(), GameError> {
        self.record(player, PayoutKind::Blackjack, amount)
    }
}

/// One wired-up room plus handles on all its collaborators.
pub struct TestTable {
    pub registry: RoomRegistry,
    pub room: RoomHandle,
    pub accounts: Arc<InMemoryAccounts>,
    pub payouts: Arc<RecordingPayouts>,
    pub reconciliation: Arc<ReconciliationLog>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub players: Vec<PlayerId>,
}

/// Build a room with `player_count` funded members and the given deck
/// source.
pub async fn table(player_count: usize, funds: u64, shuffler: Shuffler) -> TestTable {
    let accounts = Arc::new(InMemoryAccounts::new());
    let payouts = Arc::new(RecordingPayouts::default());
    let state = AppState::new(EngineConfig::default(), accounts.clone(), payouts.clone());
    let reconciliation = state.reconciliation.clone();
    let snapshots = state.snapshots.clone();

    let registry = RoomRegistry::new(state);
    let room = registry.create_room_with(shuffler);

    let mut players = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        let player = PlayerId::new_v4();
        accounts.deposit(player, funds);
        room.join(player).await.expect("join should succeed");
        players.push(player);
    }

    TestTable {
        registry,
        room,
        accounts,
        payouts,
        reconciliation,
        snapshots,
        players,
    }
}

pub fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

/// A full 52-card deck arranged so that `draws` come off the top in order.
/// The unused remainder sits below them.
pub fn rigged_deck(draws: &[Card]) -> Deck {
    let mut cards: Vec<Card> = Deck::standard()
        .cards()
        .iter()
        .copied()
        .filter(|c| !draws.contains(c))
        .collect();
    // Dealing pops from the tail, so the scripted draws go last, reversed.
    cards.extend(draws.iter().rev().copied());
    Deck::from_cards(cards)
}

/// Receive the next event or fail the test after a (virtual) grace period.
pub async fn next_event(rx: &mut broadcast::Receiver<GameEvent>) -> GameEvent {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("timed out waiting for a game event")
        .expect("event stream closed or lagged")
}

/// Skip forward until an event matches.
pub async fn wait_for(
    rx: &mut broadcast::Receiver<GameEvent>,
    mut pred: impl FnMut(&GameEvent) -> bool,
) -> GameEvent {
    loop {
        let event = next_event(rx).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Everything already sitting in the event channel, without waiting.
pub fn drained_events(rx: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Let detached tasks (payout runner) finish their work.
pub async fn drain_background_tasks() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
