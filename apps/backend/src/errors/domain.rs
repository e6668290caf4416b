//! Engine-level error type used across services and the session supervisor.
//!
//! Transport- and persistence-agnostic. Command handlers reply with
//! `Result<T, GameError>` to the originating caller only; rejected commands
//! never mutate state.

use thiserror::Error;

/// Validation failure kinds (bad input or business rule violation).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    BadAmount,
    InsufficientFunds,
    PhaseMismatch,
    OutOfTurn,
    NotSeated,
    Other(String),
}

/// Missing resources in domain terms.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Player,
    Other(String),
}

/// Central engine error type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Input/user validation or business rule violation; no state change.
    #[error("validation error ({0:?}): {1}")]
    Validation(ValidationKind, String),
    /// Room is at capacity; rejected at join.
    #[error("capacity error: {0}")]
    Capacity(String),
    /// Duplicate or stale command for an already-advanced turn; never
    /// produces a double-deal.
    #[error("stale command: {0}")]
    Stale(String),
    /// Missing resource.
    #[error("not found ({0:?}): {1}")]
    NotFound(NotFoundKind, String),
    /// External collaborator failure (payout call failed or timed out,
    /// snapshot store unavailable). Game-state progression is unaffected.
    #[error("external service error: {0}")]
    External(String),
    /// Broken engine invariant. The round is aborted and bets refunded;
    /// must never occur if invariants hold.
    #[error("invariant violation: {0}")]
    Invariant(String),
    /// Configuration problem at startup.
    #[error("config error: {0}")]
    Config(String),
    /// The room's supervisor is gone (room closed while a command was in
    /// flight).
    #[error("room closed")]
    RoomClosed,
}

impl GameError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }

    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity(detail.into())
    }

    pub fn stale(detail: impl Into<String>) -> Self {
        Self::Stale(detail.into())
    }

    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }

    pub fn external(detail: impl Into<String>) -> Self {
        Self::External(detail.into())
    }

    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant(detail.into())
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }
}
