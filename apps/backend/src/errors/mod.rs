//! Engine error types.

pub mod domain;

pub use domain::{GameError, NotFoundKind, ValidationKind};
