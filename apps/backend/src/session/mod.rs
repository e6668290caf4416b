//! Per-room session supervision: command serialization, timers, registry.

mod commands;
mod handle;
mod registry;
mod supervisor;
mod timers;

pub use handle::RoomHandle;
pub use registry::RoomRegistry;
