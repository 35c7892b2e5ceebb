//! Core of a top-down arcade shooter: entity state, per-frame physics and
//! collision, enemy spawning, the wave/stage sequencer and the session
//! lifecycle.  Rendering and input live in the binary.

pub mod compute;
pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod game;
pub mod scheduler;
pub mod spawner;
pub mod waves;

pub use config::GameConfig;
pub use error::ConfigError;
pub use game::{Game, InputState, Snapshot};
