//! Deterministic simulation module
//!
//! All gameplay rules live here. This module must be pure and deterministic:
//! - Simulated clock only (advanced by `GameSession::tick`)
//! - Seeded RNG only
//! - Stable iteration order (by token ID)
//! - No rendering or physics-engine dependencies

pub mod drop;
pub mod endgame;
pub mod merge;
pub mod schedule;
pub mod session;
pub mod size;
pub mod state;
pub mod tick;
pub mod token;

pub use drop::{DropController, HeldToken};
pub use endgame::{Countdown, EndgameConfig, EndgameMonitor, EndgameSignal};
pub use merge::{ContactBody, MergeOutcome, MergeResolver};
pub use schedule::{Scheduler, TaskHandle};
pub use session::GameSession;
pub use size::{SizeClass, SizeTable, Skin};
pub use state::{BodyState, GameEvent, GameState, WorldCommand};
pub use token::{Footprint, Token, TokenDescriptor, TokenId};
