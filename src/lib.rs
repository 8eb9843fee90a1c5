//! Booty Drop - a drop-and-merge treasure game
//!
//! Core modules:
//! - `sim`: Deterministic game rules (sizes, dropping, merging, fail line)
//! - `platform`: Injected services (leaderboard, screen capture)
//! - `audio`: Sound/haptic requests gated by player settings
//! - `tuning`: Data-driven game balance
//!
//! Rigid-body physics and rendering live outside this crate: the host feeds
//! collisions and body positions in and applies the queued world commands.

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use platform::Collaborators;
pub use settings::Settings;
pub use sim::{GameSession, GameState};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by headless drivers (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 390.0;
    pub const FIELD_HEIGHT: f32 = 844.0;
    /// Horizontal line the held token slides along
    pub const DROP_Y: f32 = 640.0;

    /// Pause between a release and the next held token (seconds)
    pub const SETTLE_DELAY: f64 = 0.6;
    /// Only the six smallest classes are ever dropped
    pub const SPAWNABLE_COUNT: usize = 6;
    /// Max merge kick per axis
    pub const MERGE_IMPULSE: f32 = 15.0;

    /// Haptic intensity for a drop
    pub const DROP_HAPTIC: f32 = 0.3;
    /// Haptic range for merges (smallest to largest output)
    pub const MERGE_HAPTIC_MIN: f32 = 0.4;
    pub const MERGE_HAPTIC_MAX: f32 = 1.0;

    /// Welcome scene: horizontal margin for demo drops
    pub const DEMO_MARGIN: f32 = 100.0;
    /// Welcome scene: delay range between demo drops (seconds)
    pub const DEMO_DELAY_MIN: f64 = 1.0;
    pub const DEMO_DELAY_MAX: f64 = 3.0;
}
