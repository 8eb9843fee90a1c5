//! Platform abstraction layer
//!
//! Handles the services the game reaches outside itself:
//! - Audio/haptics (see [`crate::audio`])
//! - Leaderboard score submission
//! - Screen capture for sharing the final board
//!
//! All of them are injected into the session so tests can substitute fakes.

use crate::audio::{AudioSink, NullAudio};

/// Remote leaderboard. Failures are the implementation's problem.
pub trait Leaderboard {
    fn submit_score(&mut self, score: u64);
}

/// Opaque image reference returned by the host's capture service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotHandle(pub u64);

/// Captures the current board as an image
pub trait SnapshotSource {
    fn capture(&mut self) -> Option<SnapshotHandle>;
}

/// Leaderboard/snapshot stand-in that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl Leaderboard for Offline {
    fn submit_score(&mut self, _score: u64) {}
}

impl SnapshotSource for Offline {
    fn capture(&mut self) -> Option<SnapshotHandle> {
        None
    }
}

/// Everything the session talks to outside the simulation
pub struct Collaborators {
    pub audio: Box<dyn AudioSink>,
    pub leaderboard: Box<dyn Leaderboard>,
    pub snapshot: Box<dyn SnapshotSource>,
}

impl Collaborators {
    /// No sound, no leaderboard, no captures
    pub fn silent() -> Self {
        Self {
            audio: Box::new(NullAudio),
            leaderboard: Box::new(Offline),
            snapshot: Box::new(Offline),
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::silent()
    }
}
