//! Session phase plus the command/event vocabulary shared with the host
//!
//! The session never touches rendering or rigid bodies directly; it queues
//! [`WorldCommand`]s for the physics/render collaborator and [`GameEvent`]s
//! for the UI.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::size::SizeClass;
use super::token::{TokenDescriptor, TokenId};

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Idle demo scene, no scoring
    #[default]
    Welcome,
    /// Active session
    Playing,
    /// Run ended, waiting for restart or exit
    GameOver,
}

/// Position of a body as reported by the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub id: TokenId,
    pub pos: Vec2,
}

/// Instructions for the physics/render collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorldCommand {
    /// Create a body; static bodies follow the pointer until made dynamic
    Spawn {
        id: TokenId,
        descriptor: TokenDescriptor,
        pos: Vec2,
        dynamic: bool,
    },
    Move { id: TokenId, pos: Vec2 },
    MakeDynamic { id: TokenId },
    ApplyImpulse { id: TokenId, impulse: Vec2 },
    Destroy { id: TokenId },
    /// Remove every token body
    Clear,
    GuideMoved { x: f32 },
    GuideVisible(bool),
    /// Advisory fail-line coloring
    FailLineDanger(bool),
}

/// Gameplay notifications for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    StateChanged(GameState),
    Dropped { id: TokenId, size: SizeClass },
    Merged { size: SizeClass, pos: Vec2, score_delta: u64 },
    ScoreChanged(u64),
    NextPreviewChanged(SizeClass),
    CountdownStarted { remaining: u32 },
    CountdownTick { remaining: u32 },
    CountdownCancelled,
    GameOver { score: u64, new_high_score: bool },
}
