//! Game session: owns score, state and every live token
//!
//! The host forwards pointer input, collisions and frame ticks here, then
//! drains the queued [`WorldCommand`]s and [`GameEvent`]s. All mutation
//! happens on the caller's thread; deferred work runs through the session's
//! [`Scheduler`] and is tagged with an epoch so nothing scheduled before a
//! reset can fire afterwards.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::drop::{DropController, HeldToken};
use super::endgame::EndgameMonitor;
use super::merge::{ContactBody, MergeOutcome, MergeResolver};
use super::schedule::Scheduler;
use super::size::{SizeClass, SizeTable};
use super::state::{GameEvent, GameState, WorldCommand};
use super::token::{Token, TokenDescriptor, TokenId};
use crate::audio::{AudioManager, SoundEffect};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::platform::{Collaborators, Leaderboard, SnapshotHandle, SnapshotSource};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Work scheduled for later on the simulation clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Deferred {
    /// Put the next held token in place after a release
    SpawnHeld {
        epoch: u64,
        released: SizeClass,
        fallback: Vec2,
    },
    /// One second of the game-over countdown
    CountdownSecond,
    /// Next decorative drop in the welcome scene
    DemoDrop { epoch: u64 },
}

pub struct GameSession {
    pub(crate) tuning: Tuning,
    pub(crate) state: GameState,
    pub(crate) score: u64,
    pub(crate) high_scores: HighScores,
    pub(crate) next_preview: TokenDescriptor,
    /// Released and merged tokens, sorted by id
    pub(crate) tokens: Vec<Token>,
    pub(crate) drop: DropController,
    pub(crate) merge: MergeResolver,
    pub(crate) endgame: EndgameMonitor,
    pub(crate) scheduler: Scheduler<Deferred>,
    pub(crate) rng: Pcg32,
    /// Bumped on every reset and every exit from `Playing`
    pub(crate) epoch: u64,
    next_id: TokenId,
    /// Remaining demo drops, popped from the back
    pub(crate) demo_queue: Vec<SizeClass>,
    pub(crate) audio: AudioManager,
    leaderboard: Box<dyn Leaderboard>,
    snapshot: Box<dyn SnapshotSource>,
    last_snapshot: Option<SnapshotHandle>,
    pub(crate) commands: Vec<WorldCommand>,
    pub(crate) events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("score", &self.score)
            .field("tokens", &self.tokens.len())
            .field("held", &self.drop.held().map(|h| h.id))
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Create a session in the welcome scene
    pub fn new(tuning: Tuning, settings: Settings, collaborators: Collaborators, seed: u64) -> Self {
        let Collaborators {
            audio,
            leaderboard,
            snapshot,
        } = collaborators;
        let mut audio = AudioManager::new(audio);
        audio.apply_settings(&settings);

        let mut rng = Pcg32::seed_from_u64(seed);
        let next_preview = TokenDescriptor::new(
            SizeTable::spawnable(&mut rng, tuning.spawnable_count),
            tuning.table,
        );

        let mut session = Self {
            drop: DropController::new(tuning.min_x, tuning.max_x, tuning.drop_y),
            merge: MergeResolver::new(tuning.table, tuning.min_x, tuning.max_x, tuning.merge_impulse),
            endgame: EndgameMonitor::new(tuning.endgame()),
            tuning,
            state: GameState::Welcome,
            score: 0,
            high_scores: HighScores::new(),
            next_preview,
            tokens: Vec::new(),
            scheduler: Scheduler::new(),
            rng,
            epoch: 0,
            next_id: 1,
            demo_queue: Vec::new(),
            audio,
            leaderboard,
            snapshot,
            last_snapshot: None,
            commands: Vec::new(),
            events: Vec::new(),
        };
        session.start_demo();
        session
    }

    /// Default tuning and settings, no collaborators
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Tuning::default(), Settings::default(), Collaborators::silent(), seed)
    }

    // === Accessors ===

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_scores.best()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Seed the high-score table (e.g. from the host's storage)
    pub fn set_high_scores(&mut self, scores: HighScores) {
        self.high_scores = scores;
    }

    /// Descriptor shown in the "next" preview
    pub fn next_preview(&self) -> &TokenDescriptor {
        &self.next_preview
    }

    pub fn held(&self) -> Option<&HeldToken> {
        self.drop.held()
    }

    /// Released and merged tokens, sorted by id
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.index_of(id).map(|i| &self.tokens[i])
    }

    /// Seconds left before game over, if the fail line is breached
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.endgame.remaining()
    }

    pub fn danger(&self) -> bool {
        self.endgame.danger()
    }

    /// Capture taken at the last game over
    pub fn last_snapshot(&self) -> Option<SnapshotHandle> {
        self.last_snapshot
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Simulated seconds since the session was created
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Take the queued world commands
    pub fn drain_commands(&mut self) -> Vec<WorldCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Take the queued gameplay events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.audio.apply_settings(settings);
    }

    // === Lifecycle ===

    /// Begin a fresh run (welcome -> playing, game over -> playing)
    pub fn start(&mut self) {
        self.reset(true);
    }

    /// Leave the run for the welcome scene
    pub fn exit_to_welcome(&mut self) {
        self.reset(false);
    }

    /// Clear the board and either start playing or return to the welcome scene.
    ///
    /// Any deferred spawn or running countdown from before the reset is discarded.
    pub fn reset(&mut self, start_playing: bool) {
        self.invalidate_deferred();

        self.tokens.clear();
        self.drop.clear();
        self.demo_queue.clear();
        self.commands.push(WorldCommand::Clear);
        self.commands.push(WorldCommand::FailLineDanger(false));

        self.score = 0;
        self.events.push(GameEvent::ScoreChanged(0));

        if start_playing {
            self.set_state(GameState::Playing);
            let first = self.random_descriptor();
            let center = (self.tuning.min_x + self.tuning.max_x) / 2.0;
            self.place_held(first, Vec2::new(center, self.tuning.drop_y));
            self.roll_next_preview();
            log::info!("Run started (epoch {})", self.epoch);
        } else {
            self.commands.push(WorldCommand::GuideVisible(false));
            self.set_state(GameState::Welcome);
            self.start_demo();
        }
    }

    /// Cancel everything scheduled under the current epoch
    fn invalidate_deferred(&mut self) {
        self.epoch += 1;
        self.endgame.reset(&mut self.scheduler);
        self.scheduler.clear();
    }

    pub(crate) fn set_state(&mut self, state: GameState) {
        if self.state != state {
            self.state = state;
            self.events.push(GameEvent::StateChanged(state));
        }
    }

    /// End the run: record the score, notify the leaderboard and capture the board
    pub fn on_game_over(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        self.invalidate_deferred();

        if let Some(held) = self.drop.take_held() {
            self.commands.push(WorldCommand::Destroy { id: held.id });
        }
        self.commands.push(WorldCommand::GuideVisible(false));

        let score = self.score;
        let now = self.now();
        let new_high_score = self.high_scores.is_new_best(score);
        self.high_scores.add_score(score, now);
        if new_high_score {
            log::info!("New high score: {}", score);
            self.leaderboard.submit_score(score);
        }

        self.last_snapshot = self.snapshot.capture();

        self.audio.play(SoundEffect::GameOver);
        if new_high_score {
            self.audio.play(SoundEffect::HighScore);
        }

        log::info!("Game over with score {}", score);
        self.set_state(GameState::GameOver);
        self.events.push(GameEvent::GameOver {
            score,
            new_high_score,
        });
    }

    // === Pointer input ===

    pub fn on_pointer_down(&mut self, x: f32) {
        if self.state != GameState::Playing {
            return;
        }
        if let Some(pos) = self.drop.begin_drag(x) {
            self.push_held_moved(pos);
        }
    }

    pub fn on_pointer_moved(&mut self, x: f32) {
        if self.state != GameState::Playing {
            return;
        }
        if let Some(pos) = self.drop.continue_drag(x) {
            self.push_held_moved(pos);
        }
    }

    /// Release the held token and schedule the next one
    pub fn on_pointer_up(&mut self, x: f32) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(release) = self.drop.release(x) else {
            return;
        };
        let HeldToken { id, descriptor, pos } = release.token;

        self.insert_token(Token { id, descriptor, pos });
        self.commands.push(WorldCommand::Move { id, pos });
        self.commands.push(WorldCommand::MakeDynamic { id });
        self.commands.push(WorldCommand::GuideVisible(false));
        self.events.push(GameEvent::Dropped {
            id,
            size: descriptor.size,
        });
        self.audio.play(SoundEffect::Drop);
        self.audio.haptic(DROP_HAPTIC);
        log::debug!("Dropped {} ({:?}) at x={:.1}", id, descriptor.size, pos.x);

        self.scheduler.schedule_once(
            self.tuning.settle_delay,
            Deferred::SpawnHeld {
                epoch: self.epoch,
                released: descriptor.size,
                fallback: release.fallback,
            },
        );
    }

    fn push_held_moved(&mut self, pos: Vec2) {
        if let Some(held) = self.drop.held() {
            self.commands.push(WorldCommand::Move { id: held.id, pos });
            self.commands.push(WorldCommand::GuideMoved { x: pos.x });
        }
    }

    // === Collisions ===

    /// A contact between two bodies, reported by the physics collaborator.
    ///
    /// Returns the merge that was applied, if any. Contacts involving the held
    /// token, unknown ids, or tokens already consumed this frame are ignored.
    pub fn on_collision(&mut self, a: TokenId, b: TokenId) -> Option<MergeOutcome> {
        if self.state != GameState::Playing {
            return None;
        }
        let a = self.contact_body(a)?;
        let b = self.contact_body(b)?;
        if a.size.is_largest() || b.size.is_largest() {
            return None;
        }

        let outcome = self.merge.resolve(&a, &b, &mut self.rng)?;
        self.apply_merge(&outcome);
        Some(outcome)
    }

    fn contact_body(&self, id: TokenId) -> Option<ContactBody> {
        self.token(id).map(|t| ContactBody {
            id: t.id,
            size: t.descriptor.size,
            pos: t.pos,
        })
    }

    fn apply_merge(&mut self, outcome: &MergeOutcome) {
        for id in outcome.consumed {
            if let Some(i) = self.index_of(id) {
                self.tokens.remove(i);
            }
            self.commands.push(WorldCommand::Destroy { id });
        }

        let descriptor = TokenDescriptor::new(outcome.size, self.tuning.table);
        let id = self.spawn_dynamic(descriptor, outcome.pos);
        self.commands.push(WorldCommand::ApplyImpulse {
            id,
            impulse: outcome.impulse,
        });

        self.score += outcome.score_delta;
        self.events.push(GameEvent::Merged {
            size: outcome.size,
            pos: outcome.pos,
            score_delta: outcome.score_delta,
        });
        self.events.push(GameEvent::ScoreChanged(self.score));

        let t = outcome.size.rank() as f32 / (SizeClass::largest().rank() as f32);
        self.audio.play(SoundEffect::Merge);
        self.audio
            .haptic(MERGE_HAPTIC_MIN + (MERGE_HAPTIC_MAX - MERGE_HAPTIC_MIN) * t);
    }

    // === Token bookkeeping ===

    pub(crate) fn allocate_id(&mut self) -> TokenId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: TokenId) -> Option<usize> {
        self.tokens.binary_search_by_key(&id, |t| t.id).ok()
    }

    /// Insert keeping id order (released tokens may be older than merge outputs)
    fn insert_token(&mut self, token: Token) {
        let at = self.tokens.partition_point(|t| t.id < token.id);
        self.tokens.insert(at, token);
    }

    /// Create a physics-active token
    pub(crate) fn spawn_dynamic(&mut self, descriptor: TokenDescriptor, pos: Vec2) -> TokenId {
        let id = self.allocate_id();
        self.tokens.push(Token { id, descriptor, pos });
        self.commands.push(WorldCommand::Spawn {
            id,
            descriptor,
            pos,
            dynamic: true,
        });
        id
    }

    /// Create the pointer-controlled token and show the guide under it
    pub(crate) fn place_held(&mut self, descriptor: TokenDescriptor, pos: Vec2) {
        let id = self.allocate_id();
        let held = self.drop.hold(id, descriptor, pos);
        self.commands.push(WorldCommand::Spawn {
            id,
            descriptor,
            pos: held.pos,
            dynamic: false,
        });
        self.commands.push(WorldCommand::GuideMoved { x: held.pos.x });
        self.commands.push(WorldCommand::GuideVisible(true));
    }

    /// Promote the preview to the held token and roll a new preview
    pub(crate) fn spawn_next_held(&mut self, released: SizeClass, fallback: Vec2) {
        let released = TokenDescriptor::new(released, self.tuning.table);
        let upcoming = self.next_preview;
        let pos = self.drop.next_spawn_position(&released, &upcoming, fallback);
        self.place_held(upcoming, pos);
        self.roll_next_preview();
    }

    pub(crate) fn random_descriptor(&mut self) -> TokenDescriptor {
        let size = SizeTable::spawnable(&mut self.rng, self.tuning.spawnable_count);
        TokenDescriptor::new(size, self.tuning.table)
    }

    pub(crate) fn roll_next_preview(&mut self) {
        self.next_preview = self.random_descriptor();
        self.events
            .push(GameEvent::NextPreviewChanged(self.next_preview.size));
    }

    // === Welcome scene ===

    /// Queue one decorative drop of every class in shuffled order
    fn start_demo(&mut self) {
        let mut sizes = SizeClass::ALL.to_vec();
        sizes.shuffle(&mut self.rng);
        self.demo_queue = sizes;
        self.scheduler
            .schedule_once(0.0, Deferred::DemoDrop { epoch: self.epoch });
    }

    pub(crate) fn demo_drop(&mut self) {
        let Some(size) = self.demo_queue.pop() else {
            return;
        };
        let descriptor = TokenDescriptor::new(size, self.tuning.table);

        let lo = self.tuning.min_x + DEMO_MARGIN;
        let hi = self.tuning.max_x - DEMO_MARGIN;
        let x = if lo < hi {
            self.rng.random_range(lo..hi)
        } else {
            (self.tuning.min_x + self.tuning.max_x) / 2.0
        };
        let y = self.tuning.field_height - descriptor.visual.y;
        self.spawn_dynamic(descriptor, Vec2::new(x, y));

        if !self.demo_queue.is_empty() {
            let delay = self.rng.random_range(DEMO_DELAY_MIN..=DEMO_DELAY_MAX);
            self.scheduler
                .schedule_once(delay, Deferred::DemoDrop { epoch: self.epoch });
        }
    }
}
