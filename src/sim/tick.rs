//! Per-frame session update
//!
//! Order within a tick: sync body positions, advance the clock, re-check the
//! fail line, then run whatever deferred work fell due. Checking the line
//! before dispatching means a countdown second and the cancel that would
//! supersede it are never both delivered in the same frame.

use super::endgame::EndgameSignal;
use super::session::{Deferred, GameSession};
use super::state::{BodyState, GameEvent, GameState, WorldCommand};
use crate::audio::SoundEffect;

impl GameSession {
    /// Advance the session by `dt` seconds.
    ///
    /// `bodies` carries the positions the physics collaborator reported for
    /// this frame; ids the session does not know are ignored.
    pub fn tick(&mut self, dt: f32, bodies: &[BodyState]) {
        self.sync_bodies(bodies);

        let fired = self.scheduler.advance(f64::from(dt.max(0.0)));

        if self.state == GameState::Playing {
            self.check_fail_line();
        }

        for (handle, task) in fired {
            match task {
                Deferred::SpawnHeld {
                    epoch,
                    released,
                    fallback,
                } => {
                    if epoch != self.epoch || self.state != GameState::Playing {
                        log::debug!("Dropping stale spawn from epoch {}", epoch);
                        continue;
                    }
                    self.spawn_next_held(released, fallback);
                }
                Deferred::CountdownSecond => {
                    match self.endgame.on_second(handle, &mut self.scheduler) {
                        Some(EndgameSignal::Tick { remaining }) => {
                            self.events.push(GameEvent::CountdownTick { remaining });
                            self.audio.play(SoundEffect::Warning);
                        }
                        Some(EndgameSignal::Expired) => self.on_game_over(),
                        _ => {}
                    }
                }
                Deferred::DemoDrop { epoch } => {
                    if epoch != self.epoch || self.state != GameState::Welcome {
                        continue;
                    }
                    self.demo_drop();
                }
            }
        }
    }

    fn sync_bodies(&mut self, bodies: &[BodyState]) {
        for body in bodies {
            if let Ok(i) = self.tokens.binary_search_by_key(&body.id, |t| t.id) {
                self.tokens[i].pos = body.pos;
            }
        }
    }

    fn check_fail_line(&mut self) {
        let (signal, danger) = self.endgame.update(
            self.tokens.iter(),
            &mut self.scheduler,
            Deferred::CountdownSecond,
        );

        if let Some(danger) = danger {
            self.commands.push(WorldCommand::FailLineDanger(danger));
        }
        match signal {
            Some(EndgameSignal::Started { remaining }) => {
                self.events.push(GameEvent::CountdownStarted { remaining });
            }
            Some(EndgameSignal::Cancelled) => {
                self.events.push(GameEvent::CountdownCancelled);
            }
            _ => {}
        }
    }
}
