//! Booty Drop headless driver
//!
//! Plays a seeded game against a crude stand-in world: tokens fall straight
//! down and stack as circles, no sliding or bouncing. Good enough to exercise
//! dropping, merging and the fail-line countdown end to end.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use booty_drop::consts::SIM_DT;
    use booty_drop::sim::{BodyState, GameEvent, Token, TokenId, WorldCommand};
    use booty_drop::{Collaborators, GameSession, GameState, Settings, Tuning};

    /// Headless autoplay for the Booty Drop simulation core.
    #[derive(Debug, Parser)]
    #[command(name = "booty-drop", version, about)]
    pub struct Args {
        /// Tuning JSON file. Built-in balance is used if not set.
        #[arg(short, long, value_name = "FILE")]
        pub tuning: Option<PathBuf>,

        /// RNG seed for both the session and the autoplayer
        #[arg(short, long, default_value = "1")]
        pub seed: u64,

        /// Give up after this many simulated seconds
        #[arg(long, default_value = "900", value_name = "SECS")]
        pub max_seconds: u32,

        /// Print a JSON summary (including the final board) instead of text
        #[arg(long)]
        pub json: bool,
    }

    #[derive(Debug, Clone, Copy)]
    struct Body {
        pos: Vec2,
        radius: f32,
        dynamic: bool,
    }

    /// Column-stacking stand-in for a rigid-body world
    #[derive(Debug)]
    struct StackWorld {
        bodies: BTreeMap<TokenId, Body>,
        min_x: f32,
        max_x: f32,
    }

    impl StackWorld {
        fn new(tuning: &Tuning) -> Self {
            Self {
                bodies: BTreeMap::new(),
                min_x: tuning.min_x,
                max_x: tuning.max_x,
            }
        }

        fn apply(&mut self, commands: Vec<WorldCommand>) {
            for command in commands {
                match command {
                    WorldCommand::Spawn {
                        id,
                        descriptor,
                        pos,
                        dynamic,
                    } => {
                        let radius = descriptor.half_width();
                        self.bodies.insert(id, Body { pos, radius, dynamic });
                    }
                    WorldCommand::Move { id, pos } => {
                        if let Some(body) = self.bodies.get_mut(&id) {
                            body.pos = pos;
                        }
                    }
                    WorldCommand::MakeDynamic { id } => {
                        if let Some(body) = self.bodies.get_mut(&id) {
                            body.dynamic = true;
                        }
                    }
                    WorldCommand::ApplyImpulse { id, impulse } => {
                        // Only the sideways part matters when nothing bounces
                        if let Some(body) = self.bodies.get_mut(&id) {
                            let x = body.pos.x + impulse.x * 0.5;
                            body.pos.x = x.clamp(self.min_x + body.radius, self.max_x - body.radius);
                        }
                    }
                    WorldCommand::Destroy { id } => {
                        self.bodies.remove(&id);
                    }
                    WorldCommand::Clear => self.bodies.clear(),
                    WorldCommand::GuideMoved { .. }
                    | WorldCommand::GuideVisible(_)
                    | WorldCommand::FailLineDanger(_) => {}
                }
            }
        }

        /// Let every dynamic body fall to rest, lowest first. Returns touching pairs.
        fn step(&mut self) -> Vec<(TokenId, TokenId)> {
            let mut order: Vec<(TokenId, Body)> = self
                .bodies
                .iter()
                .filter(|(_, b)| b.dynamic)
                .map(|(id, b)| (*id, *b))
                .collect();
            order.sort_by(|a, b| a.1.pos.y.total_cmp(&b.1.pos.y));

            let mut placed: Vec<(TokenId, Body)> = Vec::with_capacity(order.len());
            for (id, mut body) in order {
                let mut rest = body.radius;
                for (_, other) in &placed {
                    let reach = body.radius + other.radius;
                    let dx = (body.pos.x - other.pos.x).abs();
                    if dx < reach {
                        rest = rest.max(other.pos.y + (reach * reach - dx * dx).sqrt());
                    }
                }
                body.pos.y = rest;
                placed.push((id, body));
            }

            let mut contacts = Vec::new();
            for (i, (a, body_a)) in placed.iter().enumerate() {
                for (b, body_b) in &placed[i + 1..] {
                    let reach = body_a.radius + body_b.radius + 0.5;
                    if body_a.pos.distance_squared(body_b.pos) <= reach * reach {
                        contacts.push((*a, *b));
                    }
                }
            }

            for (id, body) in placed {
                self.bodies.insert(id, body);
            }
            contacts
        }

        fn states(&self) -> Vec<BodyState> {
            self.bodies
                .iter()
                .filter(|(_, b)| b.dynamic)
                .map(|(id, b)| BodyState { id: *id, pos: b.pos })
                .collect()
        }
    }

    /// Aim at a resting token of the held size, otherwise pick a random spot
    fn choose_drop_x(session: &GameSession, rng: &mut Pcg32) -> Option<f32> {
        let held = session.held()?;
        let size = held.descriptor.size;
        let target = session
            .tokens()
            .iter()
            .filter(|t| t.descriptor.size == size)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|t| t.pos.x);
        let tuning = session.tuning();
        Some(target.unwrap_or_else(|| rng.random_range(tuning.min_x..tuning.max_x)))
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        score: u64,
        seconds: f64,
        drops: u32,
        merges: u32,
        finished: bool,
        board: Vec<Token>,
    }

    pub fn run(args: Args) -> Result<()> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };

        let mut world = StackWorld::new(&tuning);
        let mut session = GameSession::new(tuning, Settings::default(), Collaborators::silent(), args.seed);
        let mut rng = Pcg32::seed_from_u64(args.seed.wrapping_add(1));

        session.start();
        world.apply(session.drain_commands());

        let max_frames = (f64::from(args.max_seconds) / f64::from(SIM_DT)) as u64;
        let mut drops = 0u32;
        let mut merges = 0u32;
        let mut finished = false;

        for _ in 0..max_frames {
            if let Some(x) = choose_drop_x(&session, &mut rng) {
                session.on_pointer_down(x);
                session.on_pointer_up(x);
            }
            world.apply(session.drain_commands());

            for (a, b) in world.step() {
                session.on_collision(a, b);
            }
            world.apply(session.drain_commands());

            session.tick(SIM_DT, &world.states());
            world.apply(session.drain_commands());

            for event in session.drain_events() {
                match event {
                    GameEvent::Dropped { .. } => drops += 1,
                    GameEvent::Merged { .. } => merges += 1,
                    GameEvent::CountdownStarted { remaining } => {
                        log::debug!("Countdown started ({}s)", remaining)
                    }
                    GameEvent::GameOver { .. } => finished = true,
                    _ => {}
                }
            }
            if session.state() == GameState::GameOver {
                finished = true;
                break;
            }
        }

        if !finished {
            log::warn!("Stopped after {}s without a game over", args.max_seconds);
        }

        let summary = Summary {
            seed: args.seed,
            score: session.score(),
            seconds: session.now(),
            drops,
            merges,
            finished,
            board: session.tokens().to_vec(),
        };

        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!(
                "seed {}: score {} after {:.1}s ({} drops, {} merges, {} tokens on the board)",
                summary.seed,
                summary.score,
                summary.seconds,
                summary.drops,
                summary.merges,
                summary.board.len()
            );
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    log::info!("Booty Drop (headless) starting...");
    headless::run(headless::Args::parse())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
