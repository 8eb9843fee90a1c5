//! Fail-line watch and game-over countdown
//!
//! Level-triggered: every tick the monitor counts settled tokens poking above
//! the fail line. While enough of them stay there, a one-second countdown
//! runs on the scheduler; as soon as the population drops it is cancelled and
//! the next breach starts from the full budget again.

use serde::{Deserialize, Serialize};

use super::schedule::{Scheduler, TaskHandle};
use super::token::Token;

/// Tunables for the fail line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndgameConfig {
    pub fail_line_y: f32,
    /// Tokens at or above the line needed to count as a breach
    pub threshold: usize,
    /// Countdown length in whole seconds
    pub budget_secs: u32,
    /// Height of the warning band below the line
    pub danger_band: f32,
}

impl Default for EndgameConfig {
    fn default() -> Self {
        Self {
            fail_line_y: 560.0,
            threshold: 3,
            budget_secs: 10,
            danger_band: 100.0,
        }
    }
}

/// Countdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Idle,
    Counting { remaining: u32, handle: TaskHandle },
}

/// Transitions reported back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndgameSignal {
    Started { remaining: u32 },
    Tick { remaining: u32 },
    Cancelled,
    Expired,
}

#[derive(Debug, Clone)]
pub struct EndgameMonitor {
    config: EndgameConfig,
    countdown: Countdown,
    danger: bool,
}

impl EndgameMonitor {
    pub fn new(config: EndgameConfig) -> Self {
        Self {
            config,
            countdown: Countdown::Idle,
            danger: false,
        }
    }

    pub fn config(&self) -> &EndgameConfig {
        &self.config
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Seconds left, if counting
    pub fn remaining(&self) -> Option<u32> {
        match self.countdown {
            Countdown::Idle => None,
            Countdown::Counting { remaining, .. } => Some(remaining),
        }
    }

    /// Advisory warning state of the fail line
    pub fn danger(&self) -> bool {
        self.danger
    }

    /// Settled tokens whose top edge reaches the fail line
    pub fn breach_count<'a>(&self, settled: impl IntoIterator<Item = &'a Token>) -> usize {
        settled
            .into_iter()
            .filter(|t| t.top() >= self.config.fail_line_y)
            .count()
    }

    /// Settled tokens whose top edge sits in the band just below the line
    pub fn near_count<'a>(&self, settled: impl IntoIterator<Item = &'a Token>) -> usize {
        let line = self.config.fail_line_y;
        let floor = line - self.config.danger_band;
        settled
            .into_iter()
            .filter(|t| {
                let top = t.top();
                top >= floor && top < line
            })
            .count()
    }

    /// Re-evaluate the breach condition.
    ///
    /// Starts the countdown (scheduling `task` every second) or cancels it.
    /// Returns the countdown transition, if any, and the new danger flag if it
    /// changed.
    pub fn update<'a, T, I>(
        &mut self,
        settled: I,
        scheduler: &mut Scheduler<T>,
        task: T,
    ) -> (Option<EndgameSignal>, Option<bool>)
    where
        T: Clone,
        I: IntoIterator<Item = &'a Token> + Clone,
    {
        let breached = self.breach_count(settled.clone()) >= self.config.threshold;
        let danger = self.near_count(settled) >= self.config.threshold;

        let danger_changed = if danger != self.danger {
            self.danger = danger;
            Some(danger)
        } else {
            None
        };

        let signal = match (self.countdown, breached) {
            (Countdown::Idle, true) => {
                let handle = scheduler.schedule_repeating(1.0, task);
                let remaining = self.config.budget_secs.max(1);
                self.countdown = Countdown::Counting { remaining, handle };
                log::info!("Fail line breached, game over in {}s", remaining);
                Some(EndgameSignal::Started { remaining })
            }
            (Countdown::Counting { handle, .. }, false) => {
                scheduler.cancel(handle);
                self.countdown = Countdown::Idle;
                log::info!("Fail line clear, countdown cancelled");
                Some(EndgameSignal::Cancelled)
            }
            _ => None,
        };

        (signal, danger_changed)
    }

    /// One countdown second elapsed. Stale handles are ignored.
    pub fn on_second<T: Clone>(
        &mut self,
        fired: TaskHandle,
        scheduler: &mut Scheduler<T>,
    ) -> Option<EndgameSignal> {
        let Countdown::Counting { remaining, handle } = self.countdown else {
            return None;
        };
        if handle != fired {
            return None;
        }

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            scheduler.cancel(handle);
            self.countdown = Countdown::Idle;
            log::info!("Countdown expired");
            Some(EndgameSignal::Expired)
        } else {
            self.countdown = Countdown::Counting { remaining, handle };
            Some(EndgameSignal::Tick { remaining })
        }
    }

    /// Back to idle, cancelling any running countdown
    pub fn reset<T: Clone>(&mut self, scheduler: &mut Scheduler<T>) {
        if let Countdown::Counting { handle, .. } = self.countdown {
            scheduler.cancel(handle);
        }
        self.countdown = Countdown::Idle;
        self.danger = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::size::{SizeClass, SizeTable};
    use crate::sim::token::TokenDescriptor;
    use glam::Vec2;

    fn coin_at(id: u32, y: f32) -> Token {
        Token {
            id,
            descriptor: TokenDescriptor::new(SizeClass::Coin, SizeTable::Classic),
            pos: Vec2::new(50.0 * id as f32, y),
        }
    }

    /// Three coins whose top edges sit exactly on the default line
    fn breaching() -> Vec<Token> {
        (1..=3).map(|i| coin_at(i, 545.0)).collect()
    }

    fn low() -> Vec<Token> {
        (1..=3).map(|i| coin_at(i, 100.0)).collect()
    }

    /// One second of session time: advance, re-check the line, then deliver ticks
    fn second(
        monitor: &mut EndgameMonitor,
        sched: &mut Scheduler<()>,
        tokens: &[Token],
    ) -> Vec<EndgameSignal> {
        let fired = sched.advance(1.0);
        let (signal, _) = monitor.update(tokens.iter(), sched, ());
        let mut out: Vec<EndgameSignal> = signal.into_iter().collect();
        for (handle, ()) in fired {
            out.extend(monitor.on_second(handle, sched));
        }
        out
    }

    #[test]
    fn test_counts() {
        let monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut tokens = breaching();
        tokens.push(coin_at(4, 500.0)); // top 515: in the band
        tokens.push(coin_at(5, 300.0));
        assert_eq!(monitor.breach_count(&tokens), 3);
        assert_eq!(monitor.near_count(&tokens), 1);
    }

    #[test]
    fn test_two_tokens_do_not_breach() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched = Scheduler::new();
        let tokens = &breaching()[..2];
        let (signal, _) = monitor.update(tokens.iter(), &mut sched, ());
        assert_eq!(signal, None);
        assert_eq!(monitor.countdown(), Countdown::Idle);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_sustained_breach_expires_after_budget() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched = Scheduler::new();
        let tokens = breaching();

        let (signal, _) = monitor.update(tokens.iter(), &mut sched, ());
        assert_eq!(signal, Some(EndgameSignal::Started { remaining: 10 }));

        let mut expired = 0;
        for s in 1..=10 {
            let signals = second(&mut monitor, &mut sched, &tokens);
            if s < 10 {
                assert!(signals.contains(&EndgameSignal::Tick { remaining: 10 - s }));
            }
            expired += signals.iter().filter(|s| **s == EndgameSignal::Expired).count();
            if s < 10 {
                assert_eq!(expired, 0, "expired early at second {s}");
            }
        }
        assert_eq!(expired, 1);
    }

    #[test]
    fn test_drop_below_threshold_resets_budget() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched = Scheduler::new();
        let high = breaching();

        monitor.update(high.iter(), &mut sched, ());
        for _ in 0..6 {
            second(&mut monitor, &mut sched, &high);
        }
        assert_eq!(monitor.remaining(), Some(4));

        let signals = second(&mut monitor, &mut sched, &low());
        assert!(signals.contains(&EndgameSignal::Cancelled));
        assert_eq!(monitor.countdown(), Countdown::Idle);
        assert!(sched.is_empty());

        let (signal, _) = monitor.update(high.iter(), &mut sched, ());
        assert_eq!(signal, Some(EndgameSignal::Started { remaining: 10 }));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched: Scheduler<()> = Scheduler::new();
        let stale = sched.schedule_once(0.0, ());
        monitor.update(breaching().iter(), &mut sched, ());
        assert_eq!(monitor.on_second(stale, &mut sched), None);
        assert_eq!(monitor.remaining(), Some(10));
    }

    #[test]
    fn test_danger_band_toggles() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched = Scheduler::new();
        let near: Vec<Token> = (1..=3).map(|i| coin_at(i, 480.0)).collect();
        let (_, changed) = monitor.update(near.iter(), &mut sched, ());
        assert_eq!(changed, Some(true));
        assert!(monitor.danger());
        assert_eq!(monitor.countdown(), Countdown::Idle);
        let (_, changed) = monitor.update(near.iter(), &mut sched, ());
        assert_eq!(changed, None);
        let (_, changed) = monitor.update(low().iter(), &mut sched, ());
        assert_eq!(changed, Some(false));
    }

    #[test]
    fn test_reset_cancels_countdown() {
        let mut monitor = EndgameMonitor::new(EndgameConfig::default());
        let mut sched = Scheduler::new();
        monitor.update(breaching().iter(), &mut sched, ());
        monitor.reset(&mut sched);
        assert_eq!(monitor.countdown(), Countdown::Idle);
        assert!(sched.is_empty());
    }
}
