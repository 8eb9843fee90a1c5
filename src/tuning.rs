//! Data-driven game balance
//!
//! Every gameplay constant that earlier builds of the game disagreed on lives
//! here, loadable from JSON. Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;
use crate::sim::endgame::EndgameConfig;
use crate::sim::size::{SIZE_CLASS_COUNT, SizeClass, SizeTable};

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("field bounds are inverted: min_x {min_x} >= max_x {max_x}")]
    InvertedBounds { min_x: f32, max_x: f32 },
    #[error("field width {width} cannot fit the largest token ({largest})")]
    FieldTooNarrow { width: f32, largest: f32 },
    #[error("fail line ({fail_line_y}) must sit below the drop line ({drop_y})")]
    FailLineAboveDrop { fail_line_y: f32, drop_y: f32 },
    #[error("countdown budget must be at least one second")]
    ZeroBudget,
    #[error("breach threshold must be at least one token")]
    ZeroThreshold,
    #[error("spawnable count {0} outside 1..=10")]
    SpawnableCount(usize),
    #[error("settle delay must be positive, got {0}")]
    SettleDelay(f64),
}

/// Gameplay tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub table: SizeTable,
    pub min_x: f32,
    pub max_x: f32,
    pub field_height: f32,
    /// Line along which the held token travels
    pub drop_y: f32,
    pub fail_line_y: f32,
    /// Settled tokens above the fail line that count as a breach
    pub breach_threshold: usize,
    /// Countdown length in seconds
    pub countdown_secs: u32,
    pub danger_band: f32,
    /// Delay between a release and the next held token (seconds)
    pub settle_delay: f64,
    /// How many of the smallest classes can be spawned
    pub spawnable_count: usize,
    /// Max merge kick per axis
    pub merge_impulse: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let endgame = EndgameConfig::default();
        Self {
            table: SizeTable::Classic,
            min_x: 0.0,
            max_x: consts::FIELD_WIDTH,
            field_height: consts::FIELD_HEIGHT,
            drop_y: consts::DROP_Y,
            fail_line_y: endgame.fail_line_y,
            breach_threshold: endgame.threshold,
            countdown_secs: endgame.budget_secs,
            danger_band: endgame.danger_band,
            settle_delay: consts::SETTLE_DELAY,
            spawnable_count: consts::SPAWNABLE_COUNT,
            merge_impulse: consts::MERGE_IMPULSE,
        }
    }
}

impl Tuning {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.min_x >= self.max_x {
            return Err(TuningError::InvertedBounds {
                min_x: self.min_x,
                max_x: self.max_x,
            });
        }
        let largest = self.table.units(SizeClass::largest());
        if self.max_x - self.min_x < largest {
            return Err(TuningError::FieldTooNarrow {
                width: self.max_x - self.min_x,
                largest,
            });
        }
        if self.fail_line_y >= self.drop_y {
            return Err(TuningError::FailLineAboveDrop {
                fail_line_y: self.fail_line_y,
                drop_y: self.drop_y,
            });
        }
        if self.countdown_secs == 0 {
            return Err(TuningError::ZeroBudget);
        }
        if self.breach_threshold == 0 {
            return Err(TuningError::ZeroThreshold);
        }
        if !(1..=SIZE_CLASS_COUNT).contains(&self.spawnable_count) {
            return Err(TuningError::SpawnableCount(self.spawnable_count));
        }
        if self.settle_delay <= 0.0 || self.settle_delay.is_nan() {
            return Err(TuningError::SettleDelay(self.settle_delay));
        }
        Ok(())
    }

    pub fn endgame(&self) -> EndgameConfig {
        EndgameConfig {
            fail_line_y: self.fail_line_y,
            threshold: self.breach_threshold,
            budget_secs: self.countdown_secs,
            danger_band: self.danger_band,
        }
    }
}
