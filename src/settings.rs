//! Player preferences
//!
//! Kept apart from gameplay tuning; the host decides where they are stored.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background music
    pub music: bool,
    /// Sound effects
    pub sound: bool,
    /// Haptic feedback
    pub vibrate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music: true,
            sound: true,
            vibrate: true,
        }
    }
}

impl Settings {
    pub fn toggle_music(&mut self) {
        self.music = !self.music;
    }

    pub fn toggle_sound(&mut self) {
        self.sound = !self.sound;
    }

    pub fn toggle_vibrate(&mut self) {
        self.vibrate = !self.vibrate;
    }
}
