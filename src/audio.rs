//! Sound and haptic requests
//!
//! The game only decides *when* something should be heard or felt. Playback
//! belongs to the host, reached through an [`AudioSink`].

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Held token released
    Drop,
    /// Two tokens merged
    Merge,
    /// Countdown second while the fail line is breached
    Warning,
    /// Game over
    GameOver,
    /// New high score
    HighScore,
}

/// Host-side playback. Calls are fire-and-forget.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    /// Intensity in 0.0 - 1.0
    fn haptic(&mut self, intensity: f32);
    /// Start/stop background music
    fn music(&mut self, _playing: bool) {}
}

/// Sink that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
    fn haptic(&mut self, _intensity: f32) {}
}

/// Audio manager for the game: applies the player's toggles before
/// forwarding to the sink
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    sound: bool,
    vibrate: bool,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("sound", &self.sound)
            .field("vibrate", &self.vibrate)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            sound: true,
            vibrate: true,
            muted: false,
        }
    }

    /// Pick up the player's toggles
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sound = settings.sound;
        self.vibrate = settings.vibrate;
        self.sink.music(settings.music);
    }

    /// Mute/unmute all audio (haptics unaffected)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn sound_enabled(&self) -> bool {
        self.sound && !self.muted
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.sound_enabled() {
            self.sink.play(effect);
        }
    }

    /// Request a haptic pulse
    pub fn haptic(&mut self, intensity: f32) {
        if self.vibrate {
            self.sink.haptic(intensity.clamp(0.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        sounds: Rc<RefCell<Vec<SoundEffect>>>,
        haptics: Rc<RefCell<Vec<f32>>>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.sounds.borrow_mut().push(effect);
        }
        fn haptic(&mut self, intensity: f32) {
            self.haptics.borrow_mut().push(intensity);
        }
    }

    #[test]
    fn test_toggles_gate_requests() {
        let rec = Recorder::default();
        let sounds = rec.sounds.clone();
        let haptics = rec.haptics.clone();
        let mut audio = AudioManager::new(Box::new(rec));

        audio.play(SoundEffect::Drop);
        audio.haptic(2.0);
        assert_eq!(*sounds.borrow(), vec![SoundEffect::Drop]);
        assert_eq!(*haptics.borrow(), vec![1.0]);

        audio.apply_settings(&Settings {
            sound: false,
            vibrate: false,
            ..Settings::default()
        });
        audio.play(SoundEffect::Merge);
        audio.haptic(0.5);
        assert_eq!(sounds.borrow().len(), 1);
        assert_eq!(haptics.borrow().len(), 1);
    }

    #[test]
    fn test_mute_silences_sound_only() {
        let rec = Recorder::default();
        let sounds = rec.sounds.clone();
        let haptics = rec.haptics.clone();
        let mut audio = AudioManager::new(Box::new(rec));
        audio.set_muted(true);
        audio.play(SoundEffect::GameOver);
        audio.haptic(0.3);
        assert!(sounds.borrow().is_empty());
        assert_eq!(haptics.borrow().len(), 1);
    }
}
