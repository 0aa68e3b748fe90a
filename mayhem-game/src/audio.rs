//! Sound cues fired by the round timer and the setup flow.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Tick,
    RoundEnd,
    GameEnd,
    Start,
    Saved,
    Calculating,
}

impl AudioCue {
    #[must_use]
    pub const fn asset(self) -> &'static str {
        match self {
            Self::Tick => "/sounds/tick.mp3",
            Self::RoundEnd => "/sounds/buzzer.mp3",
            Self::GameEnd => "/sounds/game_over.mp3",
            Self::Start => "/sounds/start_beep.mp3",
            Self::Saved => "/sounds/game_saved.mp3",
            Self::Calculating => "/sounds/calculating.mp3",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::RoundEnd => "round_end",
            Self::GameEnd => "game_end",
            Self::Start => "start",
            Self::Saved => "saved",
            Self::Calculating => "calculating",
        }
    }
}

/// Cues raised by a single operation, in firing order.
pub type Cues = SmallVec<[AudioCue; 2]>;

/// Fire-and-forget playback. Implementations must not block and must
/// swallow their own failures.
pub trait CuePlayer {
    fn play(&mut self, cue: AudioCue);

    fn play_all(&mut self, cues: &[AudioCue]) {
        for cue in cues {
            self.play(*cue);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&mut self, cue: AudioCue) {
        log::trace!("muted cue {}", cue.key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<AudioCue>);

    impl CuePlayer for Recorder {
        fn play(&mut self, cue: AudioCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn play_all_preserves_order() {
        let mut recorder = Recorder::default();
        recorder.play_all(&[AudioCue::Saved, AudioCue::Start]);
        assert_eq!(recorder.0, vec![AudioCue::Saved, AudioCue::Start]);
    }

    #[test]
    fn every_cue_has_an_mp3_asset() {
        for cue in [
            AudioCue::Tick,
            AudioCue::RoundEnd,
            AudioCue::GameEnd,
            AudioCue::Start,
            AudioCue::Saved,
            AudioCue::Calculating,
        ] {
            assert!(cue.asset().starts_with("/sounds/"));
            assert!(cue.asset().ends_with(".mp3"));
        }
    }
}
