use std::io::{Write, stderr};

use colored::Colorize;
use mayhem_game::{AudioCue, CuePlayer};

/// Terminal stand-in for the sound effects: a bell for ticks and a short
/// tag for everything else. Output errors are ignored.
#[derive(Debug, Clone, Copy)]
pub enum Speaker {
    Terminal,
    Muted,
}

impl Speaker {
    #[must_use]
    pub const fn new(mute: bool) -> Self {
        if mute { Self::Muted } else { Self::Terminal }
    }
}

fn cue_tag(cue: AudioCue) -> Option<&'static str> {
    match cue {
        AudioCue::Tick => None,
        AudioCue::RoundEnd => Some("📣 BUZZER"),
        AudioCue::GameEnd => Some("🏁 GAME OVER"),
        AudioCue::Start => Some("▶ beep"),
        AudioCue::Saved => Some("💾 saved"),
        AudioCue::Calculating => Some("🎲 calculating..."),
    }
}

impl CuePlayer for Speaker {
    fn play(&mut self, cue: AudioCue) {
        log::trace!("cue {} ({})", cue.key(), cue.asset());
        if matches!(self, Self::Muted) {
            return;
        }
        let mut err = stderr();
        let _ = match cue_tag(cue) {
            Some(tag) => writeln!(err, "{}", tag.dimmed()),
            None => write!(err, "\x07"),
        };
        let _ = err.flush();
    }
}
