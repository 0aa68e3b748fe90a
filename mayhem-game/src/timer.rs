//! Round clock: ten timed days, each ending with a needed-supply draw.
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::audio::{AudioCue, Cues};
use crate::constants::{
    CRITICAL_SECS, CUE_CADENCE_CALM_MS, CUE_CADENCE_CRITICAL_MS, CUE_CADENCE_URGENT_MS,
    MAX_ROUNDS, ROUND_DURATION_MAX_SECS, ROUND_DURATION_MIN_SECS, SHAKE_SECS, URGENT_SECS,
};
use crate::numbers::fraction;
use crate::supply::SupplyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Calm,
    Urgent,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A paused round picked up where it left off.
    Resumed,
    /// A fresh round is drawn; the board must be recalculated first.
    SetupRequired,
    /// All rounds are played; only a reset starts over.
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is paused or already at zero.
    Idle,
    Counting { time_left: u32 },
    RoundOver { next_round: u32, needed: SupplyKind },
    GameOver,
}

impl TickOutcome {
    #[must_use]
    pub fn cues(self) -> Cues {
        match self {
            Self::Idle | Self::Counting { .. } => Cues::new(),
            Self::RoundOver { .. } => smallvec![AudioCue::RoundEnd],
            Self::GameOver => smallvec![AudioCue::GameEnd],
        }
    }
}

/// Headings and button text for the board setup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupCopy {
    pub title: &'static str,
    pub subtitle: String,
    pub description: &'static str,
    pub proceed_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTimer {
    pub round: u32,
    pub time_left: u32,
    pub round_duration: u32,
    pub active: bool,
    pub needed_supply: Option<SupplyKind>,
    pub setup_open: bool,
}

/// Random round length in seconds.
pub fn draw_round_duration(rng: &mut impl Rng) -> u32 {
    rng.gen_range(ROUND_DURATION_MIN_SECS..=ROUND_DURATION_MAX_SECS)
}

impl RoundTimer {
    /// Fresh, unstarted game with setup open.
    pub fn new(rng: &mut impl Rng) -> Self {
        let round_duration = draw_round_duration(rng);
        Self {
            round: 0,
            time_left: round_duration,
            round_duration,
            active: false,
            needed_supply: None,
            setup_open: true,
        }
    }

    /// Rebuild from persisted values. Restored timers are always paused, and
    /// setup reopens when nothing has been played yet or a new day is pending.
    #[must_use]
    pub fn restore(
        round: u32,
        time_left: u32,
        round_duration: u32,
        needed_supply: Option<SupplyKind>,
    ) -> Self {
        let round_duration = round_duration.max(1);
        let time_left = time_left.min(round_duration);
        Self {
            round: round.min(MAX_ROUNDS),
            time_left,
            round_duration,
            active: false,
            needed_supply,
            setup_open: round == 0 || time_left == round_duration,
        }
    }

    #[must_use]
    pub const fn is_resumable(&self) -> bool {
        self.time_left < self.round_duration && self.time_left > 0 && self.round > 0
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.round >= MAX_ROUNDS && self.time_left == 0
    }

    /// Start button: resume a paused round, or draw a new one and open setup.
    pub fn start(&mut self, rng: &mut impl Rng) -> (StartOutcome, Cues) {
        if self.is_resumable() {
            self.active = true;
            return (StartOutcome::Resumed, smallvec![AudioCue::Start]);
        }
        if self.is_game_over() {
            return (StartOutcome::GameOver, Cues::new());
        }
        self.round_duration = draw_round_duration(rng);
        self.time_left = self.round_duration;
        self.needed_supply = None;
        self.setup_open = true;
        (StartOutcome::SetupRequired, Cues::new())
    }

    /// Leave setup and start the countdown.
    pub fn proceed(&mut self) -> Cues {
        self.setup_open = false;
        if self.round == 0 {
            self.round = 1;
        }
        self.active = true;
        log::info!("round {} started ({}s)", self.round, self.time_left);
        smallvec![AudioCue::Saved, AudioCue::Start]
    }

    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Opening the guide pauses a running round. Returns whether it did.
    pub fn open_guide(&mut self) -> bool {
        let was_active = self.active;
        self.pause();
        was_active
    }

    /// Advance one second.
    pub fn tick(&mut self, rng: &mut impl Rng) -> TickOutcome {
        if !self.active || self.time_left == 0 {
            return TickOutcome::Idle;
        }
        self.time_left -= 1;
        if self.time_left > 0 {
            return TickOutcome::Counting {
                time_left: self.time_left,
            };
        }

        self.active = false;
        if self.round < MAX_ROUNDS {
            let needed = SupplyKind::random(rng);
            self.needed_supply = Some(needed);
            self.round += 1;
            log::info!("day complete; needed supply {needed}");
            TickOutcome::RoundOver {
                next_round: self.round,
                needed,
            }
        } else {
            log::info!("final round complete");
            TickOutcome::GameOver
        }
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        *self = Self::new(rng);
    }

    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        if self.time_left <= CRITICAL_SECS {
            Urgency::Critical
        } else if self.time_left <= URGENT_SECS {
            Urgency::Urgent
        } else {
            Urgency::Calm
        }
    }

    #[must_use]
    pub const fn is_shaking(&self) -> bool {
        self.active && self.time_left <= SHAKE_SECS
    }

    /// Interval between tick cues, or `None` when no cue should play.
    #[must_use]
    pub const fn cue_cadence(&self) -> Option<Duration> {
        if !self.active || self.time_left == 0 {
            return None;
        }
        let millis = match self.urgency() {
            Urgency::Calm => CUE_CADENCE_CALM_MS,
            Urgency::Urgent => CUE_CADENCE_URGENT_MS,
            Urgency::Critical => CUE_CADENCE_CRITICAL_MS,
        };
        Some(Duration::from_millis(millis))
    }

    /// Remaining share of the round, `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        fraction(self.time_left, self.round_duration)
    }

    #[must_use]
    pub fn start_label(&self) -> String {
        if self.is_resumable() {
            "RESUME GAME".to_string()
        } else if self.round == 0 {
            "START GAME".to_string()
        } else {
            format!("START DAY {}", self.round)
        }
    }

    /// Round shown to players. Between days the counter has already moved
    /// on, so the finished day is displayed instead.
    #[must_use]
    pub const fn displayed_round(&self) -> u32 {
        if self.time_left == 0 && self.round > 1 && !self.is_game_over() {
            self.round - 1
        } else {
            self.round
        }
    }

    #[must_use]
    pub fn round_label(&self) -> String {
        format!("Round: {}/{MAX_ROUNDS}", self.displayed_round())
    }

    /// Needed supply to announce, only while between days.
    #[must_use]
    pub const fn announced_supply(&self) -> Option<SupplyKind> {
        if self.time_left == 0 {
            self.needed_supply
        } else {
            None
        }
    }

    #[must_use]
    pub fn setup_copy(&self) -> SetupCopy {
        if self.round == 0 {
            SetupCopy {
                title: "Prepare for the Apocalypse!",
                subtitle: "Game Setup".to_string(),
                description: "Before you dive into the chaos, let's set up your board.",
                proceed_label: "Proceed to the Apocalypse!".to_string(),
            }
        } else {
            SetupCopy {
                title: "You Survived Another Night!",
                subtitle: format!("Day {} Setup", self.round),
                description: "The sun rises on a bleak world. Time to re-calculate the board tiles for the new day.",
                proceed_label: format!("Proceed to Day {}!", self.round),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn running(time_left: u32, round: u32) -> RoundTimer {
        RoundTimer {
            round,
            time_left,
            round_duration: 150,
            active: true,
            needed_supply: None,
            setup_open: false,
        }
    }

    #[test]
    fn new_game_opens_setup_with_drawn_duration() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let timer = RoundTimer::new(&mut rng);
        assert!((120..=180).contains(&timer.round_duration));
        assert_eq!(timer.time_left, timer.round_duration);
        assert!(timer.setup_open);
        assert_eq!(timer.start_label(), "START GAME");
        assert_eq!(timer.round_label(), "Round: 0/10");
    }

    #[test]
    fn proceed_starts_round_one() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut timer = RoundTimer::new(&mut rng);
        let cues = timer.proceed();
        assert_eq!(cues.as_slice(), &[AudioCue::Saved, AudioCue::Start]);
        assert_eq!(timer.round, 1);
        assert!(timer.active);
        assert!(!timer.setup_open);
    }

    #[test]
    fn countdown_ends_day_and_draws_needed_supply() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut timer = running(2, 3);
        assert_eq!(timer.tick(&mut rng), TickOutcome::Counting { time_left: 1 });
        let outcome = timer.tick(&mut rng);
        let TickOutcome::RoundOver { next_round, needed } = outcome else {
            panic!("day should end at zero");
        };
        assert_eq!(next_round, 4);
        assert_eq!(timer.needed_supply, Some(needed));
        assert_eq!(timer.announced_supply(), Some(needed));
        assert!(!timer.active);
        assert_eq!(outcome.cues().as_slice(), &[AudioCue::RoundEnd]);
        assert_eq!(timer.round_label(), "Round: 3/10");
        assert_eq!(timer.start_label(), "START DAY 4");
        assert_eq!(timer.tick(&mut rng), TickOutcome::Idle);
    }

    #[test]
    fn final_round_ends_the_game() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut timer = running(1, MAX_ROUNDS);
        let outcome = timer.tick(&mut rng);
        assert_eq!(outcome, TickOutcome::GameOver);
        assert_eq!(outcome.cues().as_slice(), &[AudioCue::GameEnd]);
        assert_eq!(timer.round, MAX_ROUNDS);
        assert!(timer.is_game_over());
        assert_eq!(timer.round_label(), "Round: 10/10");
        let (start, cues) = timer.start(&mut rng);
        assert_eq!(start, StartOutcome::GameOver);
        assert!(cues.is_empty());
    }

    #[test]
    fn paused_round_resumes() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut timer = running(90, 2);
        timer.pause();
        assert_eq!(timer.tick(&mut rng), TickOutcome::Idle);
        assert_eq!(timer.start_label(), "RESUME GAME");
        let (outcome, cues) = timer.start(&mut rng);
        assert_eq!(outcome, StartOutcome::Resumed);
        assert_eq!(cues.as_slice(), &[AudioCue::Start]);
        assert!(timer.active);
        assert_eq!(timer.time_left, 90);
    }

    #[test]
    fn start_between_days_draws_a_new_round() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut timer = running(0, 4);
        timer.active = false;
        timer.needed_supply = Some(SupplyKind::Weapon);
        let (outcome, _) = timer.start(&mut rng);
        assert_eq!(outcome, StartOutcome::SetupRequired);
        assert!(timer.setup_open);
        assert_eq!(timer.time_left, timer.round_duration);
        assert_eq!(timer.needed_supply, None);
        assert_eq!(timer.setup_copy().subtitle, "Day 4 Setup");
        assert_eq!(timer.setup_copy().proceed_label, "Proceed to Day 4!");
    }

    #[test]
    fn cadence_and_urgency_tighten() {
        let timer = running(60, 1);
        assert_eq!(timer.urgency(), Urgency::Calm);
        assert_eq!(timer.cue_cadence(), Some(Duration::from_millis(1_000)));
        let timer = running(30, 1);
        assert_eq!(timer.urgency(), Urgency::Urgent);
        assert_eq!(timer.cue_cadence(), Some(Duration::from_millis(500)));
        let timer = running(10, 1);
        assert_eq!(timer.urgency(), Urgency::Critical);
        assert_eq!(timer.cue_cadence(), Some(Duration::from_millis(200)));
        assert!(!timer.is_shaking());
        assert!(running(5, 1).is_shaking());

        let mut paused = running(5, 1);
        paused.pause();
        assert_eq!(paused.cue_cadence(), None);
        assert!(!paused.is_shaking());
    }

    #[test]
    fn guide_pauses_only_running_rounds() {
        let mut timer = running(40, 1);
        assert!(timer.open_guide());
        assert!(!timer.active);
        assert!(!timer.open_guide());
    }

    #[test]
    fn restore_reopens_setup_for_pending_days() {
        let fresh = RoundTimer::restore(0, 140, 140, None);
        assert!(fresh.setup_open);
        let pending = RoundTimer::restore(3, 160, 160, None);
        assert!(pending.setup_open);
        let midway = RoundTimer::restore(3, 80, 160, Some(SupplyKind::Food));
        assert!(!midway.setup_open);
        assert!(!midway.active);
        assert!(midway.is_resumable());
        let clamped = RoundTimer::restore(40, 500, 160, None);
        assert_eq!(clamped.round, MAX_ROUNDS);
        assert_eq!(clamped.time_left, 160);
    }

    #[test]
    fn progress_tracks_remaining_share() {
        let timer = running(75, 1);
        assert!((timer.progress() - 0.5).abs() < f64::EPSILON);
    }
}
