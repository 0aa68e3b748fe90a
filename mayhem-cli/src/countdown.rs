//! Live round countdown on the tokio runtime.
//!
//! Two clocks run side by side: one advances the round a second at a time,
//! the other plays tick cues at the urgency cadence. Ctrl-C pauses the
//! round and persists it so `mayhem start` can resume later.
use std::io::{Write, stdout};
use std::time::Duration;

use anyhow::Result;
use mayhem_game::{Companion, CuePlayer, KeyValueStore, SupplyKind, TickOutcome};
use tokio::signal;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::render::progress_bar;

const MIN_CUE_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEnd {
    DayOver { next_round: u32, needed: SupplyKind },
    GameOver,
    Paused,
}

/// Scale a real-time cue cadence to the configured length of one second.
fn scaled(cadence: Duration, second: Duration) -> Duration {
    cadence.mul_f64(second.as_secs_f64()).max(MIN_CUE_PERIOD)
}

fn cue_interval(cadence: Option<Duration>, second: Duration) -> Option<Interval> {
    cadence.map(|cadence| {
        let period = scaled(cadence, second);
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    })
}

async fn next_cue(cues: &mut Option<Interval>) {
    match cues {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn redraw<S, P>(companion: &Companion<S, P>)
where
    S: KeyValueStore,
    P: CuePlayer,
{
    let mut out = stdout();
    let _ = write!(out, "\r{}", progress_bar(companion.timer()));
    let _ = out.flush();
}

/// Run the active round until it ends or the user interrupts it.
///
/// # Errors
///
/// Returns an error if the timer cannot be persisted or the Ctrl-C handler
/// cannot be installed.
pub async fn run<S, P>(companion: &mut Companion<S, P>, second: Duration) -> Result<CountdownEnd>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    let mut seconds = time::interval_at(Instant::now() + second, second);
    let mut cadence = companion.timer().cue_cadence();
    let mut cues = cue_interval(cadence, second);
    let interrupt = signal::ctrl_c();
    tokio::pin!(interrupt);

    redraw(companion);
    let end = loop {
        tokio::select! {
            _ = seconds.tick() => {
                let outcome = companion.tick()?;
                redraw(companion);
                match outcome {
                    TickOutcome::Counting { .. } => {
                        let next = companion.timer().cue_cadence();
                        if next != cadence {
                            log::debug!("cue cadence now {next:?}");
                            cadence = next;
                            cues = cue_interval(cadence, second);
                        }
                    }
                    TickOutcome::RoundOver { next_round, needed } => {
                        break CountdownEnd::DayOver { next_round, needed };
                    }
                    TickOutcome::GameOver => break CountdownEnd::GameOver,
                    TickOutcome::Idle => break CountdownEnd::Paused,
                }
            }
            () = next_cue(&mut cues) => companion.tick_cue(),
            res = &mut interrupt => {
                res?;
                companion.pause()?;
                log::info!("round paused at {}s", companion.timer().time_left);
                break CountdownEnd::Paused;
            }
        }
    };
    println!();
    Ok(end)
}
