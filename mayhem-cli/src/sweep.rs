//! Allocator sweep: draw many boards per player count and summarize them.
use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use mayhem_game::constants::{MAX_PLAYERS, MIN_PLAYERS};
use mayhem_game::{
    Allocation, AllocationRequest, AllocatorPolicy, BoardLayout, TileAllocator, TotalsPolicy,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CountStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

#[derive(Debug, Default)]
struct Tally {
    min: Option<u32>,
    max: u32,
    sum: u64,
    samples: u64,
}

impl Tally {
    fn record(&mut self, value: u32) {
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = self.max.max(value);
        self.sum += u64::from(value);
        self.samples += 1;
    }

    fn stats(&self) -> CountStats {
        #[allow(clippy::cast_precision_loss)]
        let mean = if self.samples == 0 {
            0.0
        } else {
            self.sum as f64 / self.samples as f64
        };
        CountStats {
            min: self.min.unwrap_or(0),
            max: self.max,
            mean,
        }
    }
}

#[derive(Debug, Default)]
struct BoardTallies {
    total: Tally,
    supply: Tally,
    disaster: Tally,
    disaster_bonus: Tally,
    bonus: Tally,
    empty: Tally,
    removed: Tally,
}

impl BoardTallies {
    fn record(&mut self, layout: &BoardLayout) {
        self.total.record(layout.total_tiles);
        self.supply.record(layout.supply);
        self.disaster.record(layout.disaster);
        self.disaster_bonus.record(layout.disaster_bonus);
        self.bonus.record(layout.bonus);
        self.empty.record(layout.empty);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSweep {
    pub player_count: u32,
    pub boards: usize,
    pub total_tiles: CountStats,
    pub supply: CountStats,
    pub disaster: CountStats,
    pub disaster_bonus: CountStats,
    pub bonus: CountStats,
    pub empty: CountStats,
    /// Tiles removed by the decay instruction after the party shrinks from
    /// the largest size to this one.
    pub removed_after_shrink: CountStats,
    pub violations: Vec<String>,
}

impl PlayerSweep {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub seed: u64,
    pub iterations: usize,
    pub policy: AllocatorPolicy,
    pub players: Vec<PlayerSweep>,
}

impl SweepReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.players.iter().all(PlayerSweep::passed)
    }
}

fn check_board(allocator: &TileAllocator, layout: &BoardLayout) -> Option<String> {
    let player_count = layout.player_count;
    let total = layout.total_tiles;
    let range = allocator.range_for(player_count)?;
    if !range.contains(total) {
        return Some(format!(
            "total {total} outside {}..={}",
            range.min, range.max
        ));
    }
    if layout.category_sum() != total {
        return Some(format!(
            "categories sum to {} for {total} tiles",
            layout.category_sum()
        ));
    }
    if layout.supply_breakdown.total() != layout.supply {
        return Some(format!(
            "supply breakdown sums to {} for {} supply tiles",
            layout.supply_breakdown.total(),
            layout.supply
        ));
    }
    let has_multiple = (range.min..=range.max).any(|t| t % player_count == 0);
    if allocator.policy().totals == TotalsPolicy::Divisible
        && has_multiple
        && total % player_count != 0
    {
        return Some(format!("total {total} not divisible by {player_count}"));
    }
    None
}

/// Draw `iterations` first-day boards and shrink decays per player count.
///
/// # Errors
///
/// Returns an error if the allocator rejects a supported player count.
pub fn run(allocator: &TileAllocator, iterations: usize, seed: u64) -> Result<SweepReport> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut players = Vec::new();
    for player_count in MIN_PLAYERS..=MAX_PLAYERS {
        let mut tallies = BoardTallies::default();
        let mut violations = Vec::new();
        for _ in 0..iterations {
            let first = AllocationRequest::first_day(player_count);
            if let Allocation::Board(layout) = allocator.compute(&first, &mut rng)? {
                if let Some(problem) = check_board(allocator, &layout) {
                    violations.push(problem);
                }
                tallies.record(&layout);
            }
            let shrink = AllocationRequest::next_day(player_count, MAX_PLAYERS);
            if let Allocation::Decay(decay) = allocator.compute(&shrink, &mut rng)? {
                tallies.removed.record(decay.removal_count());
            }
        }
        violations.sort();
        violations.dedup();
        log::debug!(
            "swept {iterations} boards for {player_count} players ({} violations)",
            violations.len()
        );
        players.push(PlayerSweep {
            player_count,
            boards: iterations,
            total_tiles: tallies.total.stats(),
            supply: tallies.supply.stats(),
            disaster: tallies.disaster.stats(),
            disaster_bonus: tallies.disaster_bonus.stats(),
            bonus: tallies.bonus.stats(),
            empty: tallies.empty.stats(),
            removed_after_shrink: tallies.removed.stats(),
            violations,
        });
    }
    Ok(SweepReport {
        seed,
        iterations,
        policy: allocator.policy(),
        players,
    })
}

fn stats_cell(stats: CountStats) -> String {
    format!("{:>3}..{:<3} avg {:>5.1}", stats.min, stats.max, stats.mean)
}

/// # Errors
///
/// Returns an error if the writer fails.
pub fn generate_console_report(writer: &mut impl Write, report: &SweepReport) -> Result<()> {
    writeln!(writer, "{}", "📊 Allocator Sweep Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==========================".cyan())?;
    writeln!(
        writer,
        "Seed: {}  Boards per player count: {}  Policy: {:?} totals, {:?} decay",
        report.seed, report.iterations, report.policy.totals, report.policy.decay
    )?;
    writeln!(writer)?;
    for sweep in &report.players {
        let status = if sweep.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} {} survivors",
            status,
            sweep.player_count.to_string().bold()
        )?;
        writeln!(writer, "   Total tiles:     {}", stats_cell(sweep.total_tiles))?;
        writeln!(writer, "   Supply:          {}", stats_cell(sweep.supply))?;
        writeln!(writer, "   Disaster:        {}", stats_cell(sweep.disaster))?;
        writeln!(writer, "   Disaster/Bonus:  {}", stats_cell(sweep.disaster_bonus))?;
        writeln!(writer, "   Bonus:           {}", stats_cell(sweep.bonus))?;
        writeln!(writer, "   Empty:           {}", stats_cell(sweep.empty))?;
        writeln!(
            writer,
            "   Removed on drop: {}",
            stats_cell(sweep.removed_after_shrink)
        )?;
        for violation in &sweep.violations {
            writeln!(writer, "     • {}", violation.red())?;
        }
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or the writer fails.
pub fn generate_json_report(writer: &mut impl Write, report: &SweepReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mayhem_game::DecayPolicy;

    #[test]
    fn default_allocator_sweeps_clean() {
        let report = run(&TileAllocator::default(), 200, 7).unwrap();
        assert_eq!(report.players.len(), 4);
        assert!(report.passed(), "{:?}", report.players);
        let two = &report.players[0];
        assert_eq!(two.player_count, 2);
        assert!(two.total_tiles.min >= 24 && two.total_tiles.max <= 32);
        assert!(two.bonus.min >= 1);
        // Category decay always removes exactly one tile.
        assert_eq!(two.removed_after_shrink.min, 1);
        assert_eq!(two.removed_after_shrink.max, 1);
        assert_eq!(report.players[3].boards, 200);
    }

    #[test]
    fn count_decay_removes_up_to_two() {
        let policy = AllocatorPolicy {
            totals: TotalsPolicy::Range,
            decay: DecayPolicy::Count,
        };
        let allocator = TileAllocator::default().with_policy(policy);
        let report = run(&allocator, 300, 3).unwrap();
        assert!(report.passed());
        let four = &report.players[2];
        assert!(four.removed_after_shrink.max <= 2);
        let three = &report.players[1];
        assert!(three.removed_after_shrink.max <= 1);
    }

    #[test]
    fn json_report_is_parseable() {
        let report = run(&TileAllocator::default(), 5, 1).unwrap();
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["iterations"], 5);
        assert_eq!(value["policy"]["totals"], "divisible");
        assert_eq!(value["players"][0]["player_count"], 2);
    }

    #[test]
    fn console_report_flags_failures() {
        colored::control::set_override(false);
        let mut report = run(&TileAllocator::default(), 2, 1).unwrap();
        report.players[0].violations.push("total 99 outside 24..=32".to_string());
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("❌ FAIL 2 survivors"));
        assert!(text.contains("✅ PASS 5 survivors"));
        assert!(text.contains("total 99 outside"));
    }
}
