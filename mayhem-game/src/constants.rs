//! Centralized balance and tuning constants for the Mayhem companion.
//!
//! These values define the board math and the round clock. Keeping them
//! together ensures that table balance can only be adjusted via code
//! changes reviewed in version control. The embedded allocator asset
//! mirrors the allocator values and falls back to them when it fails to
//! parse.

// Players ------------------------------------------------------------------
pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 5;

// Board totals (inclusive ranges per player count) -------------------------
pub(crate) const TILE_RANGE_2P: (u32, u32) = (24, 32);
pub(crate) const TILE_RANGE_3P: (u32, u32) = (30, 45);
pub(crate) const TILE_RANGE_4P: (u32, u32) = (40, 52);
pub(crate) const TILE_RANGE_5P: (u32, u32) = (45, 60);

// Category ratios, in percent of the total --------------------------------
pub(crate) const SUPPLY_PCT: u32 = 40;
pub(crate) const DISASTER_PCT: u32 = 18;
pub(crate) const DISASTER_BONUS_PCT: u32 = 15;
pub(crate) const BONUS_PCT: u32 = 10;

// Supply sub-ratios, in percent of the supply count. Tools take the rest.
pub(crate) const FOOD_PCT: u32 = 40;
pub(crate) const ENTERTAINMENT_PCT: u32 = 20;
pub(crate) const WEAPON_PCT: u32 = 20;

/// Minimum bonus tiles on any non-empty board.
pub(crate) const BONUS_FLOOR: u32 = 1;

// Decay (count policy) -----------------------------------------------------
pub(crate) const DECAY_SMALL_DROP: (u32, u32) = (1, 2);
pub(crate) const DECAY_LARGE_DROP: (u32, u32) = (0, 1);
pub(crate) const DECAY_SMALL_DROP_MAX_DELTA: u32 = 1;
/// Largest drop between two valid survivor counts; anything bigger comes
/// from a stale or edited previous count.
pub(crate) const DECAY_MAX_DELTA: u32 = MAX_PLAYERS - MIN_PLAYERS;

// Round clock --------------------------------------------------------------
pub const MAX_ROUNDS: u32 = 10;
pub(crate) const ROUND_DURATION_MIN_SECS: u32 = 120;
pub(crate) const ROUND_DURATION_MAX_SECS: u32 = 180;
pub(crate) const URGENT_SECS: u32 = 30;
pub(crate) const CRITICAL_SECS: u32 = 10;
pub(crate) const SHAKE_SECS: u32 = 5;
pub(crate) const CUE_CADENCE_CALM_MS: u64 = 1_000;
pub(crate) const CUE_CADENCE_URGENT_MS: u64 = 500;
pub(crate) const CUE_CADENCE_CRITICAL_MS: u64 = 200;

// Storage keys -------------------------------------------------------------
pub const KEY_PREVIOUS_PLAYERS: &str = "previousDayNumPlayers";
pub const KEY_FIRST_DAY: &str = "isFirstDay";
pub const KEY_CURRENT_ROUND: &str = "gameState_currentRound";
pub const KEY_TIME_LEFT: &str = "gameState_totalSeconds";
pub const KEY_ROUND_DURATION: &str = "gameState_roundDuration";
pub const KEY_NEEDED_SUPPLY: &str = "gameState_neededSupply";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ratios_leave_room_for_empty_tiles() {
        assert!(SUPPLY_PCT + DISASTER_PCT + DISASTER_BONUS_PCT + BONUS_PCT < 100);
        assert!(FOOD_PCT + ENTERTAINMENT_PCT + WEAPON_PCT <= 100);
    }

    #[test]
    fn cadence_tightens_as_time_runs_out() {
        assert!(CRITICAL_SECS < URGENT_SECS);
        assert!(SHAKE_SECS < CRITICAL_SECS);
        assert!(CUE_CADENCE_CRITICAL_MS < CUE_CADENCE_URGENT_MS);
        assert!(CUE_CADENCE_URGENT_MS < CUE_CADENCE_CALM_MS);
    }
}
