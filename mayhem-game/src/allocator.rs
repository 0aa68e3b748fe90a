//! Board tile allocator.
//!
//! The first day of a session lays out a full board: a total tile count
//! scaled to the number of survivors, split into supply, disaster, bonus,
//! disaster/bonus and empty tiles. Every later day only decays the board by
//! removing supply tiles.
//!
//! [`TileAllocator::compute`] is pure given an RNG. The session mutation is
//! a separate step, [`crate::SessionState::commit`], applied by the caller
//! only when computation succeeds.

pub mod config;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DECAY_LARGE_DROP, DECAY_MAX_DELTA, DECAY_SMALL_DROP, DECAY_SMALL_DROP_MAX_DELTA, MAX_PLAYERS,
    MIN_PLAYERS,
};
use crate::numbers::percent_of;
use crate::supply::SupplyKind;

pub use config::{
    AllocatorConfig, AllocatorConfigError, CategoryRatios, SupplyRatios, TileRange,
};
use config::PLAYER_SLOTS;

/// How the first-day board total is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsPolicy {
    /// Any value in the player count's range.
    Range,
    /// Only multiples of the player count, so tiles split evenly.
    #[default]
    Divisible,
}

/// What a later day's decay instruction names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayPolicy {
    /// A generic number of supply tiles, sized by how many survivors dropped out.
    Count,
    /// Exactly one tile of one randomly chosen supply category.
    #[default]
    Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorPolicy {
    #[serde(default)]
    pub totals: TotalsPolicy,
    #[serde(default)]
    pub decay: DecayPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub player_count: u32,
    pub is_first_day: bool,
    pub previous_player_count: u32,
}

impl AllocationRequest {
    #[must_use]
    pub const fn first_day(player_count: u32) -> Self {
        Self {
            player_count,
            is_first_day: true,
            previous_player_count: 0,
        }
    }

    #[must_use]
    pub const fn next_day(player_count: u32, previous_player_count: u32) -> Self {
        Self {
            player_count,
            is_first_day: false,
            previous_player_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyBreakdown {
    pub food: u32,
    pub entertainment: u32,
    pub weapon: u32,
    pub tool: u32,
}

impl SupplyBreakdown {
    /// Split `supply` by the sub-ratios; tools absorb the remainder.
    #[must_use]
    pub fn split(supply: u32, ratios: SupplyRatios) -> Self {
        let food = percent_of(supply, ratios.food);
        let entertainment = percent_of(supply, ratios.entertainment);
        let weapon = percent_of(supply, ratios.weapon);
        // Half-up rounding of three shares can overshoot tiny supplies.
        let mut parts = [food, entertainment, weapon];
        let mut assigned: u32 = parts.iter().sum();
        for part in parts.iter_mut().rev() {
            while assigned > supply && *part > 0 {
                *part -= 1;
                assigned -= 1;
            }
        }
        let [food, entertainment, weapon] = parts;
        Self {
            food,
            entertainment,
            weapon,
            tool: supply - assigned,
        }
    }

    #[must_use]
    pub const fn get(&self, kind: SupplyKind) -> u32 {
        match kind {
            SupplyKind::Food => self.food,
            SupplyKind::Entertainment => self.entertainment,
            SupplyKind::Weapon => self.weapon,
            SupplyKind::Tool => self.tool,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.food + self.entertainment + self.weapon + self.tool
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub player_count: u32,
    pub total_tiles: u32,
    pub supply: u32,
    pub disaster: u32,
    pub disaster_bonus: u32,
    pub bonus: u32,
    pub empty: u32,
    pub supply_breakdown: SupplyBreakdown,
}

impl BoardLayout {
    /// Sum of the top-level categories; equals `total_tiles` for every layout
    /// the allocator produces.
    #[must_use]
    pub const fn category_sum(&self) -> u32 {
        self.supply + self.disaster + self.disaster_bonus + self.bonus + self.empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayInstruction {
    /// Remove `count` supply tiles of any category.
    RemoveAny { player_count: u32, count: u32 },
    /// Remove one supply tile of `supply`.
    RemoveCategory { player_count: u32, supply: SupplyKind },
}

impl DecayInstruction {
    #[must_use]
    pub const fn player_count(&self) -> u32 {
        match self {
            Self::RemoveAny { player_count, .. } | Self::RemoveCategory { player_count, .. } => {
                *player_count
            }
        }
    }

    #[must_use]
    pub const fn removal_count(&self) -> u32 {
        match self {
            Self::RemoveAny { count, .. } => *count,
            Self::RemoveCategory { .. } => 1,
        }
    }

    #[must_use]
    pub const fn category(&self) -> Option<SupplyKind> {
        match self {
            Self::RemoveAny { .. } => None,
            Self::RemoveCategory { supply, .. } => Some(*supply),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Allocation {
    Board(BoardLayout),
    Decay(DecayInstruction),
}

impl Allocation {
    #[must_use]
    pub const fn player_count(&self) -> u32 {
        match self {
            Self::Board(layout) => layout.player_count,
            Self::Decay(decay) => decay.player_count(),
        }
    }

    #[must_use]
    pub const fn is_board(&self) -> bool {
        matches!(self, Self::Board(_))
    }
}

/// Input rejected before any allocation happens. Always recoverable by
/// retrying with a corrected player count.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("player count out of range: {player_count} (choose 2-5 survivors)")]
    PlayerCountOutOfRange { player_count: u32 },
    #[error("survivor count cannot be higher than yesterday ({requested} > {previous})")]
    SurvivorIncrease { previous: u32, requested: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAllocator {
    ranges: [TileRange; PLAYER_SLOTS],
    ratios: CategoryRatios,
    supply_ratios: SupplyRatios,
    bonus_floor: u32,
    policy: AllocatorPolicy,
}

impl Default for TileAllocator {
    fn default() -> Self {
        let config = AllocatorConfig::default();
        Self::new(&config, AllocatorPolicy::default()).unwrap_or_else(|err| {
            log::warn!("embedded allocator config rejected ({err}); using builtin values");
            Self::builtin(AllocatorPolicy::default())
        })
    }
}

impl TileAllocator {
    /// Build an allocator from a config, validating it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails [`AllocatorConfig::validate`].
    pub fn new(
        config: &AllocatorConfig,
        policy: AllocatorPolicy,
    ) -> Result<Self, AllocatorConfigError> {
        config.validate()?;
        Ok(Self {
            ranges: config.ordered_ranges()?,
            ratios: config.ratios,
            supply_ratios: config.supply_ratios,
            bonus_floor: config.bonus_floor,
            policy,
        })
    }

    fn builtin(policy: AllocatorPolicy) -> Self {
        let mut ranges = [TileRange::new(0, 0); PLAYER_SLOTS];
        let builtin = AllocatorConfig::builtin();
        for (slot, players) in ranges.iter_mut().zip(MIN_PLAYERS..=MAX_PLAYERS) {
            *slot = builtin.range_for(players).unwrap_or(TileRange::new(players, players));
        }
        Self {
            ranges,
            ratios: builtin.ratios,
            supply_ratios: builtin.supply_ratios,
            bonus_floor: builtin.bonus_floor,
            policy,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: AllocatorPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> AllocatorPolicy {
        self.policy
    }

    /// Tile range for a supported player count.
    #[must_use]
    pub fn range_for(&self, player_count: u32) -> Option<TileRange> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return None;
        }
        self.ranges
            .get(usize::try_from(player_count - MIN_PLAYERS).ok()?)
            .copied()
    }

    /// Check a request without drawing anything, returning the tile range
    /// for its player count.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::PlayerCountOutOfRange`] when the count is
    /// outside 2-5, and [`AllocationError::SurvivorIncrease`] when a later
    /// day reports more survivors than the day before, or a drop no valid
    /// previous count could produce.
    pub fn validate(&self, request: &AllocationRequest) -> Result<TileRange, AllocationError> {
        let player_count = request.player_count;
        let Some(range) = self.range_for(player_count) else {
            return Err(AllocationError::PlayerCountOutOfRange { player_count });
        };
        if request.is_first_day {
            return Ok(range);
        }
        let previous = request.previous_player_count;
        if player_count > previous || previous - player_count > DECAY_MAX_DELTA {
            return Err(AllocationError::SurvivorIncrease {
                previous,
                requested: player_count,
            });
        }
        Ok(range)
    }

    /// Validate a request and produce the day's board or decay instruction.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::validate`]; nothing is drawn on failure.
    pub fn compute(
        &self,
        request: &AllocationRequest,
        rng: &mut impl Rng,
    ) -> Result<Allocation, AllocationError> {
        let range = self.validate(request)?;
        let player_count = request.player_count;

        if request.is_first_day {
            let total = self.draw_total(player_count, range, rng);
            let layout = self.layout_for_total(player_count, total);
            log::debug!(
                "board for {player_count} players: {total} tiles ({} supply, {} disaster, {} disaster/bonus, {} bonus, {} empty)",
                layout.supply,
                layout.disaster,
                layout.disaster_bonus,
                layout.bonus,
                layout.empty
            );
            return Ok(Allocation::Board(layout));
        }

        let previous = request.previous_player_count;
        let decay = self.draw_decay(player_count, previous - player_count, rng);
        log::debug!("decay for {player_count} players (was {previous}): {decay:?}");
        Ok(Allocation::Decay(decay))
    }

    fn draw_total(&self, player_count: u32, range: TileRange, rng: &mut impl Rng) -> u32 {
        match self.policy.totals {
            TotalsPolicy::Range => rng.gen_range(range.min..=range.max),
            TotalsPolicy::Divisible => {
                let step = player_count.max(1);
                let first = range.min.div_ceil(step) * step;
                if first > range.max {
                    (range.min / step) * step + step
                } else {
                    let candidates = (range.max - first) / step + 1;
                    first + step * rng.gen_range(0..candidates)
                }
            }
        }
    }

    /// Deterministic category split for a given board total.
    #[must_use]
    pub fn layout_for_total(&self, player_count: u32, total_tiles: u32) -> BoardLayout {
        let ratios = self.ratios;
        let mut counts = [
            percent_of(total_tiles, ratios.supply),
            percent_of(total_tiles, ratios.disaster),
            percent_of(total_tiles, ratios.disaster_bonus),
            percent_of(total_tiles, ratios.bonus),
        ];

        // Rounding overshoot comes out of supply first, one tile at a time.
        let mut placed: u32 = counts.iter().sum();
        for count in &mut counts {
            while placed > total_tiles && *count > 0 {
                *count -= 1;
                placed -= 1;
            }
        }
        let [mut supply, disaster, disaster_bonus, mut bonus] = counts;
        let mut empty = total_tiles - placed;

        if total_tiles > 0 {
            while bonus < self.bonus_floor {
                if empty > 0 {
                    empty -= 1;
                } else if supply > 0 {
                    supply -= 1;
                } else {
                    break;
                }
                bonus += 1;
            }
        }

        BoardLayout {
            player_count,
            total_tiles,
            supply,
            disaster,
            disaster_bonus,
            bonus,
            empty,
            supply_breakdown: SupplyBreakdown::split(supply, self.supply_ratios),
        }
    }

    fn draw_decay(&self, player_count: u32, delta: u32, rng: &mut impl Rng) -> DecayInstruction {
        match self.policy.decay {
            DecayPolicy::Count => {
                let (min, max) = if delta <= DECAY_SMALL_DROP_MAX_DELTA {
                    DECAY_SMALL_DROP
                } else {
                    DECAY_LARGE_DROP
                };
                DecayInstruction::RemoveAny {
                    player_count,
                    count: rng.gen_range(min..=max),
                }
            }
            DecayPolicy::Category => DecayInstruction::RemoveCategory {
                player_count,
                supply: SupplyKind::random(rng),
            },
        }
    }
}
