//! Allocator tuning: tile ranges per player count and category ratios.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BONUS_FLOOR, BONUS_PCT, DISASTER_BONUS_PCT, DISASTER_PCT, ENTERTAINMENT_PCT, FOOD_PCT,
    MAX_PLAYERS, MIN_PLAYERS, SUPPLY_PCT, TILE_RANGE_2P, TILE_RANGE_3P, TILE_RANGE_4P,
    TILE_RANGE_5P, WEAPON_PCT,
};

const DEFAULT_ALLOCATOR_DATA: &str = include_str!("../../assets/data/allocator.json");

/// Number of supported player counts, one tile range each.
pub(crate) const PLAYER_SLOTS: usize = (MAX_PLAYERS - MIN_PLAYERS + 1) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub min: u32,
    pub max: u32,
}

impl TileRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(self, total: u32) -> bool {
        total >= self.min && total <= self.max
    }
}

impl From<(u32, u32)> for TileRange {
    fn from((min, max): (u32, u32)) -> Self {
        Self::new(min, max)
    }
}

/// Top-level category shares, in percent of the board total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRatios {
    pub supply: u32,
    pub disaster: u32,
    pub disaster_bonus: u32,
    pub bonus: u32,
}

impl CategoryRatios {
    /// Widened so user-supplied shares cannot overflow.
    #[must_use]
    pub const fn sum(self) -> u64 {
        self.supply as u64 + self.disaster as u64 + self.disaster_bonus as u64 + self.bonus as u64
    }
}

impl Default for CategoryRatios {
    fn default() -> Self {
        Self {
            supply: SUPPLY_PCT,
            disaster: DISASTER_PCT,
            disaster_bonus: DISASTER_BONUS_PCT,
            bonus: BONUS_PCT,
        }
    }
}

/// Supply sub-shares in percent of the supply count; tools get the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyRatios {
    pub food: u32,
    pub entertainment: u32,
    pub weapon: u32,
}

impl SupplyRatios {
    #[must_use]
    pub const fn sum(self) -> u64 {
        self.food as u64 + self.entertainment as u64 + self.weapon as u64
    }
}

impl Default for SupplyRatios {
    fn default() -> Self {
        Self {
            food: FOOD_PCT,
            entertainment: ENTERTAINMENT_PCT,
            weapon: WEAPON_PCT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    pub ranges: BTreeMap<u32, TileRange>,
    #[serde(default)]
    pub ratios: CategoryRatios,
    #[serde(default)]
    pub supply_ratios: SupplyRatios,
    #[serde(default = "default_bonus_floor")]
    pub bonus_floor: u32,
}

const fn default_bonus_floor() -> u32 {
    BONUS_FLOOR
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocatorConfigError {
    #[error("allocator config is not valid JSON: {0}")]
    Parse(String),
    #[error("no tile range configured for {players} players")]
    MissingRange { players: u32 },
    #[error("tile range for {players} players is inverted (min {min} > max {max})")]
    RangeInverted { players: u32, min: u32, max: u32 },
    #[error("tile range for {players} players must start above zero")]
    EmptyRange { players: u32 },
    #[error("{field} ratios add up to {sum}%, more than 100%")]
    RatiosExceedTotal { field: &'static str, sum: u64 },
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self::from_json(DEFAULT_ALLOCATOR_DATA).unwrap_or_else(|_| Self::builtin())
    }
}

impl AllocatorConfig {
    /// Compiled-in balance values, independent of the embedded asset.
    #[must_use]
    pub fn builtin() -> Self {
        let ranges = [TILE_RANGE_2P, TILE_RANGE_3P, TILE_RANGE_4P, TILE_RANGE_5P]
            .into_iter()
            .zip(MIN_PLAYERS..=MAX_PLAYERS)
            .map(|(range, players)| (players, TileRange::from(range)))
            .collect();
        Self {
            ranges,
            ratios: CategoryRatios::default(),
            supply_ratios: SupplyRatios::default(),
            bonus_floor: BONUS_FLOOR,
        }
    }

    /// Parse and validate a JSON allocator config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, AllocatorConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AllocatorConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn range_for(&self, players: u32) -> Option<TileRange> {
        self.ranges.get(&players).copied()
    }

    /// Check that every supported player count has a sane range and the
    /// ratios leave a non-negative remainder.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), AllocatorConfigError> {
        self.ordered_ranges().map(|_| ())?;
        let sum = self.ratios.sum();
        if sum > 100 {
            return Err(AllocatorConfigError::RatiosExceedTotal {
                field: "category",
                sum,
            });
        }
        let sum = self.supply_ratios.sum();
        if sum > 100 {
            return Err(AllocatorConfigError::RatiosExceedTotal {
                field: "supply",
                sum,
            });
        }
        Ok(())
    }

    /// Ranges for each supported player count, lowest count first.
    pub(crate) fn ordered_ranges(&self) -> Result<[TileRange; PLAYER_SLOTS], AllocatorConfigError> {
        let mut out = [TileRange::new(0, 0); PLAYER_SLOTS];
        for (slot, players) in out.iter_mut().zip(MIN_PLAYERS..=MAX_PLAYERS) {
            let range = self
                .range_for(players)
                .ok_or(AllocatorConfigError::MissingRange { players })?;
            if range.min == 0 {
                return Err(AllocatorConfigError::EmptyRange { players });
            }
            if range.min > range.max {
                return Err(AllocatorConfigError::RangeInverted {
                    players,
                    min: range.min,
                    max: range.max,
                });
            }
            *slot = range;
        }
        Ok(out)
    }
}
