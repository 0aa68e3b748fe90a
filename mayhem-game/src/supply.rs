//! Supply categories shared by the allocator and the nightly needed-supply draw.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyKind {
    Food,
    Entertainment,
    Weapon,
    Tool,
}

impl SupplyKind {
    pub const ALL: [Self; 4] = [Self::Food, Self::Entertainment, Self::Weapon, Self::Tool];

    /// Upper-case display name, also the persisted `name` field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Food => "FOOD",
            Self::Entertainment => "ENTERTAINMENT",
            Self::Weapon => "WEAPON",
            Self::Tool => "TOOL",
        }
    }

    /// Style hook used by front ends for colour coding.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Food => "supply-food",
            Self::Entertainment => "supply-entertainment",
            Self::Weapon => "supply-weapon",
            Self::Tool => "supply-tool",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Names longer than eight characters get a compact layout.
    #[must_use]
    pub const fn is_long_name(self) -> bool {
        self.name().len() > 8
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persisted form of the needed supply: `{"name": "...", "cssClass": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyTag {
    pub name: String,
    pub css_class: String,
}

impl From<SupplyKind> for SupplyTag {
    fn from(kind: SupplyKind) -> Self {
        Self {
            name: kind.name().to_string(),
            css_class: kind.css_class().to_string(),
        }
    }
}

impl SupplyTag {
    #[must_use]
    pub fn kind(&self) -> Option<SupplyKind> {
        SupplyKind::from_name(&self.name)
    }
}
