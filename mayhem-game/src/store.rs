//! String-keyed persistence for the session and the round clock.
//!
//! Values are stored as plain strings under fixed keys, the way browser
//! local storage holds them. Missing keys fall back to defaults; unreadable
//! values are logged and treated as missing.
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::str::FromStr;

use rand::Rng;

use crate::constants::{
    KEY_CURRENT_ROUND, KEY_FIRST_DAY, KEY_NEEDED_SUPPLY, KEY_PREVIOUS_PLAYERS,
    KEY_ROUND_DURATION, KEY_TIME_LEFT,
};
use crate::session::SessionState;
use crate::supply::{SupplyKind, SupplyTag};
use crate::timer::{RoundTimer, draw_round_duration};

/// Backend for persisted scalars.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value, `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;

    /// Drop every key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

/// In-memory store, used by tests and as a throwaway backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl From<BTreeMap<String, String>> for MemoryStore {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.values.clear();
        Ok(())
    }
}

fn read_parsed<S, T>(store: &S, key: &str) -> Result<Option<T>, S::Error>
where
    S: KeyValueStore + ?Sized,
    T: FromStr,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match raw.trim().parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            log::warn!("ignoring unreadable value {raw:?} for {key}");
            Ok(None)
        }
    }
}

fn read_needed_supply<S>(store: &S) -> Result<Option<SupplyKind>, S::Error>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(KEY_NEEDED_SUPPLY)? else {
        return Ok(None);
    };
    let kind = serde_json::from_str::<SupplyTag>(&raw)
        .ok()
        .and_then(|tag| tag.kind());
    if kind.is_none() {
        log::warn!("ignoring unreadable needed supply {raw:?}");
    }
    Ok(kind)
}

/// Load the allocator session; absent keys mean a fresh first day.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn load_session<S>(store: &S) -> Result<SessionState, S::Error>
where
    S: KeyValueStore + ?Sized,
{
    let previous_player_count = read_parsed(store, KEY_PREVIOUS_PLAYERS)?.unwrap_or(0);
    // Anything but an explicit "false" keeps the first-day flag set.
    let is_first_day = store
        .get(KEY_FIRST_DAY)?
        .is_none_or(|raw| raw.trim() != "false");
    Ok(SessionState {
        previous_player_count,
        is_first_day,
    })
}

/// # Errors
///
/// Returns an error if the backend cannot be written.
pub fn save_session<S>(store: &mut S, session: &SessionState) -> Result<(), S::Error>
where
    S: KeyValueStore + ?Sized,
{
    store.set(
        KEY_PREVIOUS_PLAYERS,
        &session.previous_player_count.to_string(),
    )?;
    store.set(KEY_FIRST_DAY, &session.is_first_day.to_string())
}

/// Load the round clock; a missing duration is drawn fresh.
///
/// # Errors
///
/// Returns an error if the backend cannot be read.
pub fn load_timer<S>(store: &S, rng: &mut impl Rng) -> Result<RoundTimer, S::Error>
where
    S: KeyValueStore + ?Sized,
{
    let round_duration = read_parsed(store, KEY_ROUND_DURATION)?
        .filter(|secs| *secs > 0)
        .unwrap_or_else(|| draw_round_duration(rng));
    let round = read_parsed(store, KEY_CURRENT_ROUND)?.unwrap_or(0);
    let time_left = read_parsed(store, KEY_TIME_LEFT)?.unwrap_or(round_duration);
    let needed_supply = read_needed_supply(store)?;
    Ok(RoundTimer::restore(
        round,
        time_left,
        round_duration,
        needed_supply,
    ))
}

/// # Errors
///
/// Returns an error if the backend cannot be written.
pub fn save_timer<S>(store: &mut S, timer: &RoundTimer) -> Result<(), S::Error>
where
    S: KeyValueStore + ?Sized,
{
    store.set(KEY_CURRENT_ROUND, &timer.round.to_string())?;
    store.set(KEY_TIME_LEFT, &timer.time_left.to_string())?;
    store.set(KEY_ROUND_DURATION, &timer.round_duration.to_string())?;
    match timer.needed_supply {
        Some(kind) => {
            let encoded = serde_json::to_string(&SupplyTag::from(kind))
                .unwrap_or_else(|_| format!(r#"{{"name":"{}"}}"#, kind.name()));
            store.set(KEY_NEEDED_SUPPLY, &encoded)
        }
        None => store.remove(KEY_NEEDED_SUPPLY),
    }
}
