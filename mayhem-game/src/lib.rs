//! Mayhem Companion Engine
//!
//! Platform-agnostic core for the Countdown to Mayhem board game companion:
//! the board tile allocator, the round clock, the rules guide and the
//! persistence glue between them. Front ends supply storage and sound.

pub mod allocator;
pub mod audio;
pub mod constants;
pub mod guide;
pub mod numbers;
pub mod session;
pub mod store;
pub mod supply;
pub mod timer;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

// Re-export commonly used types
pub use allocator::{
    Allocation, AllocationError, AllocationRequest, AllocatorConfig, AllocatorConfigError,
    AllocatorPolicy, BoardLayout, DecayInstruction, DecayPolicy, SupplyBreakdown, TileAllocator,
    TileRange, TotalsPolicy,
};
pub use audio::{AudioCue, CuePlayer, Cues, SilentPlayer};
pub use guide::{Block, Guide, GuideBook, Page, Slide};
pub use session::SessionState;
pub use store::{KeyValueStore, MemoryStore, load_session, load_timer, save_session, save_timer};
pub use supply::{SupplyKind, SupplyTag};
pub use timer::{RoundTimer, SetupCopy, StartOutcome, TickOutcome, Urgency};

#[derive(Debug, Error)]
pub enum EngineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("storage failure: {0}")]
    Store(#[source] E),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error("calculate the board tiles before proceeding")]
    NotCalculated,
}

/// One companion session: allocator, round clock and their persisted state.
pub struct Companion<S, P = SilentPlayer>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    store: S,
    player: P,
    allocator: TileAllocator,
    session: SessionState,
    timer: RoundTimer,
    rng: ChaCha20Rng,
    board_ready: bool,
}

impl<S, P> std::fmt::Debug for Companion<S, P>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Companion")
            .field("session", &self.session)
            .field("timer", &self.timer)
            .field("policy", &self.allocator.policy())
            .finish_non_exhaustive()
    }
}

impl<S, P> Companion<S, P>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    /// Restore a companion from `store`, seeding its RNG with `seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(
        store: S,
        player: P,
        allocator: TileAllocator,
        seed: u64,
    ) -> Result<Self, EngineError<S::Error>> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let session = load_session(&store).map_err(EngineError::Store)?;
        let timer = load_timer(&store, &mut rng).map_err(EngineError::Store)?;
        log::debug!("restored {session:?} at round {}", timer.round);
        Ok(Self {
            store,
            player,
            allocator,
            session,
            timer,
            rng,
            board_ready: false,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    #[must_use]
    pub const fn allocator(&self) -> &TileAllocator {
        &self.allocator
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Calculate today's board for `player_count` survivors and commit it.
    ///
    /// Nothing is mutated or persisted when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Allocation`] for rejected input and
    /// [`EngineError::Store`] if the session cannot be saved.
    pub fn calculate(&mut self, player_count: u32) -> Result<Allocation, EngineError<S::Error>> {
        self.player.play(AudioCue::Calculating);
        let request = self.session.request(player_count);
        let allocation = self.allocator.compute(&request, &mut self.rng)?;
        let mut session = self.session;
        session.commit(&allocation);
        save_session(&mut self.store, &session).map_err(EngineError::Store)?;
        self.session = session;
        self.board_ready = true;
        Ok(allocation)
    }

    /// Check today's survivor count against the session without drawing
    /// or persisting anything.
    ///
    /// # Errors
    ///
    /// Returns the [`AllocationError`] that [`Self::calculate`] would.
    pub fn check_survivors(&self, player_count: u32) -> Result<(), AllocationError> {
        self.allocator
            .validate(&self.session.request(player_count))
            .map(|_| ())
    }

    /// Start button.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be saved.
    pub fn start(&mut self) -> Result<StartOutcome, EngineError<S::Error>> {
        let (outcome, cues) = self.timer.start(&mut self.rng);
        if outcome == StartOutcome::SetupRequired {
            self.board_ready = false;
        }
        self.player.play_all(&cues);
        self.persist_timer()?;
        Ok(outcome)
    }

    /// Leave setup and begin the round.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotCalculated`] while setup is open and no
    /// board has been calculated for it.
    pub fn proceed(&mut self) -> Result<(), EngineError<S::Error>> {
        if self.timer.setup_open && !self.board_ready {
            return Err(EngineError::NotCalculated);
        }
        let cues = self.timer.proceed();
        self.board_ready = false;
        self.player.play_all(&cues);
        self.persist_timer()
    }

    /// # Errors
    ///
    /// Returns an error if the timer cannot be saved.
    pub fn pause(&mut self) -> Result<(), EngineError<S::Error>> {
        self.timer.pause();
        self.persist_timer()
    }

    /// Advance the clock one second.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be saved.
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError<S::Error>> {
        let outcome = self.timer.tick(&mut self.rng);
        if outcome != TickOutcome::Idle {
            self.player.play_all(&outcome.cues());
            self.persist_timer()?;
        }
        Ok(outcome)
    }

    /// Play one tick cue if the round is running.
    pub fn tick_cue(&mut self) {
        if self.timer.cue_cadence().is_some() {
            self.player.play(AudioCue::Tick);
        }
    }

    /// Open the rules guide, pausing a running round.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be saved.
    pub fn open_guide(&mut self) -> Result<Guide, EngineError<S::Error>> {
        if self.timer.open_guide() {
            self.persist_timer()?;
        }
        Ok(Guide::default())
    }

    /// Wipe every persisted value and start a brand new game.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared or written.
    pub fn reset(&mut self) -> Result<(), EngineError<S::Error>> {
        self.store.clear().map_err(EngineError::Store)?;
        self.session.reset();
        self.timer.reset(&mut self.rng);
        self.board_ready = false;
        log::info!("game reset");
        self.persist_timer()
    }

    fn persist_timer(&mut self) -> Result<(), EngineError<S::Error>> {
        save_timer(&mut self.store, &self.timer).map_err(EngineError::Store)
    }
}
