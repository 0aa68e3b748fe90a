//! Allocator session: what the allocator remembers between days.

use serde::{Deserialize, Serialize};

use crate::allocator::{Allocation, AllocationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub previous_player_count: u32,
    pub is_first_day: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            previous_player_count: 0,
            is_first_day: true,
        }
    }
}

impl SessionState {
    /// Build the allocator request for today's survivor count.
    #[must_use]
    pub const fn request(&self, player_count: u32) -> AllocationRequest {
        AllocationRequest {
            player_count,
            is_first_day: self.is_first_day,
            previous_player_count: self.previous_player_count,
        }
    }

    /// Record a successful allocation. Only call with an `Ok` result.
    pub fn commit(&mut self, allocation: &Allocation) {
        self.previous_player_count = allocation.player_count();
        if allocation.is_board() {
            self.is_first_day = false;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{AllocationError, DecayInstruction, TileAllocator};
    use crate::supply::SupplyKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn first_board_clears_first_day_flag() {
        let allocator = TileAllocator::default();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut session = SessionState::default();
        let allocation = allocator.compute(&session.request(4), &mut rng).unwrap();
        session.commit(&allocation);
        assert_eq!(
            session,
            SessionState {
                previous_player_count: 4,
                is_first_day: false
            }
        );
    }

    #[test]
    fn decay_records_survivors_but_keeps_day_flag() {
        let mut session = SessionState {
            previous_player_count: 5,
            is_first_day: false,
        };
        session.commit(&Allocation::Decay(DecayInstruction::RemoveCategory {
            player_count: 3,
            supply: SupplyKind::Food,
        }));
        assert_eq!(session.previous_player_count, 3);
        assert!(!session.is_first_day);
    }

    #[test]
    fn repeated_failures_leave_session_untouched() {
        let allocator = TileAllocator::default();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let session = SessionState {
            previous_player_count: 2,
            is_first_day: false,
        };
        let first = allocator.compute(&session.request(3), &mut rng);
        let second = allocator.compute(&session.request(3), &mut rng);
        assert_eq!(first, second);
        assert!(matches!(first, Err(AllocationError::SurvivorIncrease { .. })));
        assert_eq!(session.previous_player_count, 2);
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut session = SessionState {
            previous_player_count: 3,
            is_first_day: false,
        };
        session.reset();
        assert_eq!(session, SessionState::default());
    }
}
