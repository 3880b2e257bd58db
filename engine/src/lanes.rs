//! Index-based partition of the live agent sequence into defence lanes.

use crate::agent::Agent;

/// Contiguous, non-overlapping lanes over the agent sequence.
///
/// The table holds one bound per placed defence plus a trailing end bound;
/// lane `k` spans `[bounds[k], bounds[k + 1])`. `bounds[0]` is pinned to the
/// sequence start and, whenever at least one lane is open, the trailing
/// bound equals the sequence length, so the lanes cover every live agent.
/// Every mutation of the agent sequence flows through this table so that a
/// bound conceptually before an agent still precedes that agent afterwards.
#[derive(Clone, Debug)]
pub struct LaneTable {
    bounds: Vec<usize>,
    inserter: usize,
}

impl LaneTable {
    /// Creates a table with no open lanes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bounds: vec![0],
            inserter: 1,
        }
    }

    /// Number of lanes, equal to the number of placed defences.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Opens a lane for a newly placed defence by appending the trailing
    /// bound at the current sequence end.
    pub fn open_lane(&mut self, sequence_len: usize) {
        self.bounds.push(sequence_len);
    }

    /// Chooses the insertion index for the next spawned agent.
    ///
    /// The slot rotates through the lane bounds so consecutive spawns land
    /// in successive lanes. Bounds that must keep denoting their old
    /// successor shift right; bounds before the rotating slot that coincide
    /// with it stay put and therefore take the new agent into their lane.
    pub fn insert_slot(&mut self) -> usize {
        debug_assert!(self.bounds.len() > 1, "insert_slot requires an open lane");
        let slot = self.bounds[self.inserter];
        let chosen = self.inserter;
        for (index, bound) in self.bounds.iter_mut().enumerate() {
            if *bound > slot || (*bound == slot && index >= chosen) {
                *bound += 1;
            }
        }
        self.inserter += 1;
        if self.inserter == self.bounds.len() {
            self.inserter = 1;
        }
        slot
    }

    /// Records the removal of the agent at `index`.
    ///
    /// Bounds past the removed position shift back; bounds at the position
    /// already denote its successor and stay.
    pub fn note_removal(&mut self, index: usize) {
        for bound in &mut self.bounds {
            if *bound > index {
                *bound -= 1;
            }
        }
    }

    /// Returns every bound to the sequence start for the next wave.
    ///
    /// Only valid between waves, when the agent sequence is empty.
    pub fn reset(&mut self) {
        for bound in &mut self.bounds {
            *bound = 0;
        }
        self.inserter = 1;
    }

    /// Splits the agent sequence into disjoint mutable lanes.
    ///
    /// The split is what lets the attack rounds hand each defence its own
    /// `&mut` lane without locks: the slices cannot overlap by construction.
    #[must_use]
    pub fn split<'a>(&self, agents: &'a mut [Agent]) -> Vec<&'a mut [Agent]> {
        let mut lanes = Vec::with_capacity(self.lane_count());
        let mut rest = agents;
        let mut cursor = 0;
        for pair in self.bounds.windows(2) {
            let (lane, tail) = std::mem::take(&mut rest).split_at_mut(pair[1] - cursor);
            cursor = pair[1];
            rest = tail;
            lanes.push(lane);
        }
        lanes
    }
}

impl Default for LaneTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::LaneTable;
    use crate::agent::agent_at;
    use glam::Vec2;
    use proptest::prelude::*;

    fn agents(count: usize) -> Vec<crate::agent::Agent> {
        (0..count)
            .map(|index| agent_at(Vec2::new(index as f32, 0.0), 1))
            .collect()
    }

    #[test]
    fn rotating_inserts_fill_successive_lanes() {
        // Five agents on the field before any defence is placed.
        let mut table = LaneTable::new();
        table.open_lane(5);
        table.open_lane(5);
        assert_eq!(table.lane_count(), 2);

        // First rotation slot: the end of lane 0.
        assert_eq!(table.insert_slot(), 5);
        assert_eq!(table.bounds, vec![0, 6, 6]);

        // Second rotation slot: the end of lane 1.
        assert_eq!(table.insert_slot(), 6);
        assert_eq!(table.bounds, vec![0, 6, 7]);

        // The slot cycles back to lane 0's bound.
        assert_eq!(table.insert_slot(), 6);
        assert_eq!(table.bounds, vec![0, 7, 8]);
    }

    #[test]
    fn inserts_at_coinciding_bounds_stay_out_of_earlier_lanes() {
        let mut table = LaneTable::new();
        table.open_lane(3);
        table.open_lane(3);
        table.open_lane(5);
        // bounds [0, 3, 3, 5]: lane 1 is empty.
        table.inserter = 2;

        // The bound before the rotating slot stays put, so lane 0 still
        // excludes the new agent while lane 1 takes it in.
        assert_eq!(table.insert_slot(), 3);
        assert_eq!(table.bounds, vec![0, 3, 4, 6]);
    }

    #[test]
    fn removal_keeps_bounds_on_their_successors() {
        let mut table = LaneTable::new();
        table.open_lane(4);
        table.open_lane(7);

        table.note_removal(0);
        assert_eq!(table.bounds, vec![0, 3, 6]);

        // Removing the agent a bound points at leaves the bound in place,
        // now denoting the successor.
        table.note_removal(3);
        assert_eq!(table.bounds, vec![0, 3, 5]);
    }

    #[test]
    fn split_covers_the_sequence_with_disjoint_lanes() {
        let mut table = LaneTable::new();
        table.open_lane(2);
        table.open_lane(5);
        let mut sequence = agents(5);

        let lanes = table.split(&mut sequence);
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].len(), 2);
        assert_eq!(lanes[1].len(), 3);
        assert_eq!(lanes[0][0].position().x, 0.0);
        assert_eq!(lanes[1][0].position().x, 2.0);
    }

    #[test]
    fn reset_returns_every_bound_to_the_start() {
        let mut table = LaneTable::new();
        table.open_lane(2);
        table.open_lane(4);
        let _ = table.insert_slot();

        table.reset();
        assert_eq!(table.bounds, vec![0, 0, 0]);
        let lanes = table.split(&mut []);
        assert!(lanes.iter().all(|lane| lane.is_empty()));
    }

    #[test]
    fn three_defences_rotate_through_every_lane() {
        let expected = [[0, 1, 2], [1, 2, 0], [2, 0, 1]];
        for (round, row) in expected.iter().enumerate() {
            for (defence, &lane) in row.iter().enumerate() {
                assert_eq!((defence + round) % 3, lane);
            }
        }
    }

    proptest! {
        /// `(j + i) mod N` is a bijection on the lane indices for any round,
        /// so no two ready defences can ever share a lane within a round.
        #[test]
        fn rotation_assigns_every_lane_exactly_once(
            count in 1usize..64,
            round in 0usize..64,
        ) {
            let mut assigned = vec![0u32; count];
            for defence in 0..count {
                assigned[(defence + round) % count] += 1;
            }
            prop_assert!(assigned.iter().all(|&hits| hits == 1));
        }
    }
}
