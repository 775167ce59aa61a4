use std::collections::VecDeque;

use itertools::Itertools;
use std::cmp::Reverse;
use tracing::debug;

use crate::error::PlanError;
use crate::moves::Move;
use crate::planner::shortest_move_path;
use crate::staircase::Staircase;
use crate::world::World;

/// The second phase: sort a gathered configuration into the canonical
/// xy-monotone packing.
///
/// Each outer iteration re-marks, takes the highest-then-rightmost cube still
/// off the target packing whose removal keeps the rest connected, and routes
/// it to the lowest free slot. The phase ends when every slot is filled,
/// which is exactly when the occupied set equals the canonical packing.
#[derive(Debug)]
pub struct CompactPhase {
    staircase: Staircase,
    pending: VecDeque<Move>,
    done: bool,
}

impl CompactPhase {
    pub fn new(staircase: Staircase) -> Self {
        CompactPhase {
            staircase,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The next move of the phase, or `None` once the packing is complete.
    pub fn next_move(&mut self, world: &mut World) -> Result<Option<Move>, PlanError> {
        if let Some(mv) = self.pending.pop_front() {
            return Ok(Some(mv));
        }
        if self.done {
            return Ok(None);
        }
        self.plan_relocation(world)
    }

    fn plan_relocation(&mut self, world: &mut World) -> Result<Option<Move>, PlanError> {
        world.mark();
        let Some(slot) = self.staircase.next_free_slot(world) else {
            self.done = true;
            return Ok(None);
        };

        let mut last_failure = None;
        for id in self.candidates(world) {
            let from = world.cube(id).pos();
            match shortest_move_path(world, from, slot) {
                Ok(path) => {
                    debug!(cube = id, %from, %slot, len = path.len(), "compacting cube");
                    self.pending.extend(path);
                    return Ok(self.pending.pop_front());
                }
                Err(err @ PlanError::NoMovePath { .. }) => {
                    debug!(cube = id, %from, %slot, "slot unreachable, trying next candidate");
                    last_failure = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        // every misplaced cube is either a cut cube or walled off; the plan
        // cannot make progress
        Err(last_failure.unwrap_or(PlanError::NoMovePath { from: slot, to: slot }))
    }

    /// Stable cubes off the target packing, highest-then-rightmost first.
    fn candidates(&self, world: &World) -> Vec<usize> {
        world
            .cubes()
            .iter()
            .enumerate()
            .filter(|(_, cube)| !self.staircase.contains(cube.pos()) && cube.tag().is_stable())
            .map(|(id, _)| id)
            .sorted_by_key(|&id| Reverse(world.cube(id).pos().yx()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::cube::Color;
    use crate::gather::GatherPhase;
    use crate::staircase::is_xy_monotone;

    fn world_of(cells: &[(i32, i32)]) -> World {
        let mut world = World::new();
        for &(x, y) in cells {
            world.add_unmarked(Cell::new(x, y), Color::DEFAULT).unwrap();
        }
        world
    }

    fn drain(phase: &mut CompactPhase, world: &mut World) -> Vec<Move> {
        let mut moves = Vec::new();
        while let Some(mv) = phase.next_move(world).unwrap() {
            let dst = mv.target();
            assert!(mv.is_valid(world), "illegal move {mv}");
            world.move_cube_unmarked(mv.src, dst).unwrap();
            moves.push(mv);
        }
        moves
    }

    #[test]
    fn test_p_pentomino_compacts_its_tip() {
        // a 2x2 block with a cube on top of its east column
        let mut world = world_of(&[(0, 0), (1, 0), (0, 1), (1, 1), (1, 2)]);
        let staircase = Staircase::new(Cell::new(0, 0), 5);

        // the block is already one chunk, so there is nothing to gather
        let mut gather = GatherPhase::new(staircase.clone());
        assert_eq!(gather.next_move(&mut world).unwrap(), None);

        let mut phase = CompactPhase::new(staircase.clone());
        let moves = drain(&mut phase, &mut world);

        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].src, Cell::new(1, 2));
        assert!(staircase.is_complete(&world));
        assert!(is_xy_monotone(&world));
    }

    #[test]
    fn test_complete_packing_yields_nothing() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
        let mut phase = CompactPhase::new(Staircase::new(Cell::new(0, 0), 5));
        assert_eq!(phase.next_move(&mut world).unwrap(), None);
    }
}
