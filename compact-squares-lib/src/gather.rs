use std::collections::VecDeque;

use itertools::Itertools;
use tracing::debug;

use crate::cube::Classification;
use crate::error::PlanError;
use crate::moves::Move;
use crate::planner::shortest_move_path;
use crate::staircase::Staircase;
use crate::topology;
use crate::world::World;

/// The first phase: collect loose cubes into a single chunk rooted at the
/// downmost-leftmost cube.
///
/// Each outer iteration re-marks the configuration, selects a link cube that
/// can be detached without disconnecting the rest, and routes it to the
/// lowest free slot of the target packing. Link cubes come first; once none
/// remain off the packing, stable cubes of chunks other than the root chunk
/// are dismantled the same way. Candidates whose planned route exceeds the
/// bridge limit are deferred behind routes within it. The phase ends when no
/// candidate remains; whatever is left is the root chunk, which the second
/// phase sorts in place.
///
/// Moves are handed out one at a time through [`GatherPhase::next_move`]; the
/// stepper owns the configuration and commits each move before pulling the
/// next.
#[derive(Debug)]
pub struct GatherPhase {
    staircase: Staircase,
    pending: VecDeque<Move>,
    done: bool,
}

impl GatherPhase {
    pub fn new(staircase: Staircase) -> Self {
        GatherPhase {
            staircase,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The next move of the phase, or `None` once the phase is finished.
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
        let limit = topology::bridge_limit(world);
        let mut deferred: Option<Vec<Move>> = None;

        for id in self.candidates(world) {
            let from = world.cube(id).pos();
            match shortest_move_path(world, from, slot) {
                Ok(path) if path.len() as i32 <= limit => {
                    debug!(
                        cube = id,
                        %from,
                        %slot,
                        len = path.len(),
                        capacity = topology::bridge_capacity(world, id),
                        "gathering cube"
                    );
                    self.pending.extend(path);
                    return Ok(self.pending.pop_front());
                }
                Ok(path) => {
                    debug!(cube = id, len = path.len(), limit, "route over bridge limit, deferring");
                    deferred.get_or_insert(path);
                }
                Err(PlanError::NoMovePath { .. }) => {
                    debug!(cube = id, %from, %slot, "slot unreachable, trying next candidate");
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(path) = deferred {
            self.pending.extend(path);
            return Ok(self.pending.pop_front());
        }
        self.done = true;
        Ok(None)
    }

    /// Movable cubes still outside the target packing, links before foreign
    /// chunk cubes, each group in ascending (y, x) order of position.
    fn candidates(&self, world: &World) -> Vec<usize> {
        let root_chunk = world.root().and_then(|root| world.cube(root).chunk());
        let mut links = Vec::new();
        let mut foreign = Vec::new();

        for (id, cube) in world.cubes().iter().enumerate() {
            if self.staircase.contains(cube.pos()) {
                continue;
            }
            match cube.tag() {
                Classification::LinkStable => links.push(id),
                Classification::ChunkStable if cube.chunk() != root_chunk => foreign.push(id),
                _ => {}
            }
        }

        let by_position = |&id: &usize| world.cube(id).pos().yx();
        links
            .into_iter()
            .sorted_by_key(by_position)
            .chain(foreign.into_iter().sorted_by_key(by_position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::cube::Color;

    fn world_of(cells: &[(i32, i32)]) -> World {
        let mut world = World::new();
        for &(x, y) in cells {
            world.add_unmarked(Cell::new(x, y), Color::DEFAULT).unwrap();
        }
        world
    }

    fn drain(phase: &mut GatherPhase, world: &mut World) -> Vec<Move> {
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
    fn test_u_shape_gathers_the_far_arm() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]);
        let staircase = Staircase::new(Cell::new(0, 0), 5);
        let mut phase = GatherPhase::new(staircase.clone());

        let moves = drain(&mut phase, &mut world);

        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].src, Cell::new(2, 1));
        assert_eq!(moves[0].target(), Cell::new(1, 1));
        assert!(staircase.is_complete(&world));
    }

    #[test]
    fn test_line_gathers_outermost_stable_links() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let staircase = Staircase::new(Cell::new(0, 0), 5);
        let mut phase = GatherPhase::new(staircase.clone());

        let moves = drain(&mut phase, &mut world);

        // (4, 0) walks four cells to (0, 1), then (3, 0) two cells to (1, 1)
        assert_eq!(moves.len(), 6);
        assert!(staircase.is_complete(&world));
        assert!(topology::is_single_chunk(&{
            let mut w = world.clone();
            w.mark();
            w
        }));
    }

    #[test]
    fn test_already_gathered_block_yields_nothing() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1)]);
        let mut phase = GatherPhase::new(Staircase::new(Cell::new(0, 0), 5));
        assert_eq!(phase.next_move(&mut world).unwrap(), None);
    }
}
