use std::collections::{HashMap, HashSet, VecDeque};

use strum::IntoEnumIterator;
use tracing::trace;

use crate::cell::Cell;
use crate::direction::MoveDirection;
use crate::error::{GridError, PlanError};
use crate::moves::Move;
use crate::world::World;

/// Plans the shortest sequence of legal single-cube moves taking the cube at
/// `src` to the empty cell `dst`.
///
/// The mover is taken out of the occupancy index for the duration of the
/// search so it cannot support itself; every remaining cube is a static
/// scaffold, which also means local legality implies full legality for every
/// step of the returned path. The mover is restored before returning, with
/// its id, classification and chunk assignment untouched.
///
/// Breadth-first search over cells, expanding neighbors in the declaration
/// order of [`MoveDirection`]: identical inputs plan identical paths.
pub fn shortest_move_path(world: &mut World, src: Cell, dst: Cell) -> Result<Vec<Move>, PlanError> {
    let mover = match world.at(src) {
        Some(id) => id,
        None => return Err(GridError::EmptyCell(src).into()),
    };
    if src == dst {
        return Ok(Vec::new());
    }
    if world.at(dst).is_some() {
        return Err(GridError::OccupiedCell(dst).into());
    }

    world.detach(src);
    let result = search(world, src, dst);
    world.reattach(mover);
    result
}

fn search(world: &World, src: Cell, dst: Cell) -> Result<Vec<Move>, PlanError> {
    let mut arrival: HashMap<Cell, Move> = HashMap::new();
    let mut visited: HashSet<Cell> = HashSet::from([src]);
    let mut queue = VecDeque::from([src]);

    while let Some(cell) = queue.pop_front() {
        for direction in MoveDirection::iter() {
            let mv = Move::new(cell, direction);
            let target = mv.target();
            if visited.contains(&target) || !mv.is_valid_ignore_connectivity(world) {
                continue;
            }
            visited.insert(target);
            arrival.insert(target, mv);
            if target == dst {
                let path = reconstruct(&arrival, src, dst);
                trace!(%src, %dst, len = path.len(), "move path planned");
                return Ok(path);
            }
            queue.push_back(target);
        }
    }
    Err(PlanError::NoMovePath { from: src, to: dst })
}

fn reconstruct(arrival: &HashMap<Cell, Move>, src: Cell, dst: Cell) -> Vec<Move> {
    let mut path = Vec::new();
    let mut cell = dst;
    while cell != src {
        let mv = arrival[&cell];
        cell = mv.src;
        path.push(mv);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::Color;

    fn world_of(cells: &[(i32, i32)]) -> World {
        let mut world = World::new();
        for &(x, y) in cells {
            world.add_unmarked(Cell::new(x, y), Color::DEFAULT).unwrap();
        }
        world
    }

    #[test]
    fn test_path_along_a_line() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        let path = shortest_move_path(&mut world, Cell::new(4, 0), Cell::new(0, 1)).unwrap();

        // one corner pivot up, then three slides west over the scaffold
        assert_eq!(path.len() as i32, Cell::new(4, 0).chebyshev(Cell::new(0, 1)));
        assert_eq!(path[0].src, Cell::new(4, 0));
        assert_eq!(path.last().unwrap().target(), Cell::new(0, 1));
        for pair in path.windows(2) {
            assert_eq!(pair[0].target(), pair[1].src);
        }
    }

    #[test]
    fn test_planning_leaves_the_world_untouched() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0)]);
        let before: Vec<_> = world.cubes().iter().map(|c| c.pos()).collect();

        shortest_move_path(&mut world, Cell::new(2, 0), Cell::new(0, 1)).unwrap();

        let after: Vec<_> = world.cubes().iter().map(|c| c.pos()).collect();
        assert_eq!(before, after);
        assert_eq!(world.at(Cell::new(2, 0)), Some(2));
    }

    #[test]
    fn test_planning_is_deterministic() {
        let mut world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]);
        let first = shortest_move_path(&mut world, Cell::new(2, 1), Cell::new(1, 1)).unwrap();
        let second = shortest_move_path(&mut world, Cell::new(2, 1), Cell::new(1, 1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unreachable_target() {
        let mut world = world_of(&[(0, 0), (1, 0)]);
        let result = shortest_move_path(&mut world, Cell::new(1, 0), Cell::new(8, 8));
        assert_eq!(
            result,
            Err(PlanError::NoMovePath {
                from: Cell::new(1, 0),
                to: Cell::new(8, 8)
            })
        );
        // the mover is back after a failed search
        assert_eq!(world.at(Cell::new(1, 0)), Some(1));
    }

    #[test]
    fn test_empty_source_and_occupied_target() {
        let mut world = world_of(&[(0, 0), (1, 0)]);
        assert_eq!(
            shortest_move_path(&mut world, Cell::new(4, 4), Cell::new(0, 1)),
            Err(PlanError::Grid(GridError::EmptyCell(Cell::new(4, 4))))
        );
        assert_eq!(
            shortest_move_path(&mut world, Cell::new(1, 0), Cell::new(0, 0)),
            Err(PlanError::Grid(GridError::OccupiedCell(Cell::new(0, 0))))
        );
    }

    #[test]
    fn test_trivial_path() {
        let mut world = world_of(&[(0, 0), (1, 0)]);
        let path = shortest_move_path(&mut world, Cell::new(1, 0), Cell::new(1, 0)).unwrap();
        assert!(path.is_empty());
    }
}
