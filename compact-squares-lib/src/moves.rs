use std::fmt;

use crate::cell::Cell;
use crate::direction::{Compass, MoveDirection};
use crate::topology;
use crate::world::World;

/// A single-cube move: the cell the mover currently occupies plus one of the
/// twelve move directions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub src: Cell,
    pub direction: MoveDirection,
}

impl Move {
    pub const fn new(src: Cell, direction: MoveDirection) -> Self {
        Move { src, direction }
    }

    /// The cell the mover ends up in.
    pub fn target(&self) -> Cell {
        self.src + self.direction.offset()
    }

    /// Local legality: the target is empty and the neighborhood supports the
    /// motion. A slide needs a flanking neighbor on either side together with
    /// its diagonal toward the target; a corner move needs its swing cell
    /// free and its support present. Connectivity is not consulted.
    pub fn is_valid_ignore_connectivity(&self, world: &World) -> bool {
        if world.at(self.target()).is_some() {
            return false;
        }
        let has = |dir: Compass| world.has(self.src, dir);
        if let Some((swing, support)) = self.direction.corner() {
            return !has(swing) && has(support);
        }
        match self.direction {
            MoveDirection::N => (has(Compass::W) && has(Compass::NW)) || (has(Compass::E) && has(Compass::NE)),
            MoveDirection::E => (has(Compass::N) && has(Compass::NE)) || (has(Compass::S) && has(Compass::SE)),
            MoveDirection::S => (has(Compass::E) && has(Compass::SE)) || (has(Compass::W) && has(Compass::SW)),
            MoveDirection::W => (has(Compass::S) && has(Compass::SW)) || (has(Compass::N) && has(Compass::NW)),
            _ => unreachable!(),
        }
    }

    /// Full legality: locally legal and removing the mover keeps the rest of
    /// the configuration 4-connected.
    pub fn is_valid(&self, world: &World) -> bool {
        if !self.is_valid_ignore_connectivity(world) {
            return false;
        }
        match world.at(self.src) {
            Some(id) => topology::is_connected_without(world, id),
            None => false,
        }
    }

    /// Position of the mover at animation time `t` in `0..=1`, in grid
    /// coordinates. Cubic ease-in-out; corner moves pivot through the cell
    /// reached by the swing axis first.
    pub fn interpolate(&self, t: f32) -> (f32, f32) {
        let eased = ease_in_out_cubic(t.clamp(0.0, 1.0));
        let from = (self.src.x as f32, self.src.y as f32);
        let to = {
            let target = self.target();
            (target.x as f32, target.y as f32)
        };
        match self.direction.corner() {
            None => lerp(from, to, eased),
            Some((swing, _)) => {
                let mid_cell = self.src + swing.step();
                let mid = (mid_cell.x as f32, mid_cell.y as f32);
                if eased < 0.5 {
                    lerp(from, mid, eased * 2.0)
                } else {
                    lerp(mid, to, (eased - 0.5) * 2.0)
                }
            }
        }
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn lerp(from: (f32, f32), to: (f32, f32), t: f32) -> (f32, f32) {
    (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.src)
    }
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
    fn test_slide_needs_a_flank_and_its_diagonal() {
        // mover at (0, 1) slides east over the bottom row
        let world = world_of(&[(0, 0), (1, 0), (0, 1)]);
        let mv = Move::new(Cell::new(0, 1), MoveDirection::E);
        assert!(mv.is_valid_ignore_connectivity(&world));

        // without the diagonal toward the target the slide is unsupported
        let world = world_of(&[(0, 0), (0, 1)]);
        assert!(!mv.is_valid_ignore_connectivity(&world));
    }

    #[test]
    fn test_slide_into_occupied_cell_is_illegal() {
        let world = world_of(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let mv = Move::new(Cell::new(0, 1), MoveDirection::E);
        assert!(!mv.is_valid_ignore_connectivity(&world));
    }

    #[test]
    fn test_corner_needs_free_swing_and_support() {
        let world = world_of(&[(0, 0), (0, 1)]);

        // pivot south-east around the support below
        let mv = Move::new(Cell::new(0, 1), MoveDirection::ES);
        assert!(mv.is_valid_ignore_connectivity(&world));
        assert_eq!(mv.target(), Cell::new(1, 0));

        // the mirror decomposition swings through the occupied south cell
        let mv = Move::new(Cell::new(0, 1), MoveDirection::SE);
        assert!(!mv.is_valid_ignore_connectivity(&world));
    }

    #[test]
    fn test_validity_vetoes_disconnecting_moves() {
        // u-shape: sliding the bottom middle cube up is locally fine but
        // splits the two arms
        let world = world_of(&[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)]);
        let mv = Move::new(Cell::new(1, 0), MoveDirection::N);

        assert!(mv.is_valid_ignore_connectivity(&world));
        assert!(!mv.is_valid(&world));

        // moving an arm tip keeps everything connected
        let mv = Move::new(Cell::new(2, 1), MoveDirection::W);
        assert!(mv.is_valid(&world));
    }

    #[test]
    fn test_is_valid_on_empty_source() {
        let world = world_of(&[(0, 0), (1, 0)]);
        assert!(!Move::new(Cell::new(5, 5), MoveDirection::N).is_valid(&world));
    }

    #[test]
    fn test_interpolation_endpoints() {
        let mv = Move::new(Cell::new(2, 3), MoveDirection::NW);

        assert_eq!(mv.interpolate(0.0), (2.0, 3.0));
        assert_eq!(mv.interpolate(1.0), (1.0, 4.0));
        // halfway through a corner move the mover sits on the swing cell
        assert_eq!(mv.interpolate(0.5), (2.0, 4.0));
    }
}
