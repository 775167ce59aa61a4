use crate::cell::Cell;
use crate::direction::Compass;
use crate::world::World;

/// The canonical target shape: the unique tight xy-monotone packing of `n`
/// cubes anchored at the root cell.
///
/// Cells are enumerated along anti-diagonals of increasing `x + y`, bottom to
/// top within each diagonal. Every prefix of that enumeration is 4-connected
/// and xy-monotone, so the phases can fill slots one at a time without ever
/// breaking the shape invariants of the growing packing.
#[derive(Debug, Clone)]
pub struct Staircase {
    anchor: Cell,
    /// All slots, sorted bottom-to-top then west-to-east.
    cells: Vec<Cell>,
}

impl Staircase {
    pub fn new(anchor: Cell, count: usize) -> Self {
        let mut cells = Vec::with_capacity(count);
        let mut diagonal = 0;
        while cells.len() < count {
            for y in 0..=diagonal {
                if cells.len() < count {
                    cells.push(anchor + Cell::new(diagonal - y, y));
                }
            }
            diagonal += 1;
        }
        cells.sort_by_key(|cell| cell.yx());
        Staircase { anchor, cells }
    }

    pub fn anchor(&self) -> Cell {
        self.anchor
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search_by_key(&cell.yx(), |c| c.yx()).is_ok()
    }

    /// The lowest-then-leftmost slot not currently occupied. Filling slots in
    /// this order guarantees the slot's southern and western predecessors are
    /// already filled.
    pub fn next_free_slot(&self, world: &World) -> Option<Cell> {
        self.cells.iter().copied().find(|&cell| world.at(cell).is_none())
    }

    /// Whether every slot is occupied, i.e. the configuration reached its
    /// target shape.
    pub fn is_complete(&self, world: &World) -> bool {
        world.len() == self.cells.len() && self.next_free_slot(world).is_none()
    }
}

/// Whether every cube off the west and south faces of the bounding box has
/// both a western and a southern neighbor.
pub fn is_xy_monotone(world: &World) -> bool {
    let Some(bounds) = world.bounds() else {
        return true;
    };
    world.cubes().iter().all(|cube| {
        let pos = cube.pos();
        pos.x == bounds.min_x
            || pos.y == bounds.min_y
            || (world.has(pos, Compass::W) && world.has(pos, Compass::S))
    })
}
