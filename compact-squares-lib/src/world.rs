use std::collections::HashMap;

use crate::cell::Cell;
use crate::cube::{Color, Cube};
use crate::direction::Compass;
use crate::error::GridError;
use crate::topology;

/// Bounding box over the occupied cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }
}

/// The grid store: an arena of cubes plus a sparse index from cell to arena
/// slot.
///
/// Cube ids are arena indices. They are stable across moves and change only
/// on removal, which compacts the arena and rewrites the index. Mutating
/// operations come in a marked flavour that re-runs component marking and an
/// unmarked flavour that leaves classification stale, for algorithms that
/// perform many micro-edits.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub(crate) cubes: Vec<Cube>,
    pub(crate) index: HashMap<Cell, usize>,
}

impl World {
    pub fn new() -> Self {
        World::default()
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn cube(&self, id: usize) -> &Cube {
        &self.cubes[id]
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub(crate) fn cubes_mut(&mut self) -> &mut [Cube] {
        &mut self.cubes
    }

    /// Id of the cube occupying `cell`, if any.
    pub fn at(&self, cell: Cell) -> Option<usize> {
        self.index.get(&cell).copied()
    }

    /// Adds a cube and re-marks.
    pub fn add(&mut self, cell: Cell, color: Color) -> Result<usize, GridError> {
        let id = self.add_unmarked(cell, color)?;
        self.mark();
        Ok(id)
    }

    /// Adds a cube without re-marking.
    pub fn add_unmarked(&mut self, cell: Cell, color: Color) -> Result<usize, GridError> {
        if self.index.contains_key(&cell) {
            return Err(GridError::OccupiedCell(cell));
        }
        let id = self.cubes.len();
        self.cubes.push(Cube::new(cell, color));
        self.index.insert(cell, id);
        Ok(id)
    }

    /// Removes the cube at `cell` and re-marks. Ids above the removed slot
    /// shift down by one.
    pub fn remove(&mut self, cell: Cell) -> Result<Cube, GridError> {
        let cube = self.remove_unmarked(cell)?;
        self.mark();
        Ok(cube)
    }

    /// Removes the cube at `cell` without re-marking.
    pub fn remove_unmarked(&mut self, cell: Cell) -> Result<Cube, GridError> {
        let id = self.at(cell).ok_or(GridError::EmptyCell(cell))?;
        let cube = self.cubes.remove(id);
        self.rebuild_index();
        Ok(cube)
    }

    /// Moves the cube at `src` to the empty cell `dst` and re-marks.
    /// Returns the id of the moved cube.
    pub fn move_cube(&mut self, src: Cell, dst: Cell) -> Result<usize, GridError> {
        let id = self.move_cube_unmarked(src, dst)?;
        self.mark();
        Ok(id)
    }

    /// Moves the cube at `src` to the empty cell `dst` without re-marking.
    /// O(1): one index entry moves, the arena slot is updated in place.
    pub fn move_cube_unmarked(&mut self, src: Cell, dst: Cell) -> Result<usize, GridError> {
        let id = self.at(src).ok_or(GridError::EmptyCell(src))?;
        if self.index.contains_key(&dst) {
            return Err(GridError::OccupiedCell(dst));
        }
        self.index.remove(&src);
        self.index.insert(dst, id);
        self.cubes[id].pos = dst;
        Ok(id)
    }

    /// Bounding box of the occupied cells, or `None` for an empty world.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut cubes = self.cubes.iter();
        let first = cubes.next()?.pos;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for cube in cubes {
            bounds.min_x = bounds.min_x.min(cube.pos.x);
            bounds.min_y = bounds.min_y.min(cube.pos.y);
            bounds.max_x = bounds.max_x.max(cube.pos.x);
            bounds.max_y = bounds.max_y.max(cube.pos.y);
        }
        Some(bounds)
    }

    /// Whether `cell` has a neighbor in compass direction `dir`.
    pub fn has(&self, cell: Cell, dir: Compass) -> bool {
        self.at(cell + dir.step()).is_some()
    }

    /// Presence flags for the eight compass neighbors of `cell`, in
    /// [`Compass::ALL`] order.
    pub fn neighbors(&self, cell: Cell) -> [bool; 8] {
        let mut flags = [false; 8];
        for (flag, dir) in flags.iter_mut().zip(Compass::ALL) {
            *flag = self.has(cell, dir);
        }
        flags
    }

    /// Cube ids in the eight compass neighbors of `cell`, in
    /// [`Compass::ALL`] order.
    pub fn neighbor_map(&self, cell: Cell) -> [Option<usize>; 8] {
        let mut map = [None; 8];
        for (slot, dir) in map.iter_mut().zip(Compass::ALL) {
            *slot = self.at(cell + dir.step());
        }
        map
    }

    /// Id of the downmost-leftmost cube, the root of the plan.
    pub fn root(&self) -> Option<usize> {
        self.cubes
            .iter()
            .enumerate()
            .min_by_key(|(_, cube)| cube.pos.yx())
            .map(|(id, _)| id)
    }

    /// Re-runs component marking over the current configuration.
    pub fn mark(&mut self) {
        topology::mark_components(self);
    }

    /// Restores every cube to its creation cell and re-marks.
    pub fn reset(&mut self) {
        for cube in &mut self.cubes {
            cube.pos = cube.reset_pos;
        }
        self.rebuild_index();
        self.mark();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (id, cube) in self.cubes.iter().enumerate() {
            self.index.insert(cube.pos, id);
        }
    }

    /// Takes the cube at `cell` out of the index so legality checks treat its
    /// cell as empty. The arena is untouched, so ids stay stable. Pair with
    /// [`World::reattach`].
    pub(crate) fn detach(&mut self, cell: Cell) -> Option<usize> {
        self.index.remove(&cell)
    }

    /// Re-inserts a detached cube at its current position.
    pub(crate) fn reattach(&mut self, id: usize) {
        self.index.insert(self.cubes[id].pos, id);
    }
}
