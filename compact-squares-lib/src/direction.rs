use strum::{Display, EnumIter, EnumString};

use crate::cell::Cell;

/// The eight compass neighbors of a cell, clockwise from north.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Compass {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// The four cardinal directions, the adjacency used for connectivity.
pub const CARDINALS: [Compass; 4] = [Compass::N, Compass::E, Compass::S, Compass::W];

impl Compass {
    pub const ALL: [Compass; 8] = [
        Compass::N,
        Compass::NE,
        Compass::E,
        Compass::SE,
        Compass::S,
        Compass::SW,
        Compass::W,
        Compass::NW,
    ];

    /// Offset to the neighboring cell in this direction.
    pub const fn step(self) -> Cell {
        match self {
            Compass::N => Cell::new(0, 1),
            Compass::NE => Cell::new(1, 1),
            Compass::E => Cell::new(1, 0),
            Compass::SE => Cell::new(1, -1),
            Compass::S => Cell::new(0, -1),
            Compass::SW => Cell::new(-1, -1),
            Compass::W => Cell::new(-1, 0),
            Compass::NW => Cell::new(-1, 1),
        }
    }

    pub const fn is_cardinal(self) -> bool {
        matches!(self, Compass::N | Compass::E | Compass::S | Compass::W)
    }
}

/// The twelve directions a cube can move in: four straight slides and eight
/// corner pivots.
///
/// A corner direction names two cardinal axes. The first must be free of a
/// neighbor (the mover swings through it), the second must hold the supporting
/// neighbor the mover pivots over. `NE` and `EN` reach the same diagonal cell
/// through different supports.
///
/// The declaration order below fixes the neighbor expansion order of the move
/// graph search, so identical inputs always plan identical paths.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum MoveDirection {
    N,
    E,
    S,
    W,
    NW,
    NE,
    EN,
    ES,
    SE,
    SW,
    WS,
    WN,
}

impl MoveDirection {
    /// The slide axis, if this is a straight slide.
    pub const fn slide(self) -> Option<Compass> {
        match self {
            MoveDirection::N => Some(Compass::N),
            MoveDirection::E => Some(Compass::E),
            MoveDirection::S => Some(Compass::S),
            MoveDirection::W => Some(Compass::W),
            _ => None,
        }
    }

    /// The (swing axis, support axis) pair, if this is a corner move.
    pub const fn corner(self) -> Option<(Compass, Compass)> {
        match self {
            MoveDirection::NW => Some((Compass::N, Compass::W)),
            MoveDirection::NE => Some((Compass::N, Compass::E)),
            MoveDirection::EN => Some((Compass::E, Compass::N)),
            MoveDirection::ES => Some((Compass::E, Compass::S)),
            MoveDirection::SE => Some((Compass::S, Compass::E)),
            MoveDirection::SW => Some((Compass::S, Compass::W)),
            MoveDirection::WS => Some((Compass::W, Compass::S)),
            MoveDirection::WN => Some((Compass::W, Compass::N)),
            _ => None,
        }
    }

    /// Offset from the source cell to the target cell.
    pub fn offset(self) -> Cell {
        match self.corner() {
            Some((first, second)) => first.step() + second.step(),
            None => match self.slide() {
                Some(axis) => axis.step(),
                None => unreachable!(),
            },
        }
    }
}
