use crate::cell::Cell;
use crate::moves::Move;

/// Errors from the grid store. These indicate programming bugs in the caller
/// and are fatal to a run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("cell {0} is already occupied")]
    OccupiedCell(Cell),
    #[error("cell {0} is empty")]
    EmptyCell(Cell),
}

/// Errors from the move graph planner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The move graph search exhausted every reachable cell without hitting
    /// the target. Recoverable: the phases skip the target and try the next.
    #[error("no move path from {from} to {to}")]
    NoMovePath { from: Cell, to: Cell },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors surfaced by the stepper while driving a plan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgorithmError {
    /// A phase emitted a move that fails re-validation against the current
    /// configuration.
    #[error("illegal move emitted: {0}")]
    InvalidMove(Move),
    /// The configuration is too small for the plan to be defined and is not
    /// already in its target shape.
    #[error("configuration of {0} cubes is too light to reconfigure")]
    LightConfiguration(usize),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors from loading or saving instance documents.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("unknown instance version {0}")]
    BadVersion(u32),
    #[error("instance is not 4-connected")]
    Disconnected,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
