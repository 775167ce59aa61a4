use strum::Display;
use tracing::debug;

use crate::cell::Cell;
use crate::compact::CompactPhase;
use crate::cube::Classification;
use crate::error::AlgorithmError;
use crate::gather::GatherPhase;
use crate::moves::Move;
use crate::staircase::Staircase;
use crate::world::World;

/// Configurations below this size are undefined for the plan unless they
/// already sit in their target packing.
const LIGHT_THRESHOLD: usize = 5;

/// Which phase produced a committed move.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum PhaseLabel {
    Gather,
    Compact,
}

/// One committed move of the transcript.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// 1-based step number over the whole run.
    pub index: usize,
    pub phase: PhaseLabel,
    pub from: Cell,
    pub to: Cell,
    /// Classification of the moved cube after the commit. Stale in unmarked
    /// mode.
    pub tag: Classification,
}

/// Per-phase move counts of a finished run.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub gather_steps: usize,
    pub compact_steps: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.gather_steps + self.compact_steps
    }
}

/// Drives the two phases over an owned configuration, one move at a time.
///
/// The stepper is the only mover of cubes: it pulls a move from the active
/// phase, re-validates it against the current configuration, commits it, and
/// surfaces a transcript record. Marked mode re-runs component marking after
/// every commit so interactive surfaces can show live classifications;
/// unmarked mode skips that for batch runs.
#[derive(Debug)]
pub struct Stepper {
    world: World,
    gather: GatherPhase,
    compact: CompactPhase,
    phase: PhaseLabel,
    summary: RunSummary,
    current: Option<Move>,
    marked: bool,
    done: bool,
}

impl Stepper {
    /// Sets up a run over `world`, which must already be 4-connected.
    ///
    /// Configurations of fewer than five cubes are rejected with
    /// [`AlgorithmError::LightConfiguration`] unless they already occupy
    /// their target packing, in which case the run is a no-op.
    pub fn new(world: World, marked: bool) -> Result<Self, AlgorithmError> {
        let anchor = world
            .root()
            .map(|root| world.cube(root).pos())
            .unwrap_or_default();
        let staircase = Staircase::new(anchor, world.len());
        if world.len() < LIGHT_THRESHOLD && !staircase.is_complete(&world) {
            return Err(AlgorithmError::LightConfiguration(world.len()));
        }
        Ok(Stepper {
            world,
            gather: GatherPhase::new(staircase.clone()),
            compact: CompactPhase::new(staircase),
            phase: PhaseLabel::Gather,
            summary: RunSummary::default(),
            current: None,
            marked,
            done: false,
        })
    }

    /// Commits the next move and returns its transcript record, or `None`
    /// once the run is finished.
    pub fn step(&mut self) -> Result<Option<StepRecord>, AlgorithmError> {
        if self.done {
            return Ok(None);
        }
        let mv = loop {
            match self.phase {
                PhaseLabel::Gather => match self.gather.next_move(&mut self.world)? {
                    Some(mv) => break mv,
                    None => {
                        debug!(steps = self.summary.gather_steps, "gather finished");
                        self.phase = PhaseLabel::Compact;
                    }
                },
                PhaseLabel::Compact => match self.compact.next_move(&mut self.world)? {
                    Some(mv) => break mv,
                    None => {
                        debug!(steps = self.summary.compact_steps, "compact finished");
                        self.done = true;
                        self.current = None;
                        self.world.mark();
                        return Ok(None);
                    }
                },
            }
        };

        if !mv.is_valid(&self.world) {
            return Err(AlgorithmError::InvalidMove(mv));
        }
        let to = mv.target();
        let id = if self.marked {
            self.world.move_cube(mv.src, to)?
        } else {
            self.world.move_cube_unmarked(mv.src, to)?
        };

        match self.phase {
            PhaseLabel::Gather => self.summary.gather_steps += 1,
            PhaseLabel::Compact => self.summary.compact_steps += 1,
        }
        self.current = Some(mv);
        Ok(Some(StepRecord {
            index: self.summary.total(),
            phase: self.phase,
            from: mv.src,
            to,
            tag: self.world.cube(id).tag(),
        }))
    }

    /// Runs to completion and returns the per-phase move counts.
    pub fn run(&mut self) -> Result<RunSummary, AlgorithmError> {
        while self.step()?.is_some() {}
        Ok(self.summary)
    }

    /// The configuration as of the last committed move.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// The move most recently committed, for animation.
    pub fn current_move(&self) -> Option<Move> {
        self.current
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
