//! Reversible trial moves.
//!
//! A [`Move`] is applied to a [`Configuration`] and hands back a
//! [`PendingMove`] that must be consumed by exactly one of [`Move::commit`]
//! or [`Move::undo`] before the same move can be applied again.

mod cell;
mod particle;

use crate::configuration::Configuration;
use crate::error::{PackingError, Result};
use crate::rng::UniformSource;
use crate::shape::Shape;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Smallest step size the controller will shrink to.
pub const MIN_DELTA: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    ParticleTranslation,
    ParticleRotation,
    CellShape,
    CellVolume,
}

impl MoveKind {
    pub const ALL: [MoveKind; 4] = [
        MoveKind::ParticleTranslation,
        MoveKind::ParticleRotation,
        MoveKind::CellShape,
        MoveKind::CellVolume,
    ];

    pub fn is_cell_move(self) -> bool {
        matches!(self, MoveKind::CellShape | MoveKind::CellVolume)
    }

    /// Largest step size the controller will grow to.
    pub fn max_delta(self) -> f64 {
        match self {
            MoveKind::ParticleTranslation => 1.0,
            MoveKind::ParticleRotation => PI,
            MoveKind::CellShape => 0.25,
            MoveKind::CellVolume => 1e6,
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveKind::ParticleTranslation => "translation",
            MoveKind::ParticleRotation => "rotation",
            MoveKind::CellShape => "cell-shape",
            MoveKind::CellVolume => "cell-volume",
        };
        f.write_str(name)
    }
}

/// What a move mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Particle(usize),
    Cell,
}

/// Accepted/attempted counters since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceStats {
    pub accepted: u64,
    pub attempted: u64,
}

impl AcceptanceStats {
    pub fn ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }

    pub fn merge(&mut self, other: &AcceptanceStats) {
        self.accepted += other.accepted;
        self.attempted += other.attempted;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveState {
    Idle,
    Pending,
}

/// State needed to revert one application.
#[derive(Debug, Clone)]
enum Undo {
    Particle { index: usize, body: Shape },
    Cell {
        h: Matrix3<f64>,
        fractional: Vec<Vector3<f64>>,
    },
}

/// An applied, not yet resolved, move.
#[must_use = "a pending move must be committed or undone"]
#[derive(Debug)]
pub struct PendingMove {
    kind: MoveKind,
    undo: Undo,
}

impl PendingMove {
    pub fn kind(&self) -> MoveKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
pub struct Move {
    kind: MoveKind,
    target: Target,
    delta_max: f64,
    stats: AcceptanceStats,
    state: MoveState,
    // fractional coordinates lent to the pending undo of a cell move
    scratch: Vec<Vector3<f64>>,
}

impl Move {
    fn new(kind: MoveKind, target: Target, delta_max: f64) -> Self {
        Self {
            kind,
            target,
            delta_max,
            stats: AcceptanceStats::default(),
            state: MoveState::Idle,
            scratch: Vec::new(),
        }
    }

    /// Uniform displacement of particle `index` inside `[-delta_max, delta_max]³`.
    pub fn translation(index: usize, delta_max: f64) -> Self {
        Self::new(MoveKind::ParticleTranslation, Target::Particle(index), delta_max)
    }

    /// Rotation of particle `index` by three angles in `[-delta_max, delta_max]`.
    pub fn rotation(index: usize, delta_max: f64) -> Self {
        Self::new(MoveKind::ParticleRotation, Target::Particle(index), delta_max)
    }

    /// Symmetric strain `h ← (I + e)·h` with entries in `[-delta_max, delta_max]`.
    pub fn cell_shape(delta_max: f64) -> Self {
        Self::new(MoveKind::CellShape, Target::Cell, delta_max)
    }

    /// Stretch of one basis vector that changes the volume by `dv ∈ [-delta_max, delta_max]`.
    pub fn cell_volume(delta_max: f64) -> Self {
        Self::new(MoveKind::CellVolume, Target::Cell, delta_max)
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn delta_max(&self) -> f64 {
        self.delta_max
    }

    pub fn stats(&self) -> &AcceptanceStats {
        &self.stats
    }

    pub fn is_pending(&self) -> bool {
        self.state == MoveState::Pending
    }

    /// Mutate `config` and return the token that reverts it.
    pub fn apply<R: UniformSource + ?Sized>(
        &mut self,
        config: &mut Configuration,
        rng: &mut R,
    ) -> Result<PendingMove> {
        if self.is_pending() {
            return Err(PackingError::MovePending(self.kind));
        }
        let undo = match (self.kind, self.target) {
            (MoveKind::ParticleTranslation, Target::Particle(index)) => {
                particle::translate(config, index, self.delta_max, rng)?
            }
            (MoveKind::ParticleRotation, Target::Particle(index)) => {
                particle::rotate(config, index, self.delta_max, rng)?
            }
            (MoveKind::CellShape, Target::Cell) => {
                cell::strain(config, self.delta_max, rng, &mut self.scratch)?
            }
            (MoveKind::CellVolume, Target::Cell) => {
                cell::resize(config, self.delta_max, rng, &mut self.scratch)?
            }
            (kind, target) => {
                return Err(PackingError::InvalidParameter(format!(
                    "{kind} move cannot target {target:?}"
                )))
            }
        };
        self.stats.attempted += 1;
        self.state = MoveState::Pending;
        Ok(PendingMove {
            kind: self.kind,
            undo,
        })
    }

    /// Keep the applied change.
    pub fn commit(&mut self, pending: PendingMove) {
        debug_assert_eq!(pending.kind, self.kind);
        self.stats.accepted += 1;
        self.state = MoveState::Idle;
        if let Undo::Cell { fractional, .. } = pending.undo {
            self.scratch = fractional;
        }
    }

    /// Restore `config` to its state before `apply`, derived caches included.
    pub fn undo(&mut self, pending: PendingMove, config: &mut Configuration) -> Result<()> {
        debug_assert_eq!(pending.kind, self.kind);
        self.state = MoveState::Idle;
        match pending.undo {
            Undo::Particle { index, body } => config.restore_particle(index, body),
            Undo::Cell { h, fractional } => {
                config.restore_cell(h, &fractional);
                self.scratch = fractional;
                Ok(())
            }
        }
    }

    /// Double `delta_max` if the acceptance ratio since the last call beats
    /// `target`, halve it otherwise, then reset the counters.
    pub fn tune(&mut self, target: f64) -> f64 {
        if self.stats.attempted > 0 {
            self.delta_max = if self.stats.ratio() > target {
                (2.0 * self.delta_max).min(self.kind.max_delta())
            } else {
                (0.5 * self.delta_max).max(MIN_DELTA)
            };
        }
        self.stats.reset();
        self.delta_max
    }
}
