use crate::cell::{Cell, GeometryViolation};
use crate::configuration::Configuration;
use crate::error::{PackingError, Result};
use crate::moves::{AcceptanceStats, Move, MoveKind, Target};
use crate::params::DriverParams;
use crate::rng::UniformSource;
use crate::shape::ShapeKind;
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::io::Write;
use tracing::{debug, info, trace};

/// Why a proposed move was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The new cell failed the hard geometric constraint.
    Geometry(GeometryViolation),
    /// Two bodies, or a body and a periodic image, overlap.
    Overlap,
    /// The Boltzmann coin came up against the move.
    Metropolis,
}

/// Result of one [`Driver::make_move`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub kind: MoveKind,
    pub rejection: Option<Rejection>,
}

impl StepOutcome {
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// One Monte Carlo replica: a periodic cell, its particles and the moves
/// acting on them.
///
/// Outside of [`Driver::make_move`] the configuration is always overlap-free.
#[derive(Debug)]
pub struct Driver {
    config: Configuration,
    /// Translation (and, for tetrahedra, rotation) moves, one per particle
    particle_moves: Vec<Move>,
    /// Registered cell moves; empty when both cell deltas are zero
    cell_moves: Vec<Move>,
    params: DriverParams,
    rng: StdRng,
    steps: u64,
}

impl Driver {
    pub fn new(params: DriverParams) -> Result<Self> {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(params, rng)
    }

    /// Build a driver around an explicit generator, ignoring `params.seed`.
    pub fn with_rng(params: DriverParams, mut rng: StdRng) -> Result<Self> {
        params.validate()?;
        let config = place_particles(&params, &mut rng)?;

        let mut particle_moves = Vec::new();
        for index in 0..config.n_particles() {
            particle_moves.push(Move::translation(index, params.translation_delta));
            // a sphere has no orientation
            if params.shape == ShapeKind::Tetrahedron {
                particle_moves.push(Move::rotation(index, params.rotation_delta));
            }
        }
        let mut cell_moves = Vec::new();
        if params.cell_shape_delta > 0.0 {
            cell_moves.push(Move::cell_shape(params.cell_shape_delta));
        }
        if params.cell_volume_delta > 0.0 {
            cell_moves.push(Move::cell_volume(params.cell_volume_delta));
        }

        Ok(Self {
            config,
            particle_moves,
            cell_moves,
            params,
            rng,
            steps: 0,
        })
    }

    /// Propose, test and either commit or undo exactly one move.
    pub fn make_move(&mut self) -> Result<StepOutcome> {
        let cell_branch =
            !self.cell_moves.is_empty() && self.rng.uniform(0.0, 1.0) < self.params.p_cell_move;
        let outcome = if cell_branch {
            self.cell_step()?
        } else {
            self.particle_step()?
        };
        self.steps += 1;
        if let Some(reason) = outcome.rejection {
            trace!(step = self.steps, kind = %outcome.kind, ?reason, "move rejected");
        }
        Ok(outcome)
    }

    /// Run `steps` moves and return how many were accepted.
    pub fn run(&mut self, steps: usize) -> Result<usize> {
        let mut accepted = 0;
        for _ in 0..steps {
            accepted += self.make_move()?.accepted() as usize;
        }
        Ok(accepted)
    }

    fn cell_step(&mut self) -> Result<StepOutcome> {
        let k = self.rng.index(self.cell_moves.len());
        let mv = &mut self.cell_moves[k];
        let v_before = self.config.cell().volume();
        let pending = mv.apply(&mut self.config, &mut self.rng)?;
        let v_after = self.config.cell().volume();

        let rejection = if let Some(violation) = self
            .config
            .cell()
            .check_geometry(self.params.min_basis_length, self.params.project_threshold)
        {
            Some(Rejection::Geometry(violation))
        } else if !self.config.is_overlap_free() {
            Some(Rejection::Overlap)
        } else if !self
            .rng
            .metropolis(self.params.beta_p * (v_after - v_before))
        {
            Some(Rejection::Metropolis)
        } else {
            None
        };

        if rejection.is_none() {
            mv.commit(pending);
            self.config.wrap_all()?;
        } else {
            mv.undo(pending, &mut self.config)?;
        }
        Ok(StepOutcome {
            kind: mv.kind(),
            rejection,
        })
    }

    fn particle_step(&mut self) -> Result<StepOutcome> {
        let k = self.rng.index(self.particle_moves.len());
        let mv = &mut self.particle_moves[k];
        let index = match mv.target() {
            Target::Particle(index) => index,
            Target::Cell => {
                return Err(PackingError::InvalidParameter(format!(
                    "{} registered as a particle move",
                    mv.kind()
                )))
            }
        };
        let bias = self.params.beta > 0.0;
        let e_old = if bias {
            confinement_energy(&self.config, index)?
        } else {
            0.0
        };
        let pending = mv.apply(&mut self.config, &mut self.rng)?;

        let rejection = if self.config.collides(index)? {
            Some(Rejection::Overlap)
        } else if bias {
            let e_new = confinement_energy(&self.config, index)?;
            (!self.rng.metropolis(self.params.beta * (e_new - e_old))).then_some(Rejection::Metropolis)
        } else {
            None
        };

        if rejection.is_none() {
            mv.commit(pending);
            self.config.wrap_particle(index)?;
        } else {
            mv.undo(pending, &mut self.config)?;
        }
        Ok(StepOutcome {
            kind: mv.kind(),
            rejection,
        })
    }

    /// Adjust every move's step size towards `target` acceptance.
    pub fn tune_step_sizes(&mut self, target: f64) {
        let before = self.acceptance_summary();
        let mut deltas: BTreeMap<MoveKind, (f64, usize)> = BTreeMap::new();
        for mv in self.particle_moves.iter_mut().chain(self.cell_moves.iter_mut()) {
            let delta = mv.tune(target);
            let entry = deltas.entry(mv.kind()).or_insert((0.0, 0));
            entry.0 += delta;
            entry.1 += 1;
        }
        for (kind, (sum, count)) in deltas {
            let ratio = before.get(&kind).map_or(0.0, AcceptanceStats::ratio);
            info!(
                kind = %kind,
                acceptance = ratio,
                delta = sum / count as f64,
                "tuned step size"
            );
        }
    }

    /// Counters aggregated per move kind since the last tune.
    pub fn acceptance_summary(&self) -> BTreeMap<MoveKind, AcceptanceStats> {
        let mut summary: BTreeMap<MoveKind, AcceptanceStats> = BTreeMap::new();
        for mv in self.particle_moves.iter().chain(&self.cell_moves) {
            summary.entry(mv.kind()).or_default().merge(mv.stats());
        }
        summary
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.particle_moves.iter().chain(&self.cell_moves)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn cell(&self) -> &Cell {
        self.config.cell()
    }

    pub fn params(&self) -> &DriverParams {
        &self.params
    }

    pub fn packing_fraction(&self) -> f64 {
        self.config.packing_fraction()
    }

    pub fn volume(&self) -> f64 {
        self.config.cell().volume()
    }

    pub fn beta_p(&self) -> f64 {
        self.params.beta_p
    }

    pub fn set_beta_p(&mut self, beta_p: f64) {
        self.params.beta_p = beta_p;
    }

    pub fn beta(&self) -> f64 {
        self.params.beta
    }

    pub fn set_beta(&mut self, beta: f64) {
        self.params.beta = beta;
    }

    /// Number of `make_move` calls so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn write_snapshot<W: Write>(&self, writer: &mut W, with_ghosts: bool) -> std::io::Result<()> {
        self.config.write_snapshot(writer, with_ghosts)
    }
}

/// Distance of particle `index` from the cell centre in fractional coordinates.
fn confinement_energy(config: &Configuration, index: usize) -> Result<f64> {
    let s = config.cell().partial_coords(&config.particle(index)?.com())?;
    Ok((s - Vector3::repeat(0.5)).norm())
}

/// Place every particle at the cell centre with a random orientation, then
/// move it to random positions until it overlaps nothing.
fn place_particles(params: &DriverParams, rng: &mut StdRng) -> Result<Configuration> {
    let cell = Cell::cubic(params.initial_side())?;
    let centre = cell.to_absolute(&Vector3::repeat(0.5));
    let mut config = Configuration::empty(cell);

    for particle in 0..params.n_particles {
        let roll = rng.uniform(0.0, 2.0 * PI);
        let pitch = rng.uniform(0.0, 2.0 * PI);
        let yaw = rng.uniform(0.0, 2.0 * PI);
        let index = config.push(params.shape.build(centre, roll, pitch, yaw));

        let mut attempts = 1;
        while config.collides(index)? {
            if attempts >= params.max_placement_attempts {
                return Err(PackingError::PlacementFailed { particle, attempts });
            }
            let s = Vector3::from_fn(|_, _| rng.uniform(0.0, 1.0));
            let target = config.cell().to_absolute(&s);
            let p = config.particle_mut(index)?;
            let dr = target - p.com();
            p.translate(&dr);
            attempts += 1;
        }
        debug!(particle, attempts, "placed particle");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spheres(n: usize, side: f64) -> DriverParams {
        DriverParams {
            shape: ShapeKind::Sphere,
            n_particles: n,
            initial_cell_scale: Some(side),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_registers_moves_per_shape() {
        let driver = Driver::new(spheres(3, 4.0)).unwrap();
        let kinds: Vec<_> = driver.moves().map(Move::kind).collect();
        assert_eq!(
            kinds,
            vec![
                MoveKind::ParticleTranslation,
                MoveKind::ParticleTranslation,
                MoveKind::ParticleTranslation,
                MoveKind::CellShape,
                MoveKind::CellVolume,
            ]
        );

        let driver = Driver::new(DriverParams {
            n_particles: 2,
            cell_volume_delta: 0.0,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        let summary = driver.acceptance_summary();
        assert!(summary.contains_key(&MoveKind::ParticleRotation));
        assert!(!summary.contains_key(&MoveKind::CellVolume));
    }

    #[test]
    fn test_placement_is_overlap_free() {
        let driver = Driver::new(DriverParams {
            n_particles: 6,
            seed: Some(9),
            ..Default::default()
        })
        .unwrap();
        assert!(driver.configuration().is_overlap_free());
        assert_eq!(driver.configuration().n_particles(), 6);
    }

    #[test]
    fn test_placement_gives_up() {
        // two unit spheres cannot fit into a 0.8 cube
        let err = Driver::new(DriverParams {
            max_placement_attempts: 50,
            ..spheres(2, 0.8)
        })
        .unwrap_err();
        assert!(matches!(err, PackingError::PlacementFailed { particle: 0, attempts: 50 }));
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = Driver::new(spheres(4, 4.0)).unwrap();
        let mut b = Driver::new(spheres(4, 4.0)).unwrap();
        for _ in 0..200 {
            assert_eq!(a.make_move().unwrap(), b.make_move().unwrap());
        }
        assert_eq!(a.cell().h(), b.cell().h());
        assert_eq!(a.steps(), 200);
    }

    #[test]
    fn test_high_pressure_is_rejected_by_metropolis() {
        let mut driver = Driver::new(DriverParams {
            p_cell_move: 1.0,
            cell_shape_delta: 0.0,
            cell_volume_delta: 0.5,
            beta_p: 1e6,
            ..spheres(1, 3.0)
        })
        .unwrap();
        let mut grew = 0;
        for _ in 0..100 {
            let before = driver.volume();
            let outcome = driver.make_move().unwrap();
            assert_eq!(outcome.kind, MoveKind::CellVolume);
            if driver.volume() > before + 1e-12 {
                grew += 1;
            }
        }
        assert_eq!(grew, 0);
    }

    #[test]
    fn test_summary_counts_every_step() {
        let mut driver = Driver::new(spheres(3, 4.0)).unwrap();
        let accepted = driver.run(300).unwrap();
        let summary = driver.acceptance_summary();
        let attempted: u64 = summary.values().map(|s| s.attempted).sum();
        let committed: u64 = summary.values().map(|s| s.accepted).sum();
        assert_eq!(attempted, 300);
        assert_eq!(committed as usize, accepted);

        driver.tune_step_sizes(0.3);
        assert!(driver.acceptance_summary().values().all(|s| s.attempted == 0));
    }
}
