//! Configuration management for packing runs
//!
//! A YAML file is parsed into sections whose fields are all optional;
//! `with_defaults` fills the gaps, and command-line flags override the result.

mod args;

pub use args::Args;

use color_eyre::eyre::{eyre, Result, WrapErr};
use packing::{DriverParams, ShapeKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure for a packing run
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub system: SystemParams,
    #[serde(default)]
    pub moves: MoveParams,
    #[serde(default)]
    pub ensemble: EnsembleParams,
    #[serde(default)]
    pub run: RunParams,
    pub tempering: Option<TemperingParams>,
}

/// What is simulated
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SystemParams {
    pub shape: Option<ShapeKind>,
    pub n_particles: Option<usize>,
    /// Side of the initial cubic cell (default: the particle count)
    pub initial_cell_scale: Option<f64>,
    pub max_placement_attempts: Option<usize>,
}

impl SystemParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = DriverParams::default();
        self.shape = self.shape.or(Some(defaults.shape));
        self.n_particles = self.n_particles.or(Some(defaults.n_particles));
        self.max_placement_attempts = self
            .max_placement_attempts
            .or(Some(defaults.max_placement_attempts));
        self
    }
}

/// Move selection and step sizes
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MoveParams {
    pub p_cell_move: Option<f64>,
    pub translation_delta: Option<f64>,
    pub rotation_delta: Option<f64>,
    pub cell_shape_delta: Option<f64>,
    pub cell_volume_delta: Option<f64>,
    pub project_threshold: Option<f64>,
    pub min_basis_length: Option<f64>,
}

impl MoveParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let d = DriverParams::default();
        self.p_cell_move = self.p_cell_move.or(Some(d.p_cell_move));
        self.translation_delta = self.translation_delta.or(Some(d.translation_delta));
        self.rotation_delta = self.rotation_delta.or(Some(d.rotation_delta));
        self.cell_shape_delta = self.cell_shape_delta.or(Some(d.cell_shape_delta));
        self.cell_volume_delta = self.cell_volume_delta.or(Some(d.cell_volume_delta));
        self.project_threshold = self.project_threshold.or(Some(d.project_threshold));
        self.min_basis_length = self.min_basis_length.or(Some(d.min_basis_length));
        self
    }
}

/// Thermodynamic control parameters
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EnsembleParams {
    pub beta_p: Option<f64>,
    pub beta: Option<f64>,
    /// Linear `beta_p` schedule over the run; overrides `beta_p`
    pub ramp: Option<PressureRamp>,
}

impl EnsembleParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let d = DriverParams::default();
        self.beta_p = self.beta_p.or(Some(d.beta_p));
        self.beta = self.beta.or(Some(d.beta));
        self
    }
}

/// `beta_p(step) = start + (end - start) * step / total`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PressureRamp {
    pub start: f64,
    pub end: f64,
}

impl PressureRamp {
    pub fn at(&self, step: usize, total: usize) -> f64 {
        if total == 0 {
            return self.start;
        }
        self.start + (self.end - self.start) * step as f64 / total as f64
    }
}

/// Loop length, reporting and step-size control
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunParams {
    pub iterations: Option<usize>,
    /// Steps between progress reports (0 disables)
    pub report_interval: Option<usize>,
    /// Steps between snapshot files (0 disables)
    pub snapshot_interval: Option<usize>,
    pub snapshot_ghosts: Option<bool>,
    /// Steps between step-size adjustments (0 disables)
    pub tune_interval: Option<usize>,
    pub tune_target: Option<f64>,
    pub seed: Option<u64>,
}

impl RunParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let iterations = self.iterations.unwrap_or(100_000);
        self.iterations = Some(iterations);
        // 100 reports and snapshots per run unless asked otherwise
        self.report_interval = self.report_interval.or(Some((iterations / 100).max(1)));
        self.snapshot_interval = self.snapshot_interval.or(Some((iterations / 100).max(1)));
        self.snapshot_ghosts = self.snapshot_ghosts.or(Some(false));
        self.tune_interval = self.tune_interval.or(Some(0));
        self.tune_target = self.tune_target.or(Some(0.3));
        self
    }
}

/// Replica exchange in pressure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemperingParams {
    /// One replica per entry
    pub beta_ps: Vec<f64>,
    /// Steps every replica runs between swap attempts
    pub swap_interval: Option<usize>,
}

impl Config {
    /// Read and parse a YAML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
        let config = serde_yml::from_str::<Config>(&content)
            .wrap_err("Failed to parse configuration file")?
            .with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Apply default values to every section
    pub fn with_defaults(mut self) -> Self {
        self.system = self.system.with_defaults();
        self.moves = self.moves.with_defaults();
        self.ensemble = self.ensemble.with_defaults();
        self.run = self.run.with_defaults();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(tempering) = &self.tempering {
            if tempering.beta_ps.is_empty() {
                return Err(eyre!("tempering.beta_ps must list at least one pressure"));
            }
            if self.ensemble.ramp.is_some() {
                return Err(eyre!("a pressure ramp cannot be combined with tempering"));
            }
        }
        self.driver_params()
            .validate()
            .wrap_err("Invalid simulation parameters")?;
        Ok(())
    }

    /// Kernel parameters described by this configuration
    pub fn driver_params(&self) -> DriverParams {
        let d = DriverParams::default();
        let beta_p = match self.ensemble.ramp {
            Some(ramp) => ramp.start,
            None => self.ensemble.beta_p.unwrap_or(d.beta_p),
        };
        DriverParams {
            shape: self.system.shape.unwrap_or(d.shape),
            n_particles: self.system.n_particles.unwrap_or(d.n_particles),
            p_cell_move: self.moves.p_cell_move.unwrap_or(d.p_cell_move),
            translation_delta: self.moves.translation_delta.unwrap_or(d.translation_delta),
            rotation_delta: self.moves.rotation_delta.unwrap_or(d.rotation_delta),
            cell_shape_delta: self.moves.cell_shape_delta.unwrap_or(d.cell_shape_delta),
            cell_volume_delta: self.moves.cell_volume_delta.unwrap_or(d.cell_volume_delta),
            beta_p,
            beta: self.ensemble.beta.unwrap_or(d.beta),
            project_threshold: self.moves.project_threshold.unwrap_or(d.project_threshold),
            min_basis_length: self.moves.min_basis_length.unwrap_or(d.min_basis_length),
            initial_cell_scale: self.system.initial_cell_scale,
            max_placement_attempts: self
                .system
                .max_placement_attempts
                .unwrap_or(d.max_placement_attempts),
            seed: self.run.seed,
        }
    }

    /// Fold command-line overrides into the configuration
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(iterations) = args.iterations {
            self.run.iterations = Some(iterations);
        }
        if let Some(seed) = args.seed {
            self.run.seed = Some(seed);
        }
        if let Some(beta_p) = args.beta_p {
            self.ensemble.beta_p = Some(beta_p);
            self.ensemble.ramp = None;
        }
        if args.ghosts {
            self.run.snapshot_ghosts = Some(true);
        }
    }
}
