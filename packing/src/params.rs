use crate::error::{PackingError, Result};
use crate::shape::ShapeKind;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parameters of a single Monte Carlo replica.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriverParams {
    /// Body every particle is built from
    #[serde(default)]
    pub shape: ShapeKind,
    /// Number of particles placed at start-up
    #[serde(default = "default_n_particles")]
    pub n_particles: usize,
    /// Probability of proposing a cell move instead of a particle move
    #[serde(default = "default_p_cell_move")]
    pub p_cell_move: f64,
    /// Half-width of the translation cube
    #[serde(default = "default_translation_delta")]
    pub translation_delta: f64,
    /// Half-width of each Euler angle draw (radians)
    #[serde(default = "default_rotation_delta")]
    pub rotation_delta: f64,
    /// Half-width of the strain tensor entries; 0 disables the move
    #[serde(default = "default_cell_shape_delta")]
    pub cell_shape_delta: f64,
    /// Half-width of the volume change; 0 disables the move
    #[serde(default = "default_cell_volume_delta")]
    pub cell_volume_delta: f64,
    /// Pressure times inverse temperature
    #[serde(default = "default_beta_p")]
    pub beta_p: f64,
    /// Inverse temperature of the confinement bias; 0 disables it
    #[serde(default)]
    pub beta: f64,
    /// Largest allowed `|a·b|` between unit basis vectors
    #[serde(default = "default_project_threshold")]
    pub project_threshold: f64,
    /// Shortest allowed basis vector
    #[serde(default = "default_min_basis_length")]
    pub min_basis_length: f64,
    /// Side of the initial cubic cell; defaults to the particle count
    #[serde(default)]
    pub initial_cell_scale: Option<f64>,
    /// Random placements tried per particle before giving up
    #[serde(default = "default_max_placement_attempts")]
    pub max_placement_attempts: usize,
    /// Generator seed; `None` seeds from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_n_particles() -> usize {
    8
}
fn default_p_cell_move() -> f64 {
    0.2
}
fn default_translation_delta() -> f64 {
    0.1
}
fn default_rotation_delta() -> f64 {
    2.0 * PI / 10.0
}
fn default_cell_shape_delta() -> f64 {
    0.05
}
fn default_cell_volume_delta() -> f64 {
    1.0
}
fn default_beta_p() -> f64 {
    10.0
}
fn default_project_threshold() -> f64 {
    0.5
}
fn default_min_basis_length() -> f64 {
    0.5
}
fn default_max_placement_attempts() -> usize {
    10_000
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            shape: ShapeKind::default(),
            n_particles: default_n_particles(),
            p_cell_move: default_p_cell_move(),
            translation_delta: default_translation_delta(),
            rotation_delta: default_rotation_delta(),
            cell_shape_delta: default_cell_shape_delta(),
            cell_volume_delta: default_cell_volume_delta(),
            beta_p: default_beta_p(),
            beta: 0.0,
            project_threshold: default_project_threshold(),
            min_basis_length: default_min_basis_length(),
            initial_cell_scale: None,
            max_placement_attempts: default_max_placement_attempts(),
            seed: None,
        }
    }
}

impl DriverParams {
    /// Side of the initial cubic cell.
    pub fn initial_side(&self) -> f64 {
        self.initial_cell_scale.unwrap_or(self.n_particles as f64)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: String) -> Result<()> {
            Err(PackingError::InvalidParameter(msg))
        }

        if self.n_particles == 0 {
            return invalid("n_particles must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.p_cell_move) {
            return invalid(format!("p_cell_move = {} is not a probability", self.p_cell_move));
        }
        for (name, value) in [
            ("translation_delta", self.translation_delta),
            ("rotation_delta", self.rotation_delta),
            ("cell_shape_delta", self.cell_shape_delta),
            ("cell_volume_delta", self.cell_volume_delta),
            ("beta", self.beta),
            ("min_basis_length", self.min_basis_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} = {value} must be finite and non-negative"));
            }
        }
        if !self.beta_p.is_finite() {
            return invalid(format!("beta_p = {} must be finite", self.beta_p));
        }
        if !(self.project_threshold > 0.0 && self.project_threshold < 1.0) {
            return invalid(format!(
                "project_threshold = {} must lie in (0, 1)",
                self.project_threshold
            ));
        }
        if self.p_cell_move > 0.0 && self.cell_shape_delta == 0.0 && self.cell_volume_delta == 0.0 {
            return invalid("p_cell_move > 0 requires a non-zero cell move delta".into());
        }
        if let Some(side) = self.initial_cell_scale {
            if !side.is_finite() || side <= 0.0 {
                return invalid(format!("initial_cell_scale = {side} must be positive"));
            }
        }
        if self.max_placement_attempts == 0 {
            return invalid("max_placement_attempts must be at least 1".into());
        }
        Ok(())
    }
}
