pub mod cell;
pub mod configuration;
pub mod driver;
pub mod error;
pub mod moves;
pub mod params;
pub mod particle;
pub mod rng;
pub mod shape;
pub mod tempering;

pub use cell::{Cell, GeometryViolation};
pub use configuration::Configuration;
pub use driver::{Driver, Rejection, StepOutcome};
pub use error::{PackingError, Result};
pub use moves::{AcceptanceStats, Move, MoveKind, PendingMove, Target};
pub use params::DriverParams;
pub use particle::{Particle, N_IMAGES};
pub use rng::UniformSource;
pub use shape::{Shape, ShapeKind, Sphere, Tetrahedron, Triangle};
pub use tempering::ReplicaSet;
