//! Input/Output operations for packing runs
//!
//! This module handles logging setup and snapshot files.

mod output;
mod snapshot;

pub use output::setup_output;
pub use snapshot::SnapshotWriter;
