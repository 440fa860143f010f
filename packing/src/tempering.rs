//! Parallel tempering in pressure.
//!
//! Replicas are fully independent drivers, so they are stepped concurrently;
//! the pressure swap runs only after every replica has finished its batch.

use crate::driver::Driver;
use crate::error::{PackingError, Result};
use crate::moves::AcceptanceStats;
use crate::params::DriverParams;
use crate::rng::UniformSource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

#[derive(Debug)]
pub struct ReplicaSet {
    replicas: Vec<Driver>,
    /// Generator for swap selection and acceptance, separate from every replica's
    rng: StdRng,
    swaps: AcceptanceStats,
}

impl ReplicaSet {
    pub fn new(replicas: Vec<Driver>, seed: Option<u64>) -> Result<Self> {
        if replicas.is_empty() {
            return Err(PackingError::InvalidParameter(
                "a replica set needs at least one replica".into(),
            ));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            replicas,
            rng,
            swaps: AcceptanceStats::default(),
        })
    }

    /// One replica per entry of `beta_ps`, all sharing `base` otherwise.
    ///
    /// With a base seed `s`, replica `i` is seeded with `s + i + 1` and the
    /// swap generator with `s`.
    pub fn from_params(base: &DriverParams, beta_ps: &[f64]) -> Result<Self> {
        let replicas = beta_ps
            .par_iter()
            .enumerate()
            .map(|(i, &beta_p)| {
                Driver::new(DriverParams {
                    beta_p,
                    seed: base.seed.map(|s| s.wrapping_add(i as u64 + 1)),
                    ..base.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(replicas, base.seed)
    }

    /// Run `steps` moves on every replica in parallel. Returns the total
    /// number of accepted moves.
    pub fn step_all(&mut self, steps: usize) -> Result<usize> {
        self.replicas
            .par_iter_mut()
            .map(|driver| driver.run(steps))
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }

    /// Pick two distinct replicas and exchange their `beta_p` with
    /// probability `min(1, exp((βP_i − βP_j)(V_i − V_j)))`.
    ///
    /// Returns `None` when there are fewer than two replicas.
    pub fn attempt_pressure_swap(&mut self) -> Option<bool> {
        let n = self.replicas.len();
        if n < 2 {
            return None;
        }
        let i = self.rng.index(n);
        let mut j = self.rng.index(n - 1);
        if j >= i {
            j += 1;
        }
        let (a, b) = (&self.replicas[i], &self.replicas[j]);
        let exponent = (a.beta_p() - b.beta_p()) * (a.volume() - b.volume());
        let accepted = self.rng.metropolis(-exponent);

        self.swaps.attempted += 1;
        if accepted {
            self.swaps.accepted += 1;
            let (bp_i, bp_j) = (a.beta_p(), b.beta_p());
            self.replicas[i].set_beta_p(bp_j);
            self.replicas[j].set_beta_p(bp_i);
        }
        debug!(i, j, exponent, accepted, "pressure swap");
        Some(accepted)
    }

    pub fn replicas(&self) -> &[Driver] {
        &self.replicas
    }

    pub fn replicas_mut(&mut self) -> &mut [Driver] {
        &mut self.replicas
    }

    pub fn swap_stats(&self) -> &AcceptanceStats {
        &self.swaps
    }

    /// The densest replica.
    pub fn best(&self) -> &Driver {
        self.replicas
            .iter()
            .max_by(|a, b| a.packing_fraction().total_cmp(&b.packing_fraction()))
            .unwrap_or(&self.replicas[0])
    }
}
