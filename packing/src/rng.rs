use rand::Rng;

/// The one stochastic primitive the kernel consumes.
///
/// Every random decision (move magnitude, move selection, Metropolis coin,
/// replica choice) is derived from `uniform`, so a run is reproducible from
/// the generator's seed alone.
pub trait UniformSource {
    /// A sample from `[lower, upper)`. Returns `lower` for an empty interval.
    fn uniform(&mut self, lower: f64, upper: f64) -> f64;

    /// A uniformly chosen index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let i = self.uniform(0.0, len as f64) as usize;
        i.min(len - 1)
    }

    /// Metropolis coin: accept with probability `min(1, exp(-delta))`.
    fn metropolis(&mut self, delta: f64) -> bool {
        if delta <= 0.0 {
            return true;
        }
        self.uniform(0.0, 1.0) < (-delta).exp()
    }
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn uniform(&mut self, lower: f64, upper: f64) -> f64 {
        if upper <= lower {
            return lower;
        }
        self.gen_range(lower..upper)
    }
}
