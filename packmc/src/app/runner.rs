use crate::app::report::{report_progress, report_replicas};
use crate::config::{Config, PressureRamp, TemperingParams};
use crate::io::SnapshotWriter;
use color_eyre::eyre::{Result, WrapErr};
use packing::{Driver, ReplicaSet};
use tracing::info;

/// Loop settings resolved from the configuration
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub iterations: usize,
    pub report_interval: usize,
    pub snapshot_interval: usize,
    pub tune_interval: usize,
    pub tune_target: f64,
    pub ramp: Option<PressureRamp>,
}

impl Schedule {
    pub fn from_config(config: &Config) -> Self {
        let run = &config.run;
        Self {
            iterations: run.iterations.unwrap_or(0),
            report_interval: run.report_interval.unwrap_or(0),
            snapshot_interval: run.snapshot_interval.unwrap_or(0),
            tune_interval: run.tune_interval.unwrap_or(0),
            tune_target: run.tune_target.unwrap_or(0.3),
            ramp: config.ensemble.ramp,
        }
    }
}

/// `true` on every multiple of `interval`; never when `interval` is 0.
fn every(interval: usize, step: usize) -> bool {
    interval > 0 && step % interval == 0
}

/// `true` if a multiple of `interval` lies in `(from, to]`.
fn crossed(interval: usize, from: usize, to: usize) -> bool {
    interval > 0 && from / interval != to / interval
}

pub fn run_single(config: &Config, mut snapshots: Option<&mut SnapshotWriter>) -> Result<Driver> {
    let schedule = Schedule::from_config(config);
    let mut driver =
        Driver::new(config.driver_params()).wrap_err("Failed to initialise the simulation")?;
    info!(
        "Placed {} particles in a cell of volume {:.4}",
        driver.configuration().n_particles(),
        driver.volume()
    );

    for step in 0..schedule.iterations {
        if let Some(ramp) = schedule.ramp {
            driver.set_beta_p(ramp.at(step, schedule.iterations));
        }
        if every(schedule.report_interval, step) {
            report_progress(step, &driver);
        }
        if every(schedule.snapshot_interval, step) {
            if let Some(writer) = snapshots.as_mut() {
                writer.write(&driver)?;
            }
        }

        driver
            .make_move()
            .wrap_err_with(|| format!("Monte Carlo step {step} failed"))?;

        if every(schedule.tune_interval, step + 1) {
            driver.tune_step_sizes(schedule.tune_target);
        }
    }

    if let Some(writer) = snapshots.as_mut() {
        writer.write(&driver)?;
    }
    Ok(driver)
}

pub fn run_replicas(
    config: &Config,
    tempering: &TemperingParams,
    mut snapshots: Option<&mut SnapshotWriter>,
) -> Result<ReplicaSet> {
    let schedule = Schedule::from_config(config);
    let swap_interval = tempering.swap_interval.unwrap_or(1000).max(1);
    let mut replicas = ReplicaSet::from_params(&config.driver_params(), &tempering.beta_ps)
        .wrap_err("Failed to initialise the replicas")?;
    info!(
        "Running {} replicas, swapping every {} steps",
        replicas.replicas().len(),
        swap_interval
    );

    let mut step = 0;
    let mut last_snapshot = None;
    while step < schedule.iterations {
        let batch = swap_interval.min(schedule.iterations - step);
        replicas
            .step_all(batch)
            .wrap_err_with(|| format!("Replica batch starting at step {step} failed"))?;
        let (from, to) = (step, step + batch);
        step = to;

        replicas.attempt_pressure_swap();

        if crossed(schedule.report_interval, from, to) {
            report_replicas(step, &replicas);
        }
        if crossed(schedule.snapshot_interval, from, to) {
            if let Some(writer) = snapshots.as_mut() {
                writer.write(replicas.best())?;
                last_snapshot = Some(step);
            }
        }
        if crossed(schedule.tune_interval, from, to) {
            for driver in replicas.replicas_mut() {
                driver.tune_step_sizes(schedule.tune_target);
            }
        }
    }

    if let Some(writer) = snapshots.as_mut() {
        if last_snapshot != Some(step) {
            writer.write(replicas.best())?;
        }
    }
    Ok(replicas)
}
