use packing::{Driver, ReplicaSet};
use tracing::info;

pub fn report_progress(step: usize, driver: &Driver) {
    info!(
        "step {:>10}: volume = {:.6}, fraction = {:.6}, beta_p = {:.4}",
        step,
        driver.volume(),
        driver.packing_fraction(),
        driver.beta_p()
    );
    for (kind, stats) in driver.acceptance_summary() {
        if stats.attempted > 0 {
            info!(
                "  {:<12} {:>8} / {:>8} accepted ({:.1}%)",
                kind.to_string(),
                stats.accepted,
                stats.attempted,
                100.0 * stats.ratio()
            );
        }
    }
}

pub fn report_replicas(step: usize, replicas: &ReplicaSet) {
    info!(
        "step {:>10}: {} replicas, {} / {} swaps accepted",
        step,
        replicas.replicas().len(),
        replicas.swap_stats().accepted,
        replicas.swap_stats().attempted
    );
    for (i, driver) in replicas.replicas().iter().enumerate() {
        info!(
            "  replica {:>2}: beta_p = {:>10.4}, volume = {:.6}, fraction = {:.6}",
            i,
            driver.beta_p(),
            driver.volume(),
            driver.packing_fraction()
        );
    }
}

pub fn report_summary(driver: &Driver) {
    info!("\nPacking run finished after {} steps.", driver.steps());
    info!("Final cell:\n{}", driver.cell());
    info!("Final volume: {:.6}", driver.volume());
    info!("Final packing fraction: {:.6}", driver.packing_fraction());
}
