mod report;
mod runner;

pub use runner::{run_replicas, run_single};

use self::report::{report_replicas, report_summary};
use crate::config::{Args, Config};
use crate::io::{setup_output, SnapshotWriter};
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;

pub struct PackingApplication {
    args: Args,
    config: Config,
}

impl PackingApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let mut config = Config::from_file(&args.config_file)?;
        config.apply_args(&args);
        config.validate()?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.verbose)?;
        info!("Configuration loaded from {}:\n{:#?}", self.args.config_file, self.config);

        let with_ghosts = self.config.run.snapshot_ghosts.unwrap_or(false);
        let mut snapshots = match self.config.run.snapshot_interval {
            Some(interval) if interval > 0 => {
                Some(SnapshotWriter::new(&self.args.snapshot_dir, with_ghosts)?)
            }
            _ => None,
        };

        match &self.config.tempering {
            Some(tempering) => {
                let replicas = run_replicas(&self.config, tempering, snapshots.as_mut())?;
                report_replicas(self.config.run.iterations.unwrap_or(0), &replicas);
                report_summary(replicas.best());
            }
            None => {
                let driver = run_single(&self.config, snapshots.as_mut())?;
                report_summary(&driver);
            }
        }

        if let Some(writer) = &snapshots {
            info!("{} snapshots written to {}", writer.count(), self.args.snapshot_dir);
        }
        Ok(())
    }
}
