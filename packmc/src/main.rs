//! Hard-particle packing command-line interface
//!
//! Runs a Monte Carlo packing search configured by a YAML file.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::PackingApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    PackingApplication::from_cli()?.run()
}
