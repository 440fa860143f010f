use color_eyre::eyre::{Result, WrapErr};
use packing::Driver;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes numbered snapshot files `out_0000`, `out_0001`, ... into one directory.
pub struct SnapshotWriter {
    dir: PathBuf,
    count: usize,
    with_ghosts: bool,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P, with_ghosts: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .wrap_err_with(|| format!("Unable to create snapshot directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            count: 0,
            with_ghosts,
        })
    }

    /// Number of files written so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn write(&mut self, driver: &Driver) -> Result<PathBuf> {
        let path = self.dir.join(format!("out_{:04}", self.count));
        let file = File::create(&path)
            .wrap_err_with(|| format!("Unable to create snapshot: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        driver
            .write_snapshot(&mut writer, self.with_ghosts)
            .and_then(|_| writer.flush())
            .wrap_err_with(|| format!("Unable to write snapshot: {}", path.display()))?;
        self.count += 1;
        debug!("snapshot written to {}", path.display());
        Ok(path)
    }
}
