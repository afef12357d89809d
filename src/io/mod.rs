//! # IO Module - Configuration and Run Artifacts
//!
//! This module bridges the engine and the filesystem. It loads simulation
//! options from TOML files, writes the JSON run report, and bootstraps the
//! data directory layout used by the default output paths:
//!
//! 1. **Snapshot streams** → `./data/snapshots/`
//! 2. **Run reports** → `./data/reports/`
//!
//! The snapshot stream itself is produced by the engine through its sink;
//! this module only hands the engine an opened file.


use crate::simulation::SimulationOptions;
use crate::simulation::script::RunReport;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Ensures the data directory structure exists
pub fn ensure_data_directories() -> Result<(), std::io::Error> {
    fs::create_dir_all("./data/snapshots")?;
    fs::create_dir_all("./data/reports")?;
    Ok(())
}

/// Loads simulation options from a TOML file.
///
/// Missing fields fall back to the engine defaults, so a minimal file only
/// has to state the script and whatever it overrides.
pub fn load_options(path: &Path) -> Result<SimulationOptions, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let opts: SimulationOptions = toml::from_str(&text)?;
    Ok(opts)
}

/// Renders options as a TOML document, as accepted by [`load_options`].
pub fn options_to_toml(opts: &SimulationOptions) -> Result<String, Box<dyn Error>> {
    Ok(toml::to_string_pretty(opts)?)
}

/// Saves a run report as pretty-printed JSON.
pub fn save_report(path: &Path, report: &RunReport) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Loads a run report saved by [`save_report`].
pub fn load_report(path: &Path) -> Result<RunReport, Box<dyn Error>> {
    let file = BufReader::new(File::open(path)?);
    let report: RunReport = serde_json::from_reader(file)?;
    Ok(report)
}
