use clap::Parser;
use granular_lib::cli::{Cli, Commands};
use granular_lib::io;
use granular_lib::simulation::{Simulation, SimulationOptions};
use log::{error, info};
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            output,
            report,
            seed,
        } => run(&config, &output, report.as_deref(), seed),
        Commands::PrintConfig => print_config(),
    };

    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run(
    config: &Path,
    output: &Path,
    report: Option<&Path>,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    io::ensure_data_directories()?;

    let mut opts = io::load_options(config)?;
    if let Some(seed) = seed {
        opts.seed = Some(seed);
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let sink = BufWriter::new(File::create(output)?);

    let mut sim = Simulation::new(opts, Some(Box::new(sink)))?;
    info!(
        "starting script with {} stages",
        sim.options().script.len()
    );

    sim.run()?;

    info!(
        "completed {} steps at t = {:.6}, {} snapshot bundles",
        sim.step_count(),
        sim.current_time(),
        sim.snapshot_bundles()
    );

    if let Some(path) = report {
        io::save_report(path, &sim.report_data())?;
        info!("report written to {}", path.display());
    }

    Ok(())
}

fn print_config() -> Result<(), Box<dyn Error>> {
    print!("{}", io::options_to_toml(&SimulationOptions::default())?);
    Ok(())
}
