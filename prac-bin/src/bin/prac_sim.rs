use std::{
    fs::File,
    io::{self, BufWriter, Write},
    process::ExitCode,
};

use anyhow::Result;
use clap::Parser;
use log::info;
use prac_bin::cli::{CliArgs, Resolved};
use prac_bin::init_logging_with_progress;
use prac_bin::report::{self, TimeStrings};
use prac_core::{RunMetrics, SimulationConfig, Simulator};
use serde::Serialize;

/// Record of one run, written with `--output`.
#[derive(Debug, Serialize)]
struct RunRecord {
    date: String,
    args: CliArgs,
    config: SimulationConfig,
    times: TimeStrings,
    seed: u64,
    metrics: RunMetrics,
}

impl RunRecord {
    fn save_to_file(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Results saved to {}", filename);
        Ok(())
    }
}

fn run(args: CliArgs, resolved: Resolved) -> Result<()> {
    let progress = init_logging_with_progress()?;
    info!("CLI args: {:?}", args);
    let common = args.common().clone();

    let mut builder = Simulator::builder()
        .config(resolved.config.clone())
        .seed(common.seed);
    if common.progress {
        builder = builder.progress(progress);
    }
    let mut sim = builder.build()?;
    sim.run();

    if common.csv {
        report::write_csv(&sim, &resolved.times, common.header, io::stdout().lock())?;
    } else {
        println!("{}", report::summary(&sim));
    }

    if let Some(output) = &common.output {
        let record = RunRecord {
            date: chrono::Local::now().to_rfc3339(),
            args,
            config: resolved.config,
            times: resolved.times,
            seed: common.seed,
            metrics: sim.metrics(),
        };
        record.save_to_file(output)?;
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    let resolved = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };
    run(args, resolved)?;
    Ok(ExitCode::SUCCESS)
}
