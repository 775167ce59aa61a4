use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use human_panic::setup_panic;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use compact_squares_lib::{load, render, save, RunSummary, Stepper};

mod report;

use report::RunError;

/// Plans reconfigurations of sliding-square robots into their canonical
/// compact packing.
///
/// A single instance path runs interactively and can print the full move
/// transcript. Several paths run as a batch, one tab-separated result line
/// per instance.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Instance files to plan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print one line per committed move
    #[arg(long)]
    steps: bool,

    /// Write SVG snapshots of the initial and final configurations into this
    /// directory
    #[arg(long, value_name = "DIR")]
    svg: Option<PathBuf>,

    /// Write the final configuration back as an instance document
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    setup_panic!();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.paths.len() == 1 {
        run_single(&cli)
    } else {
        run_batch(&cli.paths)
    }
}

fn instance_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_single(cli: &Cli) -> ExitCode {
    let path = &cli.paths[0];
    let name = instance_name(path);
    match plan_single(cli, path, &name) {
        Ok(summary) => {
            println!(
                "{name}\t{}\t{}\t{}",
                summary.gather_steps,
                summary.compact_steps,
                summary.total()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {name}: {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn plan_single(cli: &Cli, path: &Path, name: &str) -> Result<RunSummary, RunError> {
    let world = load(path)?;
    if let Some(dir) = &cli.svg {
        std::fs::create_dir_all(dir).map_err(compact_squares_lib::InstanceError::from)?;
        write_svg(&dir.join(format!("{name}-initial.svg")), &render(&world))?;
    }

    // marked commits keep the transcript classifications live
    let mut stepper = Stepper::new(world, cli.steps)?;
    if cli.steps {
        while let Some(record) = stepper.step()? {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                record.index, record.phase, record.from, record.to, record.tag
            );
        }
    } else {
        stepper.run()?;
    }

    let summary = stepper.summary();
    if let Some(dir) = &cli.svg {
        write_svg(
            &dir.join(format!("{name}-final.svg")),
            &render(stepper.world()),
        )?;
    }
    if let Some(out) = &cli.out {
        save(out, stepper.world())?;
    }
    Ok(summary)
}

fn write_svg(path: &Path, svg: &str) -> Result<(), RunError> {
    std::fs::write(path, svg).map_err(compact_squares_lib::InstanceError::from)?;
    Ok(())
}

fn run_batch(paths: &[PathBuf]) -> ExitCode {
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(paths.len() as u64).with_style(style);

    let results: Vec<(String, Result<RunSummary, RunError>)> = paths
        .par_iter()
        .progress_with(bar)
        .map(|path| (instance_name(path), plan_batch_instance(path)))
        .collect();

    let mut failed = false;
    for (name, result) in results {
        match result {
            Ok(summary) => println!(
                "{name}\t{}\t{}\t{}",
                summary.gather_steps,
                summary.compact_steps,
                summary.total()
            ),
            Err(err) => {
                println!("{name}\t{err}");
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn plan_batch_instance(path: &Path) -> Result<RunSummary, RunError> {
    let world = load(path)?;
    // classification between moves is unobserved in batch mode
    let mut stepper = Stepper::new(world, false)?;
    Ok(stepper.run()?)
}
