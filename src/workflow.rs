//! Subcommand execution
//!
//! Connects the parsed command line to the script editor, the
//! reconstruction pipeline and the file utilities.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use log::info;

use crate::cli::{edit_arguments, is_dry_run, reconstruction_arguments};
use crate::comscript::modify_com_scripts;
use crate::config::{JobConfig, load_job, read_or_create};
use crate::mrc::set_pixel_spacing;
use crate::pipeline::{
    ReconstructionOptions, ReconstructionReport, Step, plan_reconstruction, reconstruct_tomogram,
};
use crate::runner::CommandRunner;
use crate::utils::remove_files;

/// Runs the subcommand selected on the command line
pub fn execute(matches: &ArgMatches, runner: &mut dyn CommandRunner) -> Result<()> {
    match matches.subcommand() {
        Some(("edit", sub)) => {
            let args = edit_arguments(sub)?;
            modify_com_scripts(
                &args.directory,
                args.bin_factor,
                args.pixel_size,
                &args.exclude_angles,
            )?;
            Ok(())
        }
        Some(("reconstruct", sub)) => {
            let (directory, options) = reconstruction_arguments(sub)?;
            reconstruct_or_plan(&directory, &options, runner, is_dry_run(sub))
        }
        Some(("run", sub)) => {
            let config = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| anyhow!("Job file option not found"))?;
            let job = load_job(&read_or_create(config.clone())?)?;
            run_job(&job, runner, is_dry_run(sub))
        }
        Some(("clean", sub)) => {
            let directory = sub
                .get_one::<PathBuf>("directory")
                .ok_or_else(|| anyhow!("Directory argument not found"))?;
            let extension = sub
                .get_one::<String>("extension")
                .ok_or_else(|| anyhow!("Extension argument not found"))?;
            let removed = remove_files(directory, extension)?;
            info!(
                "Removed {} '{}' files from {}",
                removed.len(),
                extension,
                directory.display()
            );
            Ok(())
        }
        Some(("pixel-size", sub)) => {
            let file = sub
                .get_one::<PathBuf>("file")
                .ok_or_else(|| anyhow!("File argument not found"))?;
            let spacing = sub
                .get_one::<f64>("spacing")
                .ok_or_else(|| anyhow!("Spacing argument not found"))?;
            set_pixel_spacing(runner, file, *spacing)?;
            info!("Set pixel spacing of {} to {spacing}", file.display());
            Ok(())
        }
        Some((other, _)) => Err(anyhow!("Unknown command: {other}")),
        None => Err(anyhow!("No command given")),
    }
}

/// Edits the scripts when the job asks for it, then reconstructs
pub fn run_job(job: &JobConfig, runner: &mut dyn CommandRunner, dry_run: bool) -> Result<()> {
    let options = job.reconstruction_options()?;
    options.validate()?;

    if job.edit_scripts {
        if dry_run {
            println!(
                "Would set bin factor {} and pixel size {} in {}",
                job.bin_factor,
                job.pixel_size,
                job.directory.display()
            );
        } else {
            modify_com_scripts(
                &job.directory,
                job.bin_factor,
                job.pixel_size,
                &job.exclude_angles,
            )?;
        }
    }

    reconstruct_or_plan(&job.directory, &options, runner, dry_run)
}

fn reconstruct_or_plan(
    directory: &Path,
    options: &ReconstructionOptions,
    runner: &mut dyn CommandRunner,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        let steps = plan_reconstruction(directory, options)?;
        print_plan(&steps);
        return Ok(());
    }

    let report = reconstruct_tomogram(directory, options, runner)?;
    print_report(&report);
    Ok(())
}

/// Prints the steps of a dry run grouped by stage
pub fn print_plan(steps: &[Step]) {
    println!("\nReconstruction plan:");
    println!("====================");

    let mut current = None;
    for step in steps {
        if current != Some(step.stage) {
            println!("\n{}", step.stage.to_string().cyan().bold());
            current = Some(step.stage);
        }
        println!("  {step}");
    }

    println!("\nTotal steps: {}", steps.len());
    println!("\nRun without --dry flag to execute these steps.");
}

fn print_report(report: &ReconstructionReport) {
    println!(
        "{} {} ({} steps, log: {})",
        "Reconstructed".green().bold(),
        report.volume.display(),
        report.steps,
        report.log.display()
    );
}
