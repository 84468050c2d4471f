//! Reconstruction engine
//!
//! This module executes a reconstruction plan inside a reconstruction directory.

use std::fs::{File, remove_file, rename};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use fs_extra::file::{CopyOptions, move_file};
use log::{debug, error, info};

use crate::errors::{Result, file_operation_error, no_input_images_error};
use crate::runner::CommandRunner;

use super::context::{Artifacts, WorkDir};
use super::plan::{Action, ReconstructionOptions, Step, build_plan};

/// Outcome of a completed reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionReport {
    /// Number of steps executed
    pub steps: usize,
    /// The renamed reconstruction, `<name>_<directory>.rec`
    pub volume: PathBuf,
    /// Log collecting the output of the external programs
    pub log: PathBuf,
}

/// Builds the plan for reconstructing the tilt images of `directory`
///
/// Nothing is executed or written.
///
/// # Errors
/// * `Precondition` if the options are invalid
/// * `DirectoryNotFound` if `directory` does not exist
/// * `NoInputImages` if the directory holds no `.mrc` file
pub fn plan_reconstruction(directory: &Path, options: &ReconstructionOptions) -> Result<Vec<Step>> {
    options.validate()?;
    let workdir = WorkDir::open(directory)?;
    plan_in(&workdir, options)
}

fn plan_in(workdir: &WorkDir, options: &ReconstructionOptions) -> Result<Vec<Step>> {
    let images = workdir.tilt_images()?;
    if images.is_empty() {
        return Err(no_input_images_error(workdir.root().to_path_buf()));
    }
    debug!("Found {} tilt images in {}", images.len(), workdir.root().display());

    Ok(build_plan(options, &images, &workdir.basename()?))
}

/// Reconstructs a tomogram from the tilt images in `directory`
///
/// The steps run in order: stack, erase, newst, ctf, dose filter, tilt,
/// rotate or rename, cleanup. The first failing step stops the run and
/// leaves the intermediate files in place.
pub fn reconstruct_tomogram(
    directory: &Path,
    options: &ReconstructionOptions,
    runner: &mut dyn CommandRunner,
) -> Result<ReconstructionReport> {
    options.validate()?;
    let workdir = WorkDir::open(directory)?;
    let steps = plan_in(&workdir, options)?;

    let artifacts = Artifacts::new(&options.name);
    let log = workdir.append_log(&artifacts.log())?;

    info!(
        "Reconstructing '{}' in {} ({} steps)",
        options.name,
        workdir.root().display(),
        steps.len()
    );

    for (index, step) in steps.iter().enumerate() {
        if let Err(e) = execute_step(&workdir, step, runner, &log) {
            error!(
                "Step {} of {} ({}) failed: {e}",
                index + 1,
                steps.len(),
                step.stage
            );
            return Err(e);
        }
    }

    let volume = match steps.last().map(|step| &step.action) {
        Some(Action::Move { to, .. }) => workdir.path(to),
        _ => workdir.path(&artifacts.volume()),
    };
    info!("Reconstruction written to {}", volume.display());

    Ok(ReconstructionReport {
        steps: steps.len(),
        volume,
        log: workdir.path(&artifacts.log()),
    })
}

/// Executes a single step inside `workdir`
pub fn execute_step(
    workdir: &WorkDir,
    step: &Step,
    runner: &mut dyn CommandRunner,
    log: &File,
) -> Result<()> {
    info!("{step}");
    match &step.action {
        Action::Run(command) => runner.run(command, workdir.root(), Some(log)),
        Action::Move { from, to } => move_artifact(&workdir.path(from), &workdir.path(to)),
        Action::Remove(file) => {
            let path = workdir.path(file);
            remove_file(&path).map_err(|e| file_operation_error(e, path, "remove"))
        }
    }
}

/// Renames `source` to `target`, replacing any existing file
///
/// Falls back to copy and delete only when the two paths are on different
/// filesystems.
fn move_artifact(source: &Path, target: &Path) -> Result<()> {
    match rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!("{} is on another device, copying", target.display());
            let options = CopyOptions::new().overwrite(true);
            move_file(source, target, &options)
                .map(|_| ())
                .map_err(|e| file_operation_error(io::Error::other(e), source.to_path_buf(), "move"))
        }
        Err(e) => Err(file_operation_error(e, source.to_path_buf(), "move")),
    }
}
