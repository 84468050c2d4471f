//! Reconstruction plan
//!
//! The reconstruction is a fixed sequence of steps. Building it as data lets
//! the engine execute it and the CLI print it for a dry run.

use std::fmt;

use crate::constants::{
    CTF_SCRIPT, DEFAULT_VOLTAGE, ERASER_SCRIPT, NEWST_SCRIPT, SUPPORTED_VOLTAGES, TILT_SCRIPT,
};
use crate::errors::{Result, precondition_error};
use crate::runner::ExternalCommand;
use crate::utils::format_decimal;

use super::context::Artifacts;

/// Dose weighting parameters passed to `mtffilter`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseWeighting {
    /// Dose per image, in electrons per square Angstrom
    pub fixed: f64,
    /// Dose received before the first image was taken
    pub initial: f64,
}

impl DoseWeighting {
    /// Combines optional dose values; they must be given together or not at all
    pub fn from_parts(fixed: Option<f64>, initial: Option<f64>) -> Result<Option<DoseWeighting>> {
        match (fixed, initial) {
            (Some(fixed), Some(initial)) => Ok(Some(DoseWeighting { fixed, initial })),
            (None, None) => Ok(None),
            _ => Err(precondition_error(
                "fixed and initial dose must be supplied together",
            )),
        }
    }
}

/// Parameters of one reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionOptions {
    /// Tomogram name, the prefix of every artifact
    pub name: String,
    pub dose: Option<DoseWeighting>,
    /// Microscope voltage in kV
    pub voltage: u32,
    /// Rotate the volume 90 degrees about X with `trimvol -rx`
    pub rotate_x: bool,
}

impl ReconstructionOptions {
    pub fn new(name: &str) -> Self {
        ReconstructionOptions {
            name: name.to_string(),
            dose: None,
            voltage: DEFAULT_VOLTAGE,
            rotate_x: true,
        }
    }

    pub fn dose(mut self, dose: Option<DoseWeighting>) -> Self {
        self.dose = dose;
        self
    }

    pub fn voltage(mut self, voltage: u32) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn rotate_x(mut self, rotate_x: bool) -> Self {
        self.rotate_x = rotate_x;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(precondition_error("tomogram name must not be empty"));
        }
        if self.name.contains(['/', '\\']) {
            return Err(precondition_error(&format!(
                "tomogram name '{}' must not contain a path separator",
                self.name
            )));
        }
        if !SUPPORTED_VOLTAGES.contains(&self.voltage) {
            return Err(precondition_error(&format!(
                "voltage must be 200 or 300 kV, got {}",
                self.voltage
            )));
        }
        Ok(())
    }
}

/// Pipeline stage a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stack,
    Erase,
    Newst,
    Ctf,
    DoseFilter,
    Tilt,
    Rotate,
    Rename,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Stack => "stack",
            Stage::Erase => "erase",
            Stage::Newst => "newst",
            Stage::Ctf => "ctf",
            Stage::DoseFilter => "dose-filter",
            Stage::Tilt => "tilt",
            Stage::Rotate => "rotate",
            Stage::Rename => "rename",
            Stage::Cleanup => "cleanup",
        };
        write!(f, "{name}")
    }
}

/// What a step does; file names are relative to the reconstruction directory
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(ExternalCommand),
    Move { from: String, to: String },
    Remove(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Run(command) => write!(f, "{command}"),
            Action::Move { from, to } => write!(f, "mv {from} {to}"),
            Action::Remove(file) => write!(f, "rm {file}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub stage: Stage,
    pub action: Action,
}

impl Step {
    fn run(stage: Stage, command: ExternalCommand) -> Self {
        Step {
            stage,
            action: Action::Run(command),
        }
    }

    fn rename(stage: Stage, from: String, to: String) -> Self {
        Step {
            stage,
            action: Action::Move { from, to },
        }
    }

    fn remove(file: String) -> Self {
        Step {
            stage: Stage::Cleanup,
            action: Action::Remove(file),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)
    }
}

fn submfg(script: &str) -> ExternalCommand {
    ExternalCommand::new("submfg").arg(script)
}

/// Builds the ordered steps reconstructing `images` into `<name>_<directory_name>.rec`
pub fn build_plan(
    options: &ReconstructionOptions,
    images: &[String],
    directory_name: &str,
) -> Vec<Step> {
    let files = Artifacts::new(&options.name);
    let mut steps = Vec::new();

    steps.push(Step::run(
        Stage::Stack,
        ExternalCommand::new("newstack")
            .args(images.iter().cloned())
            .arg(files.stack()),
    ));

    steps.push(Step::run(Stage::Erase, submfg(ERASER_SCRIPT)));
    steps.push(Step::rename(Stage::Erase, files.stack(), files.original_stack()));
    steps.push(Step::rename(Stage::Erase, files.fixed_stack(), files.stack()));

    steps.push(Step::run(Stage::Newst, submfg(NEWST_SCRIPT)));
    steps.push(Step::run(Stage::Ctf, submfg(CTF_SCRIPT)));

    let mut mtffilter = ExternalCommand::new("mtffilter");
    if let Some(dose) = options.dose {
        mtffilter = mtffilter.args([
            "-dfixed".to_string(),
            format_decimal(dose.fixed),
            "-initial".to_string(),
            format_decimal(dose.initial),
            "-volt".to_string(),
            options.voltage.to_string(),
        ]);
    }
    steps.push(Step::run(
        Stage::DoseFilter,
        mtffilter.args([files.ctf_corrected(), files.aligned()]),
    ));

    steps.push(Step::run(Stage::Tilt, submfg(TILT_SCRIPT)));

    if options.rotate_x {
        steps.push(Step::run(
            Stage::Rotate,
            ExternalCommand::new("trimvol").args(["-rx".to_string(), files.full_volume(), files.volume()]),
        ));
    } else {
        steps.push(Step::rename(Stage::Rename, files.full_volume(), files.volume()));
    }

    steps.push(Step::remove(files.stack()));
    if options.rotate_x {
        steps.push(Step::remove(files.full_volume()));
    }
    steps.push(Step::rename(Stage::Cleanup, files.original_stack(), files.stack()));
    steps.push(Step::remove(files.aligned()));
    steps.push(Step::remove(files.ctf_corrected()));
    steps.push(Step::rename(
        Stage::Cleanup,
        files.volume(),
        files.final_volume(directory_name),
    ));

    steps
}
