//! Job data structures
//!
//! A job file describes one reconstruction directory, the script edits to
//! apply to it and the reconstruction parameters.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::constants::{DEFAULT_VOLTAGE, SUPPORTED_VOLTAGES};
use crate::pipeline::{DoseWeighting, ReconstructionOptions};

use super::loader::deserialize_path;

/// Dose weighting section of a job file
///
/// Both fields are optional so that a half filled section is reported as a
/// parameter error rather than a YAML error.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DoseConfig {
    /// Dose per image, in electrons per square Angstrom
    pub fixed: Option<f64>,
    /// Dose received before the first image
    pub initial: Option<f64>,
}

/// A reconstruction job
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Reconstruction directory, either a path string or a list of path segments
    #[serde(deserialize_with = "deserialize_path")]
    pub directory: PathBuf,
    /// Tomogram name, the prefix of every artifact
    pub name: String,
    pub bin_factor: u32,
    /// Unbinned pixel spacing of the tilt images in Angstrom
    pub pixel_size: f64,
    /// Views to leave out of the back-projection
    #[serde(default)]
    pub exclude_angles: Vec<i32>,
    #[serde(default)]
    pub dose: Option<DoseConfig>,
    /// Microscope voltage in kV
    #[serde(default = "default_voltage")]
    pub voltage: u32,
    #[serde(default = "default_true")]
    pub rotate_x: bool,
    /// Patch the command scripts before reconstructing
    #[serde(default = "default_true")]
    pub edit_scripts: bool,
}

fn default_voltage() -> u32 {
    DEFAULT_VOLTAGE
}

fn default_true() -> bool {
    true
}

impl JobConfig {
    /// Validates the job
    ///
    /// # Arguments
    /// * `check_paths` - Whether to check that the reconstruction directory exists
    ///
    /// # Errors
    /// Returns an error with a detailed message if validation fails
    pub fn validate(&self, check_paths: bool) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!(
                "No tomogram name specified in the job. The name prefixes every output file."
            ));
        }

        if self.bin_factor == 0 {
            return Err(anyhow!("Bin factor must be at least 1."));
        }

        if !(self.pixel_size > 0.0) {
            return Err(anyhow!(
                "Pixel size must be a positive number of Angstrom, got {}.",
                self.pixel_size
            ));
        }

        if !SUPPORTED_VOLTAGES.contains(&self.voltage) {
            return Err(anyhow!(
                "Voltage must be 200 or 300 kV, got {}.",
                self.voltage
            ));
        }

        self.reconstruction_options()?.validate()?;

        if check_paths {
            if !self.directory.exists() {
                return Err(anyhow!(
                    "Reconstruction directory does not exist: {}\n{}",
                    self.directory.display(),
                    "Please check the path and ensure it exists."
                ));
            }

            if !self.directory.is_dir() {
                return Err(anyhow!(
                    "Reconstruction path is not a directory: {}\n{}",
                    self.directory.display(),
                    "Please specify a valid directory path."
                ));
            }
        }

        Ok(())
    }

    /// The dose section as `mtffilter` parameters
    pub fn dose_weighting(&self) -> Result<Option<DoseWeighting>> {
        let dose = self.dose.clone().unwrap_or_default();
        Ok(DoseWeighting::from_parts(dose.fixed, dose.initial)?)
    }

    /// Reconstruction parameters of this job
    pub fn reconstruction_options(&self) -> Result<ReconstructionOptions> {
        Ok(ReconstructionOptions::new(&self.name)
            .dose(self.dose_weighting()?)
            .voltage(self.voltage)
            .rotate_x(self.rotate_x))
    }
}
