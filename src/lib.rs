//! Automation around the IMOD tomogram reconstruction scripts.
//!
//! The crate edits the `newst.com`, `ctfcorrection.com` and `tilt.com`
//! command scripts of a reconstruction directory and drives the external
//! IMOD programs that turn a directory of `.mrc` tilt images into a
//! reconstructed volume.

pub mod cli;
pub mod comscript;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod mrc;
pub mod pipeline;
pub mod runner;
pub mod utils;
pub mod workflow;

pub mod prelude {
    pub use crate::comscript::{
        ComScript, modify_com_scripts, modify_ctfcorrection, modify_newst, modify_tilt,
    };
    pub use crate::errors::{
        command_failed_error, directory_not_found_error, file_operation_error, generic_error,
        marker_not_found_error, no_input_images_error, precondition_error,
    };
    pub use crate::errors::{Error, Result};
    pub use crate::logging::{LogLevel, init_logger};
    pub use crate::mrc::{Volume, save_mrc};
    pub use crate::pipeline::{
        DoseWeighting, ReconstructionOptions, ReconstructionReport, plan_reconstruction,
        reconstruct_tomogram,
    };
    pub use crate::runner::{CommandRunner, ExternalCommand, ProcessRunner};
    pub use crate::utils::remove_files;
}
