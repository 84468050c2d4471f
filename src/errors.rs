use glob::PatternError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for script editing and reconstruction
#[derive(Debug)]
pub enum Error {
    /// Error related to file operations
    FileOperation {
        source: io::Error,
        path: PathBuf,
        operation: String,
    },
    /// A command script has no line with the requested key
    MarkerNotFound { path: PathBuf, marker: String },
    /// A command script has more than one line with the requested key
    DuplicateMarker { path: PathBuf, marker: String },
    /// An external program ran but exited unsuccessfully
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
    },
    /// An external program could not be started
    CommandSpawn { source: io::Error, program: String },
    /// Parameters that cannot be used together
    Precondition { detail: String },
    /// The reconstruction directory contains no tilt images
    NoInputImages { path: PathBuf },
    /// Error related to glob pattern matching
    GlobPattern {
        source: PatternError,
        pattern: String,
    },
    /// Error related to path operations
    PathOperation { path: PathBuf, operation: String },
    /// Error when a filename is not valid Unicode
    InvalidFilename { path: PathBuf },
    /// Error when a directory is not found
    DirectoryNotFound { path: PathBuf },
    /// Generic error with a message
    Generic { message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileOperation {
                path, operation, ..
            } => {
                write!(f, "Failed to {} file: {}", operation, path.display())
            }
            Error::MarkerNotFound { path, marker } => {
                write!(f, "No '{marker}' line found in {}", path.display())
            }
            Error::DuplicateMarker { path, marker } => {
                write!(f, "More than one '{marker}' line in {}", path.display())
            }
            Error::CommandFailed {
                program,
                args,
                code,
            } => {
                let status = match code {
                    Some(c) => format!("exit status {c}"),
                    None => "termination by signal".to_string(),
                };
                write!(f, "Command '{program} {}' failed with {status}", args.join(" "))
            }
            Error::CommandSpawn { program, .. } => {
                write!(f, "Failed to start command: {program}")
            }
            Error::Precondition { detail } => {
                write!(f, "Invalid parameters: {detail}")
            }
            Error::NoInputImages { path } => {
                write!(f, "No .mrc images found in {}", path.display())
            }
            Error::GlobPattern { pattern, .. } => {
                write!(f, "Invalid glob pattern: {pattern}")
            }
            Error::PathOperation { path, operation } => {
                write!(f, "Failed to {} path: {}", operation, path.display())
            }
            Error::InvalidFilename { path } => {
                write!(f, "Filename is not valid unicode: {}", path.display())
            }
            Error::DirectoryNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            Error::Generic { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::FileOperation { source, .. } => Some(source),
            Error::CommandSpawn { source, .. } => Some(source),
            Error::GlobPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type used by the script editor and the reconstruction driver
///
/// # Examples
/// ```
/// use imod_recon::prelude::{Result, precondition_error};
///
/// fn check_bin(bin_factor: u32) -> Result<u32> {
///     if bin_factor == 0 {
///         return Err(precondition_error("bin factor must be at least 1"));
///     }
///     Ok(bin_factor)
/// }
///
/// assert!(check_bin(0).is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Helper function to create a file operation error
pub fn file_operation_error(err: io::Error, path: PathBuf, operation: &str) -> Error {
    Error::FileOperation {
        source: err,
        path,
        operation: operation.to_string(),
    }
}

pub fn marker_not_found_error(path: PathBuf, marker: &str) -> Error {
    Error::MarkerNotFound {
        path,
        marker: marker.to_string(),
    }
}

pub fn duplicate_marker_error(path: PathBuf, marker: &str) -> Error {
    Error::DuplicateMarker {
        path,
        marker: marker.to_string(),
    }
}

/// Helper function to create an error for a program that exited unsuccessfully
pub fn command_failed_error(program: &str, args: &[String], code: Option<i32>) -> Error {
    Error::CommandFailed {
        program: program.to_string(),
        args: args.to_vec(),
        code,
    }
}

pub fn command_spawn_error(err: io::Error, program: &str) -> Error {
    Error::CommandSpawn {
        source: err,
        program: program.to_string(),
    }
}

pub fn precondition_error(detail: &str) -> Error {
    Error::Precondition {
        detail: detail.to_string(),
    }
}

pub fn no_input_images_error(path: PathBuf) -> Error {
    Error::NoInputImages { path }
}

/// Helper function to create a glob pattern error
pub fn glob_pattern_error(err: PatternError, pattern: &str) -> Error {
    Error::GlobPattern {
        source: err,
        pattern: pattern.to_string(),
    }
}

/// Helper function to create a path operation error
pub fn path_operation_error(path: PathBuf, operation: &str) -> Error {
    Error::PathOperation {
        path,
        operation: operation.to_string(),
    }
}

/// Helper function to create an invalid filename error
pub fn invalid_filename_error(path: PathBuf) -> Error {
    Error::InvalidFilename { path }
}

/// Helper function to create a directory not found error
pub fn directory_not_found_error(path: PathBuf) -> Error {
    Error::DirectoryNotFound { path }
}

/// Helper function to create a generic error
pub fn generic_error(message: &str) -> Error {
    Error::Generic {
        message: message.to_string(),
    }
}
