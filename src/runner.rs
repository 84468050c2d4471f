//! External program execution
//!
//! Every IMOD program is started through a [`CommandRunner`], so the
//! reconstruction driver never touches `std::process` directly.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, trace};

use crate::errors::{Result, command_failed_error, command_spawn_error, file_operation_error};

/// A program name with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: &str) -> Self {
        ExternalCommand {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external programs to completion
pub trait CommandRunner {
    /// Runs `command` with `directory` as its working directory
    ///
    /// Standard output and error go to `output` when given and are discarded
    /// otherwise. A non-zero exit status is an error.
    fn run(
        &mut self,
        command: &ExternalCommand,
        directory: &Path,
        output: Option<&File>,
    ) -> Result<()>;
}

/// Runs programs found on `PATH` as child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &mut self,
        command: &ExternalCommand,
        directory: &Path,
        output: Option<&File>,
    ) -> Result<()> {
        let mut process = Command::new(&command.program);
        process.args(&command.args).current_dir(directory);

        match output {
            Some(file) => {
                process.stdout(clone_handle(file, directory)?);
                process.stderr(clone_handle(file, directory)?);
            }
            None => {
                process.stdout(Stdio::null());
                process.stderr(Stdio::null());
            }
        }

        debug!("Starting '{command}' in {}", directory.display());
        let status = process
            .status()
            .map_err(|e| command_spawn_error(e, &command.program))?;
        trace!("'{}' finished with {status}", command.program);

        if !status.success() {
            return Err(command_failed_error(
                &command.program,
                &command.args,
                status.code(),
            ));
        }

        Ok(())
    }
}

fn clone_handle(file: &File, directory: &Path) -> Result<File> {
    file.try_clone()
        .map_err(|e| file_operation_error(e, directory.to_path_buf(), "duplicate log handle in"))
}
