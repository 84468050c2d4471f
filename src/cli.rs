use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, command, value_parser};

use crate::constants::{
    APPLICATION, CONFIG_HELP, DEFAULT_CONFIG_PATH, DEFAULT_VOLTAGE, DRY_RUN_HELP,
    IMAGE_EXTENSION, LOCAL_LOGGING_HELP, LOG_FILE_DEFAULT, LOG_FILE_HELP, VERBOSE_HELP,
};
use crate::logging::LogLevel;
use crate::pipeline::{DoseWeighting, ReconstructionOptions};
use crate::utils::find_project_folder;

/// Parameters of the `edit` subcommand
#[derive(Debug, Clone, PartialEq)]
pub struct EditArguments {
    pub directory: PathBuf,
    pub bin_factor: u32,
    pub pixel_size: f64,
    pub exclude_angles: Vec<i32>,
}

fn dry_run_arg() -> Arg {
    Arg::new("dry")
        .short('n')
        .long("dry")
        .help(DRY_RUN_HELP)
        .action(ArgAction::SetTrue)
}

fn directory_arg(help: &'static str) -> Arg {
    Arg::new("directory")
        .required(true)
        .help(help)
        .value_parser(value_parser!(PathBuf))
}

/// Defines the command line
///
/// Global options:
/// - `verbose`: Increase verbosity level
/// - `log_file`: Application log file
/// - `log_locally`: Keep the log file in the current directory
///
/// Subcommands: `edit`, `reconstruct`, `run`, `clean` and `pixel-size`.
pub fn build_cli() -> Command {
    let arg_verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help(VERBOSE_HELP)
        .global(true)
        .action(ArgAction::Count);

    let log_file = Arg::new("log_file")
        .short('l')
        .long("log-file")
        .help(LOG_FILE_HELP)
        .global(true)
        .default_value(LOG_FILE_DEFAULT);

    let log_locally = Arg::new("log_locally")
        .short('L')
        .long("log-locally")
        .help(LOCAL_LOGGING_HELP)
        .global(true)
        .action(ArgAction::SetTrue);

    let edit = Command::new("edit")
        .about("Set bin factor, pixel size and excluded views in newst.com, ctfcorrection.com and tilt.com")
        .arg(directory_arg("Directory holding the command scripts"))
        .arg(
            Arg::new("bin")
                .short('b')
                .long("bin")
                .required(true)
                .help("Bin factor")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("pixel_size")
                .short('p')
                .long("pixel-size")
                .required(true)
                .help("Unbinned pixel spacing of the tilt images in Angstrom")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Views to exclude from the reconstruction, e.g. 1,2,60")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .value_parser(value_parser!(i32)),
        );

    let reconstruct = Command::new("reconstruct")
        .about("Reconstruct a tomogram from the .mrc tilt images of a directory")
        .arg(directory_arg("Reconstruction directory"))
        .arg(
            Arg::new("name")
                .short('t')
                .long("name")
                .required(true)
                .help("Tomogram name, the prefix of every output file"),
        )
        .arg(
            Arg::new("dose_fixed")
                .long("dose-fixed")
                .help("Dose per image in electrons per square Angstrom")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("dose_initial")
                .long("dose-initial")
                .help("Dose applied before the first image")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("voltage")
                .long("voltage")
                .help("Microscope voltage in kV (200 or 300)")
                .default_value("300")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("no_rotate")
                .long("no-rotate")
                .help("Keep the volume as written by tilt instead of rotating it about X")
                .action(ArgAction::SetTrue),
        )
        .arg(dry_run_arg());

    let run = Command::new("run")
        .about("Edit the scripts and reconstruct as described by a YAML job file")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(CONFIG_HELP)
                .default_value(DEFAULT_CONFIG_PATH)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(dry_run_arg());

    let clean = Command::new("clean")
        .about("Remove every file with the given extension from a directory")
        .arg(directory_arg("Directory to clean"))
        .arg(
            Arg::new("extension")
                .short('e')
                .long("extension")
                .help("File extension to remove")
                .default_value(IMAGE_EXTENSION),
        );

    let pixel_size = Command::new("pixel-size")
        .about("Set the pixel spacing of an MRC file with alterheader")
        .arg(
            Arg::new("file")
                .required(true)
                .help("MRC file to patch")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("spacing")
                .short('s')
                .long("spacing")
                .required(true)
                .help("Pixel spacing in Angstrom")
                .value_parser(value_parser!(f64)),
        );

    command!()
        .name(APPLICATION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(arg_verbose)
        .arg(log_file)
        .arg(log_locally)
        .subcommand(edit)
        .subcommand(reconstruct)
        .subcommand(run)
        .subcommand(clean)
        .subcommand(pixel_size)
}

/// Parses the process arguments, exiting with usage on error
pub fn get_matches() -> ArgMatches {
    build_cli().get_matches()
}

/// Gets the verbosity level from the number of -v/--verbose flags
pub fn get_verbosity(matches: &ArgMatches) -> LogLevel {
    let verbose_count = matches.get_count("verbose");
    LogLevel::from_occurrences(verbose_count)
}

/// Gets the application log path
///
/// The file lives in the platform config directory unless `--log-locally` is set.
pub fn get_log_file(matches: &ArgMatches) -> Result<PathBuf> {
    let filename = matches
        .get_one::<String>("log_file")
        .cloned()
        .unwrap_or_else(|| LOG_FILE_DEFAULT.to_string());
    if matches.get_flag("log_locally") {
        Ok(PathBuf::from(filename))
    } else {
        let folder = find_project_folder()?;
        Ok(folder.config_dir().join(filename))
    }
}

pub fn is_dry_run(matches: &ArgMatches) -> bool {
    matches.get_flag("dry")
}

/// Reads the `edit` subcommand arguments
///
/// # Errors
/// Returns an error if the pixel size is not a positive number
pub fn edit_arguments(matches: &ArgMatches) -> Result<EditArguments> {
    let directory = required::<PathBuf>(matches, "directory")?.clone();
    let bin_factor = *required::<u32>(matches, "bin")?;
    let pixel_size = *required::<f64>(matches, "pixel_size")?;
    if !(pixel_size > 0.0 && pixel_size.is_finite()) {
        return Err(anyhow!(
            "Pixel size must be a positive number of Angstrom, got {pixel_size}."
        ));
    }
    let exclude_angles = matches
        .get_many::<i32>("exclude")
        .map(|values| values.copied().collect())
        .unwrap_or_default();

    Ok(EditArguments {
        directory,
        bin_factor,
        pixel_size,
        exclude_angles,
    })
}

/// Reads the `reconstruct` subcommand arguments
///
/// # Errors
/// Returns an error if only one of the dose parameters is given
pub fn reconstruction_arguments(matches: &ArgMatches) -> Result<(PathBuf, ReconstructionOptions)> {
    let directory = required::<PathBuf>(matches, "directory")?.clone();
    let name = required::<String>(matches, "name")?;
    let dose = DoseWeighting::from_parts(
        matches.get_one::<f64>("dose_fixed").copied(),
        matches.get_one::<f64>("dose_initial").copied(),
    )?;
    let voltage = matches
        .get_one::<u32>("voltage")
        .copied()
        .unwrap_or(DEFAULT_VOLTAGE);

    let options = ReconstructionOptions::new(name)
        .dose(dose)
        .voltage(voltage)
        .rotate_x(!matches.get_flag("no_rotate"));
    Ok((directory, options))
}

fn required<'a, T>(matches: &'a ArgMatches, id: &str) -> Result<&'a T>
where
    T: std::any::Any + Clone + Send + Sync + 'static,
{
    matches
        .get_one::<T>(id)
        .ok_or_else(|| anyhow!("Missing required argument: {id}"))
}
