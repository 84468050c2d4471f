/// Constants used throughout the application
///
/// This module centralises script names, script keys, artifact suffixes and
/// CLI help strings.

/// Qualifier string used for application identification
pub const QUALIFIER: &str = "com";

/// Organisation name used for application identification
pub const ORGANIZATION: &str = "Ondřej Vágner";

/// Application name used for configuration and log directories
pub const APPLICATION: &str = "imodrecon";

/// Script that rebins and aligns the stack
pub const NEWST_SCRIPT: &str = "newst.com";

/// Script that applies the CTF correction
pub const CTF_SCRIPT: &str = "ctfcorrection.com";

/// Script that runs the back-projection
pub const TILT_SCRIPT: &str = "tilt.com";

/// Script that erases gold beads and hot pixels from the stack
pub const ERASER_SCRIPT: &str = "eraser.com";

pub const BIN_KEY: &str = "BinByFactor";
pub const BIN_LABEL: &str = "BinByFactor     ";
pub const PIXEL_SIZE_KEY: &str = "PixelSize";
pub const PIXEL_SIZE_LABEL: &str = "PixelSize       ";
pub const IMAGE_BINNED_KEY: &str = "IMAGEBINNED";
pub const IMAGE_BINNED_LABEL: &str = "IMAGEBINNED ";
pub const EXCLUDE_KEY: &str = "EXCLUDELIST2";
pub const EXCLUDE_LABEL: &str = "EXCLUDELIST2 ";
pub const GPU_KEY: &str = "UseGPU";
pub const GPU_LABEL: &str = "UseGPU ";
pub const GPU_DISABLED: &str = "0";

/// Separator printed between the edited scripts
pub const SCRIPT_SEPARATOR: &str =
    "------------------------------------------------------------------------";

/// Extension of the per-tilt input images
pub const IMAGE_EXTENSION: &str = ".mrc";

/// Suffix of the per-run log that collects external program output
pub const RECONSTRUCTION_LOG_SUFFIX: &str = "_reconstruction.log";

/// Microscope voltages accepted by `mtffilter`
pub const SUPPORTED_VOLTAGES: [u32; 2] = [200, 300];

/// Default microscope voltage in kV
pub const DEFAULT_VOLTAGE: u32 = 300;

/// Help text for the config command-line option
pub const CONFIG_HELP: &str = "Read the job from a specific YAML file";

/// Help text for the dry-run command-line option
pub const DRY_RUN_HELP: &str = "Print the reconstruction plan without running anything";

/// Help text for the verbose command-line option
pub const VERBOSE_HELP: &str = "Increase verbosity level (can be used multiple times)";

/// Help text for the log file command-line option
pub const LOG_FILE_HELP: &str = "Write the application log to this file";

/// Help text for the local logging command-line option
pub const LOCAL_LOGGING_HELP: &str =
    "Write the log file to the current directory instead of the config directory";

/// Default path for the job file
pub const DEFAULT_CONFIG_PATH: &str = "job.yaml";

/// Default name for the application log
pub const LOG_FILE_DEFAULT: &str = "imodrecon.log";
