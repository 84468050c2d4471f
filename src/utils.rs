use std::fs::{create_dir_all, remove_file};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use glob::{Pattern, glob};
use log::debug;

use crate::constants::{APPLICATION, ORGANIZATION, QUALIFIER};
use crate::errors::{
    Result, file_operation_error, generic_error, glob_pattern_error, invalid_filename_error,
    path_operation_error,
};

/// Formats a pixel size the way IMOD scripts carry it: three decimals at most,
/// always with a fractional part
pub fn format_pixel_size(value: f64) -> String {
    format_decimal((value * 1000.0).round() / 1000.0)
}

/// Shortest representation of `value` that still reads as a float, e.g. `3.0`
pub fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Formats view numbers as `1, 2, 3`
pub fn format_angle_list(angles: &[i32]) -> String {
    angles
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Expands `~` and environment variables in a user supplied path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| invalid_filename_error(path.to_path_buf()))?;
    let expanded = shellexpand::full(path_str)
        .map_err(|e| generic_error(&format!("Failed to expand path '{path_str}': {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Last component of a directory path, ignoring trailing separators
///
/// Paths without a final component, such as `.`, are canonicalized first.
pub fn directory_basename(directory: &Path) -> Result<String> {
    let name = match directory.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            let canonical = directory.canonicalize().map_err(|e| {
                file_operation_error(e, directory.to_path_buf(), "resolve")
            })?;
            canonical
                .file_name()
                .ok_or_else(|| path_operation_error(canonical.clone(), "get the name of"))?
                .to_os_string()
        }
    };

    name.into_string()
        .map_err(|_| invalid_filename_error(directory.to_path_buf()))
}

/// Files in `directory` ending with `extension`, sorted by name
pub fn files_with_extension(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let directory_str = directory
        .to_str()
        .ok_or_else(|| invalid_filename_error(directory.to_path_buf()))?;
    let pattern = format!("{}/*{}", Pattern::escape(directory_str), Pattern::escape(extension));

    let mut files = glob(&pattern)
        .map_err(|e| glob_pattern_error(e, &pattern))?
        .map(|res| res.map_err(|e| file_operation_error(e.into(), directory.to_path_buf(), "access")))
        .collect::<Result<Vec<PathBuf>>>()?;

    files.retain(|path| path.is_file());
    files.sort();
    Ok(files)
}

/// Removes all files in a directory with the given extension
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - The removed files
pub fn remove_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let files = files_with_extension(directory, extension)?;
    for file in &files {
        debug!("Removing {}", file.display());
        remove_file(file).map_err(|e| file_operation_error(e, file.clone(), "remove"))?;
    }
    Ok(files)
}

pub(crate) fn find_project_folder() -> Result<ProjectDirs> {
    let folder = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| generic_error("Failed to determine project directories"))?;

    if !folder.config_dir().exists() {
        create_dir_all(folder.config_dir())
            .map_err(|e| file_operation_error(e, folder.config_dir().to_path_buf(), "create directory"))?;
    }
    Ok(folder)
}
