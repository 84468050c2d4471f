//! Reconstruction directory context
//!
//! The driver never changes the process working directory. Artifact paths are
//! resolved against a [`WorkDir`] and external programs are started inside it.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::constants::{IMAGE_EXTENSION, RECONSTRUCTION_LOG_SUFFIX};
use crate::errors::{
    Result, directory_not_found_error, file_operation_error, invalid_filename_error,
};
use crate::utils::{directory_basename, expand_path, files_with_extension};

/// A reconstruction directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Opens an existing directory, expanding `~` and environment variables
    pub fn open(directory: &Path) -> Result<Self> {
        let root = expand_path(directory)?;
        if !root.is_dir() {
            return Err(directory_not_found_error(root));
        }
        Ok(WorkDir { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file inside the directory
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Name of the directory itself, used to tag the final volume
    pub fn basename(&self) -> Result<String> {
        directory_basename(&self.root)
    }

    /// File names of the tilt images, in lexicographic order
    pub fn tilt_images(&self) -> Result<Vec<String>> {
        files_with_extension(&self.root, IMAGE_EXTENSION)?
            .into_iter()
            .map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| invalid_filename_error(path.clone()))
            })
            .collect()
    }

    /// Opens a log file in append mode, creating it when missing
    pub fn append_log(&self, name: &str) -> Result<File> {
        let path = self.path(name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| file_operation_error(e, path, "open"))
    }
}

/// File names of every artifact produced for one tomogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    name: String,
}

impl Artifacts {
    pub fn new(name: &str) -> Self {
        Artifacts {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<name>.st`, the stack the scripts read
    pub fn stack(&self) -> String {
        format!("{}.st", self.name)
    }

    pub fn original_stack(&self) -> String {
        format!("{}_orig.st", self.name)
    }

    /// Written by `eraser.com`
    pub fn fixed_stack(&self) -> String {
        format!("{}_fixed.st", self.name)
    }

    /// Written by `ctfcorrection.com`
    pub fn ctf_corrected(&self) -> String {
        format!("{}_ctfcorr.ali", self.name)
    }

    /// Dose filtered stack read by `tilt.com`
    pub fn aligned(&self) -> String {
        format!("{}.ali", self.name)
    }

    /// Written by `tilt.com`
    pub fn full_volume(&self) -> String {
        format!("{}_full.rec", self.name)
    }

    pub fn volume(&self) -> String {
        format!("{}.rec", self.name)
    }

    pub fn final_volume(&self, directory_name: &str) -> String {
        format!("{}_{}.rec", self.name, directory_name)
    }

    pub fn log(&self) -> String {
        format!("{}{}", self.name, RECONSTRUCTION_LOG_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_artifact_names() {
        let artifacts = Artifacts::new("tomo");
        assert_eq!(artifacts.stack(), "tomo.st");
        assert_eq!(artifacts.original_stack(), "tomo_orig.st");
        assert_eq!(artifacts.fixed_stack(), "tomo_fixed.st");
        assert_eq!(artifacts.ctf_corrected(), "tomo_ctfcorr.ali");
        assert_eq!(artifacts.aligned(), "tomo.ali");
        assert_eq!(artifacts.full_volume(), "tomo_full.rec");
        assert_eq!(artifacts.volume(), "tomo.rec");
        assert_eq!(artifacts.final_volume("TS_01"), "tomo_TS_01.rec");
        assert_eq!(artifacts.log(), "tomo_reconstruction.log");
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkDir::open(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, crate::errors::Error::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_tilt_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_02.mrc", "a_10.mrc", "a_02.mrc", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.mrc")).unwrap();

        let workdir = WorkDir::open(dir.path()).unwrap();
        assert_eq!(
            workdir.tilt_images().unwrap(),
            vec!["a_02.mrc", "a_10.mrc", "b_02.mrc"]
        );
    }

    #[test]
    fn test_basename_ignores_trailing_separator() {
        let dir = tempfile::tempdir().unwrap();
        let tomo_dir = dir.path().join("TS_07");
        fs::create_dir(&tomo_dir).unwrap();

        let with_slash = PathBuf::from(format!("{}/", tomo_dir.display()));
        let workdir = WorkDir::open(&with_slash).unwrap();
        assert_eq!(workdir.basename().unwrap(), "TS_07");
    }
}
