//! Job loading functionality
//!
//! This module contains functions for loading and validating job files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::debug;
use serde_yaml::from_str;

use crate::utils::{expand_path, find_project_folder};

use super::model::JobConfig;

/// Loads a job from a file
///
/// `~` and environment variables in the reconstruction directory are expanded.
///
/// # Errors
/// Returns an error if the file cannot be read or if the job is invalid
pub fn load_job(file: &Path) -> Result<JobConfig> {
    let job = parse_job(file)?;
    job.validate(true)?;
    Ok(job)
}

/// Loads a job from a file without checking that the directory exists
///
/// This is primarily used for testing.
pub fn load_job_for_testing(file: &Path) -> Result<JobConfig> {
    let job = parse_job(file)?;
    job.validate(false)?;
    Ok(job)
}

fn parse_job(file: &Path) -> Result<JobConfig> {
    let file_content = fs::read(file)
        .map_err(|e| anyhow!("Failed to read job file {}: {}", file.display(), e))?;

    let content_str = String::from_utf8(file_content).map_err(|e| {
        anyhow!(
            "Job file {} contains invalid UTF-8 characters: {}",
            file.display(),
            e
        )
    })?;

    let mut job: JobConfig = from_str(&content_str).map_err(|e| {
        anyhow!(
            "Failed to parse job file {}: {}\nPlease check the YAML syntax.",
            file.display(),
            e
        )
    })?;

    job.directory = expand_path(&job.directory)?;
    debug!("Loaded job '{}' for {}", job.name, job.directory.display());

    Ok(job)
}

/// Returns the job path if it exists, otherwise the same name in the config directory
///
/// # Errors
/// * Returns an error if the configuration directory cannot be created
pub fn read_or_create(job: PathBuf) -> Result<PathBuf> {
    if job.exists() {
        Ok(job)
    } else {
        let folder = find_project_folder()?;
        Ok(folder.config_dir().join(job))
    }
}

/// Deserializes a path given either as a string or as a list of segments
pub fn deserialize_path<'de, D>(deserializer: D) -> std::result::Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PathVisitor;

    impl<'de> serde::de::Visitor<'de> for PathVisitor {
        type Value = PathBuf;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a path string or an array of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(PathBuf::from(value))
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut path = PathBuf::new();
            while let Some(segment) = seq.next_element::<String>()? {
                path.push(segment);
            }
            Ok(path)
        }
    }

    deserializer.deserialize_any(PathVisitor)
}
