//! Job configuration module
//!
//! This module contains components for loading and validating job files.

mod loader;
mod model;

pub use loader::{load_job, load_job_for_testing, read_or_create};
pub use model::{DoseConfig, JobConfig};
