//! Reconstruction pipeline module
//!
//! This module contains the reconstruction directory context, the plan of
//! steps and the engine that executes it.

mod context;
mod engine;
mod plan;

pub use context::{Artifacts, WorkDir};
pub use engine::{ReconstructionReport, execute_step, plan_reconstruction, reconstruct_tomogram};
pub use plan::{Action, DoseWeighting, ReconstructionOptions, Stage, Step, build_plan};
