//! Command script module
//!
//! This module contains the typed model of IMOD `.com` scripts and the
//! edits applied before a reconstruction.

mod editor;
mod model;

pub use editor::{modify_com_scripts, modify_ctfcorrection, modify_newst, modify_tilt};
pub use model::{ComScript, ScriptLine};
