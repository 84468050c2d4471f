//! Script editing
//!
//! Rewrites the binning, pixel size and excluded views of the `newst.com`,
//! `ctfcorrection.com` and `tilt.com` scripts of a reconstruction directory.

use std::path::Path;

use log::info;

use crate::constants::{
    BIN_KEY, BIN_LABEL, CTF_SCRIPT, EXCLUDE_KEY, EXCLUDE_LABEL, GPU_DISABLED, GPU_KEY, GPU_LABEL,
    IMAGE_BINNED_KEY, IMAGE_BINNED_LABEL, NEWST_SCRIPT, PIXEL_SIZE_KEY, PIXEL_SIZE_LABEL,
    SCRIPT_SEPARATOR, TILT_SCRIPT,
};
use crate::errors::Result;
use crate::utils::{format_angle_list, format_pixel_size};

use super::model::ComScript;

/// Sets the bin factor of a `newst.com` script
///
/// Note: This overwrites the file.
pub fn modify_newst(path: &Path, bin_factor: u32) -> Result<ComScript> {
    let mut script = ComScript::load(path)?;
    script.set(BIN_KEY, BIN_LABEL, &bin_factor.to_string())?;
    save_and_print(&script)?;
    Ok(script)
}

/// Sets the pixel size of a `ctfcorrection.com` script
///
/// The written pixel size is that of the binned stack, `bin_factor * pixel_spacing`
/// rounded to three decimals.
///
/// Note: This overwrites the file.
pub fn modify_ctfcorrection(path: &Path, bin_factor: u32, pixel_spacing: f64) -> Result<ComScript> {
    let mut script = ComScript::load(path)?;
    let binned = f64::from(bin_factor) * pixel_spacing;
    script.set(PIXEL_SIZE_KEY, PIXEL_SIZE_LABEL, &format_pixel_size(binned))?;
    save_and_print(&script)?;
    Ok(script)
}

/// Sets the bin factor and excluded views of a `tilt.com` script and disables the GPU
///
/// An empty `exclude_angles` leaves any existing `EXCLUDELIST2` line alone.
///
/// Note: This overwrites the file.
pub fn modify_tilt(path: &Path, bin_factor: u32, exclude_angles: &[i32]) -> Result<ComScript> {
    let mut script = ComScript::load(path)?;

    if script.get(GPU_KEY)? != Some(GPU_DISABLED) {
        script.upsert(GPU_KEY, GPU_LABEL, GPU_DISABLED)?;
    }

    script.set(IMAGE_BINNED_KEY, IMAGE_BINNED_LABEL, &bin_factor.to_string())?;

    if !exclude_angles.is_empty() {
        script.upsert(EXCLUDE_KEY, EXCLUDE_LABEL, &format_angle_list(exclude_angles))?;
    }

    save_and_print(&script)?;
    Ok(script)
}

/// Edits the three scripts found in `directory`
///
/// The first failing script aborts the remaining edits; scripts already
/// written stay written.
pub fn modify_com_scripts(
    directory: &Path,
    bin_factor: u32,
    pixel_spacing: f64,
    exclude_angles: &[i32],
) -> Result<()> {
    info!("Modified '{NEWST_SCRIPT}' file:");
    modify_newst(&directory.join(NEWST_SCRIPT), bin_factor)?;
    print_separator();

    info!("Modified '{CTF_SCRIPT}' file:");
    modify_ctfcorrection(&directory.join(CTF_SCRIPT), bin_factor, pixel_spacing)?;
    print_separator();

    info!("Modified '{TILT_SCRIPT}' file:");
    modify_tilt(&directory.join(TILT_SCRIPT), bin_factor, exclude_angles)?;

    Ok(())
}

fn save_and_print(script: &ComScript) -> Result<()> {
    script.save()?;
    for line in script.lines() {
        info!("{line}");
    }
    Ok(())
}

fn print_separator() {
    info!("");
    info!("{SCRIPT_SEPARATOR}");
    info!("");
}
