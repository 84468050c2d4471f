//! MRC volume writer
//!
//! Writes float32 (mode 2) volumes with a 1024 byte little-endian MRC2014
//! header. The pixel spacing is not written here: IMOD's `alterheader`
//! patches it afterwards so the cell dimensions stay consistent with what
//! the IMOD tools expect.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LE, WriteBytesExt};
use log::debug;

use crate::errors::{Result, file_operation_error, invalid_filename_error, precondition_error};
use crate::runner::{CommandRunner, ExternalCommand};

/// Size of the fixed MRC header in bytes
pub const HEADER_SIZE: usize = 1024;

const MODE_FLOAT32: u32 = 2;
const SPACE_GROUP_VOLUME: u32 = 1;
const FORMAT_VERSION: u32 = 20140;

/// A dense float32 volume stored in z(y(x)) order
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    nx: u32,
    ny: u32,
    nz: u32,
    voxels: Vec<f32>,
}

fn voxel_count(nx: u32, ny: u32, nz: u32) -> Result<usize> {
    (nx as usize)
        .checked_mul(ny as usize)
        .and_then(|n| n.checked_mul(nz as usize))
        .ok_or_else(|| precondition_error(&format!("volume of {nx}x{ny}x{nz} is too large")))
}

impl Volume {
    /// A zero filled volume
    pub fn new(nx: u32, ny: u32, nz: u32) -> Result<Self> {
        let count = voxel_count(nx, ny, nz)?;
        Ok(Volume {
            nx,
            ny,
            nz,
            voxels: vec![0.0; count],
        })
    }

    /// Wraps existing voxel data; the length must match the dimensions
    pub fn from_data(nx: u32, ny: u32, nz: u32, voxels: Vec<f32>) -> Result<Self> {
        let expected = voxel_count(nx, ny, nz)?;
        if voxels.len() != expected {
            return Err(precondition_error(&format!(
                "volume of {nx}x{ny}x{nz} needs {expected} voxels, got {}",
                voxels.len()
            )));
        }
        Ok(Volume { nx, ny, nz, voxels })
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.nx, self.ny, self.nz)
    }

    fn index(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= self.nx || y >= self.ny || z >= self.nz {
            return None;
        }
        let nx = self.nx as usize;
        let ny = self.ny as usize;
        Some((z as usize) * nx * ny + (y as usize) * nx + (x as usize))
    }

    /// Voxel value, `None` outside the volume
    pub fn get(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        self.index(x, y, z).map(|i| self.voxels[i])
    }

    pub fn set(&mut self, x: u32, y: u32, z: u32, value: f32) -> Result<()> {
        let i = self.index(x, y, z).ok_or_else(|| {
            precondition_error(&format!(
                "voxel ({x}, {y}, {z}) is outside the {}x{}x{} volume",
                self.nx, self.ny, self.nz
            ))
        })?;
        self.voxels[i] = value;
        Ok(())
    }

    /// Minimum, maximum, mean and RMS deviation of the voxels
    fn statistics(&self) -> (f32, f32, f32, f32) {
        if self.voxels.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let count = self.voxels.len() as f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in &self.voxels {
            min = min.min(v);
            max = max.max(v);
            sum += f64::from(v);
        }
        let mean = sum / count;
        let variance = self
            .voxels
            .iter()
            .map(|&v| (f64::from(v) - mean).powi(2))
            .sum::<f64>()
            / count;
        (min, max, mean as f32, variance.sqrt() as f32)
    }

    /// Writes the header and voxels to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .map_err(|e| file_operation_error(e, path.to_path_buf(), "create"))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| file_operation_error(e, path.to_path_buf(), "write"))
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let (min, max, mean, rms) = self.statistics();

        // words 1-4: dimensions and mode
        writer.write_u32::<LE>(self.nx)?;
        writer.write_u32::<LE>(self.ny)?;
        writer.write_u32::<LE>(self.nz)?;
        writer.write_u32::<LE>(MODE_FLOAT32)?;

        // words 5-7: start indices
        writer.write_all(&[0u8; 4 * 3])?;

        // words 8-10: sampling, one pixel per cell unit
        writer.write_u32::<LE>(self.nx)?;
        writer.write_u32::<LE>(self.ny)?;
        writer.write_u32::<LE>(self.nz)?;

        // words 11-16: cell lengths and angles
        writer.write_f32::<LE>(self.nx as f32)?;
        writer.write_f32::<LE>(self.ny as f32)?;
        writer.write_f32::<LE>(self.nz as f32)?;
        for _ in 0..3 {
            writer.write_f32::<LE>(90.0)?;
        }

        // words 17-19: axis mapping
        writer.write_u32::<LE>(1)?;
        writer.write_u32::<LE>(2)?;
        writer.write_u32::<LE>(3)?;

        // words 20-22: density statistics
        writer.write_f32::<LE>(min)?;
        writer.write_f32::<LE>(max)?;
        writer.write_f32::<LE>(mean)?;

        // words 23-24: space group, no extended header
        writer.write_u32::<LE>(SPACE_GROUP_VOLUME)?;
        writer.write_u32::<LE>(0)?;

        // words 25-49: extra space, with the format version at word 28
        writer.write_all(&[0u8; 4 * 3])?;
        writer.write_u32::<LE>(FORMAT_VERSION)?;
        writer.write_all(&[0u8; 4 * (49 - 28)])?;

        // words 50-52: origin
        writer.write_all(&[0u8; 4 * 3])?;

        // words 53-54: map identifier and little-endian machine stamp
        writer.write_all(b"MAP ")?;
        writer.write_all(&[0x44, 0x44, 0x00, 0x00])?;

        // words 55-56: RMS deviation, no labels
        writer.write_f32::<LE>(rms)?;
        writer.write_u32::<LE>(0)?;

        // words 57-256: labels
        writer.write_all(&[0u8; 4 * (256 - 56)])?;

        for &v in &self.voxels {
            writer.write_f32::<LE>(v)?;
        }

        Ok(())
    }
}

/// Saves a volume and sets its pixel spacing with `alterheader -del`
///
/// `alterheader` runs in the file's directory with its output discarded.
pub fn save_mrc(
    runner: &mut dyn CommandRunner,
    path: &Path,
    volume: &Volume,
    pixel_spacing: f64,
) -> Result<()> {
    volume.save(path)?;
    debug!("Wrote {:?} volume to {}", volume.dimensions(), path.display());
    set_pixel_spacing(runner, path, pixel_spacing)
}

/// Patches the pixel spacing of an existing MRC file with `alterheader -del`
pub fn set_pixel_spacing(
    runner: &mut dyn CommandRunner,
    path: &Path,
    pixel_spacing: f64,
) -> Result<()> {
    if !(pixel_spacing > 0.0) {
        return Err(precondition_error(&format!(
            "pixel spacing must be positive, got {pixel_spacing}"
        )));
    }

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| invalid_filename_error(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let command = ExternalCommand::new("alterheader")
        .arg("-del")
        .arg(format!("{0},{0},{0}", pixel_spacing))
        .arg(file_name);
    runner.run(&command, directory, None)
}
