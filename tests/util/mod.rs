#![allow(dead_code)]

use std::fs::{self, File};
use std::path::Path;

use imod_recon::errors::{Result, command_failed_error};
use imod_recon::runner::{CommandRunner, ExternalCommand};

/// Stands in for the IMOD programs: records every invocation and writes the
/// file each program would have produced
pub struct FakeImod {
    name: String,
    fail_on: Option<String>,
    pub commands: Vec<String>,
}

impl FakeImod {
    pub fn new(name: &str) -> Self {
        FakeImod {
            name: name.to_string(),
            fail_on: None,
            commands: Vec::new(),
        }
    }

    /// Makes the command whose line starts with `prefix` exit with status 1
    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    fn output_of(&self, command: &ExternalCommand) -> Option<String> {
        let script = command.args.first().map(String::as_str);
        match (command.program.as_str(), script) {
            ("newstack", _) | ("mtffilter", _) | ("trimvol", _) => command.args.last().cloned(),
            ("submfg", Some("eraser.com")) => Some(format!("{}_fixed.st", self.name)),
            ("submfg", Some("newst.com")) => Some(format!("{}.ali", self.name)),
            ("submfg", Some("ctfcorrection.com")) => Some(format!("{}_ctfcorr.ali", self.name)),
            ("submfg", Some("tilt.com")) => Some(format!("{}_full.rec", self.name)),
            _ => None,
        }
    }
}

impl CommandRunner for FakeImod {
    fn run(
        &mut self,
        command: &ExternalCommand,
        directory: &Path,
        _output: Option<&File>,
    ) -> Result<()> {
        let line = command.to_string();
        self.commands.push(line.clone());

        if let Some(prefix) = &self.fail_on {
            if line.starts_with(prefix.as_str()) {
                return Err(command_failed_error(&command.program, &command.args, Some(1)));
            }
        }

        if let Some(output) = self.output_of(command) {
            fs::write(directory.join(output), command.program.as_bytes()).unwrap();
        }
        Ok(())
    }
}

/// Creates `count` empty tilt images named `tilt_<i>.mrc`
pub fn write_tilt_images(directory: &Path, count: usize) {
    for i in 0..count {
        fs::write(directory.join(format!("tilt_{i:02}.mrc")), b"").unwrap();
    }
}

/// Sorted names of the files in a directory
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

pub const NEWST_COM: &str = "# THIS IS A COMMAND FILE TO RUN NEWSTACK
$newstack -StandardInput
InputFile\ttomo.st
OutputFile\ttomo.ali
TransformFile\ttomo.xf
TaperAtFill\t1,0
AdjustOrigin
SizeToOutputInXandY\t1024,1024
OffsetsInXandY\t0.0,0.0
BinByFactor\t1
AntialiasFilter\t-1
$if (-e ./savework) ./savework
";

pub const CTF_COM: &str = "# Command file to run ctfphaseflip
$ctfphaseflip -StandardInput
InputStack\ttomo.ali
AngleFile\ttomo.tlt
OutputFileName\ttomo_ctfcorr.ali
TransformFile\ttomo.xf
DefocusFile\ttomo.defocus
Voltage\t300
SphericalAberration\t2.7
DefocusTol\t200
PixelSize\t0.135
AmplitudeContrast\t0.07
InterpolationWidth\t15
$if (-e ./savework) ./savework
";

pub const TILT_COM: &str = "# Command file to run Tilt
$tilt -StandardInput
InputProjections tomo.ali
OutputFile tomo_full.rec
IMAGEBINNED 1
TILTFILE tomo.tlt
THICKNESS 300
RADIAL 0.35 0.035
FalloffIsTrueSigma 1
XAXISTILT 0.0
LOG 0.0
SCALE 0.0 250.0
PERPENDICULAR
MODE 2
FULLIMAGE 4096 4096
SUBSETSTART 0 0
AdjustOrigin
ActionIfGPUFails 1,2
OFFSET 0.0
SHIFT 0.0 0.0
$if (-e ./savework) ./savework
";

/// Writes the three editable scripts into `directory`
pub fn write_scripts(directory: &Path) {
    fs::write(directory.join("newst.com"), NEWST_COM).unwrap();
    fs::write(directory.join("ctfcorrection.com"), CTF_COM).unwrap();
    fs::write(directory.join("tilt.com"), TILT_COM).unwrap();
}
