use std::fs;

use tempfile::tempdir;

use imod_recon::errors::Error;
use imod_recon::pipeline::{
    Action, DoseWeighting, ReconstructionOptions, Stage, Step, WorkDir, execute_step,
    plan_reconstruction, reconstruct_tomogram,
};

mod util;
use util::{FakeImod, file_names, write_tilt_images};

#[test]
fn test_full_reconstruction_leaves_only_final_volume() {
    let root = tempdir().unwrap();
    let dir = root.path().join("TS_01");
    fs::create_dir(&dir).unwrap();
    write_tilt_images(&dir, 5);

    let mut imod = FakeImod::new("tomo");
    let report = reconstruct_tomogram(&dir, &ReconstructionOptions::new("tomo"), &mut imod).unwrap();

    assert_eq!(report.volume, dir.join("tomo_TS_01.rec"));
    assert!(report.volume.is_file());

    let names = file_names(&dir);
    assert!(names.contains(&"tomo.st".to_string()));
    assert!(names.contains(&"tomo_reconstruction.log".to_string()));
    for leftover in ["tomo_orig.st", "tomo_fixed.st", "tomo.ali", "tomo_ctfcorr.ali", "tomo_full.rec", "tomo.rec"] {
        assert!(!names.contains(&leftover.to_string()), "{leftover} should be gone");
    }

    // The restored stack is the original newstack output, not the erased one
    assert_eq!(fs::read_to_string(dir.join("tomo.st")).unwrap(), "newstack");
}

#[test]
fn test_commands_run_in_order() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 3);

    let mut imod = FakeImod::new("tomo");
    let dose = DoseWeighting::from_parts(Some(3.0), Some(1.5)).unwrap();
    let options = ReconstructionOptions::new("tomo").dose(dose);
    reconstruct_tomogram(dir.path(), &options, &mut imod).unwrap();

    assert_eq!(
        imod.commands,
        vec![
            "newstack tilt_00.mrc tilt_01.mrc tilt_02.mrc tomo.st",
            "submfg eraser.com",
            "submfg newst.com",
            "submfg ctfcorrection.com",
            "mtffilter -dfixed 3.0 -initial 1.5 -volt 300 tomo_ctfcorr.ali tomo.ali",
            "submfg tilt.com",
            "trimvol -rx tomo_full.rec tomo.rec",
        ]
    );
}

#[test]
fn test_failed_command_stops_pipeline() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 5);

    let mut imod = FakeImod::new("tomo").failing_on("submfg ctfcorrection.com");
    let err = reconstruct_tomogram(dir.path(), &ReconstructionOptions::new("tomo"), &mut imod)
        .unwrap_err();

    match err {
        Error::CommandFailed { program, args, code } => {
            assert_eq!(program, "submfg");
            assert_eq!(args, vec!["ctfcorrection.com"]);
            assert_eq!(code, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(imod.commands.last().unwrap(), "submfg ctfcorrection.com");
    assert_eq!(imod.commands.len(), 4);

    // Intermediate files stay for inspection
    let names = file_names(dir.path());
    assert!(names.contains(&"tomo_orig.st".to_string()));
    assert!(names.contains(&"tomo.st".to_string()));
}

#[test]
fn test_failed_stack_runs_nothing_else() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 2);

    let mut imod = FakeImod::new("tomo").failing_on("newstack");
    assert!(reconstruct_tomogram(dir.path(), &ReconstructionOptions::new("tomo"), &mut imod).is_err());
    assert_eq!(imod.commands.len(), 1);
}

#[test]
fn test_without_rotation_volume_is_renamed() {
    let root = tempdir().unwrap();
    let dir = root.path().join("grid3_ts7");
    fs::create_dir(&dir).unwrap();
    write_tilt_images(&dir, 5);

    let mut imod = FakeImod::new("tomo");
    let options = ReconstructionOptions::new("tomo").rotate_x(false);
    let report = reconstruct_tomogram(&dir, &options, &mut imod).unwrap();

    assert!(!imod.commands.iter().any(|c| c.starts_with("trimvol")));
    assert_eq!(report.volume, dir.join("tomo_grid3_ts7.rec"));
    // tilt.com output becomes the final volume unchanged
    assert_eq!(fs::read_to_string(&report.volume).unwrap(), "submfg");
}

#[test]
fn test_missing_images() {
    let dir = tempdir().unwrap();
    let mut imod = FakeImod::new("tomo");
    let err = reconstruct_tomogram(dir.path(), &ReconstructionOptions::new("tomo"), &mut imod)
        .unwrap_err();
    assert!(matches!(err, Error::NoInputImages { .. }));
    assert!(imod.commands.is_empty());
}

#[test]
fn test_invalid_options_run_nothing() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 5);

    let mut imod = FakeImod::new("tomo");
    let options = ReconstructionOptions::new("tomo").voltage(100);
    let err = reconstruct_tomogram(dir.path(), &options, &mut imod).unwrap_err();
    assert!(matches!(err, Error::Precondition { .. }));
    assert!(imod.commands.is_empty());
    assert!(!dir.path().join("tomo_reconstruction.log").exists());
}

#[test]
fn test_dose_parameters_must_come_together() {
    assert!(DoseWeighting::from_parts(Some(3.0), None).is_err());
    assert!(DoseWeighting::from_parts(None, Some(3.0)).is_err());
    assert!(DoseWeighting::from_parts(Some(3.0), Some(0.0)).is_ok());
    assert!(DoseWeighting::from_parts(None, None).is_ok());
}

#[test]
fn test_plan_changes_nothing() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 5);
    let before = file_names(dir.path());

    let steps = plan_reconstruction(dir.path(), &ReconstructionOptions::new("tomo")).unwrap();

    assert!(!steps.is_empty());
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn test_log_is_appended_across_runs() {
    let dir = tempdir().unwrap();
    write_tilt_images(dir.path(), 2);
    fs::write(dir.path().join("tomo_reconstruction.log"), "previous run\n").unwrap();

    let mut imod = FakeImod::new("tomo");
    reconstruct_tomogram(dir.path(), &ReconstructionOptions::new("tomo"), &mut imod).unwrap();

    let log = fs::read_to_string(dir.path().join("tomo_reconstruction.log")).unwrap();
    assert!(log.starts_with("previous run"));
}

fn move_step(from: &str, to: &str) -> Step {
    Step {
        stage: Stage::Erase,
        action: Action::Move {
            from: from.to_string(),
            to: to.to_string(),
        },
    }
}

#[cfg(unix)]
#[test]
fn test_move_renames_in_place() {
    use std::os::unix::fs::MetadataExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tomo.st"), b"stack").unwrap();
    let inode = fs::metadata(dir.path().join("tomo.st")).unwrap().ino();

    let workdir = WorkDir::open(dir.path()).unwrap();
    let log = workdir.append_log("tomo_reconstruction.log").unwrap();
    let mut imod = FakeImod::new("tomo");
    execute_step(&workdir, &move_step("tomo.st", "tomo_orig.st"), &mut imod, &log).unwrap();

    let moved = dir.path().join("tomo_orig.st");
    assert!(!dir.path().join("tomo.st").exists());
    assert_eq!(fs::metadata(&moved).unwrap().ino(), inode);
    assert!(imod.commands.is_empty());
}

#[test]
fn test_move_replaces_existing_target() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tomo_fixed.st"), b"erased").unwrap();
    fs::write(dir.path().join("tomo.st"), b"stale").unwrap();

    let workdir = WorkDir::open(dir.path()).unwrap();
    let log = workdir.append_log("tomo_reconstruction.log").unwrap();
    let mut imod = FakeImod::new("tomo");
    execute_step(&workdir, &move_step("tomo_fixed.st", "tomo.st"), &mut imod, &log).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("tomo.st")).unwrap(), "erased");
    assert!(!dir.path().join("tomo_fixed.st").exists());
}

#[test]
fn test_move_of_missing_file_fails() {
    let dir = tempdir().unwrap();
    let workdir = WorkDir::open(dir.path()).unwrap();
    let log = workdir.append_log("tomo_reconstruction.log").unwrap();
    let mut imod = FakeImod::new("tomo");

    let err = execute_step(&workdir, &move_step("tomo.rec", "tomo_TS.rec"), &mut imod, &log)
        .unwrap_err();
    assert!(matches!(err, Error::FileOperation { .. }));
}

