use std::fs;
use std::path::Path;

use tempfile::tempdir;

use imod_recon::utils::{
    directory_basename, format_angle_list, format_decimal, format_pixel_size, remove_files,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pixel_size() {
        assert_eq!(format_pixel_size(2.7), "2.7");
        assert_eq!(format_pixel_size(8.0), "8.0");
        assert_eq!(format_pixel_size(1.23456), "1.235");
        assert_eq!(format_pixel_size(4.0 * 1.35), "5.4");
    }

    #[test]
    fn test_format_decimal_keeps_fraction() {
        assert_eq!(format_decimal(3.0), "3.0");
        assert_eq!(format_decimal(0.0), "0.0");
        assert_eq!(format_decimal(1.5), "1.5");
        assert_eq!(format_decimal(-2.0), "-2.0");
    }

    #[test]
    fn test_format_angle_list() {
        assert_eq!(format_angle_list(&[1, 2, 3]), "1, 2, 3");
        assert_eq!(format_angle_list(&[40]), "40");
        assert_eq!(format_angle_list(&[]), "");
    }

    #[test]
    fn test_directory_basename() {
        assert_eq!(directory_basename(Path::new("/data/TS_01")).unwrap(), "TS_01");
        assert_eq!(directory_basename(Path::new("/data/TS_01/")).unwrap(), "TS_01");
        assert_eq!(directory_basename(Path::new("TS_02")).unwrap(), "TS_02");
    }

    #[test]
    fn test_directory_basename_of_dot() {
        let expected = std::env::current_dir().unwrap();
        let expected = expected.canonicalize().unwrap();
        assert_eq!(
            directory_basename(Path::new(".")).unwrap(),
            expected.file_name().unwrap().to_str().unwrap()
        );
    }

    #[test]
    fn test_remove_files_by_extension() {
        let dir = tempdir().unwrap();
        for name in ["a.mrc", "b.mrc", "tomo.rec", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = remove_files(dir.path(), ".mrc").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!dir.path().join("a.mrc").exists());
        assert!(dir.path().join("tomo.rec").exists());
        assert!(dir.path().join("notes.txt").exists());

        let removed = remove_files(dir.path(), ".rec").unwrap();
        assert_eq!(removed, vec![dir.path().join("tomo.rec")]);
    }

    #[test]
    fn test_remove_files_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(remove_files(dir.path(), ".mrc").unwrap().is_empty());
    }
}
