//! Loading and saving through `Container`

use std::fs;

use rose_rs::prelude::*;

use crate::temp_path;

#[test_log::test]
fn test_save_requires_path() {
	let mut grid = Container::<MovFile>::new();
	assert!(!grid.is_loaded());
	assert!(matches!(grid.save(), Err(RoseFileError::FileNotLoaded)));
}

#[test_log::test]
fn test_save_as_then_load() {
	let path = temp_path("grid.mov");

	let mut grid = Container::from_file(MovFile::new(8, 4));
	grid.set_blocked(2, 3, true).unwrap();
	grid.save_as(&path).unwrap();
	assert_eq!(grid.file_path(), Some(path.as_path()));

	let mut loaded = Container::<MovFile>::new();
	loaded.load(&path).unwrap();
	assert!(loaded.is_loaded());
	assert_eq!(loaded.file(), grid.file());
	assert!(loaded.is_blocked(2, 3).unwrap());

	// save() writes back to the bound path
	loaded.set_blocked(2, 3, false).unwrap();
	loaded.save().unwrap();
	assert!(!MovFile::open(&path).unwrap().is_blocked(2, 3).unwrap());

	fs::remove_file(&path).unwrap();
}

#[test_log::test]
fn test_load_missing_file() {
	let path = temp_path("missing.zmd");
	let mut skeleton = Container::<ZmdFile>::new();
	assert!(matches!(skeleton.load(&path), Err(RoseFileError::FileNotFound { .. })));
	assert!(!skeleton.is_loaded());
}

#[test_log::test]
fn test_identifier_error_carries_path() {
	let path = temp_path("not_a_motion.zmo");
	fs::write(&path, b"ZMD0003\0\0\0\0\0\0\0\0\0\0\0\0\0").unwrap();

	let mut motion = Container::<ZmoFile>::new();
	let err = motion.load(&path).unwrap_err();
	fs::remove_file(&path).unwrap();

	match err {
		RoseFileError::IdentifierMismatch {
			file_type,
			path: Some(p),
			..
		} => {
			assert_eq!(file_type, FileType::Zmo);
			assert_eq!(p, path);
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test_log::test]
fn test_file_type_from_path() {
	assert_eq!(FileType::from_path("3DDATA/MAPS/JUNON/JPT01/30_30.HIM"), Some(FileType::Him));
	assert_eq!(FileType::from_path("list_npc.chr"), Some(FileType::Chr));
	assert_eq!(FileType::from_path("readme.txt"), None);
	assert_eq!(FileType::from_path("no_extension"), None);
}
