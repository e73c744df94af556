//! IDX index updates on disk

use std::fs;

use rose_rs::prelude::*;

use crate::{i32_at, temp_path};

fn entry(path: &str, offset: i32, size: i32) -> VfsFileEntry {
	VfsFileEntry {
		path: path.to_string(),
		offset,
		size,
		block_size: size,
		version: 3,
		..Default::default()
	}
}

fn sample_index() -> IdxFile {
	let mut data = VfsFileSystem::new("DATA.VFS");
	data.files.push(entry("3DDATA\\STB\\LIST_NPC.STB", 0, 1200));
	data.files.push(entry("3DDATA\\STB\\OLD.STB", 1200, 64));

	let mut map = VfsFileSystem::new("MAP.VFS");
	map.files.push(entry("3DDATA\\MAPS\\JUNON\\JPT01\\30_30.HIM", 512, 16960));

	IdxFile {
		base_version: 1,
		current_version: 3,
		file_systems: vec![data, map],
	}
}

#[test_log::test]
fn test_patch_update_cycle() {
	let path = temp_path("data.idx");
	IdxFile::save(&sample_index(), &path).unwrap();

	let mut index = Container::<IdxFile>::new();
	index.load(&path).unwrap();
	index.current_version = 4;
	index.file_systems[0].files[1].is_deleted = true;
	index.file_systems[1].files.push(VfsFileEntry {
		version: 4,
		..entry("3DDATA\\MAPS\\JUNON\\JPT01\\31_30.HIM", 17472, 16960)
	});
	index.save().unwrap();

	let bytes = fs::read(&path).unwrap();
	fs::remove_file(&path).unwrap();

	assert_eq!(i32_at(&bytes, 4), 4);
	// deleted count is recomputed from the entry flags
	let data_block = i32_at(&bytes, 22) as usize;
	assert_eq!(i32_at(&bytes, data_block + 4), 1);
	let map_block = i32_at(&bytes, 35) as usize;
	assert_eq!(i32_at(&bytes, map_block), 2);

	let loaded = IdxFile::from_bytes(&bytes).unwrap();
	assert_eq!(&loaded, index.file());
	assert_eq!(loaded.file_count(), 4);
}

#[test_log::test]
fn test_lookup_after_round_trip() {
	let index = sample_index();
	let loaded = IdxFile::from_bytes(&index.to_bytes().unwrap()).unwrap();

	let (system, found) = loaded.find_file("3ddata/maps/junon/jpt01/30_30.him").unwrap();
	assert_eq!(system.filename, "MAP.VFS");
	assert_eq!(found.size, 16960);
	assert!(loaded.find_system("map.vfs").is_some());
	assert!(loaded.find_file("3DDATA/STB/MISSING.STB").is_none());
}
