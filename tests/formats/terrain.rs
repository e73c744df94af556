//! Map block formats working together

use rose_rs::prelude::*;

#[test_log::test]
fn test_flat_heightmap() {
	let mut heights = HimFile::new(65, 65);
	heights.fill(12.5);
	heights.generate_patches().unwrap();

	let loaded = HimFile::from_bytes(&heights.to_bytes().unwrap()).unwrap();
	assert_eq!(loaded, heights);
	assert_eq!(loaded.patches().len(), 16 * 16);
	assert_eq!(loaded.quad_patches().len(), 85);
	for patch in loaded.patches().iter().chain(loaded.quad_patches()) {
		assert_eq!(patch.minimum, 12.5);
		assert_eq!(patch.maximum, 12.5);
	}
}

#[test_log::test]
fn test_peak_reaches_quad_root() {
	let mut heights = HimFile::new(65, 65);
	heights.set_height(40, 20, 300.0).unwrap();
	heights.set_height(3, 60, -20.0).unwrap();
	heights.generate_patches().unwrap();

	let root = heights.quad_patches()[0];
	assert_eq!(root.maximum, 300.0);
	assert_eq!(root.minimum, -20.0);
}

#[test_log::test]
fn test_small_heightmap_rejected() {
	let mut heights = HimFile::new(33, 33);
	assert!(matches!(heights.generate_patches(), Err(RoseFileError::ArgumentInvalid { .. })));
}

#[test_log::test]
fn test_tiles_and_walkability() {
	let mut tiles = TilFile::new(16, 16);
	tiles.tile_mut(4, 5).unwrap().tile = 77;
	let tiles = TilFile::from_bytes(&tiles.to_bytes().unwrap()).unwrap();
	assert_eq!(tiles.tile(4, 5).unwrap().tile, 77);
	assert!(tiles.tile(16, 0).is_err());

	let mut grid = MovFile::new(32, 32);
	grid.set_blocked(31, 0, true).unwrap();
	let grid = MovFile::from_bytes(&grid.to_bytes().unwrap()).unwrap();
	assert!(grid.is_blocked(31, 0).unwrap());
	assert!(!grid.is_blocked(0, 31).unwrap());
}
