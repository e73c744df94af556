//! `.TIL` terrain tile file support.
//!
//! ```text
//! i32 width
//! i32 height
//! height × width × (u8 brush, u8 tile index, u8 tile set, i32 tile)
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{ReadExt, WriteExt, ensure_remaining};

/// One terrain tile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
	/// Brush used to paint the tile
	pub brush: u8,
	/// Index within the tile set
	pub tile_index: u8,
	/// Tile set
	pub tile_set: u8,
	/// Zone tile number
	pub tile: i32,
}

/// A decoded tile grid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	width: usize,
	height: usize,
	tiles: Vec<Tile>,
}

impl File {
	/// Creates a grid of default tiles.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			tiles: vec![Tile::default(); width * height],
		}
	}

	/// Tiles per row.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Number of rows.
	pub fn height(&self) -> usize {
		self.height
	}

	/// All tiles, row major.
	pub fn tiles(&self) -> &[Tile] {
		&self.tiles
	}

	fn index(&self, x: usize, y: usize) -> Result<usize, RoseFileError> {
		if x >= self.width {
			return Err(RoseFileError::out_of_range("column", x, self.width));
		}
		if y >= self.height {
			return Err(RoseFileError::out_of_range("row", y, self.height));
		}
		Ok(y * self.width + x)
	}

	/// Tile at column `x`, row `y`.
	pub fn tile(&self, x: usize, y: usize) -> Result<&Tile, RoseFileError> {
		Ok(&self.tiles[self.index(x, y)?])
	}

	/// Mutable tile at column `x`, row `y`.
	pub fn tile_mut(&mut self, x: usize, y: usize) -> Result<&mut Tile, RoseFileError> {
		let index = self.index(x, y)?;
		Ok(&mut self.tiles[index])
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Til;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let width = reader.read_count_i32()?;
		let height = reader.read_count_i32()?;
		let count = width
			.checked_mul(height)
			.ok_or_else(|| RoseFileError::invalid_argument(format!("tile grid {width}x{height} is too large")))?;

		ensure_remaining(reader, count, 7, "tile count")?;
		let mut tiles = Vec::with_capacity(count);
		for _ in 0..count {
			tiles.push(Tile {
				brush: reader.read_u8()?,
				tile_index: reader.read_u8()?,
				tile_set: reader.read_u8()?,
				tile: reader.read_i32::<LittleEndian>()?,
			});
		}

		debug!("TIL: {}x{} tiles", width, height);
		Ok(Self {
			width,
			height,
			tiles,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.width, "width")?;
		writer.write_count_i32(self.height, "height")?;
		for tile in &self.tiles {
			writer.write_u8(tile.brush)?;
			writer.write_u8(tile.tile_index)?;
			writer.write_u8(tile.tile_set)?;
			writer.write_i32::<LittleEndian>(tile.tile)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip() {
		let mut tiles = File::new(3, 2);
		*tiles.tile_mut(2, 1).unwrap() = Tile {
			brush: 1,
			tile_index: 2,
			tile_set: 3,
			tile: 400,
		};

		let bytes = tiles.to_bytes().unwrap();
		assert_eq!(bytes.len(), 8 + 6 * 7);
		assert_eq!(&bytes[8 + 5 * 7..], &[1, 2, 3, 0x90, 0x01, 0, 0]);

		let loaded = File::from_bytes(&bytes).unwrap();
		assert_eq!(loaded, tiles);
		assert_eq!(loaded.tile(2, 1).unwrap().tile, 400);
	}

	#[test]
	fn test_huge_dimensions_are_rejected() {
		let mut bytes = File::new(2, 2).to_bytes().unwrap();
		bytes[0..4].copy_from_slice(&i32::MAX.to_le_bytes());
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::ArgumentInvalid { .. })));
	}

	#[test]
	fn test_out_of_range() {
		let tiles = File::new(2, 2);
		assert!(matches!(tiles.tile(0, 2), Err(RoseFileError::ArgumentOutOfRange { index: 2, .. })));
	}
}
