//! `.HIM` heightmap file support.
//!
//! A heightmap holds the terrain heights of one map block together with two
//! derived summaries used for culling: a 16×16 grid of patch bounds and an 85
//! node quad-tree over that grid.
//!
//! # File Format
//!
//! ```text
//! i32   width
//! i32   height
//! i32   grid count (4)
//! f32   patch size (250.0)
//! f32   height × width heights, row major
//! u8-length "quad"
//! i32   patch count (256)
//! 16 × 16 × (f32 maximum, f32 minimum)
//! i32   quad patch count (85)
//! 85 × (f32 maximum, f32 minimum)
//! ```
//!
//! The summaries are never edited directly. After changing heights call
//! [`File::generate_patches`] before saving; nothing invalidates them for you.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt, checked_count, ensure_remaining};

/// HIM constants.
pub mod constants {
	/// Tag written before the patch tables
	pub const IDENTIFIER: &str = "quad";

	/// Patches per side
	pub const PATCH_GRID: usize = 16;

	/// Height samples per patch side (patches share their edges)
	pub const PATCH_SAMPLES: usize = 5;

	/// Heights per side needed by patch generation
	pub const MINIMUM_SIZE: usize = 65;

	/// Nodes in the flattened quad-tree (1 + 4 + 16 + 64)
	pub const QUAD_PATCH_COUNT: usize = 85;

	/// Depth of the quad-tree leaves
	pub const QUAD_DEPTH: usize = 3;

	/// Default grid count field
	pub const DEFAULT_GRID_COUNT: i32 = 4;

	/// Default patch size field
	pub const DEFAULT_PATCH_SIZE: f32 = 250.0;
}

/// Height bounds of a region.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patch {
	/// Highest sample
	pub maximum: f32,
	/// Lowest sample
	pub minimum: f32,
}

impl Patch {
	fn empty() -> Self {
		Self {
			maximum: f32::MIN,
			minimum: f32::MAX,
		}
	}

	fn include(&mut self, other: Patch) {
		self.maximum = self.maximum.max(other.maximum);
		self.minimum = self.minimum.min(other.minimum);
	}

	fn read<R: Read + ?Sized>(reader: &mut R) -> std::io::Result<Self> {
		let maximum = reader.read_f32::<LittleEndian>()?;
		let minimum = reader.read_f32::<LittleEndian>()?;
		Ok(Self {
			maximum,
			minimum,
		})
	}

	fn write<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
		writer.write_f32::<LittleEndian>(self.maximum)?;
		writer.write_f32::<LittleEndian>(self.minimum)
	}
}

/// A decoded heightmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	width: usize,
	height: usize,
	grid_count: i32,
	patch_size: f32,
	heights: Vec<f32>,
	patches: Vec<Patch>,
	quad_patches: Vec<Patch>,
}

impl Default for File {
	fn default() -> Self {
		Self::new(0, 0)
	}
}

impl File {
	/// Creates a flat heightmap with zeroed summaries.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			grid_count: constants::DEFAULT_GRID_COUNT,
			patch_size: constants::DEFAULT_PATCH_SIZE,
			heights: vec![0.0; width * height],
			patches: vec![Patch::default(); constants::PATCH_GRID * constants::PATCH_GRID],
			quad_patches: vec![Patch::default(); constants::QUAD_PATCH_COUNT],
		}
	}

	/// Samples per row.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Number of rows.
	pub fn height(&self) -> usize {
		self.height
	}

	/// Grid count header field.
	pub fn grid_count(&self) -> i32 {
		self.grid_count
	}

	/// Patch size header field.
	pub fn patch_size(&self) -> f32 {
		self.patch_size
	}

	/// All heights, row major.
	pub fn heights(&self) -> &[f32] {
		&self.heights
	}

	fn height_index(&self, x: usize, y: usize) -> Result<usize, RoseFileError> {
		if x >= self.width {
			return Err(RoseFileError::out_of_range("column", x, self.width));
		}
		if y >= self.height {
			return Err(RoseFileError::out_of_range("row", y, self.height));
		}
		Ok(y * self.width + x)
	}

	/// Height at column `x`, row `y`.
	pub fn height_at(&self, x: usize, y: usize) -> Result<f32, RoseFileError> {
		Ok(self.heights[self.height_index(x, y)?])
	}

	/// Sets the height at column `x`, row `y`.
	pub fn set_height(&mut self, x: usize, y: usize, value: f32) -> Result<(), RoseFileError> {
		let index = self.height_index(x, y)?;
		self.heights[index] = value;
		Ok(())
	}

	/// Sets every height to `value`.
	pub fn fill(&mut self, value: f32) {
		self.heights.fill(value);
	}

	/// Patch at column `x`, row `y` of the 16×16 grid.
	pub fn patch(&self, x: usize, y: usize) -> Result<&Patch, RoseFileError> {
		if x >= constants::PATCH_GRID {
			return Err(RoseFileError::out_of_range("patch column", x, constants::PATCH_GRID));
		}
		if y >= constants::PATCH_GRID {
			return Err(RoseFileError::out_of_range("patch row", y, constants::PATCH_GRID));
		}
		Ok(&self.patches[y * constants::PATCH_GRID + x])
	}

	/// The 256 patches, row major.
	pub fn patches(&self) -> &[Patch] {
		&self.patches
	}

	/// The 85 quad-tree nodes; children of node `i` are `4i + 1 ..= 4i + 4`.
	pub fn quad_patches(&self) -> &[Patch] {
		&self.quad_patches
	}

	/// Recomputes the patch grid and the quad-tree from the heights.
	///
	/// Patch `(w, h)` spans the 5×5 samples at columns `w*4 ..= w*4+4` and rows
	/// `64 - (h*4 + vh)` for `vh` in `0..5`, so patch row 0 sits at the bottom
	/// of the sample grid.
	///
	/// # Errors
	///
	/// [`RoseFileError::ArgumentInvalid`] if the grid is smaller than 65×65.
	pub fn generate_patches(&mut self) -> Result<(), RoseFileError> {
		let size = constants::MINIMUM_SIZE;
		if self.width < size || self.height < size {
			return Err(RoseFileError::invalid_argument(format!(
				"patch generation needs at least {size}x{size} heights, have {}x{}",
				self.width, self.height
			)));
		}

		for h in 0..constants::PATCH_GRID {
			for w in 0..constants::PATCH_GRID {
				let mut patch = Patch::empty();
				for vh in 0..constants::PATCH_SAMPLES {
					let row = size - (h * 4 + vh + 1);
					for vw in 0..constants::PATCH_SAMPLES {
						let value = self.heights[row * self.width + w * 4 + vw];
						patch.maximum = patch.maximum.max(value);
						patch.minimum = patch.minimum.min(value);
					}
				}
				self.patches[h * constants::PATCH_GRID + w] = patch;
			}
		}

		self.generate_quad_patches();
		debug!("HIM: regenerated {} patches", self.patches.len() + self.quad_patches.len());
		Ok(())
	}

	fn generate_quad_patches(&mut self) {
		self.build_quad(0, 0, 0, 0, constants::PATCH_GRID);
	}

	/// Fills node `index` covering `span × span` patches from `(x, y)`.
	fn build_quad(&mut self, index: usize, depth: usize, x: usize, y: usize, span: usize) -> Patch {
		let half = span / 2;
		let mut bounds = Patch::empty();

		for child in 0..4 {
			let cx = x + (child % 2) * half;
			let cy = y + (child / 2) * half;
			let part = if depth == constants::QUAD_DEPTH {
				self.patches[cy * constants::PATCH_GRID + cx]
			} else {
				self.build_quad(index * 4 + child + 1, depth + 1, cx, cy, half)
			};
			bounds.include(part);
		}

		self.quad_patches[index] = bounds;
		bounds
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Him;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let width = reader.read_count_i32()?;
		let height = reader.read_count_i32()?;
		let grid_count = reader.read_i32::<LittleEndian>()?;
		let patch_size = reader.read_f32::<LittleEndian>()?;

		let sample_count = width
			.checked_mul(height)
			.ok_or_else(|| RoseFileError::invalid_argument(format!("heightmap {width}x{height} is too large")))?;
		ensure_remaining(reader, sample_count, 4, "height count")?;
		let mut heights = vec![0.0f32; sample_count];
		reader.read_f32_into::<LittleEndian>(&mut heights)?;

		let identifier = reader.read_u8_length_string(LEGACY_ENCODING)?;
		if identifier != constants::IDENTIFIER {
			return Err(RoseFileError::identifier_mismatch(FileType::Him, constants::IDENTIFIER, identifier));
		}

		let patch_count = reader.read_count_i32()?;
		let expected = constants::PATCH_GRID * constants::PATCH_GRID;
		if patch_count != expected {
			return Err(RoseFileError::CountMismatch {
				file_type: FileType::Him,
				what: "patches",
				expected,
				actual: patch_count,
			});
		}
		let patches = (0..patch_count).map(|_| Patch::read(reader)).collect::<Result<Vec<_>, _>>()?;

		let quad_count = reader.read_count_i32()?;
		if quad_count != constants::QUAD_PATCH_COUNT {
			return Err(RoseFileError::CountMismatch {
				file_type: FileType::Him,
				what: "quad patches",
				expected: constants::QUAD_PATCH_COUNT,
				actual: quad_count,
			});
		}
		let quad_patches = (0..quad_count).map(|_| Patch::read(reader)).collect::<Result<Vec<_>, _>>()?;

		debug!("HIM: {}x{} heights, patch size {}", width, height, patch_size);

		Ok(Self {
			width,
			height,
			grid_count,
			patch_size,
			heights,
			patches,
			quad_patches,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.width, "width")?;
		writer.write_count_i32(self.height, "height")?;
		writer.write_i32::<LittleEndian>(self.grid_count)?;
		writer.write_f32::<LittleEndian>(self.patch_size)?;
		for &value in &self.heights {
			writer.write_f32::<LittleEndian>(value)?;
		}

		writer.write_u8_length_string(constants::IDENTIFIER, LEGACY_ENCODING)?;
		writer.write_i32::<LittleEndian>(checked_count(self.patches.len(), "patch count")?)?;
		for patch in &self.patches {
			patch.write(writer)?;
		}
		writer.write_i32::<LittleEndian>(checked_count(self.quad_patches.len(), "quad patch count")?)?;
		for patch in &self.quad_patches {
			patch.write(writer)?;
		}
		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "HIM File: {}x{} heights", self.width, self.height)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_constant_heights_give_constant_patches() {
		let mut heightmap = File::new(65, 65);
		heightmap.fill(12.5);
		heightmap.generate_patches().unwrap();

		for patch in heightmap.patches().iter().chain(heightmap.quad_patches()) {
			assert_eq!(patch.minimum, 12.5);
			assert_eq!(patch.maximum, 12.5);
		}
	}

	#[test]
	fn test_patch_rows_are_flipped() {
		let mut heightmap = File::new(65, 65);
		// bottom row of samples belongs to patch row 0
		heightmap.set_height(0, 64, 100.0).unwrap();
		heightmap.set_height(64, 0, -50.0).unwrap();
		heightmap.generate_patches().unwrap();

		assert_eq!(heightmap.patch(0, 0).unwrap().maximum, 100.0);
		assert_eq!(heightmap.patch(0, 0).unwrap().minimum, 0.0);
		assert_eq!(heightmap.patch(15, 15).unwrap().minimum, -50.0);
		assert_eq!(heightmap.patch(15, 0).unwrap().maximum, 0.0);
	}

	#[test]
	fn test_shared_edges() {
		let mut heightmap = File::new(65, 65);
		// column 4 is the right edge of patch 0 and the left edge of patch 1
		heightmap.set_height(4, 60, 7.0).unwrap();
		heightmap.generate_patches().unwrap();

		assert_eq!(heightmap.patch(0, 0).unwrap().maximum, 7.0);
		assert_eq!(heightmap.patch(1, 0).unwrap().maximum, 7.0);
		assert_eq!(heightmap.patch(2, 0).unwrap().maximum, 0.0);
	}

	#[test]
	fn test_quad_tree_aggregation() {
		let mut heightmap = File::new(65, 65);
		heightmap.set_height(0, 64, 9.0).unwrap();
		heightmap.generate_patches().unwrap();

		let quads = heightmap.quad_patches();
		assert_eq!(quads.len(), 85);
		assert_eq!(quads[0].maximum, 9.0);
		// root -> first child -> first grandchild -> first leaf
		assert_eq!(quads[1].maximum, 9.0);
		assert_eq!(quads[5].maximum, 9.0);
		assert_eq!(quads[21].maximum, 9.0);
		assert_eq!(quads[2].maximum, 0.0);
		assert_eq!(quads[84].maximum, 0.0);

		for (index, node) in quads.iter().enumerate().take(21) {
			let mut expected = Patch::empty();
			for child in 1..=4 {
				expected.include(quads[index * 4 + child]);
			}
			assert_eq!(*node, expected);
		}
	}

	#[test]
	fn test_small_grid_is_rejected() {
		let mut heightmap = File::new(64, 65);
		assert!(matches!(heightmap.generate_patches(), Err(RoseFileError::ArgumentInvalid { .. })));
	}

	#[test]
	fn test_round_trip() {
		let mut heightmap = File::new(65, 65);
		for y in 0..65 {
			for x in 0..65 {
				heightmap.set_height(x, y, (x * y) as f32 * 0.5).unwrap();
			}
		}
		heightmap.generate_patches().unwrap();

		let bytes = heightmap.to_bytes().unwrap();
		assert_eq!(bytes.len(), 16 + 65 * 65 * 4 + 5 + 4 + 256 * 8 + 4 + 85 * 8);
		assert_eq!(File::from_bytes(&bytes).unwrap(), heightmap);
	}

	#[test]
	fn test_bad_tag() {
		let mut bytes = File::new(1, 1).to_bytes().unwrap();
		bytes[21] = b'Q';
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::IdentifierMismatch { .. })));
	}

	#[test]
	fn test_huge_dimensions_are_rejected() {
		let mut bytes = File::new(1, 1).to_bytes().unwrap();
		bytes[0..4].copy_from_slice(&i32::MAX.to_le_bytes());
		bytes[4..8].copy_from_slice(&i32::MAX.to_le_bytes());
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::ArgumentInvalid { .. })));

		// fits in memory arithmetic but not in the stream
		bytes[0..4].copy_from_slice(&100i32.to_le_bytes());
		bytes[4..8].copy_from_slice(&100i32.to_le_bytes());
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::ArgumentInvalid { .. })));
	}

	#[test]
	fn test_out_of_range_access() {
		let heightmap = File::new(3, 2);
		assert!(matches!(heightmap.height_at(3, 0), Err(RoseFileError::ArgumentOutOfRange { .. })));
		assert!(heightmap.height_at(2, 1).is_ok());
		assert!(heightmap.patch(16, 0).is_err());
	}
}
