//! `.TSI` sprite sheet file support.
//!
//! Describes UI sprites as rectangles cut from a set of textures.
//!
//! ```text
//! i16 texture count
//! texture count × (u16-length file name, i32 colour key)
//! i16 total sprite count
//! per texture: i16 sprite count,
//!   sprites × (i16 texture index, i32 x1, i32 y1, i32 x2, i32 y2,
//!              i32 colour, [32] name)
//! ```
//!
//! Sprites are kept under the texture they belong to and the total count is
//! derived when writing. A sprite's stored texture index is written back as
//! read while the sprite stays under the same texture, and derived from its
//! position otherwise.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt};

/// TSI constants.
pub mod constants {
	/// Width of the sprite name field
	pub const NAME_SIZE: usize = 32;
}

/// A rectangle cut from a texture.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Sprite {
	/// Left edge
	pub x1: i32,
	/// Top edge
	pub y1: i32,
	/// Right edge
	pub x2: i32,
	/// Bottom edge
	pub y2: i32,
	/// Tint colour (ARGB)
	pub colour: i32,
	/// Sprite name (at most 32 bytes)
	pub name: String,
	/// Texture index as read, with the group the sprite was read under
	#[serde(skip)]
	stored_texture: Option<(i16, usize)>,
}

impl PartialEq for Sprite {
	fn eq(&self, other: &Self) -> bool {
		self.x1 == other.x1
			&& self.y1 == other.y1
			&& self.x2 == other.x2
			&& self.y2 == other.y2
			&& self.colour == other.colour
			&& self.name == other.name
	}
}

impl Eq for Sprite {}

impl Sprite {
	/// Creates a sprite covering `(x1, y1)` to `(x2, y2)`.
	pub fn new(name: impl Into<String>, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
		Self {
			x1,
			y1,
			x2,
			y2,
			name: name.into(),
			..Self::default()
		}
	}

	/// Rectangle width.
	pub fn width(&self) -> i32 {
		self.x2 - self.x1
	}

	/// Rectangle height.
	pub fn height(&self) -> i32 {
		self.y2 - self.y1
	}
}

/// A texture and the sprites cut from it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
	/// Texture file name
	pub file_name: String,
	/// Transparent colour key (ARGB)
	pub colour_key: i32,
	/// Sprites on this texture
	pub sprites: Vec<Sprite>,
}

/// A decoded sprite sheet file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	/// Textures in stored order
	pub textures: Vec<Texture>,
}

impl File {
	/// Creates an empty sprite sheet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Total sprites across all textures.
	pub fn sprite_count(&self) -> usize {
		self.textures.iter().map(|t| t.sprites.len()).sum()
	}

	/// Finds a sprite by name, returning its texture index too.
	pub fn find_sprite(&self, name: &str) -> Option<(usize, &Sprite)> {
		self.textures
			.iter()
			.enumerate()
			.find_map(|(index, texture)| texture.sprites.iter().find(|s| s.name == name).map(|s| (index, s)))
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Tsi;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let texture_count = reader.read_count_i16()?;
		let mut textures = Vec::with_capacity(texture_count);
		for _ in 0..texture_count {
			textures.push(Texture {
				file_name: reader.read_u16_length_string(LEGACY_ENCODING)?,
				colour_key: reader.read_i32::<LittleEndian>()?,
				sprites: Vec::new(),
			});
		}

		let total = reader.read_count_i16()?;
		for (index, texture) in textures.iter_mut().enumerate() {
			let sprite_count = reader.read_count_i16()?;
			texture.sprites.reserve(sprite_count);
			for _ in 0..sprite_count {
				let texture_index = reader.read_i16::<LittleEndian>()?;
				if usize::try_from(texture_index).ok() != Some(index) {
					warn!("TSI sprite under texture {} claims texture {}", index, texture_index);
				}
				texture.sprites.push(Sprite {
					x1: reader.read_i32::<LittleEndian>()?,
					y1: reader.read_i32::<LittleEndian>()?,
					x2: reader.read_i32::<LittleEndian>()?,
					y2: reader.read_i32::<LittleEndian>()?,
					colour: reader.read_i32::<LittleEndian>()?,
					name: reader.read_fixed_string(constants::NAME_SIZE, LEGACY_ENCODING)?,
					stored_texture: Some((texture_index, index)),
				});
			}
		}

		let file = Self {
			textures,
		};
		if file.sprite_count() != total {
			return Err(RoseFileError::CountMismatch {
				file_type: FileType::Tsi,
				what: "sprites",
				expected: total,
				actual: file.sprite_count(),
			});
		}

		debug!("TSI: {} textures, {} sprites", file.textures.len(), total);
		Ok(file)
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i16(self.textures.len(), "texture count")?;
		for texture in &self.textures {
			writer.write_u16_length_string(&texture.file_name, LEGACY_ENCODING)?;
			writer.write_i32::<LittleEndian>(texture.colour_key)?;
		}

		writer.write_count_i16(self.sprite_count(), "sprite count")?;
		for (index, texture) in self.textures.iter().enumerate() {
			writer.write_count_i16(texture.sprites.len(), "sprite count")?;
			for sprite in &texture.sprites {
				match sprite.stored_texture {
					Some((stored, group)) if group == index => writer.write_i16::<LittleEndian>(stored)?,
					_ => writer.write_count_i16(index, "texture index")?,
				}
				writer.write_i32::<LittleEndian>(sprite.x1)?;
				writer.write_i32::<LittleEndian>(sprite.y1)?;
				writer.write_i32::<LittleEndian>(sprite.x2)?;
				writer.write_i32::<LittleEndian>(sprite.y2)?;
				writer.write_i32::<LittleEndian>(sprite.colour)?;
				writer.write_fixed_string(&sprite.name, constants::NAME_SIZE, LEGACY_ENCODING)?;
			}
		}
		Ok(())
	}
}
