//! `.LOD` level of detail file support.
//!
//! `u8`-length name, `i32` level count, then per level an `f32` switch
//! distance and a `u8`-length model path.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt};

/// One detail level.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
	/// Camera distance at which this level takes over
	pub distance: f32,
	/// Model shown at this level
	pub model: String,
}

/// A decoded level of detail file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	/// Object name
	pub name: String,
	/// Levels, nearest first
	pub levels: Vec<Level>,
}

impl File {
	/// Creates an empty file for `name`.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			levels: Vec::new(),
		}
	}

	/// Model to use at `distance`: the last level whose distance has been reached.
	pub fn level_for(&self, distance: f32) -> Option<&Level> {
		self.levels.iter().take_while(|level| level.distance <= distance).last().or(self.levels.first())
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Lod;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let name = reader.read_u8_length_string(LEGACY_ENCODING)?;
		let level_count = reader.read_count_i32()?;
		let mut levels = Vec::with_capacity(level_count.min(64));
		for _ in 0..level_count {
			levels.push(Level {
				distance: reader.read_f32::<LittleEndian>()?,
				model: reader.read_u8_length_string(LEGACY_ENCODING)?,
			});
		}

		debug!("LOD '{}': {} levels", name, levels.len());
		Ok(Self {
			name,
			levels,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u8_length_string(&self.name, LEGACY_ENCODING)?;
		writer.write_count_i32(self.levels.len(), "level count")?;
		for level in &self.levels {
			writer.write_f32::<LittleEndian>(level.distance)?;
			writer.write_u8_length_string(&level.model, LEGACY_ENCODING)?;
		}
		Ok(())
	}
}
