//! `.LIT` lightmap file support.
//!
//! Maps the parts of each placed object to a region of a shared lightmap
//! texture.
//!
//! ```text
//! i32 object count
//! per object: i32 part count, i32 id
//!   per part: u8-length name, i32 id, u8-length file name, i32 lightmap index,
//!             i32 pixels per part, i32 parts per width, i32 part position
//! i32 file count
//! file count × u8-length file name
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt};

/// Lightmap placement of one object part.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
	/// Part name
	pub name: String,
	/// Part id
	pub id: i32,
	/// Lightmap texture file
	pub file_name: String,
	/// Index of the texture in [`File::files`]
	pub lightmap_index: i32,
	/// Pixels per part side
	pub pixels_per_part: i32,
	/// Parts per texture row
	pub parts_per_width: i32,
	/// Slot of this part within the texture
	pub part_position: i32,
}

/// Lightmap parts of one placed object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
	/// Object id
	pub id: i32,
	/// Parts
	pub parts: Vec<Part>,
}

/// A decoded lightmap file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	/// Objects in stored order
	pub objects: Vec<Object>,
	/// Lightmap texture file names
	pub files: Vec<String>,
}

impl File {
	/// Creates an empty lightmap file.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finds an object by id.
	pub fn find_object(&self, id: i32) -> Option<&Object> {
		self.objects.iter().find(|o| o.id == id)
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Lit;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let object_count = reader.read_count_i32()?;
		let mut objects = Vec::with_capacity(object_count.min(4096));
		for _ in 0..object_count {
			let part_count = reader.read_count_i32()?;
			let id = reader.read_i32::<LittleEndian>()?;

			let mut parts = Vec::with_capacity(part_count.min(4096));
			for _ in 0..part_count {
				parts.push(Part {
					name: reader.read_u8_length_string(LEGACY_ENCODING)?,
					id: reader.read_i32::<LittleEndian>()?,
					file_name: reader.read_u8_length_string(LEGACY_ENCODING)?,
					lightmap_index: reader.read_i32::<LittleEndian>()?,
					pixels_per_part: reader.read_i32::<LittleEndian>()?,
					parts_per_width: reader.read_i32::<LittleEndian>()?,
					part_position: reader.read_i32::<LittleEndian>()?,
				});
			}
			objects.push(Object {
				id,
				parts,
			});
		}

		let file_count = reader.read_count_i32()?;
		let files = (0..file_count)
			.map(|_| reader.read_u8_length_string(LEGACY_ENCODING))
			.collect::<Result<Vec<_>, _>>()?;

		debug!("LIT: {} objects, {} lightmaps", objects.len(), files.len());
		Ok(Self {
			objects,
			files,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.objects.len(), "object count")?;
		for object in &self.objects {
			writer.write_count_i32(object.parts.len(), "part count")?;
			writer.write_i32::<LittleEndian>(object.id)?;
			for part in &object.parts {
				writer.write_u8_length_string(&part.name, LEGACY_ENCODING)?;
				writer.write_i32::<LittleEndian>(part.id)?;
				writer.write_u8_length_string(&part.file_name, LEGACY_ENCODING)?;
				writer.write_i32::<LittleEndian>(part.lightmap_index)?;
				writer.write_i32::<LittleEndian>(part.pixels_per_part)?;
				writer.write_i32::<LittleEndian>(part.parts_per_width)?;
				writer.write_i32::<LittleEndian>(part.part_position)?;
			}
		}

		writer.write_count_i32(self.files.len(), "file count")?;
		for name in &self.files {
			writer.write_u8_length_string(name, LEGACY_ENCODING)?;
		}
		Ok(())
	}
}
