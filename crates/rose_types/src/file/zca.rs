//! `.ZCA` camera file support.
//!
//! ```text
//! "ZCA0001\0"
//! i32  projection (0 perspective, 1 orthographic)
//! Mat4 model view
//! Mat4 projection
//! f32  field of view, aspect ratio, near plane, far plane
//! Vec3 eye, center, up
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::{
	io::{LEGACY_ENCODING, ReadExt, WriteExt},
	math::{Mat4, Vec3},
};

/// ZCA constants.
pub mod constants {
	/// File identifier
	pub const IDENTIFIER: &str = "ZCA0001";

	/// Width of the identifier field
	pub const IDENTIFIER_SIZE: usize = 8;
}

/// Camera projection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ProjectionType {
	/// Perspective projection
	#[default]
	Perspective = 0,
	/// Orthographic projection
	Orthographic = 1,
}

impl ProjectionType {
	/// Converts the stored value.
	pub fn from_i32(value: i32) -> Option<Self> {
		match value {
			0 => Some(Self::Perspective),
			1 => Some(Self::Orthographic),
			_ => None,
		}
	}
}

/// A decoded camera file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	/// Projection kind
	pub projection_type: ProjectionType,
	/// Model view matrix
	pub model_view: Mat4,
	/// Projection matrix
	pub projection: Mat4,
	/// Vertical field of view
	pub field_of_view: f32,
	/// Width over height
	pub aspect_ratio: f32,
	/// Near clip distance
	pub near_plane: f32,
	/// Far clip distance
	pub far_plane: f32,
	/// Camera position
	pub eye: Vec3,
	/// Look-at target
	pub center: Vec3,
	/// Up direction
	pub up: Vec3,
}

impl Default for File {
	fn default() -> Self {
		Self {
			projection_type: ProjectionType::Perspective,
			model_view: Mat4::IDENTITY,
			projection: Mat4::IDENTITY,
			field_of_view: 45.0,
			aspect_ratio: 4.0 / 3.0,
			near_plane: 1.0,
			far_plane: 1000.0,
			eye: Vec3::default(),
			center: Vec3::new(0.0, 1.0, 0.0),
			up: Vec3::new(0.0, 0.0, 1.0),
		}
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Zca;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let identifier = reader.read_fixed_string(constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;
		if identifier != constants::IDENTIFIER {
			return Err(RoseFileError::identifier_mismatch(FileType::Zca, constants::IDENTIFIER, identifier));
		}

		let raw_projection = reader.read_i32::<LittleEndian>()?;
		let projection_type = ProjectionType::from_i32(raw_projection)
			.ok_or(RoseFileError::invalid_discriminant(FileType::Zca, "projection type", raw_projection))?;

		let file = Self {
			projection_type,
			model_view: reader.read_mat4()?,
			projection: reader.read_mat4()?,
			field_of_view: reader.read_f32::<LittleEndian>()?,
			aspect_ratio: reader.read_f32::<LittleEndian>()?,
			near_plane: reader.read_f32::<LittleEndian>()?,
			far_plane: reader.read_f32::<LittleEndian>()?,
			eye: reader.read_vec3()?,
			center: reader.read_vec3()?,
			up: reader.read_vec3()?,
		};

		debug!("ZCA: {:?}, fov {}", file.projection_type, file.field_of_view);
		Ok(file)
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_fixed_string(constants::IDENTIFIER, constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;
		writer.write_i32::<LittleEndian>(self.projection_type as i32)?;
		writer.write_mat4(&self.model_view)?;
		writer.write_mat4(&self.projection)?;
		writer.write_f32::<LittleEndian>(self.field_of_view)?;
		writer.write_f32::<LittleEndian>(self.aspect_ratio)?;
		writer.write_f32::<LittleEndian>(self.near_plane)?;
		writer.write_f32::<LittleEndian>(self.far_plane)?;
		writer.write_vec3(self.eye)?;
		writer.write_vec3(self.center)?;
		writer.write_vec3(self.up)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_round_trip() {
		let mut camera = File {
			projection_type: ProjectionType::Orthographic,
			..File::default()
		};
		camera.eye = Vec3::new(5200.0, 5200.0, 300.0);
		camera.model_view = Mat4::from_array(std::array::from_fn(|i| i as f32));

		let bytes = camera.to_bytes().unwrap();
		assert_eq!(bytes.len(), 8 + 4 + 64 * 2 + 16 + 36);
		assert_eq!(&bytes[8..12], &1i32.to_le_bytes());
		assert_eq!(&bytes[16..20], &1.0f32.to_le_bytes());
		assert_eq!(File::from_bytes(&bytes).unwrap(), camera);
	}

	#[test]
	fn test_invalid_projection() {
		let mut bytes = File::default().to_bytes().unwrap();
		bytes[8..12].copy_from_slice(&2i32.to_le_bytes());
		assert!(matches!(
			File::from_bytes(&bytes),
			Err(RoseFileError::InvalidDiscriminant {
				value: 2,
				..
			})
		));
	}

	#[test]
	fn test_identifier_mismatch() {
		let mut bytes = File::default().to_bytes().unwrap();
		bytes[0] = b'X';
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::IdentifierMismatch { .. })));
	}
}
