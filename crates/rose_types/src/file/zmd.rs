//! `.ZMD` skeleton file support.
//!
//! # File Format
//!
//! ```text
//! "ZMD0003\0" (or "ZMD0002\0")
//! i32 bone count
//! per bone:  i32 parent, null-terminated name, Vec3 translation,
//!            Quat rotation (w, x, y, z)
//! i32 dummy count
//! per dummy: null-terminated name, i32 parent, Vec3 translation,
//!            Quat rotation (w, x, y, z, version 3 only)
//! ```
//!
//! Version 2 dummies carry no rotation and load with the identity. Files are
//! always written as version 3.
//!
//! The root bone is its own parent (index 0). Parent links are not checked on
//! load; [`File::validate_hierarchy`] does that on request.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::{
	io::{LEGACY_ENCODING, QuatOrder, ReadExt, WriteExt},
	math::{Quat, Vec3},
};

/// ZMD constants.
pub mod constants {
	/// Identifier written by this library
	pub const IDENTIFIER: &str = "ZMD0003";

	/// Older identifier without dummy rotations
	pub const IDENTIFIER_V2: &str = "ZMD0002";

	/// Width of the identifier field
	pub const IDENTIFIER_SIZE: usize = 8;
}

/// A skeleton bone or dummy attachment point.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
	/// Index of the parent bone
	pub parent: i32,
	/// Bone name
	pub name: String,
	/// Translation relative to the parent
	pub translation: Vec3,
	/// Rotation relative to the parent
	pub rotation: Quat,
}

/// A decoded skeleton.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	/// Bones; bone 0 is the root
	pub bones: Vec<Bone>,
	/// Dummy attachment points, parented to bones
	pub dummy_bones: Vec<Bone>,
}

impl File {
	/// Creates an empty skeleton.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finds a bone index by name.
	pub fn find_bone(&self, name: &str) -> Option<usize> {
		self.bones.iter().position(|b| b.name == name)
	}

	/// Checks that every bone's parent is an earlier bone and every dummy's parent exists.
	///
	/// The root (bone 0) may name itself as parent.
	///
	/// # Errors
	///
	/// [`RoseFileError::ArgumentInvalid`] naming the first offending bone.
	pub fn validate_hierarchy(&self) -> Result<(), RoseFileError> {
		for (index, bone) in self.bones.iter().enumerate() {
			let valid = usize::try_from(bone.parent).is_ok_and(|parent| parent < index || (index == 0 && parent == 0));
			if !valid {
				return Err(RoseFileError::invalid_argument(format!(
					"bone {} '{}' has parent {}, expected an earlier bone",
					index, bone.name, bone.parent
				)));
			}
		}

		for (index, dummy) in self.dummy_bones.iter().enumerate() {
			if !usize::try_from(dummy.parent).is_ok_and(|parent| parent < self.bones.len()) {
				return Err(RoseFileError::invalid_argument(format!(
					"dummy {} '{}' has parent {}, skeleton has {} bones",
					index,
					dummy.name,
					dummy.parent,
					self.bones.len()
				)));
			}
		}
		Ok(())
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Zmd;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let identifier = reader.read_fixed_string(constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;
		let dummy_rotations = match identifier.as_str() {
			constants::IDENTIFIER => true,
			constants::IDENTIFIER_V2 => false,
			_ => return Err(RoseFileError::identifier_mismatch(FileType::Zmd, constants::IDENTIFIER, identifier)),
		};

		let bone_count = reader.read_count_i32()?;
		let mut bones = Vec::with_capacity(bone_count.min(1024));
		for _ in 0..bone_count {
			bones.push(Bone {
				parent: reader.read_i32::<LittleEndian>()?,
				name: reader.read_null_terminated_string(LEGACY_ENCODING)?,
				translation: reader.read_vec3()?,
				rotation: reader.read_quat(QuatOrder::Wxyz)?,
			});
		}

		let dummy_count = reader.read_count_i32()?;
		let mut dummy_bones = Vec::with_capacity(dummy_count.min(1024));
		for _ in 0..dummy_count {
			let name = reader.read_null_terminated_string(LEGACY_ENCODING)?;
			let parent = reader.read_i32::<LittleEndian>()?;
			let translation = reader.read_vec3()?;
			let rotation = if dummy_rotations { reader.read_quat(QuatOrder::Wxyz)? } else { Quat::IDENTITY };
			dummy_bones.push(Bone {
				parent,
				name,
				translation,
				rotation,
			});
		}

		debug!("ZMD {}: {} bones, {} dummies", identifier, bones.len(), dummy_bones.len());
		Ok(Self {
			bones,
			dummy_bones,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_fixed_string(constants::IDENTIFIER, constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;

		writer.write_count_i32(self.bones.len(), "bone count")?;
		for bone in &self.bones {
			writer.write_i32::<LittleEndian>(bone.parent)?;
			writer.write_null_terminated_string(&bone.name, LEGACY_ENCODING)?;
			writer.write_vec3(bone.translation)?;
			writer.write_quat(bone.rotation, QuatOrder::Wxyz)?;
		}

		writer.write_count_i32(self.dummy_bones.len(), "dummy count")?;
		for dummy in &self.dummy_bones {
			writer.write_null_terminated_string(&dummy.name, LEGACY_ENCODING)?;
			writer.write_i32::<LittleEndian>(dummy.parent)?;
			writer.write_vec3(dummy.translation)?;
			writer.write_quat(dummy.rotation, QuatOrder::Wxyz)?;
		}
		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ZMD File: {} bones, {} dummies", self.bones.len(), self.dummy_bones.len())
	}
}
