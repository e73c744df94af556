//! `.CHR` character list support.
//!
//! Binds NPC and monster ids to a skeleton, mesh objects, motions and effects
//! drawn from three shared path lists.
//!
//! ```text
//! u16 count + null-terminated skeleton paths
//! u16 count + null-terminated motion paths
//! u16 count + null-terminated effect paths
//! u16 character count
//! per character:
//!   u8 enabled
//!   if enabled:
//!     u16 skeleton index, null-terminated name
//!     u16 object count  + u16 object ids
//!     u16 motion count  + (u16 action, u16 motion index)
//!     u16 effect count  + (u16 bone, u16 effect index)
//! ```

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt, checked_count};

/// Motion bound to an action slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMotion {
	/// Action slot (stand, walk, attack, ...)
	pub action: u16,
	/// Index into [`File::motion_files`]
	pub motion: u16,
}

/// Effect attached to a bone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEffect {
	/// Bone the effect follows
	pub bone: u16,
	/// Index into [`File::effect_files`]
	pub effect: u16,
}

/// An enabled character entry.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
	/// Index into [`File::skeleton_files`]
	pub skeleton: u16,
	/// Character name
	pub name: String,
	/// Mesh object ids
	pub objects: Vec<u16>,
	/// Motions
	pub motions: Vec<CharacterMotion>,
	/// Effects
	pub effects: Vec<CharacterEffect>,
}

/// A decoded character list.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	/// Skeleton file paths
	pub skeleton_files: Vec<String>,
	/// Motion file paths
	pub motion_files: Vec<String>,
	/// Effect file paths
	pub effect_files: Vec<String>,
	/// Characters by id; `None` for disabled slots
	pub characters: Vec<Option<Character>>,
}

fn read_count<R: Read + ?Sized>(reader: &mut R) -> Result<usize, RoseFileError> {
	Ok(usize::from(reader.read_u16::<LittleEndian>()?))
}

fn write_count<W: Write + ?Sized>(writer: &mut W, count: usize, what: &str) -> Result<(), RoseFileError> {
	writer.write_u16::<LittleEndian>(checked_count(count, what)?)?;
	Ok(())
}

fn read_paths<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<String>, RoseFileError> {
	let count = read_count(reader)?;
	(0..count).map(|_| reader.read_null_terminated_string(LEGACY_ENCODING)).collect()
}

fn write_paths<W: Write + ?Sized>(writer: &mut W, paths: &[String], what: &str) -> Result<(), RoseFileError> {
	write_count(writer, paths.len(), what)?;
	for path in paths {
		writer.write_null_terminated_string(path, LEGACY_ENCODING)?;
	}
	Ok(())
}

impl Character {
	fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, RoseFileError> {
		let skeleton = reader.read_u16::<LittleEndian>()?;
		let name = reader.read_null_terminated_string(LEGACY_ENCODING)?;

		let object_count = read_count(reader)?;
		let mut objects = Vec::with_capacity(object_count);
		for _ in 0..object_count {
			objects.push(reader.read_u16::<LittleEndian>()?);
		}

		let motion_count = read_count(reader)?;
		let mut motions = Vec::with_capacity(motion_count);
		for _ in 0..motion_count {
			motions.push(CharacterMotion {
				action: reader.read_u16::<LittleEndian>()?,
				motion: reader.read_u16::<LittleEndian>()?,
			});
		}

		let effect_count = read_count(reader)?;
		let mut effects = Vec::with_capacity(effect_count);
		for _ in 0..effect_count {
			effects.push(CharacterEffect {
				bone: reader.read_u16::<LittleEndian>()?,
				effect: reader.read_u16::<LittleEndian>()?,
			});
		}

		Ok(Self {
			skeleton,
			name,
			objects,
			motions,
			effects,
		})
	}

	fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u16::<LittleEndian>(self.skeleton)?;
		writer.write_null_terminated_string(&self.name, LEGACY_ENCODING)?;

		write_count(writer, self.objects.len(), "object count")?;
		for &object in &self.objects {
			writer.write_u16::<LittleEndian>(object)?;
		}

		write_count(writer, self.motions.len(), "motion count")?;
		for motion in &self.motions {
			writer.write_u16::<LittleEndian>(motion.action)?;
			writer.write_u16::<LittleEndian>(motion.motion)?;
		}

		write_count(writer, self.effects.len(), "effect count")?;
		for effect in &self.effects {
			writer.write_u16::<LittleEndian>(effect.bone)?;
			writer.write_u16::<LittleEndian>(effect.effect)?;
		}
		Ok(())
	}
}

impl File {
	/// Creates an empty character list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Character `id`, or `None` if the slot is disabled.
	pub fn character(&self, id: usize) -> Result<Option<&Character>, RoseFileError> {
		self.characters
			.get(id)
			.map(Option::as_ref)
			.ok_or(RoseFileError::out_of_range("character", id, self.characters.len()))
	}

	/// Number of enabled characters.
	pub fn enabled_count(&self) -> usize {
		self.characters.iter().flatten().count()
	}

	/// Skeleton path of `character`.
	pub fn skeleton_path(&self, character: &Character) -> Option<&str> {
		self.skeleton_files.get(usize::from(character.skeleton)).map(String::as_str)
	}

	/// Motion path bound to `action` for `character`.
	pub fn motion_path(&self, character: &Character, action: u16) -> Option<&str> {
		character
			.motions
			.iter()
			.find(|m| m.action == action)
			.and_then(|m| self.motion_files.get(usize::from(m.motion)))
			.map(String::as_str)
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Chr;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let skeleton_files = read_paths(reader)?;
		let motion_files = read_paths(reader)?;
		let effect_files = read_paths(reader)?;

		let character_count = read_count(reader)?;
		let mut characters = Vec::with_capacity(character_count);
		for _ in 0..character_count {
			let enabled = reader.read_bool()?;
			characters.push(if enabled { Some(Character::read(reader)?) } else { None });
		}

		let file = Self {
			skeleton_files,
			motion_files,
			effect_files,
			characters,
		};
		debug!(
			"CHR: {} skeletons, {} motions, {} effects, {}/{} characters enabled",
			file.skeleton_files.len(),
			file.motion_files.len(),
			file.effect_files.len(),
			file.enabled_count(),
			file.characters.len()
		);
		Ok(file)
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		write_paths(writer, &self.skeleton_files, "skeleton count")?;
		write_paths(writer, &self.motion_files, "motion count")?;
		write_paths(writer, &self.effect_files, "effect count")?;

		write_count(writer, self.characters.len(), "character count")?;
		for character in &self.characters {
			writer.write_bool(character.is_some())?;
			if let Some(character) = character {
				character.write(writer)?;
			}
		}
		Ok(())
	}
}
