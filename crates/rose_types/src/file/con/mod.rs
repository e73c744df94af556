//! `.CON` conversation file support.
//!
//! Conversation files drive NPC dialogs: a fixed table of 16 script functions,
//! a list of messages, menus of selectable messages and a compiled script blob.
//!
//! # File Format
//!
//! ```text
//! 0x000  i16        function enable mask (bit i = function i)
//! 0x002  16 × [32]  function names, null padded
//! 0x202  u16        padding marker, normally 0xCCCC
//! 0x204  i32        conversation offset (absolute)
//! 0x208  i32        script offset (absolute)
//!
//! conversation section (offsets below are relative to its start):
//!   i32 message count, i32 message table offset,
//!   i32 menu count,    i32 menu table offset
//!   message table: count × i32 -> messages (80 bytes, plain)
//!   menu table:    count × i32 -> menu blocks
//!
//! menu block:
//!   i32 block size, i32 message count                     plain
//!   count × i32 offsets (relative to block), messages     scrambled
//!
//! script:
//!   i32 length                                            plain
//!   bytes                                                 scrambled
//! ```
//!
//! Menu contents are scrambled with [`cipher`] keyed by `(message count, block
//! size)`, the script with `(length, end of script offset)`. Both keys are
//! derivable before the scrambled bytes are read, so the writer computes block
//! sizes from the message count rather than measuring what it wrote.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, Placeholder, ReadExt, WriteExt, checked_count, ensure_remaining, position_i32};

pub mod cipher;

/// CON constants.
pub mod constants {
	/// Number of script function slots
	pub const FUNCTION_COUNT: usize = 16;

	/// Width of every fixed string field
	pub const STRING_SIZE: usize = 32;

	/// Marker written after the function names by default
	pub const PADDING_MARKER: u16 = 0xCCCC;

	/// Size of a message record
	pub const MESSAGE_SIZE: usize = 4 * 3 + STRING_SIZE * 2 + 4;

	/// Size of the plain menu block header (block size + message count)
	pub const MENU_HEADER_SIZE: usize = 8;
}

/// A named script function slot.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
	/// Function name
	pub name: String,
	/// Whether the function is enabled
	pub enabled: bool,
}

/// A dialog message.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	/// Message identifier
	pub id: i32,
	/// Message kind as stored by the client
	pub message_type: i32,
	/// Dialog window the message targets
	pub target_window: i32,
	/// Script condition (at most 32 bytes)
	pub condition: String,
	/// Script action (at most 32 bytes)
	pub action: String,
	/// String table row shown to the player
	pub string_id: i32,
}

impl Message {
	fn from_record(record: &[u8; constants::MESSAGE_SIZE]) -> Result<Self, RoseFileError> {
		let mut reader = &record[..];
		Ok(Self {
			id: reader.read_i32::<LittleEndian>()?,
			message_type: reader.read_i32::<LittleEndian>()?,
			target_window: reader.read_i32::<LittleEndian>()?,
			condition: reader.read_fixed_string(constants::STRING_SIZE, LEGACY_ENCODING)?,
			action: reader.read_fixed_string(constants::STRING_SIZE, LEGACY_ENCODING)?,
			string_id: reader.read_i32::<LittleEndian>()?,
		})
	}

	fn to_record(&self) -> Result<[u8; constants::MESSAGE_SIZE], RoseFileError> {
		let mut record = [0u8; constants::MESSAGE_SIZE];
		let mut writer = &mut record[..];
		writer.write_i32::<LittleEndian>(self.id)?;
		writer.write_i32::<LittleEndian>(self.message_type)?;
		writer.write_i32::<LittleEndian>(self.target_window)?;
		writer.write_fixed_string(&self.condition, constants::STRING_SIZE, LEGACY_ENCODING)?;
		writer.write_fixed_string(&self.action, constants::STRING_SIZE, LEGACY_ENCODING)?;
		writer.write_i32::<LittleEndian>(self.string_id)?;
		Ok(record)
	}
}

/// A menu of selectable messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
	/// Menu entries
	pub messages: Vec<Message>,
}

impl Menu {
	/// On-disk size of a menu block holding `message_count` messages.
	pub fn block_size(message_count: usize) -> usize {
		constants::MENU_HEADER_SIZE + message_count * (4 + constants::MESSAGE_SIZE)
	}
}

/// A decoded conversation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	functions: [Function; constants::FUNCTION_COUNT],
	#[serde(default = "default_padding_marker")]
	padding_marker: u16,
	/// Top level messages
	pub messages: Vec<Message>,
	/// Menus
	pub menus: Vec<Menu>,
	/// Compiled script, unscrambled
	pub script: Vec<u8>,
}

fn default_padding_marker() -> u16 {
	constants::PADDING_MARKER
}

impl Default for File {
	fn default() -> Self {
		Self {
			functions: Default::default(),
			padding_marker: constants::PADDING_MARKER,
			messages: Vec::new(),
			menus: Vec::new(),
			script: Vec::new(),
		}
	}
}

fn read_message<R: Read + ?Sized>(reader: &mut R, key: Option<(i32, i32)>) -> Result<Message, RoseFileError> {
	let mut record = [0u8; constants::MESSAGE_SIZE];
	reader.read_exact(&mut record)?;
	if let Some((key_a, key_b)) = key {
		cipher::obfuscate_bytes(&mut record, key_a, key_b);
	}
	Message::from_record(&record)
}

fn read_offsets<R: Read + Seek>(reader: &mut R, position: u64, count: usize) -> Result<Vec<i32>, RoseFileError> {
	reader.seek(SeekFrom::Start(position))?;
	ensure_remaining(reader, count, 4, "offset count")?;
	let mut offsets = vec![0i32; count];
	reader.read_i32_into::<LittleEndian>(&mut offsets)?;
	Ok(offsets)
}

fn relative(base: u64, offset: i32) -> Result<u64, RoseFileError> {
	base.checked_add_signed(i64::from(offset))
		.ok_or_else(|| RoseFileError::invalid_argument(format!("offset {offset} points before the stream start")))
}

fn read_menu<R: Read + Seek>(reader: &mut R, start: u64) -> Result<Menu, RoseFileError> {
	reader.seek(SeekFrom::Start(start))?;
	let block_size = reader.read_i32::<LittleEndian>()?;
	let message_count = reader.read_count_i32()?;
	let key_a = checked_count::<i32>(message_count, "menu message count")?;

	let mut offsets = Vec::with_capacity(message_count.min(4096));
	for _ in 0..message_count {
		let offset = reader.read_i32::<LittleEndian>()?;
		offsets.push(cipher::obfuscate_i32(offset, key_a, block_size));
	}

	let mut messages = Vec::with_capacity(offsets.len());
	for offset in offsets {
		reader.seek(SeekFrom::Start(relative(start, offset)?))?;
		messages.push(read_message(reader, Some((key_a, block_size)))?);
	}

	trace!("CON menu at 0x{:X}: {} messages, block size {}", start, message_count, block_size);
	Ok(Menu {
		messages,
	})
}

impl File {
	/// Creates an empty conversation with 16 unnamed, disabled functions.
	pub fn new() -> Self {
		Self::default()
	}

	/// The 16 function slots.
	pub fn functions(&self) -> &[Function; constants::FUNCTION_COUNT] {
		&self.functions
	}

	/// Function slot at `index`.
	pub fn function(&self, index: usize) -> Result<&Function, RoseFileError> {
		self.functions.get(index).ok_or(RoseFileError::out_of_range("function", index, constants::FUNCTION_COUNT))
	}

	/// Mutable function slot at `index`.
	pub fn function_mut(&mut self, index: usize) -> Result<&mut Function, RoseFileError> {
		self.functions.get_mut(index).ok_or(RoseFileError::out_of_range("function", index, constants::FUNCTION_COUNT))
	}

	/// Marker stored after the function names.
	pub fn padding_marker(&self) -> u16 {
		self.padding_marker
	}

	/// Replaces the marker stored after the function names.
	pub fn set_padding_marker(&mut self, marker: u16) {
		self.padding_marker = marker;
	}

	/// Enable mask as stored on disk.
	pub fn function_mask(&self) -> i16 {
		let mask = self
			.functions
			.iter()
			.enumerate()
			.filter(|(_, function)| function.enabled)
			.fold(0u16, |mask, (index, _)| mask | (1 << index));
		mask as i16
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Con;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let mask = reader.read_i16::<LittleEndian>()? as u16;
		let mut functions: [Function; constants::FUNCTION_COUNT] = Default::default();
		for (index, function) in functions.iter_mut().enumerate() {
			function.name = reader.read_fixed_string(constants::STRING_SIZE, LEGACY_ENCODING)?;
			function.enabled = (mask >> index) & 1 == 1;
		}

		let padding_marker = reader.read_u16::<LittleEndian>()?;
		if padding_marker != constants::PADDING_MARKER {
			debug!("CON padding marker is 0x{:04X}", padding_marker);
		}

		let conversation_offset = reader.read_i32::<LittleEndian>()?;
		let script_offset = reader.read_i32::<LittleEndian>()?;

		let base = relative(0, conversation_offset)?;
		reader.seek(SeekFrom::Start(base))?;
		let message_count = reader.read_count_i32()?;
		let message_table_offset = reader.read_i32::<LittleEndian>()?;
		let menu_count = reader.read_count_i32()?;
		let menu_table_offset = reader.read_i32::<LittleEndian>()?;

		let message_offsets = read_offsets(reader, relative(base, message_table_offset)?, message_count)?;
		let mut messages = Vec::with_capacity(message_count);
		for offset in message_offsets {
			reader.seek(SeekFrom::Start(relative(base, offset)?))?;
			messages.push(read_message(reader, None)?);
		}

		let menu_offsets = read_offsets(reader, relative(base, menu_table_offset)?, menu_count)?;
		let mut menus = Vec::with_capacity(menu_count);
		for offset in menu_offsets {
			menus.push(read_menu(reader, relative(base, offset)?)?);
		}

		reader.seek(SeekFrom::Start(relative(0, script_offset)?))?;
		let script_length = reader.read_count_i32()?;
		let mut script = reader.read_bytes(script_length)?;
		let script_key_a = checked_count::<i32>(script_length, "script length")?;
		let script_end = script_offset.wrapping_add(4).wrapping_add(script_key_a);
		cipher::obfuscate_bytes(&mut script, script_key_a, script_end);

		debug!(
			"CON: {} messages, {} menus, {} script bytes",
			messages.len(),
			menus.len(),
			script.len()
		);

		Ok(Self {
			functions,
			padding_marker,
			messages,
			menus,
			script,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_i16::<LittleEndian>(self.function_mask())?;
		for function in &self.functions {
			writer.write_fixed_string(&function.name, constants::STRING_SIZE, LEGACY_ENCODING)?;
		}
		writer.write_u16::<LittleEndian>(self.padding_marker)?;

		let conversation_slot = Placeholder::reserve_u32(writer)?;
		let script_slot = Placeholder::reserve_u32(writer)?;

		let base = position_i32(writer)?;
		conversation_slot.patch_i32(writer, base)?;

		writer.write_count_i32(self.messages.len(), "message count")?;
		let message_table_slot = Placeholder::reserve_u32(writer)?;
		writer.write_count_i32(self.menus.len(), "menu count")?;
		let menu_table_slot = Placeholder::reserve_u32(writer)?;

		let offset = position_i32(writer)? - base;
		message_table_slot.patch_i32(writer, offset)?;
		let message_slots =
			self.messages.iter().map(|_| Placeholder::reserve_u32(writer)).collect::<Result<Vec<_>, _>>()?;
		for (message, slot) in self.messages.iter().zip(message_slots) {
			let offset = position_i32(writer)? - base;
			slot.patch_i32(writer, offset)?;
			writer.write_all(&message.to_record()?)?;
		}

		let offset = position_i32(writer)? - base;
		menu_table_slot.patch_i32(writer, offset)?;
		let menu_slots = self.menus.iter().map(|_| Placeholder::reserve_u32(writer)).collect::<Result<Vec<_>, _>>()?;
		for (menu, slot) in self.menus.iter().zip(menu_slots) {
			let offset = position_i32(writer)? - base;
			slot.patch_i32(writer, offset)?;

			let message_count = menu.messages.len();
			let key_a = checked_count::<i32>(message_count, "menu message count")?;
			let block_size = checked_count::<i32>(Menu::block_size(message_count), "menu block size")?;
			writer.write_i32::<LittleEndian>(block_size)?;
			writer.write_i32::<LittleEndian>(key_a)?;

			let first_message = constants::MENU_HEADER_SIZE + message_count * 4;
			for index in 0..message_count {
				let offset = checked_count::<i32>(first_message + index * constants::MESSAGE_SIZE, "menu offset")?;
				writer.write_i32::<LittleEndian>(cipher::obfuscate_i32(offset, key_a, block_size))?;
			}
			for message in &menu.messages {
				let mut record = message.to_record()?;
				cipher::obfuscate_bytes(&mut record, key_a, block_size);
				writer.write_all(&record)?;
			}
		}

		let script_offset = position_i32(writer)?;
		script_slot.patch_i32(writer, script_offset)?;
		let script_length = checked_count::<i32>(self.script.len(), "script length")?;
		let script_end = script_offset.wrapping_add(4).wrapping_add(script_length);
		let mut script = self.script.clone();
		cipher::obfuscate_bytes(&mut script, script_length, script_end);
		writer.write_i32::<LittleEndian>(script_length)?;
		writer.write_all(&script)?;

		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"CON File: {} messages, {} menus, {} script bytes",
			self.messages.len(),
			self.menus.len(),
			self.script.len()
		)
	}
}

#[cfg(test)]
mod tests;
