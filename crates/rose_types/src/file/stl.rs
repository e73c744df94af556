//! `.STL` string table support.
//!
//! Localised text for the client's data tables. Every row has a key and an id
//! plus one text record per language. Item and quest tables carry extra fields
//! per record.
//!
//! # File Format
//!
//! ```text
//! u8-length identifier    "NRST01" | "ITST01" | "QEST01"
//! i32 row count
//! row count × (var-length key, i32 id)
//! i32 language count
//! language count × i32 absolute offset   -> language block
//!
//! language block:
//!   row count × i32 absolute offset      -> text record
//!
//! text record:
//!   var-length text
//!   var-length description               (item, quest)
//!   var-length start message             (quest)
//!   var-length end message               (quest)
//! ```
//!
//! All strings are UTF-8 with a 7-bit variable length prefix. Offsets are
//! written as zero and patched once their target is placed.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, Placeholder, ReadExt, UNICODE_ENCODING, WriteExt, ensure_remaining, position_i32};

/// Table flavour, selected by the identifier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
	/// Text only
	#[default]
	Normal,
	/// Text and description
	Item,
	/// Text, description, start and end message
	Quest,
}

impl TableKind {
	/// Identifier written at the start of the file.
	pub fn identifier(self) -> &'static str {
		match self {
			Self::Normal => "NRST01",
			Self::Item => "ITST01",
			Self::Quest => "QEST01",
		}
	}

	/// Kind for a stored identifier.
	pub fn from_identifier(identifier: &str) -> Option<Self> {
		match identifier {
			"NRST01" => Some(Self::Normal),
			"ITST01" => Some(Self::Item),
			"QEST01" => Some(Self::Quest),
			_ => None,
		}
	}

	fn has_description(self) -> bool {
		matches!(self, Self::Item | Self::Quest)
	}

	fn has_messages(self) -> bool {
		self == Self::Quest
	}
}

/// Text of one row in one language.
///
/// Fields the table kind does not store are ignored on write and empty on read.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
	/// Display text
	pub text: String,
	/// Description (item and quest tables)
	pub description: String,
	/// Message shown on quest start
	pub start_message: String,
	/// Message shown on quest completion
	pub end_message: String,
}

impl Text {
	/// Text record holding only `text`.
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			..Self::default()
		}
	}

	fn read<R: Read + ?Sized>(reader: &mut R, kind: TableKind) -> Result<Self, RoseFileError> {
		let mut text = Self::new(reader.read_var_length_string(UNICODE_ENCODING)?);
		if kind.has_description() {
			text.description = reader.read_var_length_string(UNICODE_ENCODING)?;
		}
		if kind.has_messages() {
			text.start_message = reader.read_var_length_string(UNICODE_ENCODING)?;
			text.end_message = reader.read_var_length_string(UNICODE_ENCODING)?;
		}
		Ok(text)
	}

	fn write<W: Write + ?Sized>(&self, writer: &mut W, kind: TableKind) -> Result<(), RoseFileError> {
		writer.write_var_length_string(&self.text, UNICODE_ENCODING)?;
		if kind.has_description() {
			writer.write_var_length_string(&self.description, UNICODE_ENCODING)?;
		}
		if kind.has_messages() {
			writer.write_var_length_string(&self.start_message, UNICODE_ENCODING)?;
			writer.write_var_length_string(&self.end_message, UNICODE_ENCODING)?;
		}
		Ok(())
	}
}

/// A table row with its text in every language.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
	/// Lookup key, e.g. `LIST_NPC_001`
	pub key: String,
	/// Numeric id
	pub id: i32,
	texts: Vec<Text>,
}

impl Row {
	/// Text records, one per language.
	pub fn texts(&self) -> &[Text] {
		&self.texts
	}
}

/// A decoded string table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	kind: TableKind,
	language_count: usize,
	rows: Vec<Row>,
}

impl File {
	/// Creates an empty table with `language_count` languages.
	pub fn new(kind: TableKind, language_count: usize) -> Self {
		Self {
			kind,
			language_count,
			rows: Vec::new(),
		}
	}

	/// Table flavour.
	pub fn kind(&self) -> TableKind {
		self.kind
	}

	/// Number of languages every row carries.
	pub fn language_count(&self) -> usize {
		self.language_count
	}

	/// Number of rows.
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	/// All rows.
	pub fn rows(&self) -> &[Row] {
		&self.rows
	}

	/// Row at `row`.
	pub fn row(&self, row: usize) -> Result<&Row, RoseFileError> {
		self.rows.get(row).ok_or(RoseFileError::out_of_range("row", row, self.rows.len()))
	}

	/// Index of the row with `key`.
	pub fn find_row(&self, key: &str) -> Option<usize> {
		self.rows.iter().position(|r| r.key == key)
	}

	/// Text of `row` in `language`.
	pub fn text(&self, row: usize, language: usize) -> Result<&Text, RoseFileError> {
		self.row(row)?.texts.get(language).ok_or(RoseFileError::out_of_range("language", language, self.language_count))
	}

	/// Mutable text of `row` in `language`.
	pub fn text_mut(&mut self, row: usize, language: usize) -> Result<&mut Text, RoseFileError> {
		let row_count = self.rows.len();
		let language_count = self.language_count;
		self.rows
			.get_mut(row)
			.ok_or(RoseFileError::out_of_range("row", row, row_count))?
			.texts
			.get_mut(language)
			.ok_or(RoseFileError::out_of_range("language", language, language_count))
	}

	/// Appends a row with empty text in every language and returns its index.
	pub fn add_row(&mut self, key: impl Into<String>, id: i32) -> usize {
		self.rows.push(Row {
			key: key.into(),
			id,
			texts: vec![Text::default(); self.language_count],
		});
		self.rows.len() - 1
	}

	/// Removes and returns row `row`.
	pub fn remove_row(&mut self, row: usize) -> Result<Row, RoseFileError> {
		if row >= self.rows.len() {
			return Err(RoseFileError::out_of_range("row", row, self.rows.len()));
		}
		Ok(self.rows.remove(row))
	}
}

fn seek_to<R: Seek + ?Sized>(reader: &mut R, offset: i32) -> Result<(), RoseFileError> {
	let position =
		u64::try_from(offset).map_err(|_| RoseFileError::invalid_argument(format!("negative offset {offset}")))?;
	reader.seek(SeekFrom::Start(position))?;
	Ok(())
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Stl;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let identifier = reader.read_u8_length_string(LEGACY_ENCODING)?;
		let kind = TableKind::from_identifier(&identifier).ok_or_else(|| {
			RoseFileError::identifier_mismatch(FileType::Stl, TableKind::Normal.identifier(), identifier.clone())
		})?;

		let row_count = reader.read_count_i32()?;
		let mut rows = Vec::with_capacity(row_count.min(1 << 16));
		for _ in 0..row_count {
			rows.push(Row {
				key: reader.read_var_length_string(UNICODE_ENCODING)?,
				id: reader.read_i32::<LittleEndian>()?,
				texts: Vec::new(),
			});
		}

		let language_count = reader.read_count_i32()?;
		ensure_remaining(reader, language_count, 4, "language count")?;
		let mut language_offsets = vec![0i32; language_count];
		reader.read_i32_into::<LittleEndian>(&mut language_offsets)?;

		for offset in language_offsets {
			seek_to(reader, offset)?;
			ensure_remaining(reader, row_count, 4, "row count")?;
			let mut row_offsets = vec![0i32; row_count];
			reader.read_i32_into::<LittleEndian>(&mut row_offsets)?;

			for (row, offset) in rows.iter_mut().zip(row_offsets) {
				seek_to(reader, offset)?;
				row.texts.push(Text::read(reader, kind)?);
			}
		}

		debug!("STL {}: {} rows, {} languages", identifier, rows.len(), language_count);
		Ok(Self {
			kind,
			language_count,
			rows,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u8_length_string(self.kind.identifier(), LEGACY_ENCODING)?;
		writer.write_count_i32(self.rows.len(), "row count")?;
		for row in &self.rows {
			if row.texts.len() != self.language_count {
				return Err(RoseFileError::CountMismatch {
					file_type: FileType::Stl,
					what: "row languages",
					expected: self.language_count,
					actual: row.texts.len(),
				});
			}
			writer.write_var_length_string(&row.key, UNICODE_ENCODING)?;
			writer.write_i32::<LittleEndian>(row.id)?;
		}

		writer.write_count_i32(self.language_count, "language count")?;
		let language_slots =
			(0..self.language_count).map(|_| Placeholder::reserve_u32(writer)).collect::<Result<Vec<_>, _>>()?;

		for (language, language_slot) in language_slots.into_iter().enumerate() {
			let offset = position_i32(writer)?;
			language_slot.patch_i32(writer, offset)?;
			let row_slots = self.rows.iter().map(|_| Placeholder::reserve_u32(writer)).collect::<Result<Vec<_>, _>>()?;

			for (row, row_slot) in self.rows.iter().zip(row_slots) {
				let offset = position_i32(writer)?;
				row_slot.patch_i32(writer, offset)?;
				row.texts[language].write(writer, self.kind)?;
			}
		}
		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"STL File ({}): {} rows, {} languages",
			self.kind.identifier(),
			self.rows.len(),
			self.language_count
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn read_i32_at(bytes: &[u8], offset: usize) -> i32 {
		i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
	}

	fn quest_table() -> File {
		let mut table = File::new(TableKind::Quest, 2);
		let row = table.add_row("QUEST_001", 1);
		*table.text_mut(row, 0).unwrap() = Text {
			text: "\u{CC98}\u{C74C}".to_string(),
			description: "desc".to_string(),
			start_message: "start".to_string(),
			end_message: "end".to_string(),
		};
		table.text_mut(row, 1).unwrap().text = "First steps".to_string();
		table.add_row("QUEST_002", 2);
		table
	}

	#[test]
	fn test_round_trip() {
		let table = quest_table();
		let loaded = File::from_bytes(&table.to_bytes().unwrap()).unwrap();
		assert_eq!(loaded, table);
		assert_eq!(loaded.kind(), TableKind::Quest);
		assert_eq!(loaded.text(0, 1).unwrap().text, "First steps");
		assert_eq!(loaded.find_row("QUEST_002"), Some(1));
	}

	#[test]
	fn test_offsets_are_patched() {
		let bytes = quest_table().to_bytes().unwrap();
		assert_eq!(&bytes[..7], b"\x06QEST01");

		// identifier 7, row count 4, rows 2 × (1 + 9 + 4), language count 4
		let language_table = 7 + 4 + 28 + 4;
		assert_eq!(read_i32_at(&bytes, language_table - 4), 2);
		let first_language = read_i32_at(&bytes, language_table) as usize;
		assert_eq!(first_language, language_table + 8);

		let first_text = read_i32_at(&bytes, first_language) as usize;
		assert_eq!(first_text, first_language + 8);
		// UTF-8 text, two three-byte characters
		assert_eq!(bytes[first_text], 6);
	}

	#[test]
	fn test_normal_table_skips_extra_fields() {
		let mut table = File::new(TableKind::Normal, 1);
		let row = table.add_row("NPC_1", 100);
		*table.text_mut(row, 0).unwrap() = Text {
			text: "Judy".to_string(),
			description: "ignored".to_string(),
			..Text::default()
		};

		let loaded = File::from_bytes(&table.to_bytes().unwrap()).unwrap();
		assert_eq!(loaded.text(0, 0).unwrap(), &Text::new("Judy"));
	}

	#[test]
	fn test_unknown_identifier() {
		let mut bytes = File::new(TableKind::Item, 1).to_bytes().unwrap();
		bytes[1] = b'X';
		assert!(matches!(File::from_bytes(&bytes), Err(RoseFileError::IdentifierMismatch { .. })));
	}

	#[test]
	fn test_text_index_checks() {
		let table = quest_table();
		assert!(matches!(table.text(0, 2), Err(RoseFileError::ArgumentOutOfRange { .. })));
		assert!(matches!(table.text(5, 0), Err(RoseFileError::ArgumentOutOfRange { .. })));
	}

	#[test]
	fn test_huge_counts_are_rejected() {
		let bytes = quest_table().to_bytes().unwrap();
		let language_count = 7 + 4 + 28;

		let mut corrupt = bytes.clone();
		corrupt[language_count..language_count + 4].copy_from_slice(&i32::MAX.to_le_bytes());
		assert!(matches!(File::from_bytes(&corrupt), Err(RoseFileError::ArgumentInvalid { .. })));

		let mut corrupt = bytes;
		corrupt[7..11].copy_from_slice(&i32::MAX.to_le_bytes());
		assert!(File::from_bytes(&corrupt).is_err());
	}
}
