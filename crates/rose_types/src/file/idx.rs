//! `.IDX` virtual file system index support.
//!
//! The index lists every file packed into the client's data archives (`.VFS`),
//! grouped by archive.
//!
//! # File Format
//!
//! ```text
//! i32 base version
//! i32 current version
//! i32 system count
//! system count × (u16-length archive name, i32 absolute offset of its block)
//!
//! block:
//!   i32 file count
//!   i32 deleted count
//!   i32 first data offset (offset of the first entry, 0 when empty)
//!   file count × entry
//!
//! entry:
//!   u16-length path, i32 offset, i32 size, i32 block size,
//!   u8 deleted, u8 compressed, u8 encrypted, i32 version, i32 checksum
//! ```
//!
//! Block offsets are written as zero and patched once each block is placed.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, Placeholder, ReadExt, WriteExt, checked_count, position_i32};

/// Canonical form used when comparing archive paths.
///
/// Comparison ignores ASCII case and treats `/` and `\` as the same separator.
pub fn normalize_path(path: &str) -> String {
	path.trim().replace('/', "\\").to_ascii_lowercase()
}

/// One file stored inside an archive.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
	/// Path inside the archive, `\` separated
	pub path: String,
	/// Byte offset of the data inside the archive
	pub offset: i32,
	/// Data size in bytes
	pub size: i32,
	/// Allocated size in bytes
	pub block_size: i32,
	/// Entry is deleted and its space reusable
	pub is_deleted: bool,
	/// Data is compressed
	pub is_compressed: bool,
	/// Data is encrypted
	pub is_encrypted: bool,
	/// Patch version that last wrote the entry
	pub version: i32,
	/// Client checksum of the data
	pub checksum: i32,
}

impl FileEntry {
	fn read<R: Read>(reader: &mut R) -> Result<Self, RoseFileError> {
		Ok(Self {
			path: reader.read_u16_length_string(LEGACY_ENCODING)?,
			offset: reader.read_i32::<LittleEndian>()?,
			size: reader.read_i32::<LittleEndian>()?,
			block_size: reader.read_i32::<LittleEndian>()?,
			is_deleted: reader.read_bool()?,
			is_compressed: reader.read_bool()?,
			is_encrypted: reader.read_bool()?,
			version: reader.read_i32::<LittleEndian>()?,
			checksum: reader.read_i32::<LittleEndian>()?,
		})
	}

	fn write<W: Write>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u16_length_string(&self.path, LEGACY_ENCODING)?;
		writer.write_i32::<LittleEndian>(self.offset)?;
		writer.write_i32::<LittleEndian>(self.size)?;
		writer.write_i32::<LittleEndian>(self.block_size)?;
		writer.write_bool(self.is_deleted)?;
		writer.write_bool(self.is_compressed)?;
		writer.write_bool(self.is_encrypted)?;
		writer.write_i32::<LittleEndian>(self.version)?;
		writer.write_i32::<LittleEndian>(self.checksum)?;
		Ok(())
	}
}

/// Block header values as read, next to what the entries produced at that time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoredHeader {
	deleted_count: i32,
	first_offset: i32,
	derived: (i32, i32),
}

/// An archive and the files it holds.
///
/// The deleted count and first data offset in the block header follow from
/// the entries. Values read from disk are written back unchanged as long as
/// the entries still produce the same numbers as when they were read.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FileSystem {
	/// Archive file name, e.g. `DATA.VFS`
	pub filename: String,
	/// Entries in stored order
	pub files: Vec<FileEntry>,
	#[serde(skip)]
	stored: Option<StoredHeader>,
}

impl PartialEq for FileSystem {
	fn eq(&self, other: &Self) -> bool {
		self.filename == other.filename && self.files == other.files
	}
}

impl Eq for FileSystem {}

impl FileSystem {
	/// Creates an empty archive record.
	pub fn new(filename: impl Into<String>) -> Self {
		Self {
			filename: filename.into(),
			files: Vec::new(),
			stored: None,
		}
	}

	/// Number of entries flagged deleted.
	pub fn deleted_count(&self) -> usize {
		self.files.iter().filter(|f| f.is_deleted).count()
	}

	/// Offset of the first entry's data, or 0 for an empty archive.
	pub fn first_offset(&self) -> i32 {
		self.files.first().map_or(0, |f| f.offset)
	}

	fn derived_header(&self) -> Result<(i32, i32), RoseFileError> {
		Ok((checked_count(self.deleted_count(), "deleted count")?, self.first_offset()))
	}

	/// `(deleted count, first data offset)` to write in the block header.
	fn header_values(&self) -> Result<(i32, i32), RoseFileError> {
		let derived = self.derived_header()?;
		Ok(match self.stored {
			Some(stored) if stored.derived == derived => (stored.deleted_count, stored.first_offset),
			_ => derived,
		})
	}

	/// Finds an entry by path.
	pub fn find_file(&self, path: &str) -> Option<&FileEntry> {
		let wanted = normalize_path(path);
		self.files.iter().find(|f| normalize_path(&f.path) == wanted)
	}
}

/// A decoded index file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	/// Version of the base installation
	pub base_version: i32,
	/// Version after the last applied patch
	pub current_version: i32,
	/// Archives in stored order
	pub file_systems: Vec<FileSystem>,
}

impl File {
	/// Creates an empty index.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finds an archive by file name.
	pub fn find_system(&self, filename: &str) -> Option<&FileSystem> {
		let wanted = normalize_path(filename);
		self.file_systems.iter().find(|s| normalize_path(&s.filename) == wanted)
	}

	/// Finds an entry by path in any archive.
	pub fn find_file(&self, path: &str) -> Option<(&FileSystem, &FileEntry)> {
		self.file_systems.iter().find_map(|system| system.find_file(path).map(|entry| (system, entry)))
	}

	/// Total number of entries across all archives.
	pub fn file_count(&self) -> usize {
		self.file_systems.iter().map(|s| s.files.len()).sum()
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Idx;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let base_version = reader.read_i32::<LittleEndian>()?;
		let current_version = reader.read_i32::<LittleEndian>()?;
		let system_count = reader.read_count_i32()?;

		let mut headers = Vec::with_capacity(system_count.min(1024));
		for _ in 0..system_count {
			let filename = reader.read_u16_length_string(LEGACY_ENCODING)?;
			let offset = reader.read_i32::<LittleEndian>()?;
			headers.push((filename, offset));
		}

		let mut file_systems = Vec::with_capacity(headers.len());
		for (filename, offset) in headers {
			let position = u64::try_from(offset)
				.map_err(|_| RoseFileError::invalid_argument(format!("negative block offset {offset}")))?;
			reader.seek(SeekFrom::Start(position))?;

			let file_count = reader.read_count_i32()?;
			let deleted_count = reader.read_i32::<LittleEndian>()?;
			let first_offset = reader.read_i32::<LittleEndian>()?;

			let mut files = Vec::with_capacity(file_count.min(65536));
			for _ in 0..file_count {
				files.push(FileEntry::read(reader)?);
			}

			let mut system = FileSystem::new(filename);
			system.files = files;
			let derived = system.derived_header()?;
			if deleted_count != derived.0 {
				warn!(
					"IDX system '{}' declares {} deleted entries, found {}",
					system.filename, deleted_count, derived.0
				);
			}
			if first_offset != derived.1 {
				debug!(
					"IDX system '{}' stores first offset {}, entries start at {}",
					system.filename, first_offset, derived.1
				);
			}
			system.stored = Some(StoredHeader {
				deleted_count,
				first_offset,
				derived,
			});
			debug!("IDX system '{}' at 0x{:X}: {} files", system.filename, offset, system.files.len());
			file_systems.push(system);
		}

		Ok(Self {
			base_version,
			current_version,
			file_systems,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_i32::<LittleEndian>(self.base_version)?;
		writer.write_i32::<LittleEndian>(self.current_version)?;
		writer.write_count_i32(self.file_systems.len(), "system count")?;

		let mut slots = Vec::with_capacity(self.file_systems.len());
		for system in &self.file_systems {
			writer.write_u16_length_string(&system.filename, LEGACY_ENCODING)?;
			slots.push(Placeholder::reserve_u32(writer)?);
		}

		for (system, slot) in self.file_systems.iter().zip(slots) {
			let offset = position_i32(writer)?;
			slot.patch_i32(writer, offset)?;

			let (deleted_count, first_offset) = system.header_values()?;
			writer.write_count_i32(system.files.len(), "file count")?;
			writer.write_i32::<LittleEndian>(deleted_count)?;
			writer.write_i32::<LittleEndian>(first_offset)?;
			for entry in &system.files {
				entry.write(writer)?;
			}
		}

		debug!("IDX: wrote {} systems, {} files", self.file_systems.len(), self.file_count());
		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"IDX File: version {}/{}, {} systems, {} files",
			self.base_version,
			self.current_version,
			self.file_systems.len(),
			self.file_count()
		)
	}
}
