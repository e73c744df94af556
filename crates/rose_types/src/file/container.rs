//! Load/save lifecycle shared by every file format.
//!
//! Each format implements [`RoseFile`], which only knows how to read itself from
//! and write itself to a seekable stream. [`Container`] adds the path binding:
//!
//! ```text
//! Unloaded --load(path)/save_as(path)--> Loaded --save()--> Loaded
//!     ^                                     |
//!     +---------------reset()---------------+
//! ```
//!
//! Streams opened by the container are closed before the call returns, on
//! success and on error. Streams handed in by the caller stay open.

use std::{
	fs::OpenOptions,
	io::{BufReader, BufWriter, Cursor, ErrorKind, Read, Seek, Write},
	ops::{Deref, DerefMut},
	path::{Path, PathBuf},
};

use log::debug;

use super::{FileType, RoseFileError};

/// A file format that can be decoded from and encoded to a stream.
pub trait RoseFile: Default + Sized {
	/// Format identifier used in errors and logs.
	const FILE_TYPE: FileType;

	/// Decodes the file from `reader`, starting at its current position.
	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError>;

	/// Encodes the file into `writer`.
	///
	/// Offsets stored by the format are absolute, so `writer` is expected to be
	/// positioned at the start of the stream.
	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError>;

	/// Decodes the file from a byte slice.
	fn from_bytes(data: &[u8]) -> Result<Self, RoseFileError> {
		Self::read_from(&mut Cursor::new(data))
	}

	/// Encodes the file into a new byte vector.
	fn to_bytes(&self) -> Result<Vec<u8>, RoseFileError> {
		let mut cursor = Cursor::new(Vec::new());
		self.write_to(&mut cursor)?;
		Ok(cursor.into_inner())
	}

	/// Opens and decodes a file from disk.
	fn open(path: impl AsRef<Path>) -> Result<Self, RoseFileError> {
		let mut container = Container::<Self>::new();
		container.load(path)?;
		Ok(container.into_inner())
	}

	/// Encodes the file to disk, replacing any existing file.
	fn save(&self, path: impl AsRef<Path>) -> Result<(), RoseFileError> {
		write_path(self, path.as_ref())
	}
}

fn write_path<F: RoseFile>(file: &F, path: &Path) -> Result<(), RoseFileError> {
	if let Ok(metadata) = std::fs::metadata(path)
		&& metadata.permissions().readonly()
	{
		return Err(RoseFileError::FileReadOnly {
			path: path.to_path_buf(),
		});
	}

	let handle = OpenOptions::new().write(true).create(true).truncate(true).open(path).map_err(|source| {
		RoseFileError::FileInUse {
			path: path.to_path_buf(),
			source,
		}
	})?;

	let mut writer = BufWriter::new(handle);
	file.write_to(&mut writer)?;
	writer.flush()?;
	debug!("saved {} file to '{}'", F::FILE_TYPE, path.display());
	Ok(())
}

/// Owns a decoded file together with the path it was loaded from or saved to.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Container<F> {
	path: Option<PathBuf>,
	file: F,
}

impl<F: RoseFile> Container<F> {
	/// Creates an unloaded container holding an empty file.
	pub fn new() -> Self {
		Self {
			path: None,
			file: F::default(),
		}
	}

	/// Wraps an in-memory file that has no path yet.
	pub fn from_file(file: F) -> Self {
		Self {
			path: None,
			file,
		}
	}

	/// Path bound by the last successful `load` or `save_as`.
	pub fn file_path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// `true` once a path has been bound.
	pub fn is_loaded(&self) -> bool {
		self.path.is_some()
	}

	/// Discards the decoded data and the bound path.
	pub fn reset(&mut self) {
		self.path = None;
		self.file = F::default();
	}

	/// Loads `path`, replacing the current contents.
	///
	/// # Errors
	///
	/// - [`RoseFileError::FileNotFound`] if `path` does not exist
	/// - [`RoseFileError::FileInUse`] if it cannot be opened
	/// - any decoding error of the format, with the path attached to
	///   identifier mismatches
	///
	/// The path is bound only once decoding succeeds. After a failed load the
	/// container is reset, so `save()` cannot overwrite the file on disk.
	pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), RoseFileError> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(RoseFileError::FileNotFound {
				path: path.to_path_buf(),
			});
		}

		let handle = std::fs::File::open(path).map_err(|source| match source.kind() {
			ErrorKind::NotFound => RoseFileError::FileNotFound {
				path: path.to_path_buf(),
			},
			_ => RoseFileError::FileInUse {
				path: path.to_path_buf(),
				source,
			},
		})?;

		self.reset();
		let mut reader = BufReader::new(handle);
		self.file = F::read_from(&mut reader).map_err(|e| e.with_path(path))?;
		self.path = Some(path.to_path_buf());
		debug!("loaded {} file from '{}'", F::FILE_TYPE, path.display());
		Ok(())
	}

	/// Decodes from a caller-owned stream. The bound path is left untouched.
	pub fn load_from<R: Read + Seek>(&mut self, reader: &mut R) -> Result<(), RoseFileError> {
		self.file = F::read_from(reader)?;
		Ok(())
	}

	/// Saves to the bound path.
	///
	/// # Errors
	///
	/// [`RoseFileError::FileNotLoaded`] if no path has been bound yet.
	pub fn save(&mut self) -> Result<(), RoseFileError> {
		let path = self.path.clone().ok_or(RoseFileError::FileNotLoaded)?;
		write_path(&self.file, &path)
	}

	/// Saves to `path` and binds it.
	///
	/// # Errors
	///
	/// - [`RoseFileError::FileReadOnly`] if `path` exists and is read-only
	/// - [`RoseFileError::FileInUse`] if it cannot be opened for writing
	pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), RoseFileError> {
		let path = path.as_ref();
		write_path(&self.file, path)?;
		self.path = Some(path.to_path_buf());
		Ok(())
	}

	/// Encodes into a caller-owned stream.
	pub fn save_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		self.file.write_to(writer)
	}

	/// Borrows the decoded file.
	pub fn file(&self) -> &F {
		&self.file
	}

	/// Mutably borrows the decoded file.
	pub fn file_mut(&mut self) -> &mut F {
		&mut self.file
	}

	/// Returns the decoded file, dropping the path.
	pub fn into_inner(self) -> F {
		self.file
	}
}

impl<F> Deref for Container<F> {
	type Target = F;

	fn deref(&self) -> &Self::Target {
		&self.file
	}
}

impl<F> DerefMut for Container<F> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.file
	}
}
