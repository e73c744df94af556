//! Error types for file format parsing and manipulation.

use std::{
	fmt::{self, Display, Formatter},
	path::{Path, PathBuf},
};

use thiserror::Error;

/// Identifies the file format an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// `.ZMO` motion files
	Zmo,
	/// `.CON` conversation files
	Con,
	/// `.IDX` virtual file index
	Idx,
	/// `.HIM` heightmaps
	Him,
	/// `.TIL` tile maps
	Til,
	/// `.LIT` lightmap descriptions
	Lit,
	/// `.TSI` sprite sheets
	Tsi,
	/// `.ZMD` skeletons
	Zmd,
	/// `.TBL` index tables
	Tbl,
	/// `.LOD` level of detail descriptions
	Lod,
	/// `.MOV` movement grids
	Mov,
	/// `.HLP` help documents
	Hlp,
	/// `.ZCA` cameras
	Zca,
	/// `.STL` language tables
	Stl,
	/// `.PTL` particle systems
	Ptl,
	/// `.CHR` character lists
	Chr,
}

impl FileType {
	/// All supported file types.
	pub const ALL: [FileType; 16] = [
		Self::Zmo,
		Self::Con,
		Self::Idx,
		Self::Him,
		Self::Til,
		Self::Lit,
		Self::Tsi,
		Self::Zmd,
		Self::Tbl,
		Self::Lod,
		Self::Mov,
		Self::Hlp,
		Self::Zca,
		Self::Stl,
		Self::Ptl,
		Self::Chr,
	];

	/// Lowercase file extension used by the client for this format.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Zmo => "zmo",
			Self::Con => "con",
			Self::Idx => "idx",
			Self::Him => "him",
			Self::Til => "til",
			Self::Lit => "lit",
			Self::Tsi => "tsi",
			Self::Zmd => "zmd",
			Self::Tbl => "tbl",
			Self::Lod => "lod",
			Self::Mov => "mov",
			Self::Hlp => "hlp",
			Self::Zca => "zca",
			Self::Stl => "stl",
			Self::Ptl => "ptl",
			Self::Chr => "chr",
		}
	}

	/// Guesses the file type from a path's extension (case-insensitive).
	pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
		let extension = path.as_ref().extension()?.to_str()?;
		Self::ALL.into_iter().find(|ty| ty.extension().eq_ignore_ascii_case(extension))
	}
}

impl Display for FileType {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.extension().to_ascii_uppercase())
	}
}

fn path_suffix(path: &Option<PathBuf>) -> String {
	match path {
		Some(path) => format!(" in '{}'", path.display()),
		None => String::new(),
	}
}

/// Unified error type for every file format in this crate.
#[derive(Debug, Error)]
pub enum RoseFileError {
	/// The file to load does not exist
	#[error("File not found: '{}'", path.display())]
	FileNotFound {
		/// Requested path
		path: PathBuf,
	},

	/// The file could not be opened for exclusive access
	#[error("File in use: '{}'", path.display())]
	FileInUse {
		/// Requested path
		path: PathBuf,
		/// Underlying open failure
		#[source]
		source: std::io::Error,
	},

	/// The save target exists and is marked read-only
	#[error("File is read-only: '{}'", path.display())]
	FileReadOnly {
		/// Requested path
		path: PathBuf,
	},

	/// `save()` was called before any path was bound
	#[error("No file path bound, load or save to a path first")]
	FileNotLoaded,

	/// Magic/version token did not match the expected value
	#[error(
		"{file_type} identifier mismatch: expected '{expected}', got '{actual}'{}",
		path_suffix(.path)
	)]
	IdentifierMismatch {
		/// File type being parsed
		file_type: FileType,
		/// Identifier the format requires
		expected: String,
		/// Identifier found in the stream
		actual: String,
		/// Path of the file, when loaded from disk
		path: Option<PathBuf>,
	},

	/// A type tag on disk is not one of the known record kinds
	#[error("Invalid {kind} discriminant in {file_type}: {value}")]
	InvalidDiscriminant {
		/// File type being parsed
		file_type: FileType,
		/// Record family the tag selects (e.g. "motion channel")
		kind: &'static str,
		/// Raw tag value
		value: i64,
	},

	/// An index into a collection was out of range
	#[error("{name} {index} out of range (count: {count})")]
	ArgumentOutOfRange {
		/// Argument name
		name: &'static str,
		/// Requested index
		index: usize,
		/// Number of available items
		count: usize,
	},

	/// An argument violated a format constraint
	#[error("Invalid argument: {message}")]
	ArgumentInvalid {
		/// Description of the violation
		message: String,
	},

	/// A fixed count stored on disk disagrees with the format
	#[error("{file_type} {what} count mismatch: expected {expected}, got {actual}")]
	CountMismatch {
		/// File type being parsed
		file_type: FileType,
		/// What was being counted
		what: &'static str,
		/// Required count
		expected: usize,
		/// Count found in the stream
		actual: usize,
	},

	/// Text could not be encoded in the format's character set
	#[error("Bad encoding: {message}")]
	BadEncoding {
		/// Description of the failure
		message: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl RoseFileError {
	/// Creates an [`RoseFileError::IdentifierMismatch`] without a path.
	pub fn identifier_mismatch(
		file_type: FileType,
		expected: impl Into<String>,
		actual: impl Into<String>,
	) -> Self {
		Self::IdentifierMismatch {
			file_type,
			expected: expected.into(),
			actual: actual.into(),
			path: None,
		}
	}

	/// Creates an [`RoseFileError::InvalidDiscriminant`].
	pub fn invalid_discriminant(file_type: FileType, kind: &'static str, value: impl Into<i64>) -> Self {
		Self::InvalidDiscriminant {
			file_type,
			kind,
			value: value.into(),
		}
	}

	/// Creates an [`RoseFileError::ArgumentOutOfRange`].
	pub fn out_of_range(name: &'static str, index: usize, count: usize) -> Self {
		Self::ArgumentOutOfRange {
			name,
			index,
			count,
		}
	}

	/// Creates an [`RoseFileError::ArgumentInvalid`].
	pub fn invalid_argument(message: impl Into<String>) -> Self {
		Self::ArgumentInvalid {
			message: message.into(),
		}
	}

	/// Attaches `path` to identifier mismatches that were raised without one.
	pub fn with_path(self, path: impl AsRef<Path>) -> Self {
		match self {
			Self::IdentifierMismatch {
				file_type,
				expected,
				actual,
				path: None,
			} => Self::IdentifierMismatch {
				file_type,
				expected,
				actual,
				path: Some(path.as_ref().to_path_buf()),
			},
			other => other,
		}
	}
}
