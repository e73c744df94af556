//! Prelude module for `rose_types`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```no_run
//! use rose_types::prelude::*;
//!
//! let motion = ZmoFile::open("3DDATA/MOTION/NPC/WALK.ZMO").unwrap();
//! println!("{motion}");
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Characters
	ChrFile,

	// Conversations
	ConFile,
	ConMenu,
	ConMessage,

	// Lifecycle
	Container,
	FileType,

	// Map blocks
	HeightmapPatch,
	HimFile,
	HlpFile,

	// Virtual file system index
	IdxFile,

	LitFile,
	LodFile,
	MovFile,

	// Particles
	PtlFile,

	Registry,
	RoseFile,
	RoseFileError,

	// Tables
	StlFile,
	TableKind,
	TaggedRecord,
	TblFile,
	TilFile,
	TsiFile,
	VfsFileEntry,
	VfsFileSystem,
	ZcaFile,

	// Skeletons and motions
	ChannelType,
	ZmdFile,
	ZmoFile,
};

#[doc(inline)]
pub use crate::{
	math::{Color4, Mat4, Quat, Vec2, Vec3, Vec4},
	min_max::MinMax,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
