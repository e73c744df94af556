//! File format support for the `rose-rs` project.
//!
//! One module per format. Every format type implements [`RoseFile`]; wrap one in
//! a [`Container`] to keep track of the path it was loaded from.

mod error;

pub mod container;
pub mod registry;

pub mod chr;
pub mod con;
pub mod him;
pub mod hlp;
pub mod idx;
pub mod lit;
pub mod lod;
pub mod mov;
pub mod ptl;
pub mod stl;
pub mod tbl;
pub mod til;
pub mod tsi;
pub mod zca;
pub mod zmd;
pub mod zmo;

// Re-export unified error type
pub use error::{FileType, RoseFileError};

pub use container::{Container, RoseFile};
pub use registry::{Registry, TaggedRecord};

// Re-export main file types
pub use chr::{Character, CharacterEffect, CharacterMotion, File as ChrFile};
pub use con::{File as ConFile, Function as ConFunction, Menu as ConMenu, Message as ConMessage};
pub use him::{File as HimFile, Patch as HeightmapPatch};
pub use hlp::{File as HlpFile, Node as HelpNode, Page as HelpPage};
pub use idx::{File as IdxFile, FileEntry as VfsFileEntry, FileSystem as VfsFileSystem};
pub use lit::{File as LitFile, Object as LightmapObject, Part as LightmapPart};
pub use lod::{File as LodFile, Level as LodLevel};
pub use mov::File as MovFile;
pub use ptl::{EventType, EventValue, File as PtlFile, ParticleEvent, Sequence as ParticleSequence};
pub use stl::{File as StlFile, Row as StlRow, TableKind, Text as StlText};
pub use tbl::File as TblFile;
pub use til::{File as TilFile, Tile};
pub use tsi::{File as TsiFile, Sprite, Texture as SpriteTexture};
pub use zca::{File as ZcaFile, ProjectionType};
pub use zmd::{Bone, File as ZmdFile};
pub use zmo::{ChannelType, File as ZmoFile, MotionChannel, Samples};
