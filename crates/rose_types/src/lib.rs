//! Core data types and file format support for the `rose-rs` project.
//!
//! # File Formats
//!
//! - **ZMO**: Motion channels (position, rotation, scale, ...) sampled per frame
//! - **ZMD**: Skeletons with bones and dummy attachment points
//! - **CON**: NPC conversations with scrambled menus and a compiled script
//! - **IDX**: Index of the files packed into the `.VFS` archives
//! - **HIM / TIL / MOV / LIT**: Map block heights, tiles, walkability and lightmaps
//! - **TSI**: UI sprite sheets
//! - **STL / TBL**: Localised string tables and integer tables
//! - **PTL**: Particle systems
//! - **CHR**: Character list binding ids to skeletons, motions and effects
//! - **LOD / HLP / ZCA**: Detail levels, help pages and cameras
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use rose_types::prelude::*;
//!
//! # fn main() -> Result<(), RoseFileError> {
//! let mut skeleton = Container::<ZmdFile>::new();
//! skeleton.load("3DDATA/NPC/MALE.ZMD")?;
//! println!("{} bones", skeleton.bones.len());
//! # Ok(())
//! # }
//! ```
//!
//! Or work on buffers directly:
//!
//! ```
//! use rose_types::file::{MovFile, RoseFile};
//!
//! let mut grid = MovFile::new(16, 16);
//! grid.set_blocked(3, 4, true).unwrap();
//! let loaded = MovFile::from_bytes(&grid.to_bytes().unwrap()).unwrap();
//! assert!(loaded.is_blocked(3, 4).unwrap());
//! ```

pub mod file;

/// Primitive readers and writers shared by the formats.
pub mod io;

/// Vector, quaternion, matrix and colour storage types.
pub mod math;

/// Randomly sampled `(minimum, maximum)` ranges.
pub mod min_max;

/// `use rose_types::prelude::*;` to import commonly used items.
pub mod prelude;
