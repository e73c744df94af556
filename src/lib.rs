#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `rose-rs` reads and writes the binary asset files of the ROSE Online client.
//!
//! Everything lives in [`rose_types`]; this crate re-exports it so applications
//! only need a single dependency.
//!
//! ```no_run
//! use rose_rs::prelude::*;
//!
//! let index = IdxFile::open("data.idx").unwrap();
//! if let Some((system, entry)) = index.find_file("3DDATA/STB/LIST_NPC.STB") {
//! 	println!("{} @ {}+{}", system.filename, entry.offset, entry.size);
//! }
//! ```
pub use rose_types::*;
