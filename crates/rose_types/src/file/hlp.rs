//! `.HLP` help file support.
//!
//! An in-game help browser: a topic tree followed by the pages it links to.
//!
//! ```text
//! node:  u8-length name, i32 child count, children (nodes, depth first)
//! i32 page count
//! page count × (u8-length title, u16-length content)
//! ```
//!
//! The file starts with the root node.

use std::io::{Read, Seek, Write};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt};

/// HLP constants.
pub mod constants {
	/// Deepest topic nesting accepted when reading
	pub const MAX_DEPTH: usize = 64;
}

/// A topic in the help tree.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	/// Topic name
	pub name: String,
	/// Sub-topics
	pub children: Vec<Node>,
}

impl Node {
	/// Creates a leaf topic.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			children: Vec::new(),
		}
	}

	/// Number of nodes in this subtree, including itself.
	pub fn node_count(&self) -> usize {
		1 + self.children.iter().map(Node::node_count).sum::<usize>()
	}

	fn read<R: Read + ?Sized>(reader: &mut R, depth: usize) -> Result<Self, RoseFileError> {
		if depth > constants::MAX_DEPTH {
			return Err(RoseFileError::invalid_argument(format!(
				"help topics nested deeper than {}",
				constants::MAX_DEPTH
			)));
		}

		let name = reader.read_u8_length_string(LEGACY_ENCODING)?;
		let child_count = reader.read_count_i32()?;
		let mut children = Vec::with_capacity(child_count.min(256));
		for _ in 0..child_count {
			children.push(Node::read(reader, depth + 1)?);
		}
		Ok(Self {
			name,
			children,
		})
	}

	fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u8_length_string(&self.name, LEGACY_ENCODING)?;
		writer.write_count_i32(self.children.len(), "child count")?;
		for child in &self.children {
			child.write(writer)?;
		}
		Ok(())
	}
}

/// A help page.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
	/// Page title
	pub title: String,
	/// Page body
	pub content: String,
}

/// A decoded help file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	/// Root of the topic tree
	pub root: Node,
	/// Pages
	pub pages: Vec<Page>,
}

impl File {
	/// Creates a help file with an unnamed root.
	pub fn new() -> Self {
		Self::default()
	}

	/// Finds a page by title.
	pub fn find_page(&self, title: &str) -> Option<&Page> {
		self.pages.iter().find(|p| p.title == title)
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Hlp;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let root = Node::read(reader, 0)?;

		let page_count = reader.read_count_i32()?;
		let mut pages = Vec::with_capacity(page_count.min(1024));
		for _ in 0..page_count {
			pages.push(Page {
				title: reader.read_u8_length_string(LEGACY_ENCODING)?,
				content: reader.read_u16_length_string(LEGACY_ENCODING)?,
			});
		}

		debug!("HLP: {} topics, {} pages", root.node_count(), pages.len());
		Ok(Self {
			root,
			pages,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		self.root.write(writer)?;
		writer.write_count_i32(self.pages.len(), "page count")?;
		for page in &self.pages {
			writer.write_u8_length_string(&page.title, LEGACY_ENCODING)?;
			writer.write_u16_length_string(&page.content, LEGACY_ENCODING)?;
		}
		Ok(())
	}
}
