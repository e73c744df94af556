//! `.MOV` movement grid support.
//!
//! A map block's walkability grid: `i32 width`, `i32 height`, then one byte per
//! cell, row major. Zero is walkable, anything else blocks movement.

use std::io::{Read, Seek, Write};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{ReadExt, WriteExt, ensure_remaining};

/// A decoded movement grid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	width: usize,
	height: usize,
	cells: Vec<u8>,
}

impl File {
	/// Creates a fully walkable grid.
	pub fn new(width: usize, height: usize) -> Self {
		Self {
			width,
			height,
			cells: vec![0; width * height],
		}
	}

	/// Cells per row.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Number of rows.
	pub fn height(&self) -> usize {
		self.height
	}

	/// Raw cell values, row major.
	pub fn cells(&self) -> &[u8] {
		&self.cells
	}

	fn index(&self, x: usize, y: usize) -> Result<usize, RoseFileError> {
		if x >= self.width {
			return Err(RoseFileError::out_of_range("column", x, self.width));
		}
		if y >= self.height {
			return Err(RoseFileError::out_of_range("row", y, self.height));
		}
		Ok(y * self.width + x)
	}

	/// Raw value of a cell.
	pub fn cell(&self, x: usize, y: usize) -> Result<u8, RoseFileError> {
		Ok(self.cells[self.index(x, y)?])
	}

	/// Sets the raw value of a cell.
	pub fn set_cell(&mut self, x: usize, y: usize, value: u8) -> Result<(), RoseFileError> {
		let index = self.index(x, y)?;
		self.cells[index] = value;
		Ok(())
	}

	/// `true` if the cell blocks movement.
	pub fn is_blocked(&self, x: usize, y: usize) -> Result<bool, RoseFileError> {
		Ok(self.cell(x, y)? != 0)
	}

	/// Marks a cell blocked or walkable.
	pub fn set_blocked(&mut self, x: usize, y: usize, blocked: bool) -> Result<(), RoseFileError> {
		self.set_cell(x, y, u8::from(blocked))
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Mov;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let width = reader.read_count_i32()?;
		let height = reader.read_count_i32()?;
		let count = width
			.checked_mul(height)
			.ok_or_else(|| RoseFileError::invalid_argument(format!("movement grid {width}x{height} is too large")))?;
		ensure_remaining(reader, count, 1, "cell count")?;
		let cells = reader.read_bytes(count)?;

		debug!("MOV: {}x{} cells, {} blocked", width, height, cells.iter().filter(|&&c| c != 0).count());
		Ok(Self {
			width,
			height,
			cells,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.width, "width")?;
		writer.write_count_i32(self.height, "height")?;
		writer.write_all(&self.cells)?;
		Ok(())
	}
}
