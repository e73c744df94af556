//! `.TBL` integer table support.
//!
//! A jagged table of `i32` values addressed by row.
//!
//! ```text
//! i32 row count
//! row count × i32 absolute row offsets
//! per row: i32 value count, values × i32
//! ```
//!
//! Row offsets are written as zero and patched as each row is placed.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError};
use crate::io::{Placeholder, ReadExt, WriteExt, ensure_remaining, position_i32};

/// A decoded table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
	rows: Vec<Vec<i32>>,
}

impl File {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of rows.
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	/// All rows.
	pub fn rows(&self) -> &[Vec<i32>] {
		&self.rows
	}

	/// Values of row `row`.
	pub fn row(&self, row: usize) -> Result<&[i32], RoseFileError> {
		self.rows.get(row).map(Vec::as_slice).ok_or(RoseFileError::out_of_range("row", row, self.rows.len()))
	}

	/// Mutable values of row `row`.
	pub fn row_mut(&mut self, row: usize) -> Result<&mut Vec<i32>, RoseFileError> {
		let count = self.rows.len();
		self.rows.get_mut(row).ok_or(RoseFileError::out_of_range("row", row, count))
	}

	/// Value at `(row, column)`.
	pub fn value(&self, row: usize, column: usize) -> Result<i32, RoseFileError> {
		let values = self.row(row)?;
		values.get(column).copied().ok_or(RoseFileError::out_of_range("column", column, values.len()))
	}

	/// Sets the value at `(row, column)`.
	pub fn set_value(&mut self, row: usize, column: usize, value: i32) -> Result<(), RoseFileError> {
		let values = self.row_mut(row)?;
		let count = values.len();
		let slot = values.get_mut(column).ok_or(RoseFileError::out_of_range("column", column, count))?;
		*slot = value;
		Ok(())
	}

	/// Appends a row and returns its index.
	pub fn add_row(&mut self, values: Vec<i32>) -> usize {
		self.rows.push(values);
		self.rows.len() - 1
	}

	/// Removes and returns row `row`.
	pub fn remove_row(&mut self, row: usize) -> Result<Vec<i32>, RoseFileError> {
		if row >= self.rows.len() {
			return Err(RoseFileError::out_of_range("row", row, self.rows.len()));
		}
		Ok(self.rows.remove(row))
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Tbl;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		let row_count = reader.read_count_i32()?;
		ensure_remaining(reader, row_count, 4, "row count")?;
		let mut offsets = vec![0i32; row_count];
		reader.read_i32_into::<LittleEndian>(&mut offsets)?;

		let mut rows = Vec::with_capacity(row_count);
		for offset in offsets {
			let position = u64::try_from(offset)
				.map_err(|_| RoseFileError::invalid_argument(format!("negative row offset {offset}")))?;
			reader.seek(SeekFrom::Start(position))?;
			let count = reader.read_count_i32()?;
			ensure_remaining(reader, count, 4, "value count")?;
			let mut values = vec![0i32; count];
			reader.read_i32_into::<LittleEndian>(&mut values)?;
			rows.push(values);
		}

		debug!("TBL: {} rows", rows.len());
		Ok(Self {
			rows,
		})
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.rows.len(), "row count")?;
		let slots = self.rows.iter().map(|_| Placeholder::reserve_u32(writer)).collect::<Result<Vec<_>, _>>()?;

		for (values, slot) in self.rows.iter().zip(slots) {
			let offset = position_i32(writer)?;
			slot.patch_i32(writer, offset)?;
			writer.write_count_i32(values.len(), "value count")?;
			for &value in values {
				writer.write_i32::<LittleEndian>(value)?;
			}
		}
		Ok(())
	}
}
