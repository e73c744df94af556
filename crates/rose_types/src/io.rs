//! Primitive codec utilities shared by every file format.
//!
//! All numbers are little-endian. Strings come in several flavours:
//!
//! | Form             | Layout                                          |
//! |------------------|-------------------------------------------------|
//! | null terminated  | bytes followed by a single `0x00`               |
//! | fixed width      | exactly `N` bytes, padded with `0x00`           |
//! | `u8` prefixed    | `u8` byte length, then bytes                    |
//! | `u16` prefixed   | `u16` byte length, then bytes                   |
//! | `u32` prefixed   | `u32` byte length, then bytes                   |
//! | variable prefixed| 7-bit groups, high bit continues, then bytes    |
//!
//! Text is stored in the legacy Korean code page ([`LEGACY_ENCODING`]) unless a
//! format says otherwise.
//!
//! Readers consume exactly the bytes a field occupies before decoding it, so a
//! decoding problem never leaves the stream in the middle of a field.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use encoding_rs::Encoding;
use log::{trace, warn};

use crate::{
	file::RoseFileError,
	math::{Color4, Mat4, Quat, Vec2, Vec3, Vec4},
};

/// Code page used by most formats (EUC-KR / CP949).
pub const LEGACY_ENCODING: &Encoding = encoding_rs::EUC_KR;

/// Unicode encoding used by the language tables.
pub const UNICODE_ENCODING: &Encoding = encoding_rs::UTF_8;

/// Component order of a quaternion on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuatOrder {
	/// `w` first, used by motion and skeleton files
	Wxyz,
	/// `w` last
	Xyzw,
}

/// Decodes `bytes` with `encoding`, replacing malformed sequences.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
	let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
	if had_errors {
		warn!("{} string contained malformed bytes: {:02X?}", encoding.name(), bytes);
	}
	text.into_owned()
}

/// Encodes `text` with `encoding`, failing on characters the code page lacks.
pub fn encode_text(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>, RoseFileError> {
	let (bytes, _, had_errors) = encoding.encode(text);
	if had_errors {
		return Err(RoseFileError::BadEncoding {
			message: format!("'{}' cannot be represented in {}", text, encoding.name()),
		});
	}
	Ok(bytes.into_owned())
}

/// Converts an in-memory length to the integer type a format stores it as.
pub fn checked_count<T: TryFrom<usize>>(value: usize, what: &str) -> Result<T, RoseFileError> {
	T::try_from(value).map_err(|_| RoseFileError::invalid_argument(format!("{what} {value} does not fit the format")))
}

/// Up-front capacity limit for buffers sized by a value read from disk.
const READ_CHUNK: usize = 1 << 16;

/// Fails unless `count` records of `element_size` bytes fit in what is left of the stream.
///
/// Readers call this before allocating for a count taken from the file.
pub fn ensure_remaining<R: Seek + ?Sized>(
	reader: &mut R,
	count: usize,
	element_size: usize,
	what: &str,
) -> Result<(), RoseFileError> {
	let position = reader.stream_position()?;
	let end = reader.seek(SeekFrom::End(0))?;
	reader.seek(SeekFrom::Start(position))?;
	let remaining = end.saturating_sub(position);
	let fits = count
		.checked_mul(element_size)
		.and_then(|needed| u64::try_from(needed).ok())
		.is_some_and(|needed| needed <= remaining);
	if !fits {
		return Err(RoseFileError::invalid_argument(format!(
			"{what} {count} x {element_size} bytes exceeds the {remaining} bytes left"
		)));
	}
	Ok(())
}

/// Current stream position as the `i32` offset most formats store.
pub fn position_i32<S: Seek + ?Sized>(stream: &mut S) -> Result<i32, RoseFileError> {
	let position = stream.stream_position()?;
	i32::try_from(position)
		.map_err(|_| RoseFileError::invalid_argument(format!("offset {position} exceeds the format limit")))
}

/// Number of padding bytes needed to move `position` to a multiple of `alignment`.
pub fn padding_for(position: u64, alignment: u64) -> u64 {
	if alignment <= 1 {
		return 0;
	}
	(alignment - position % alignment) % alignment
}

/// Skips forward to the next multiple of `alignment`.
pub fn align_reader<R: Seek + ?Sized>(reader: &mut R, alignment: u64) -> io::Result<u64> {
	let position = reader.stream_position()?;
	let padding = padding_for(position, alignment);
	reader.seek(SeekFrom::Current(padding as i64))
}

/// Writes `fill` bytes until the stream sits on a multiple of `alignment`.
pub fn align_writer<W: Write + Seek + ?Sized>(writer: &mut W, alignment: u64, fill: u8) -> io::Result<u64> {
	let position = writer.stream_position()?;
	let padding = padding_for(position, alignment);
	for _ in 0..padding {
		writer.write_u8(fill)?;
	}
	Ok(position + padding)
}

/// A reserved `u32` slot to be filled once the real value is known.
///
/// The slot is written as zero, then [`Placeholder::patch`] seeks back, writes the
/// value and restores the cursor to wherever writing had reached.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a reserved slot must be patched"]
pub struct Placeholder {
	position: u64,
}

impl Placeholder {
	/// Writes a zero `u32` and remembers where it went.
	pub fn reserve_u32<W: Write + Seek + ?Sized>(writer: &mut W) -> io::Result<Self> {
		let position = writer.stream_position()?;
		writer.write_u32::<LittleEndian>(0)?;
		Ok(Self {
			position,
		})
	}

	/// Absolute stream position of the slot.
	pub fn position(&self) -> u64 {
		self.position
	}

	/// Fills the slot with `value`.
	pub fn patch<W: Write + Seek + ?Sized>(self, writer: &mut W, value: u32) -> io::Result<()> {
		let resume = writer.stream_position()?;
		writer.seek(SeekFrom::Start(self.position))?;
		writer.write_u32::<LittleEndian>(value)?;
		writer.seek(SeekFrom::Start(resume))?;
		trace!("patched offset slot at 0x{:X} with 0x{:X}", self.position, value);
		Ok(())
	}

	/// Fills the slot with a signed value.
	pub fn patch_i32<W: Write + Seek + ?Sized>(self, writer: &mut W, value: i32) -> io::Result<()> {
		self.patch(writer, value as u32)
	}
}

/// Reading helpers on top of [`byteorder::ReadBytesExt`].
pub trait ReadExt: Read {
	/// Reads a one byte boolean, nonzero is `true`.
	fn read_bool(&mut self) -> io::Result<bool> {
		Ok(self.read_u8()? != 0)
	}

	/// Reads exactly `len` bytes.
	///
	/// The buffer grows with the data actually read, so a corrupt length fails
	/// with `UnexpectedEof` instead of allocating `len` bytes up front.
	fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
		let mut buffer = Vec::with_capacity(len.min(READ_CHUNK));
		let read = Read::take(&mut *self, len as u64).read_to_end(&mut buffer)?;
		if read != len {
			return Err(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				format!("expected {len} bytes, stream ended after {read}"),
			));
		}
		Ok(buffer)
	}

	/// Reads a non-negative `i32` count.
	fn read_count_i32(&mut self) -> Result<usize, RoseFileError> {
		let value = self.read_i32::<LittleEndian>()?;
		usize::try_from(value).map_err(|_| RoseFileError::invalid_argument(format!("negative count {value}")))
	}

	/// Reads a non-negative `i16` count.
	fn read_count_i16(&mut self) -> Result<usize, RoseFileError> {
		let value = self.read_i16::<LittleEndian>()?;
		usize::try_from(value).map_err(|_| RoseFileError::invalid_argument(format!("negative count {value}")))
	}

	/// Reads a string terminated by a null byte.
	fn read_null_terminated_string(&mut self, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let mut bytes = Vec::new();
		loop {
			match self.read_u8()? {
				0 => break,
				byte => bytes.push(byte),
			}
		}
		Ok(decode_text(&bytes, encoding))
	}

	/// Reads a `len` byte field and decodes it up to the first null byte.
	fn read_fixed_string(&mut self, len: usize, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let bytes = self.read_bytes(len)?;
		let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
		Ok(decode_text(&bytes[..end], encoding))
	}

	/// Reads a string prefixed by a `u8` length.
	fn read_u8_length_string(&mut self, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let len = self.read_u8()? as usize;
		Ok(decode_text(&self.read_bytes(len)?, encoding))
	}

	/// Reads a string prefixed by a `u16` length.
	fn read_u16_length_string(&mut self, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let len = self.read_u16::<LittleEndian>()? as usize;
		Ok(decode_text(&self.read_bytes(len)?, encoding))
	}

	/// Reads a string prefixed by a `u32` length.
	fn read_u32_length_string(&mut self, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let len = self.read_u32::<LittleEndian>()? as usize;
		Ok(decode_text(&self.read_bytes(len)?, encoding))
	}

	/// Reads a 7-bit encoded length (at most five bytes).
	fn read_var_length(&mut self) -> Result<u32, RoseFileError> {
		let mut value = 0u32;
		for shift in (0..35).step_by(7) {
			let byte = self.read_u8()?;
			value |= u32::from(byte & 0x7F) << shift;
			if byte & 0x80 == 0 {
				return Ok(value);
			}
		}
		Err(RoseFileError::invalid_argument("variable length prefix longer than 5 bytes"))
	}

	/// Reads a string prefixed by a 7-bit encoded length.
	fn read_var_length_string(&mut self, encoding: &'static Encoding) -> Result<String, RoseFileError> {
		let len = self.read_var_length()? as usize;
		Ok(decode_text(&self.read_bytes(len)?, encoding))
	}

	/// Reads `(x, y)`.
	fn read_vec2(&mut self) -> io::Result<Vec2> {
		Ok(Vec2::new(self.read_f32::<LittleEndian>()?, self.read_f32::<LittleEndian>()?))
	}

	/// Reads `(x, y, z)`.
	fn read_vec3(&mut self) -> io::Result<Vec3> {
		let x = self.read_f32::<LittleEndian>()?;
		let y = self.read_f32::<LittleEndian>()?;
		let z = self.read_f32::<LittleEndian>()?;
		Ok(Vec3::new(x, y, z))
	}

	/// Reads `(x, y, z, w)`.
	fn read_vec4(&mut self) -> io::Result<Vec4> {
		let x = self.read_f32::<LittleEndian>()?;
		let y = self.read_f32::<LittleEndian>()?;
		let z = self.read_f32::<LittleEndian>()?;
		let w = self.read_f32::<LittleEndian>()?;
		Ok(Vec4::new(x, y, z, w))
	}

	/// Reads a quaternion in the given component order.
	fn read_quat(&mut self, order: QuatOrder) -> io::Result<Quat> {
		let v = self.read_vec4()?;
		Ok(match order {
			QuatOrder::Wxyz => Quat::new(v.y, v.z, v.w, v.x),
			QuatOrder::Xyzw => Quat::new(v.x, v.y, v.z, v.w),
		})
	}

	/// Reads 16 floats.
	fn read_mat4(&mut self) -> io::Result<Mat4> {
		let mut values = [0.0f32; 16];
		self.read_f32_into::<LittleEndian>(&mut values)?;
		Ok(Mat4::from_array(values))
	}

	/// Reads `(r, g, b, a)`.
	fn read_color4(&mut self) -> io::Result<Color4> {
		let v = self.read_vec4()?;
		Ok(Color4::new(v.x, v.y, v.z, v.w))
	}
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Writing helpers on top of [`byteorder::WriteBytesExt`].
pub trait WriteExt: Write {
	/// Writes a one byte boolean.
	fn write_bool(&mut self, value: bool) -> io::Result<()> {
		self.write_u8(u8::from(value))
	}

	/// Writes a collection length as `i32`.
	fn write_count_i32(&mut self, count: usize, what: &str) -> Result<(), RoseFileError> {
		self.write_i32::<LittleEndian>(checked_count(count, what)?)?;
		Ok(())
	}

	/// Writes a collection length as `i16`.
	fn write_count_i16(&mut self, count: usize, what: &str) -> Result<(), RoseFileError> {
		self.write_i16::<LittleEndian>(checked_count(count, what)?)?;
		Ok(())
	}

	/// Writes `text` followed by a null byte.
	fn write_null_terminated_string(&mut self, text: &str, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let bytes = encode_text(text, encoding)?;
		if bytes.contains(&0) {
			return Err(RoseFileError::invalid_argument(format!("'{text}' contains a null byte")));
		}
		self.write_all(&bytes)?;
		self.write_u8(0)?;
		Ok(())
	}

	/// Writes `text` into a `len` byte null padded field.
	///
	/// Fails instead of truncating when the encoded text is longer than `len`.
	fn write_fixed_string(&mut self, text: &str, len: usize, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let mut bytes = encode_text(text, encoding)?;
		if bytes.len() > len {
			return Err(RoseFileError::invalid_argument(format!(
				"'{}' is {} bytes, field holds {}",
				text,
				bytes.len(),
				len
			)));
		}
		bytes.resize(len, 0);
		self.write_all(&bytes)?;
		Ok(())
	}

	/// Writes a `u8` length prefixed string.
	fn write_u8_length_string(&mut self, text: &str, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let bytes = encode_text(text, encoding)?;
		self.write_u8(checked_count(bytes.len(), "string length")?)?;
		self.write_all(&bytes)?;
		Ok(())
	}

	/// Writes a `u16` length prefixed string.
	fn write_u16_length_string(&mut self, text: &str, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let bytes = encode_text(text, encoding)?;
		self.write_u16::<LittleEndian>(checked_count(bytes.len(), "string length")?)?;
		self.write_all(&bytes)?;
		Ok(())
	}

	/// Writes a `u32` length prefixed string.
	fn write_u32_length_string(&mut self, text: &str, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let bytes = encode_text(text, encoding)?;
		self.write_u32::<LittleEndian>(checked_count(bytes.len(), "string length")?)?;
		self.write_all(&bytes)?;
		Ok(())
	}

	/// Writes a 7-bit encoded length.
	fn write_var_length(&mut self, mut value: u32) -> io::Result<()> {
		while value >= 0x80 {
			self.write_u8((value as u8 & 0x7F) | 0x80)?;
			value >>= 7;
		}
		self.write_u8(value as u8)
	}

	/// Writes a string prefixed by a 7-bit encoded length.
	fn write_var_length_string(&mut self, text: &str, encoding: &'static Encoding) -> Result<(), RoseFileError> {
		let bytes = encode_text(text, encoding)?;
		self.write_var_length(checked_count(bytes.len(), "string length")?)?;
		self.write_all(&bytes)?;
		Ok(())
	}

	/// Writes `(x, y)`.
	fn write_vec2(&mut self, value: Vec2) -> io::Result<()> {
		self.write_f32::<LittleEndian>(value.x)?;
		self.write_f32::<LittleEndian>(value.y)
	}

	/// Writes `(x, y, z)`.
	fn write_vec3(&mut self, value: Vec3) -> io::Result<()> {
		self.write_f32::<LittleEndian>(value.x)?;
		self.write_f32::<LittleEndian>(value.y)?;
		self.write_f32::<LittleEndian>(value.z)
	}

	/// Writes `(x, y, z, w)`.
	fn write_vec4(&mut self, value: Vec4) -> io::Result<()> {
		self.write_f32::<LittleEndian>(value.x)?;
		self.write_f32::<LittleEndian>(value.y)?;
		self.write_f32::<LittleEndian>(value.z)?;
		self.write_f32::<LittleEndian>(value.w)
	}

	/// Writes a quaternion in the given component order.
	fn write_quat(&mut self, value: Quat, order: QuatOrder) -> io::Result<()> {
		match order {
			QuatOrder::Wxyz => self.write_vec4(Vec4::new(value.w, value.x, value.y, value.z)),
			QuatOrder::Xyzw => self.write_vec4(Vec4::new(value.x, value.y, value.z, value.w)),
		}
	}

	/// Writes 16 floats.
	fn write_mat4(&mut self, value: &Mat4) -> io::Result<()> {
		for v in value.to_array() {
			self.write_f32::<LittleEndian>(v)?;
		}
		Ok(())
	}

	/// Writes `(r, g, b, a)`.
	fn write_color4(&mut self, value: Color4) -> io::Result<()> {
		self.write_vec4(Vec4::new(value.r, value.g, value.b, value.a))
	}
}

impl<W: Write + ?Sized> WriteExt for W {}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;

	#[test]
	fn test_null_terminated_string() {
		let mut buffer = Vec::new();
		buffer.write_null_terminated_string("ZMO0002", LEGACY_ENCODING).unwrap();
		assert_eq!(buffer, b"ZMO0002\0");

		let mut cursor = Cursor::new(buffer);
		assert_eq!(cursor.read_null_terminated_string(LEGACY_ENCODING).unwrap(), "ZMO0002");
		assert_eq!(cursor.position(), 8);
	}

	#[test]
	fn test_fixed_string_pads_and_rejects_overflow() {
		let mut buffer = Vec::new();
		buffer.write_fixed_string("abc", 8, LEGACY_ENCODING).unwrap();
		assert_eq!(buffer, b"abc\0\0\0\0\0");

		let err = buffer.write_fixed_string("123456789", 8, LEGACY_ENCODING).unwrap_err();
		assert!(matches!(err, RoseFileError::ArgumentInvalid { .. }));
		// nothing written on failure
		assert_eq!(buffer.len(), 8);

		let mut cursor = Cursor::new(buffer);
		assert_eq!(cursor.read_fixed_string(8, LEGACY_ENCODING).unwrap(), "abc");
		assert_eq!(cursor.position(), 8);
	}

	#[test]
	fn test_legacy_korean_text() {
		let mut buffer = Vec::new();
		buffer.write_u16_length_string("\u{D55C}\u{AE00}", LEGACY_ENCODING).unwrap();
		// two EUC-KR characters, two bytes each
		assert_eq!(&buffer[..2], &4u16.to_le_bytes());

		let mut cursor = Cursor::new(buffer);
		assert_eq!(cursor.read_u16_length_string(LEGACY_ENCODING).unwrap(), "\u{D55C}\u{AE00}");
	}

	#[test]
	fn test_unmappable_text_is_rejected() {
		let mut buffer = Vec::new();
		let err = buffer.write_u8_length_string("\u{1F600}", LEGACY_ENCODING).unwrap_err();
		assert!(matches!(err, RoseFileError::BadEncoding { .. }));
	}

	#[test]
	fn test_var_length() {
		for value in [0u32, 1, 0x7F, 0x80, 300, 0x3FFF, 0x4000, u32::MAX] {
			let mut buffer = Vec::new();
			buffer.write_var_length(value).unwrap();
			let mut cursor = Cursor::new(buffer);
			assert_eq!(cursor.read_var_length().unwrap(), value);
		}

		let mut buffer = Vec::new();
		buffer.write_var_length(300).unwrap();
		assert_eq!(buffer, [0xAC, 0x02]);
	}

	#[test]
	fn test_quaternion_order() {
		let q = Quat::new(1.0, 2.0, 3.0, 4.0);
		let mut buffer = Vec::new();
		buffer.write_quat(q, QuatOrder::Wxyz).unwrap();
		assert_eq!(&buffer[..4], &4.0f32.to_le_bytes());

		let mut cursor = Cursor::new(buffer);
		assert_eq!(cursor.read_quat(QuatOrder::Wxyz).unwrap(), q);
	}

	#[test]
	fn test_alignment() {
		assert_eq!(padding_for(0, 4), 0);
		assert_eq!(padding_for(5, 4), 3);
		assert_eq!(padding_for(8, 4), 0);
		assert_eq!(padding_for(7, 1), 0);

		let mut cursor = Cursor::new(Vec::new());
		cursor.write_all(&[1, 2, 3]).unwrap();
		assert_eq!(align_writer(&mut cursor, 4, 0xCC).unwrap(), 4);
		assert_eq!(cursor.get_ref(), &[1, 2, 3, 0xCC]);

		let mut reader = Cursor::new(vec![0u8; 16]);
		reader.set_position(9);
		assert_eq!(align_reader(&mut reader, 8).unwrap(), 16);
	}

	#[test]
	fn test_placeholder_patch_restores_position() {
		let mut cursor = Cursor::new(Vec::new());
		cursor.write_u32::<LittleEndian>(7).unwrap();
		let slot = Placeholder::reserve_u32(&mut cursor).unwrap();
		assert_eq!(slot.position(), 4);
		cursor.write_all(&[0xAA; 6]).unwrap();
		slot.patch(&mut cursor, 0x1234).unwrap();

		assert_eq!(cursor.position(), 14);
		assert_eq!(&cursor.get_ref()[4..8], &0x1234u32.to_le_bytes());
	}

	#[test]
	fn test_huge_length_string_fails_without_allocating() {
		let mut bytes = u32::MAX.to_le_bytes().to_vec();
		bytes.extend_from_slice(b"abc");
		let err = Cursor::new(bytes).read_u32_length_string(LEGACY_ENCODING).unwrap_err();
		match err {
			RoseFileError::IOError(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn test_ensure_remaining() {
		let mut cursor = Cursor::new(vec![0u8; 16]);
		cursor.set_position(4);
		ensure_remaining(&mut cursor, 3, 4, "rows").unwrap();
		assert_eq!(cursor.position(), 4);

		let err = ensure_remaining(&mut cursor, 4, 4, "rows").unwrap_err();
		assert!(matches!(err, RoseFileError::ArgumentInvalid { .. }));
		assert!(ensure_remaining(&mut cursor, usize::MAX, 2, "rows").is_err());
		assert_eq!(cursor.position(), 4);
	}

	#[test]
	fn test_negative_count_is_rejected() {
		let mut cursor = Cursor::new((-1i32).to_le_bytes().to_vec());
		assert!(matches!(cursor.read_count_i32(), Err(RoseFileError::ArgumentInvalid { .. })));
	}
}
