//! `.ZMO` motion file support.
//!
//! A motion file animates a skeleton (or a mesh's vertices) through a number of
//! channels that all share the same frame count.
//!
//! # File Format
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ "ZMO0002\0"                      (8 bytes)   │
//! │ frames per second                (i32)       │
//! │ frame count                      (i32)       │
//! │ channel count                    (i32)       │
//! ├──────────────────────────────────────────────┤
//! │ channel count × (type u32, index u32)        │
//! ├──────────────────────────────────────────────┤
//! │ frame count × channel count samples,         │
//! │ frame major: every channel of frame 0, then  │
//! │ every channel of frame 1, ...                │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Sample layout depends on the channel type, see [`ChannelType`]. Rotations
//! are stored `w` first.
//!
//! # Examples
//!
//! ```
//! use rose_types::file::{RoseFile, zmo::{ChannelType, File}};
//! use rose_types::math::Vec3;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut motion = File::new(30);
//! motion.set_frame_count(2);
//! let channel = motion.add_channel(ChannelType::Position, 0)?;
//! channel.vec3_frames_mut().unwrap()[1] = Vec3::new(0.0, 1.0, 0.0);
//!
//! let bytes = motion.to_bytes()?;
//! let loaded = File::from_bytes(&bytes)?;
//! assert_eq!(loaded, motion);
//! # Ok(())
//! # }
//! ```

use std::{
	io::{Read, Seek, Write},
	sync::LazyLock,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError, registry::Registry};
use crate::io::{LEGACY_ENCODING, ReadExt, WriteExt, ensure_remaining};

mod channel;

pub use channel::{ChannelType, MotionChannel, Samples, channel_registry};

/// ZMO constants.
pub mod constants {
	/// File identifier
	pub const IDENTIFIER: &str = "ZMO0002";

	/// Width of the identifier field including its terminator
	pub const IDENTIFIER_SIZE: usize = 8;

	/// Frame rate of a newly created motion
	pub const DEFAULT_FRAMES_PER_SECOND: i32 = 30;
}

static DEFAULT_CHANNELS: LazyLock<Registry<MotionChannel>> = LazyLock::new(channel_registry);

/// A decoded motion file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	frames_per_second: i32,
	frame_count: usize,
	channels: Vec<MotionChannel>,
}

impl File {
	/// Creates an empty motion with the given frame rate.
	pub fn new(frames_per_second: i32) -> Self {
		Self {
			frames_per_second,
			frame_count: 0,
			channels: Vec::new(),
		}
	}

	/// Decodes a motion, creating channels through `registry`.
	///
	/// # Errors
	///
	/// - [`RoseFileError::IdentifierMismatch`] if the file does not start with `ZMO0002`
	/// - [`RoseFileError::InvalidDiscriminant`] for a channel type `registry` lacks
	/// - [`RoseFileError::ArgumentInvalid`] if the counts need more bytes than the stream holds
	pub fn read_with<R: Read + Seek>(
		reader: &mut R,
		registry: &Registry<MotionChannel>,
	) -> Result<Self, RoseFileError> {
		let identifier = reader.read_fixed_string(constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;
		if identifier != constants::IDENTIFIER {
			return Err(RoseFileError::identifier_mismatch(FileType::Zmo, constants::IDENTIFIER, identifier));
		}

		let frames_per_second = reader.read_i32::<LittleEndian>()?;
		let frame_count = reader.read_count_i32()?;
		let channel_count = reader.read_count_i32()?;
		ensure_remaining(reader, channel_count, 8, "channel count")?;

		let mut channels = Vec::with_capacity(channel_count);
		for _ in 0..channel_count {
			let tag = reader.read_u32::<LittleEndian>()?;
			let index = reader.read_u32::<LittleEndian>()?;
			let mut channel = registry.create_instance(tag)?;
			channel.set_index(index);
			channels.push(channel);
		}

		let frame_size: usize = channels.iter().map(|c| c.channel_type().sample_size()).sum();
		if frame_size > 0 {
			ensure_remaining(reader, frame_count, frame_size, "frame count")?;
			for channel in &mut channels {
				channel.resize(frame_count);
			}
			for frame in 0..frame_count {
				for channel in &mut channels {
					channel.read_frame(frame, reader)?;
				}
			}
		}

		debug!(
			"ZMO: {} fps, {} frames, {} channels",
			frames_per_second,
			frame_count,
			channels.len()
		);

		Ok(Self {
			frames_per_second,
			frame_count,
			channels,
		})
	}

	/// Playback rate.
	pub fn frames_per_second(&self) -> i32 {
		self.frames_per_second
	}

	/// Sets the playback rate.
	pub fn set_frames_per_second(&mut self, frames_per_second: i32) {
		self.frames_per_second = frames_per_second;
	}

	/// Number of frames in every channel.
	pub fn frame_count(&self) -> usize {
		self.frame_count
	}

	/// Resizes every channel to `frame_count` frames.
	///
	/// New frames are zeroed (identity for rotations); surplus frames are dropped.
	pub fn set_frame_count(&mut self, frame_count: usize) {
		self.frame_count = frame_count;
		for channel in &mut self.channels {
			channel.resize(frame_count);
		}
	}

	/// Duration in seconds, or zero for a non-positive frame rate.
	pub fn duration(&self) -> f32 {
		if self.frames_per_second <= 0 {
			return 0.0;
		}
		self.frame_count as f32 / self.frames_per_second as f32
	}

	/// Number of channels.
	pub fn channel_count(&self) -> usize {
		self.channels.len()
	}

	/// All channels in file order.
	pub fn channels(&self) -> &[MotionChannel] {
		&self.channels
	}

	/// Channel at `index`.
	pub fn channel(&self, index: usize) -> Result<&MotionChannel, RoseFileError> {
		let count = self.channels.len();
		self.channels.get(index).ok_or(RoseFileError::out_of_range("channel", index, count))
	}

	/// Mutable channel at `index`.
	pub fn channel_mut(&mut self, index: usize) -> Result<&mut MotionChannel, RoseFileError> {
		let count = self.channels.len();
		self.channels.get_mut(index).ok_or(RoseFileError::out_of_range("channel", index, count))
	}

	/// Finds the first channel of `channel_type` bound to `bone`.
	pub fn find_channel(&self, channel_type: ChannelType, bone: u32) -> Option<&MotionChannel> {
		self.channels.iter().find(|c| c.channel_type() == channel_type && c.index() == bone)
	}

	/// Appends a channel sized to the current frame count.
	pub fn add_channel(&mut self, channel_type: ChannelType, index: u32) -> Result<&mut MotionChannel, RoseFileError> {
		let mut channel = DEFAULT_CHANNELS.create_instance(channel_type.to_u32())?;
		channel.set_index(index);
		channel.resize(self.frame_count);
		self.channels.push(channel);
		let last = self.channels.len() - 1;
		Ok(&mut self.channels[last])
	}

	/// Removes and returns the channel at `index`.
	pub fn remove_channel(&mut self, index: usize) -> Result<MotionChannel, RoseFileError> {
		if index >= self.channels.len() {
			return Err(RoseFileError::out_of_range("channel", index, self.channels.len()));
		}
		Ok(self.channels.remove(index))
	}

	/// Removes every channel.
	pub fn clear_channels(&mut self) {
		self.channels.clear();
	}
}

impl Default for File {
	fn default() -> Self {
		Self::new(constants::DEFAULT_FRAMES_PER_SECOND)
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Zmo;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		Self::read_with(reader, &DEFAULT_CHANNELS)
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_fixed_string(constants::IDENTIFIER, constants::IDENTIFIER_SIZE, LEGACY_ENCODING)?;
		writer.write_i32::<LittleEndian>(self.frames_per_second)?;
		writer.write_count_i32(self.frame_count, "frame count")?;
		writer.write_count_i32(self.channels.len(), "channel count")?;

		for channel in &self.channels {
			writer.write_u32::<LittleEndian>(channel.channel_type().to_u32())?;
			writer.write_u32::<LittleEndian>(channel.index())?;
		}

		for frame in 0..self.frame_count {
			for channel in &self.channels {
				channel.write_frame(frame, writer)?;
			}
		}

		Ok(())
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"ZMO File: {} fps, {} frames, {} channels",
			self.frames_per_second,
			self.frame_count,
			self.channels.len()
		)
	}
}
