//! Motion channels and their per-frame samples.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::{
	file::{
		FileType, RoseFileError,
		registry::{Registry, TaggedRecord},
	},
	io::{QuatOrder, ReadExt, WriteExt},
	math::{Quat, Vec2, Vec3},
};

/// Channel type tag as stored on disk. Each type is a distinct bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ChannelType {
	/// Placeholder channel without samples
	None = 1 << 0,
	/// Bone translation
	Position = 1 << 1,
	/// Bone rotation
	Rotation = 1 << 2,
	/// Vertex normal
	Normal = 1 << 3,
	/// Vertex alpha
	Alpha = 1 << 4,
	/// First texture coordinate set
	TextureCoordinate1 = 1 << 5,
	/// Second texture coordinate set
	TextureCoordinate2 = 1 << 6,
	/// Third texture coordinate set
	TextureCoordinate3 = 1 << 7,
	/// Fourth texture coordinate set
	TextureCoordinate4 = 1 << 8,
	/// Texture frame index
	TextureAnimation = 1 << 9,
	/// Uniform scale
	Scale = 1 << 10,
}

impl ChannelType {
	/// Every channel type in tag order.
	pub const ALL: [ChannelType; 11] = [
		Self::None,
		Self::Position,
		Self::Rotation,
		Self::Normal,
		Self::Alpha,
		Self::TextureCoordinate1,
		Self::TextureCoordinate2,
		Self::TextureCoordinate3,
		Self::TextureCoordinate4,
		Self::TextureAnimation,
		Self::Scale,
	];

	/// Converts a raw tag to a channel type.
	pub fn from_u32(value: u32) -> Result<Self, RoseFileError> {
		Self::ALL
			.into_iter()
			.find(|ty| ty.to_u32() == value)
			.ok_or_else(|| RoseFileError::invalid_discriminant(FileType::Zmo, MotionChannel::KIND, value))
	}

	/// Raw tag value.
	pub fn to_u32(self) -> u32 {
		self as u32
	}

	/// Bytes one frame of this channel occupies on disk.
	pub fn sample_size(self) -> usize {
		match self {
			Self::None => 0,
			Self::Alpha | Self::TextureAnimation | Self::Scale => 4,
			Self::TextureCoordinate1 | Self::TextureCoordinate2 | Self::TextureCoordinate3 | Self::TextureCoordinate4 => 8,
			Self::Position | Self::Normal => 12,
			Self::Rotation => 16,
		}
	}
}

/// A value that can be stored in one frame of a channel.
trait Sample: Copy + Default {
	fn read_sample<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;
	fn write_sample<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()>;
}

impl Sample for f32 {
	fn read_sample<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_f32::<LittleEndian>()
	}

	fn write_sample<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_f32::<LittleEndian>(self)
	}
}

impl Sample for Vec2 {
	fn read_sample<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_vec2()
	}

	fn write_sample<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_vec2(self)
	}
}

impl Sample for Vec3 {
	fn read_sample<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_vec3()
	}

	fn write_sample<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_vec3(self)
	}
}

impl Sample for Quat {
	fn read_sample<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_quat(QuatOrder::Wxyz)
	}

	fn write_sample<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_quat(self, QuatOrder::Wxyz)
	}
}

/// Frame samples of one channel, one variant per channel type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Samples {
	/// No per-frame data
	None,
	/// Translations
	Position(Vec<Vec3>),
	/// Rotations
	Rotation(Vec<Quat>),
	/// Normals
	Normal(Vec<Vec3>),
	/// Alpha values
	Alpha(Vec<f32>),
	/// Texture coordinates, set 1
	TextureCoordinate1(Vec<Vec2>),
	/// Texture coordinates, set 2
	TextureCoordinate2(Vec<Vec2>),
	/// Texture coordinates, set 3
	TextureCoordinate3(Vec<Vec2>),
	/// Texture coordinates, set 4
	TextureCoordinate4(Vec<Vec2>),
	/// Texture frame values
	TextureAnimation(Vec<f32>),
	/// Scale factors
	Scale(Vec<f32>),
}

/// Runs `$body` with `$frames` bound to the sample vector of whichever variant
/// `$samples` is, or evaluates `$none` for [`Samples::None`].
macro_rules! with_frames {
	($samples:expr, $frames:ident => $body:expr, none => $none:expr) => {
		match $samples {
			Samples::None => $none,
			Samples::Position($frames) | Samples::Normal($frames) => $body,
			Samples::Rotation($frames) => $body,
			Samples::Alpha($frames) | Samples::TextureAnimation($frames) | Samples::Scale($frames) => $body,
			Samples::TextureCoordinate1($frames)
			| Samples::TextureCoordinate2($frames)
			| Samples::TextureCoordinate3($frames)
			| Samples::TextureCoordinate4($frames) => $body,
		}
	};
}

fn read_into<T: Sample, R: Read + ?Sized>(frames: &mut [T], frame: usize, reader: &mut R) -> io::Result<()> {
	if let Some(slot) = frames.get_mut(frame) {
		*slot = T::read_sample(reader)?;
	}
	Ok(())
}

fn write_from<T: Sample, W: Write + ?Sized>(frames: &[T], frame: usize, writer: &mut W) -> io::Result<()> {
	frames.get(frame).copied().unwrap_or_default().write_sample(writer)
}

impl Samples {
	/// Empty samples for `channel_type`.
	pub fn empty(channel_type: ChannelType) -> Self {
		match channel_type {
			ChannelType::None => Self::None,
			ChannelType::Position => Self::Position(Vec::new()),
			ChannelType::Rotation => Self::Rotation(Vec::new()),
			ChannelType::Normal => Self::Normal(Vec::new()),
			ChannelType::Alpha => Self::Alpha(Vec::new()),
			ChannelType::TextureCoordinate1 => Self::TextureCoordinate1(Vec::new()),
			ChannelType::TextureCoordinate2 => Self::TextureCoordinate2(Vec::new()),
			ChannelType::TextureCoordinate3 => Self::TextureCoordinate3(Vec::new()),
			ChannelType::TextureCoordinate4 => Self::TextureCoordinate4(Vec::new()),
			ChannelType::TextureAnimation => Self::TextureAnimation(Vec::new()),
			ChannelType::Scale => Self::Scale(Vec::new()),
		}
	}

	/// The channel type these samples belong to.
	pub fn channel_type(&self) -> ChannelType {
		match self {
			Self::None => ChannelType::None,
			Self::Position(_) => ChannelType::Position,
			Self::Rotation(_) => ChannelType::Rotation,
			Self::Normal(_) => ChannelType::Normal,
			Self::Alpha(_) => ChannelType::Alpha,
			Self::TextureCoordinate1(_) => ChannelType::TextureCoordinate1,
			Self::TextureCoordinate2(_) => ChannelType::TextureCoordinate2,
			Self::TextureCoordinate3(_) => ChannelType::TextureCoordinate3,
			Self::TextureCoordinate4(_) => ChannelType::TextureCoordinate4,
			Self::TextureAnimation(_) => ChannelType::TextureAnimation,
			Self::Scale(_) => ChannelType::Scale,
		}
	}

	/// Number of stored samples (always zero for [`Samples::None`]).
	pub fn len(&self) -> usize {
		with_frames!(self, frames => frames.len(), none => 0)
	}

	/// `true` if no samples are stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn resize(&mut self, frame_count: usize) {
		with_frames!(self, frames => frames.resize(frame_count, Default::default()), none => ())
	}

	fn read_frame<R: Read + ?Sized>(&mut self, frame: usize, reader: &mut R) -> io::Result<()> {
		with_frames!(self, frames => read_into(frames, frame, reader), none => Ok(()))
	}

	fn write_frame<W: Write + ?Sized>(&self, frame: usize, writer: &mut W) -> io::Result<()> {
		with_frames!(self, frames => write_from(frames, frame, writer), none => Ok(()))
	}
}

/// One animated channel bound to a bone or vertex index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionChannel {
	index: u32,
	samples: Samples,
}

impl MotionChannel {
	/// Creates a channel of `channel_type` with no samples.
	pub fn new(channel_type: ChannelType) -> Self {
		Self {
			index: 0,
			samples: Samples::empty(channel_type),
		}
	}

	/// Channel type.
	pub fn channel_type(&self) -> ChannelType {
		self.samples.channel_type()
	}

	/// Bone (or vertex) index the channel animates.
	pub fn index(&self) -> u32 {
		self.index
	}

	/// Sets the bone (or vertex) index.
	pub fn set_index(&mut self, index: u32) {
		self.index = index;
	}

	/// All samples.
	pub fn samples(&self) -> &Samples {
		&self.samples
	}

	/// Number of frames stored.
	pub fn frame_count(&self) -> usize {
		self.samples.len()
	}

	/// Position or normal frames.
	pub fn vec3_frames(&self) -> Option<&[Vec3]> {
		match &self.samples {
			Samples::Position(frames) | Samples::Normal(frames) => Some(frames),
			_ => None,
		}
	}

	/// Mutable position or normal frames.
	pub fn vec3_frames_mut(&mut self) -> Option<&mut [Vec3]> {
		match &mut self.samples {
			Samples::Position(frames) | Samples::Normal(frames) => Some(frames),
			_ => None,
		}
	}

	/// Rotation frames.
	pub fn quat_frames(&self) -> Option<&[Quat]> {
		match &self.samples {
			Samples::Rotation(frames) => Some(frames),
			_ => None,
		}
	}

	/// Mutable rotation frames.
	pub fn quat_frames_mut(&mut self) -> Option<&mut [Quat]> {
		match &mut self.samples {
			Samples::Rotation(frames) => Some(frames),
			_ => None,
		}
	}

	/// Alpha, texture animation or scale frames.
	pub fn scalar_frames(&self) -> Option<&[f32]> {
		match &self.samples {
			Samples::Alpha(frames) | Samples::TextureAnimation(frames) | Samples::Scale(frames) => Some(frames),
			_ => None,
		}
	}

	/// Mutable alpha, texture animation or scale frames.
	pub fn scalar_frames_mut(&mut self) -> Option<&mut [f32]> {
		match &mut self.samples {
			Samples::Alpha(frames) | Samples::TextureAnimation(frames) | Samples::Scale(frames) => Some(frames),
			_ => None,
		}
	}

	/// Texture coordinate frames of any set.
	pub fn vec2_frames(&self) -> Option<&[Vec2]> {
		match &self.samples {
			Samples::TextureCoordinate1(frames)
			| Samples::TextureCoordinate2(frames)
			| Samples::TextureCoordinate3(frames)
			| Samples::TextureCoordinate4(frames) => Some(frames),
			_ => None,
		}
	}

	/// Mutable texture coordinate frames of any set.
	pub fn vec2_frames_mut(&mut self) -> Option<&mut [Vec2]> {
		match &mut self.samples {
			Samples::TextureCoordinate1(frames)
			| Samples::TextureCoordinate2(frames)
			| Samples::TextureCoordinate3(frames)
			| Samples::TextureCoordinate4(frames) => Some(frames),
			_ => None,
		}
	}

	pub(super) fn resize(&mut self, frame_count: usize) {
		self.samples.resize(frame_count);
	}

	pub(super) fn read_frame<R: Read + ?Sized>(&mut self, frame: usize, reader: &mut R) -> io::Result<()> {
		self.samples.read_frame(frame, reader)
	}

	pub(super) fn write_frame<W: Write + ?Sized>(&self, frame: usize, writer: &mut W) -> io::Result<()> {
		self.samples.write_frame(frame, writer)
	}
}

impl TaggedRecord for MotionChannel {
	const KIND: &'static str = "motion channel";
	const FILE_TYPE: FileType = FileType::Zmo;

	fn tag(&self) -> u32 {
		self.channel_type().to_u32()
	}
}

/// Registry with a factory for every [`ChannelType`].
pub fn channel_registry() -> Registry<MotionChannel> {
	let mut registry = Registry::new();
	for channel_type in ChannelType::ALL {
		registry.register(channel_type.to_u32(), move || MotionChannel::new(channel_type));
	}
	registry
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_creates_matching_type() {
		let registry = channel_registry();
		assert_eq!(registry.len(), ChannelType::ALL.len());

		let channel = registry.create_instance(ChannelType::Position.to_u32()).unwrap();
		assert_eq!(channel.channel_type(), ChannelType::Position);
		assert_eq!(channel.tag(), 2);
	}

	#[test]
	fn test_unknown_channel_tag() {
		let registry = channel_registry();
		for tag in [0, 3, 2048, u32::MAX] {
			let err = registry.create_instance(tag).unwrap_err();
			assert!(matches!(err, RoseFileError::InvalidDiscriminant { file_type: FileType::Zmo, .. }));
		}
		assert!(ChannelType::from_u32(12).is_err());
	}

	#[test]
	fn test_resize_keeps_existing_frames() {
		let mut channel = MotionChannel::new(ChannelType::Scale);
		channel.resize(2);
		channel.scalar_frames_mut().unwrap()[1] = 4.0;
		channel.resize(4);
		assert_eq!(channel.scalar_frames().unwrap(), &[0.0, 4.0, 0.0, 0.0]);
		channel.resize(1);
		assert_eq!(channel.frame_count(), 1);
	}

	#[test]
	fn test_rotation_defaults_to_identity() {
		let mut channel = MotionChannel::new(ChannelType::Rotation);
		channel.resize(1);
		assert_eq!(channel.quat_frames().unwrap()[0], Quat::IDENTITY);
		assert!(channel.vec3_frames().is_none());
	}

	#[test]
	fn test_none_channel_has_no_samples() {
		let mut channel = MotionChannel::new(ChannelType::None);
		channel.resize(10);
		assert_eq!(channel.frame_count(), 0);
		assert!(channel.samples().is_empty());
	}
}
