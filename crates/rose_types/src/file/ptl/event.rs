//! Particle events: timed changes applied to live particles.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::{
	file::{
		FileType,
		registry::{Registry, TaggedRecord},
	},
	io::{ReadExt, WriteExt},
	math::{Color4, Vec2, Vec3},
	min_max::MinMax,
};

/// Event type tag as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum EventType {
	/// Particle size
	Size = 1,
	/// Restarts the event timeline
	Timer = 2,
	/// Red colour component
	Red = 3,
	/// Green colour component
	Green = 4,
	/// Blue colour component
	Blue = 5,
	/// Alpha component
	Alpha = 6,
	/// Whole colour
	Colour = 7,
	/// X velocity
	VelocityX = 8,
	/// Y velocity
	VelocityY = 9,
	/// Z velocity
	VelocityZ = 10,
	/// Whole velocity
	Velocity = 11,
	/// Texture frame
	Texture = 12,
	/// Rotation
	Rotation = 13,
}

impl EventType {
	/// Every event type in tag order.
	pub const ALL: [EventType; 13] = [
		Self::Size,
		Self::Timer,
		Self::Red,
		Self::Green,
		Self::Blue,
		Self::Alpha,
		Self::Colour,
		Self::VelocityX,
		Self::VelocityY,
		Self::VelocityZ,
		Self::Velocity,
		Self::Texture,
		Self::Rotation,
	];

	/// Raw tag value.
	pub fn to_u32(self) -> u32 {
		self as u32
	}
}

/// What an event changes, with the range its target value is drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventValue {
	/// Width and height
	Size(MinMax<Vec2>),
	/// Timeline restart point
	Timer(MinMax<f32>),
	/// Red component
	Red(MinMax<f32>),
	/// Green component
	Green(MinMax<f32>),
	/// Blue component
	Blue(MinMax<f32>),
	/// Alpha component
	Alpha(MinMax<f32>),
	/// Colour
	Colour(MinMax<Color4>),
	/// X velocity
	VelocityX(MinMax<f32>),
	/// Y velocity
	VelocityY(MinMax<f32>),
	/// Z velocity
	VelocityZ(MinMax<f32>),
	/// Velocity
	Velocity(MinMax<Vec3>),
	/// Texture frame
	Texture(MinMax<f32>),
	/// Rotation
	Rotation(MinMax<f32>),
}

impl EventValue {
	/// Zeroed value for `event_type`.
	pub fn empty(event_type: EventType) -> Self {
		match event_type {
			EventType::Size => Self::Size(MinMax::default()),
			EventType::Timer => Self::Timer(MinMax::default()),
			EventType::Red => Self::Red(MinMax::default()),
			EventType::Green => Self::Green(MinMax::default()),
			EventType::Blue => Self::Blue(MinMax::default()),
			EventType::Alpha => Self::Alpha(MinMax::default()),
			EventType::Colour => Self::Colour(MinMax::default()),
			EventType::VelocityX => Self::VelocityX(MinMax::default()),
			EventType::VelocityY => Self::VelocityY(MinMax::default()),
			EventType::VelocityZ => Self::VelocityZ(MinMax::default()),
			EventType::Velocity => Self::Velocity(MinMax::default()),
			EventType::Texture => Self::Texture(MinMax::default()),
			EventType::Rotation => Self::Rotation(MinMax::default()),
		}
	}

	/// The event type this value belongs to.
	pub fn event_type(&self) -> EventType {
		match self {
			Self::Size(_) => EventType::Size,
			Self::Timer(_) => EventType::Timer,
			Self::Red(_) => EventType::Red,
			Self::Green(_) => EventType::Green,
			Self::Blue(_) => EventType::Blue,
			Self::Alpha(_) => EventType::Alpha,
			Self::Colour(_) => EventType::Colour,
			Self::VelocityX(_) => EventType::VelocityX,
			Self::VelocityY(_) => EventType::VelocityY,
			Self::VelocityZ(_) => EventType::VelocityZ,
			Self::Velocity(_) => EventType::Velocity,
			Self::Texture(_) => EventType::Texture,
			Self::Rotation(_) => EventType::Rotation,
		}
	}

	fn read_payload<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<()> {
		match self {
			Self::Size(range) => *range = MinMax::read(reader)?,
			Self::Colour(range) => *range = MinMax::read(reader)?,
			Self::Velocity(range) => *range = MinMax::read(reader)?,
			Self::Timer(range)
			| Self::Red(range)
			| Self::Green(range)
			| Self::Blue(range)
			| Self::Alpha(range)
			| Self::VelocityX(range)
			| Self::VelocityY(range)
			| Self::VelocityZ(range)
			| Self::Texture(range)
			| Self::Rotation(range) => *range = MinMax::read(reader)?,
		}
		Ok(())
	}

	fn write_payload<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
		match self {
			Self::Size(range) => range.write(writer),
			Self::Colour(range) => range.write(writer),
			Self::Velocity(range) => range.write(writer),
			Self::Timer(range)
			| Self::Red(range)
			| Self::Green(range)
			| Self::Blue(range)
			| Self::Alpha(range)
			| Self::VelocityX(range)
			| Self::VelocityY(range)
			| Self::VelocityZ(range)
			| Self::Texture(range)
			| Self::Rotation(range) => range.write(writer),
		}
	}
}

/// A timed event within a particle sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleEvent {
	/// Window of particle lifetime during which the event fires
	pub time_range: MinMax<f32>,
	/// Interpolate towards the value instead of jumping
	pub fade: bool,
	/// What changes
	pub value: EventValue,
}

impl ParticleEvent {
	/// Creates an event that fires at time zero without fading.
	pub fn new(value: EventValue) -> Self {
		Self {
			time_range: MinMax::default(),
			fade: false,
			value,
		}
	}

	/// Event type.
	pub fn event_type(&self) -> EventType {
		self.value.event_type()
	}

	/// Reads everything after the type tag.
	pub(super) fn read_body<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<()> {
		self.time_range = MinMax::read(reader)?;
		self.fade = reader.read_bool()?;
		self.value.read_payload(reader)
	}

	/// Writes everything after the type tag.
	pub(super) fn write_body<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
		self.time_range.write(writer)?;
		writer.write_bool(self.fade)?;
		self.value.write_payload(writer)
	}
}

impl TaggedRecord for ParticleEvent {
	const KIND: &'static str = "particle event";
	const FILE_TYPE: FileType = FileType::Ptl;

	fn tag(&self) -> u32 {
		self.event_type().to_u32()
	}
}

/// Registry with a factory for every [`EventType`].
pub fn event_registry() -> Registry<ParticleEvent> {
	let mut registry = Registry::new();
	for event_type in EventType::ALL {
		registry.register(event_type.to_u32(), move || ParticleEvent::new(EventValue::empty(event_type)));
	}
	registry
}
