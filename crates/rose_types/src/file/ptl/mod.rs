//! `.PTL` particle system file support.
//!
//! A particle file holds one or more emitter sequences. Each sequence has
//! spawn parameters and a list of timed events that change particles during
//! their lifetime.
//!
//! # File Format
//!
//! ```text
//! i32 sequence count
//! per sequence:
//!   u32-length name
//!   MinMax<f32> lifetime, MinMax<f32> emit rate
//!   i32 loop count
//!   MinMax<Vec3> spawn direction, emit radius, gravity
//!   u32-length texture file
//!   i32 particle count, alignment, update coordinate, texture width,
//!       texture height, implementation, destination blend, source blend,
//!       blend operation
//!   i32 event count
//!   per event: u32 type, MinMax<f32> time range, u8 fade, payload
//! ```
//!
//! A `MinMax` is stored minimum first. The payload layout depends on the event
//! type, see [`EventValue`].

use std::{
	io::{Read, Seek, Write},
	sync::LazyLock,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::{FileType, RoseFile, RoseFileError, registry::Registry};
use crate::{
	io::{LEGACY_ENCODING, ReadExt, WriteExt},
	math::Vec3,
	min_max::MinMax,
};

mod event;

pub use event::{EventType, EventValue, ParticleEvent, event_registry};

static DEFAULT_EVENTS: LazyLock<Registry<ParticleEvent>> = LazyLock::new(event_registry);

/// One emitter.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
	/// Sequence name
	pub name: String,
	/// Particle lifetime in seconds
	pub lifetime: MinMax<f32>,
	/// Particles emitted per second
	pub emit_rate: MinMax<f32>,
	/// Times the sequence repeats, 0 loops forever
	pub loop_count: i32,
	/// Initial direction
	pub spawn_direction: MinMax<Vec3>,
	/// Spawn offset from the emitter
	pub emit_radius: MinMax<Vec3>,
	/// Constant acceleration
	pub gravity: MinMax<Vec3>,
	/// Texture file
	pub texture_file: String,
	/// Maximum live particles
	pub particle_count: i32,
	/// Billboard alignment mode
	pub alignment: i32,
	/// Coordinate space particles update in
	pub update_coordinate: i32,
	/// Texture atlas columns
	pub texture_width: i32,
	/// Texture atlas rows
	pub texture_height: i32,
	/// Renderer implementation
	pub implementation: i32,
	/// Destination blend factor
	pub destination_blend: i32,
	/// Source blend factor
	pub source_blend: i32,
	/// Blend operation
	pub blend_operation: i32,
	/// Events in stored order
	pub events: Vec<ParticleEvent>,
}

impl Sequence {
	fn read<R: Read>(reader: &mut R, registry: &Registry<ParticleEvent>) -> Result<Self, RoseFileError> {
		let mut sequence = Self {
			name: reader.read_u32_length_string(LEGACY_ENCODING)?,
			lifetime: MinMax::read(reader)?,
			emit_rate: MinMax::read(reader)?,
			loop_count: reader.read_i32::<LittleEndian>()?,
			spawn_direction: MinMax::read(reader)?,
			emit_radius: MinMax::read(reader)?,
			gravity: MinMax::read(reader)?,
			texture_file: reader.read_u32_length_string(LEGACY_ENCODING)?,
			particle_count: reader.read_i32::<LittleEndian>()?,
			alignment: reader.read_i32::<LittleEndian>()?,
			update_coordinate: reader.read_i32::<LittleEndian>()?,
			texture_width: reader.read_i32::<LittleEndian>()?,
			texture_height: reader.read_i32::<LittleEndian>()?,
			implementation: reader.read_i32::<LittleEndian>()?,
			destination_blend: reader.read_i32::<LittleEndian>()?,
			source_blend: reader.read_i32::<LittleEndian>()?,
			blend_operation: reader.read_i32::<LittleEndian>()?,
			events: Vec::new(),
		};

		let event_count = reader.read_count_i32()?;
		sequence.events.reserve(event_count.min(1024));
		for _ in 0..event_count {
			let tag = reader.read_u32::<LittleEndian>()?;
			let mut event = registry.create_instance(tag)?;
			event.read_body(reader)?;
			sequence.events.push(event);
		}

		trace!("PTL sequence '{}': {} events", sequence.name, sequence.events.len());
		Ok(sequence)
	}

	fn write<W: Write>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_u32_length_string(&self.name, LEGACY_ENCODING)?;
		self.lifetime.write(writer)?;
		self.emit_rate.write(writer)?;
		writer.write_i32::<LittleEndian>(self.loop_count)?;
		self.spawn_direction.write(writer)?;
		self.emit_radius.write(writer)?;
		self.gravity.write(writer)?;
		writer.write_u32_length_string(&self.texture_file, LEGACY_ENCODING)?;
		for value in [
			self.particle_count,
			self.alignment,
			self.update_coordinate,
			self.texture_width,
			self.texture_height,
			self.implementation,
			self.destination_blend,
			self.source_blend,
			self.blend_operation,
		] {
			writer.write_i32::<LittleEndian>(value)?;
		}

		writer.write_count_i32(self.events.len(), "event count")?;
		for event in &self.events {
			writer.write_u32::<LittleEndian>(event.event_type().to_u32())?;
			event.write_body(writer)?;
		}
		Ok(())
	}
}

/// A decoded particle file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
	/// Emitters in stored order
	pub sequences: Vec<Sequence>,
}

impl File {
	/// Creates an empty particle file.
	pub fn new() -> Self {
		Self::default()
	}

	/// Decodes a particle file, creating events through `registry`.
	///
	/// # Errors
	///
	/// [`RoseFileError::InvalidDiscriminant`] for an event type `registry` lacks.
	pub fn read_with<R: Read + Seek>(
		reader: &mut R,
		registry: &Registry<ParticleEvent>,
	) -> Result<Self, RoseFileError> {
		let sequence_count = reader.read_count_i32()?;
		let mut sequences = Vec::with_capacity(sequence_count.min(256));
		for _ in 0..sequence_count {
			sequences.push(Sequence::read(reader, registry)?);
		}

		debug!(
			"PTL: {} sequences, {} events",
			sequences.len(),
			sequences.iter().map(|s| s.events.len()).sum::<usize>()
		);
		Ok(Self {
			sequences,
		})
	}
}

impl RoseFile for File {
	const FILE_TYPE: FileType = FileType::Ptl;

	fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self, RoseFileError> {
		Self::read_with(reader, &DEFAULT_EVENTS)
	}

	fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), RoseFileError> {
		writer.write_count_i32(self.sequences.len(), "sequence count")?;
		for sequence in &self.sequences {
			sequence.write(writer)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests;
