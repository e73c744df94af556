//! Unit tests for PTL file operations

use super::*;
use crate::math::{Color4, Vec2};

fn smoke() -> Sequence {
	let mut sequence = Sequence {
		name: "smoke".to_string(),
		lifetime: MinMax::new(1.0, 2.5),
		emit_rate: MinMax::constant(20.0),
		loop_count: 0,
		spawn_direction: MinMax::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
		emit_radius: MinMax::constant(Vec3::splat(0.5)),
		gravity: MinMax::constant(Vec3::new(0.0, 0.0, -9.8)),
		texture_file: "3DDATA\\EFFECT\\SMOKE.DDS".to_string(),
		particle_count: 64,
		alignment: 1,
		texture_width: 4,
		texture_height: 4,
		destination_blend: 2,
		source_blend: 5,
		blend_operation: 1,
		..Sequence::default()
	};

	let mut size = ParticleEvent::new(EventValue::Size(MinMax::new(Vec2::splat(1.0), Vec2::splat(3.0))));
	size.time_range = MinMax::new(0.0, 0.5);
	size.fade = true;
	sequence.events.push(size);
	sequence.events.push(ParticleEvent::new(EventValue::Colour(MinMax::constant(Color4::new(1.0, 0.5, 0.25, 1.0)))));
	sequence.events.push(ParticleEvent::new(EventValue::Velocity(MinMax::constant(Vec3::new(0.0, 0.0, 2.0)))));
	sequence.events.push(ParticleEvent::new(EventValue::Alpha(MinMax::new(1.0, 0.0))));
	sequence
}

#[test]
fn test_round_trip() {
	let particles = File {
		sequences: vec![smoke(), Sequence::default()],
	};
	let loaded = File::from_bytes(&particles.to_bytes().unwrap()).unwrap();
	assert_eq!(loaded, particles);
	assert_eq!(loaded.sequences[0].events[0].event_type(), EventType::Size);
	assert!(loaded.sequences[0].events[0].fade);
}

#[test]
fn test_every_event_type_round_trips() {
	let mut sequence = Sequence::default();
	for event_type in EventType::ALL {
		sequence.events.push(ParticleEvent::new(EventValue::empty(event_type)));
	}
	let particles = File {
		sequences: vec![sequence],
	};
	assert_eq!(File::from_bytes(&particles.to_bytes().unwrap()).unwrap(), particles);
}

/// Byte position of the first event's type tag in a one-sequence file.
fn first_event(name_len: usize, texture_len: usize) -> usize {
	4 + 4 + name_len + 16 + 4 + 3 * 24 + 4 + texture_len + 9 * 4 + 4
}

#[test]
fn test_event_layout() {
	let particles = File {
		sequences: vec![smoke()],
	};
	let bytes = particles.to_bytes().unwrap();
	let event = first_event(5, 23);

	assert_eq!(&bytes[event - 4..event], &4i32.to_le_bytes());
	assert_eq!(&bytes[event..event + 4], &1u32.to_le_bytes());
	// time range minimum first, then the fade flag
	assert_eq!(&bytes[event + 4..event + 8], &0.0f32.to_le_bytes());
	assert_eq!(&bytes[event + 8..event + 12], &0.5f32.to_le_bytes());
	assert_eq!(bytes[event + 12], 1);
	assert_eq!(&bytes[event + 13..event + 17], &1.0f32.to_le_bytes());
}

#[test]
fn test_zero_event_tag_is_rejected() {
	let particles = File {
		sequences: vec![smoke()],
	};
	let mut bytes = particles.to_bytes().unwrap();
	let event = first_event(5, 23);
	bytes[event..event + 4].copy_from_slice(&0u32.to_le_bytes());

	assert!(matches!(
		File::from_bytes(&bytes),
		Err(RoseFileError::InvalidDiscriminant {
			value: 0,
			..
		})
	));
}

#[test]
fn test_custom_registry() {
	let particles = File {
		sequences: vec![smoke()],
	};
	let bytes = particles.to_bytes().unwrap();

	let mut registry = Registry::new();
	registry.register(EventType::Size.to_u32(), || ParticleEvent::new(EventValue::empty(EventType::Size)));
	let err = File::read_with(&mut std::io::Cursor::new(&bytes), &registry).unwrap_err();
	assert!(matches!(err, RoseFileError::InvalidDiscriminant { value: 7, .. }));
}

#[test]
fn test_sampling_event_ranges() {
	let event = ParticleEvent::new(EventValue::Velocity(MinMax::constant(Vec3::splat(2.0))));
	if let EventValue::Velocity(range) = &event.value {
		assert_eq!(range.random_sample(), Vec3::splat(2.0));
		assert_eq!(range.range(), Vec3::splat(0.0));
	} else {
		panic!("velocity event expected");
	}
}
