//! ZMO motion end to end

use rose_rs::{
	file::{MotionChannel, zmo::channel_registry},
	prelude::*,
};

use crate::i32_at;

fn walk_cycle() -> ZmoFile {
	let mut motion = ZmoFile::new(30);
	motion.set_frame_count(2);

	let position = motion.add_channel(ChannelType::Position, 0).unwrap();
	let frames = position.vec3_frames_mut().unwrap();
	frames[0] = Vec3::new(0.0, 0.0, 0.0);
	frames[1] = Vec3::new(1.0, 2.0, 3.0);

	let rotation = motion.add_channel(ChannelType::Rotation, 1).unwrap();
	rotation.quat_frames_mut().unwrap()[1] = Quat::new(0.0, 0.0, 0.70710677, 0.70710677);
	motion
}

#[test_log::test]
fn test_motion_layout() {
	let bytes = walk_cycle().to_bytes().unwrap();

	assert_eq!(&bytes[..8], b"ZMO0002\0");
	assert_eq!(i32_at(&bytes, 8), 30);
	assert_eq!(i32_at(&bytes, 12), 2);
	assert_eq!(i32_at(&bytes, 16), 2);

	// channel headers: (type tag, bone)
	assert_eq!(i32_at(&bytes, 20), 2);
	assert_eq!(i32_at(&bytes, 24), 0);
	assert_eq!(i32_at(&bytes, 28), 4);
	assert_eq!(i32_at(&bytes, 32), 1);

	// frames are interleaved: 12 bytes of position then 16 of rotation per frame
	assert_eq!(bytes.len(), 36 + 2 * (12 + 16));
	let second_position = 36 + 12 + 16;
	assert_eq!(f32::from_le_bytes(bytes[second_position + 4..second_position + 8].try_into().unwrap()), 2.0);
}

#[test_log::test]
fn test_motion_round_trip() {
	let motion = walk_cycle();
	let loaded = ZmoFile::from_bytes(&motion.to_bytes().unwrap()).unwrap();

	assert_eq!(loaded, motion);
	assert_eq!(loaded.frame_count(), 2);
	assert!((loaded.duration() - 2.0 / 30.0).abs() < f32::EPSILON);

	let rotation = loaded.find_channel(ChannelType::Rotation, 1).unwrap();
	assert_eq!(rotation.quat_frames().unwrap()[0], Quat::IDENTITY);
	assert!(loaded.find_channel(ChannelType::Rotation, 0).is_none());
}

#[test_log::test]
fn test_restricted_registry() {
	let bytes = walk_cycle().to_bytes().unwrap();

	let mut registry = Registry::new();
	registry.register(ChannelType::Position.to_u32(), || MotionChannel::new(ChannelType::Position));

	let result = ZmoFile::read_with(&mut std::io::Cursor::new(&bytes), &registry);
	assert!(matches!(
		result,
		Err(RoseFileError::InvalidDiscriminant {
			value: 4,
			..
		})
	));

	let loaded = ZmoFile::read_with(&mut std::io::Cursor::new(&bytes), &channel_registry()).unwrap();
	assert_eq!(loaded.channel_count(), 2);
}

#[test_log::test]
fn test_wrong_identifier() {
	let mut bytes = walk_cycle().to_bytes().unwrap();
	bytes[6] = b'3';
	assert!(matches!(ZmoFile::from_bytes(&bytes), Err(RoseFileError::IdentifierMismatch { .. })));
}
