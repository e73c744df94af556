//! Benchmark helper utilities for rose-rs
//!
//! Builds synthetic but realistically sized files so the benchmarks run without
//! a game client.

use rose_types::{
	file::{ChannelType, ConFile, ConMenu, ConMessage, HimFile, RoseFile, ZmoFile},
	math::{Quat, Vec3},
};

/// A 65×65 heightmap of rolling hills with patches generated.
pub fn generate_heightmap() -> HimFile {
	let mut heights = HimFile::new(65, 65);
	for y in 0..65 {
		for x in 0..65 {
			let value = ((x as f32) * 0.3).sin() * 120.0 + ((y as f32) * 0.2).cos() * 80.0;
			heights.set_height(x, y, value).expect("in range");
		}
	}
	heights.generate_patches().expect("65x65 grid");
	heights
}

fn message(id: i32) -> ConMessage {
	ConMessage {
		id,
		message_type: 1,
		target_window: 0,
		condition: format!("QF_CHECK({id})"),
		action: format!("QF_REWARD({id})"),
		string_id: 1000 + id,
	}
}

/// A conversation with `menu_count` menus of `messages_per_menu` entries and
/// a `script_size` byte script, encoded.
pub fn generate_conversation(menu_count: usize, messages_per_menu: usize, script_size: usize) -> Vec<u8> {
	let mut conversation = ConFile::new();
	conversation.messages = (0..messages_per_menu as i32).map(message).collect();
	conversation.menus = (0..menu_count)
		.map(|menu| ConMenu {
			messages: (0..messages_per_menu).map(|i| message((menu * messages_per_menu + i) as i32)).collect(),
		})
		.collect();
	conversation.script = (0..script_size).map(|i| (i % 251) as u8).collect();
	conversation.to_bytes().expect("encode conversation")
}

/// A motion with `bone_count` bones animated over `frame_count` frames, encoded.
pub fn generate_motion(bone_count: u32, frame_count: usize) -> Vec<u8> {
	let mut motion = ZmoFile::new(30);
	motion.set_frame_count(frame_count);
	for bone in 0..bone_count {
		let position = motion.add_channel(ChannelType::Position, bone).expect("registered channel");
		for (i, frame) in position.vec3_frames_mut().expect("vec3 channel").iter_mut().enumerate() {
			*frame = Vec3::new(i as f32, bone as f32, 0.0);
		}
		let rotation = motion.add_channel(ChannelType::Rotation, bone).expect("registered channel");
		rotation.quat_frames_mut().expect("quat channel").fill(Quat::IDENTITY);
	}
	motion.to_bytes().expect("encode motion")
}
