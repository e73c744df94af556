//! Unit tests for CON file operations

use byteorder::{LittleEndian, ReadBytesExt};

use super::*;

fn message(id: i32, condition: &str, action: &str) -> Message {
	Message {
		id,
		message_type: 1,
		target_window: 2,
		condition: condition.to_string(),
		action: action.to_string(),
		string_id: 100 + id,
	}
}

fn read_i32_at(bytes: &[u8], offset: usize) -> i32 {
	(&bytes[offset..offset + 4]).read_i32::<LittleEndian>().unwrap()
}

fn sample_conversation() -> File {
	let mut conversation = File::new();
	{
		let function = conversation.function_mut(0).unwrap();
		function.name = "OnOpen".to_string();
		function.enabled = true;
	}
	conversation.function_mut(15).unwrap().enabled = true;
	conversation.messages = vec![message(1, "cond_a", "act_a"), message(2, "", "act_b")];
	conversation.menus = vec![
		Menu {
			messages: vec![message(10, "menu", "open")],
		},
		Menu {
			messages: vec![message(20, "x", "y"), message(21, "z", "w")],
		},
		Menu::default(),
	];
	conversation.script = b"\x1B\x4C\x75\x61 compiled".to_vec();
	conversation
}

#[test]
fn test_round_trip() {
	let conversation = sample_conversation();
	let bytes = conversation.to_bytes().unwrap();
	let loaded = File::from_bytes(&bytes).unwrap();

	assert_eq!(loaded, conversation);
	assert_eq!(loaded.function(0).unwrap().name, "OnOpen");
	assert!(loaded.function(15).unwrap().enabled);
	assert!(!loaded.function(1).unwrap().enabled);
}

#[test]
fn test_header_layout() {
	let bytes = sample_conversation().to_bytes().unwrap();

	assert_eq!(&bytes[0..2], &(0x8001u16 as i16).to_le_bytes());
	assert_eq!(&bytes[2..8], b"OnOpen");
	assert_eq!(&bytes[0x202..0x204], &[0xCC, 0xCC]);
	assert_eq!(read_i32_at(&bytes, 0x204), 0x20C);

	let script_offset = read_i32_at(&bytes, 0x208) as usize;
	assert_eq!(read_i32_at(&bytes, script_offset), 13);
	assert_eq!(bytes.len(), script_offset + 4 + 13);
}

#[test]
fn test_plain_messages_and_relative_offsets() {
	let bytes = sample_conversation().to_bytes().unwrap();
	let base = 0x20C;

	assert_eq!(read_i32_at(&bytes, base), 2);
	assert_eq!(read_i32_at(&bytes, base + 8), 3);

	let message_table = base + read_i32_at(&bytes, base + 4) as usize;
	assert_eq!(message_table, base + 16);
	let first = base + read_i32_at(&bytes, message_table) as usize;
	assert_eq!(first, message_table + 8);
	assert_eq!(read_i32_at(&bytes, first), 1);
	assert_eq!(&bytes[first + 12..first + 18], b"cond_a");
}

#[test]
fn test_menu_blocks_are_scrambled() {
	let bytes = sample_conversation().to_bytes().unwrap();
	let base = 0x20C;
	let menu_table = base + read_i32_at(&bytes, base + 12) as usize;

	// one message: block size and count are plain, key is the odd count
	let menu = base + read_i32_at(&bytes, menu_table) as usize;
	assert_eq!(read_i32_at(&bytes, menu), Menu::block_size(1) as i32);
	assert_eq!(read_i32_at(&bytes, menu), 92);
	assert_eq!(read_i32_at(&bytes, menu + 4), 1);
	assert_eq!(read_i32_at(&bytes, menu + 8), 12 ^ 0x01010101);
	assert_eq!(read_i32_at(&bytes, menu + 12), 10 ^ 0x01010101);

	// two messages: even count, key is the low byte of the block size
	let menu = base + read_i32_at(&bytes, menu_table + 4) as usize;
	assert_eq!(read_i32_at(&bytes, menu), 176);
	assert_eq!(read_i32_at(&bytes, menu + 8), 16 ^ i32::from_ne_bytes([0xB0; 4]));

	let empty = base + read_i32_at(&bytes, menu_table + 8) as usize;
	assert_eq!(read_i32_at(&bytes, empty), 8);
	assert_eq!(read_i32_at(&bytes, empty + 4), 0);
}

#[test]
fn test_script_is_scrambled() {
	let conversation = sample_conversation();
	let bytes = conversation.to_bytes().unwrap();
	let script_offset = read_i32_at(&bytes, 0x208);
	let length = conversation.script.len() as i32;

	let mut stored = bytes[script_offset as usize + 4..].to_vec();
	assert_ne!(stored, conversation.script);
	cipher::obfuscate_bytes(&mut stored, length, script_offset + 4 + length);
	assert_eq!(stored, conversation.script);
}

#[test]
fn test_empty_conversation() {
	let conversation = File::new();
	let bytes = conversation.to_bytes().unwrap();
	assert_eq!(bytes.len(), 0x20C + 16 + 4);
	assert_eq!(File::from_bytes(&bytes).unwrap(), conversation);
}

#[test]
fn test_overlong_condition_is_rejected() {
	let mut conversation = File::new();
	conversation.messages.push(message(1, &"c".repeat(33), ""));
	let err = conversation.to_bytes().unwrap_err();
	assert!(matches!(err, RoseFileError::ArgumentInvalid { .. }));
}

#[test]
fn test_function_index_out_of_range() {
	let mut conversation = File::new();
	assert!(matches!(
		conversation.function(16),
		Err(RoseFileError::ArgumentOutOfRange {
			index: 16,
			count: 16,
			..
		})
	));
	assert!(conversation.function_mut(99).is_err());
}

#[test]
fn test_truncated_file() {
	let bytes = sample_conversation().to_bytes().unwrap();
	let err = File::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
	assert!(matches!(err, RoseFileError::IOError(_)));
}

#[test]
fn test_padding_marker_is_preserved() {
	let mut bytes = sample_conversation().to_bytes().unwrap();
	bytes[0x202..0x204].copy_from_slice(&0x0000u16.to_le_bytes());

	let loaded = File::from_bytes(&bytes).unwrap();
	assert_eq!(loaded.padding_marker(), 0);
	assert_eq!(loaded.to_bytes().unwrap(), bytes);
	assert_eq!(File::new().padding_marker(), constants::PADDING_MARKER);
}

#[test]
fn test_huge_message_count_is_rejected() {
	let mut bytes = sample_conversation().to_bytes().unwrap();
	bytes[0x20C..0x210].copy_from_slice(&i32::MAX.to_le_bytes());
	let err = File::from_bytes(&bytes).unwrap_err();
	assert!(matches!(err, RoseFileError::ArgumentInvalid { .. }));
}

#[test]
fn test_huge_script_length_is_rejected() {
	let conversation = sample_conversation();
	let mut bytes = conversation.to_bytes().unwrap();
	let script_offset = read_i32_at(&bytes, 0x208) as usize;
	bytes[script_offset..script_offset + 4].copy_from_slice(&i32::MAX.to_le_bytes());
	let err = File::from_bytes(&bytes).unwrap_err();
	assert!(matches!(err, RoseFileError::IOError(_)));
}
