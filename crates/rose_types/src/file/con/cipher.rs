//! Position keyed XOR scrambling used by conversation files.
//!
//! Two integers taken from the structure being written select a single key
//! byte: the first if it is odd, otherwise the second (both truncated to their
//! low byte). Every byte of the value is XORed with that key, so applying the
//! same call twice restores the input. There is no integrity check.

/// Picks the key byte for the pair `(key_a, key_b)`.
pub fn select_key(key_a: i32, key_b: i32) -> u8 {
	if key_a & 1 != 0 { key_a as u8 } else { key_b as u8 }
}

/// XORs all four bytes of `value` with the selected key byte.
pub fn obfuscate_i32(value: i32, key_a: i32, key_b: i32) -> i32 {
	let key = select_key(key_a, key_b);
	value ^ i32::from_ne_bytes([key; 4])
}

/// XORs every byte of `bytes` in place with the selected key byte.
pub fn obfuscate_bytes(bytes: &mut [u8], key_a: i32, key_b: i32) {
	let key = select_key(key_a, key_b);
	if key == 0 {
		return;
	}
	for byte in bytes {
		*byte ^= key;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_key_selection() {
		assert_eq!(select_key(3, 0x40), 3);
		assert_eq!(select_key(2, 0x40), 0x40);
		assert_eq!(select_key(0x1FF, 7), 0xFF);
		assert_eq!(select_key(0, 0x1B0), 0xB0);
		assert_eq!(select_key(-1, 0), 0xFF);
	}

	#[test]
	fn test_scalar_bytes_share_one_key() {
		assert_eq!(obfuscate_i32(0, 1, 0), 0x01010101);
		assert_eq!(obfuscate_i32(0x12345678, 4, 0xFF), 0x12345678 ^ -1);
	}

	#[test]
	fn test_obfuscation_is_symmetric() {
		let values = [0, 1, -1, i32::MIN, i32::MAX, 0x0BADF00D];
		let keys = [(0, 0), (1, 0), (2, 176), (9, 260), (-3, 5), (0x7FFF_FFFE, 0x7FFF_FFFF)];

		for &value in &values {
			for &(a, b) in &keys {
				assert_eq!(obfuscate_i32(obfuscate_i32(value, a, b), a, b), value);
			}
		}

		let original: Vec<u8> = (0..=255).collect();
		for &(a, b) in &keys {
			let mut bytes = original.clone();
			obfuscate_bytes(&mut bytes, a, b);
			obfuscate_bytes(&mut bytes, a, b);
			assert_eq!(bytes, original);
		}
	}

	#[test]
	fn test_scalar_matches_byte_form() {
		let value = 0x01020304i32;
		let mut bytes = value.to_le_bytes();
		obfuscate_bytes(&mut bytes, 5, 0);
		assert_eq!(i32::from_le_bytes(bytes), obfuscate_i32(value, 5, 0));
	}
}
