//! Cross-format tests for `rose-rs`
//!
//! Every test builds its input in memory, so no game client is needed.

mod container;
mod motion;
mod terrain;
mod vfs;

/// Unique path in the system temp directory for `name`.
pub(crate) fn temp_path(name: &str) -> std::path::PathBuf {
	std::env::temp_dir().join(format!("rose_rs_{}_{}", std::process::id(), name))
}

/// Reads the little-endian `i32` at `offset`.
pub(crate) fn i32_at(bytes: &[u8], offset: usize) -> i32 {
	i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}
