//! Plain vector, quaternion, matrix and colour types used by the file formats.
//!
//! These are storage types only; they carry the component order used on disk
//! and leave arithmetic to whatever engine consumes the decoded data.

use serde::{Deserialize, Serialize};

/// Two component vector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
	/// X component
	pub x: f32,
	/// Y component
	pub y: f32,
}

impl Vec2 {
	/// Creates a vector from components.
	pub const fn new(x: f32, y: f32) -> Self {
		Self {
			x,
			y,
		}
	}

	/// Vector with every component set to `value`.
	pub const fn splat(value: f32) -> Self {
		Self::new(value, value)
	}
}

/// Three component vector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
	/// X component
	pub x: f32,
	/// Y component
	pub y: f32,
	/// Z component
	pub z: f32,
}

impl Vec3 {
	/// Creates a vector from components.
	pub const fn new(x: f32, y: f32, z: f32) -> Self {
		Self {
			x,
			y,
			z,
		}
	}

	/// Vector with every component set to `value`.
	pub const fn splat(value: f32) -> Self {
		Self::new(value, value, value)
	}
}

/// Four component vector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
	/// X component
	pub x: f32,
	/// Y component
	pub y: f32,
	/// Z component
	pub z: f32,
	/// W component
	pub w: f32,
}

impl Vec4 {
	/// Creates a vector from components.
	pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
		Self {
			x,
			y,
			z,
			w,
		}
	}

	/// Vector with every component set to `value`.
	pub const fn splat(value: f32) -> Self {
		Self::new(value, value, value, value)
	}
}

/// Rotation quaternion.
///
/// Stored in memory as `(x, y, z, w)`. Motion and skeleton files write `w` first,
/// see [`QuatOrder`](crate::io::QuatOrder).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
	/// X component
	pub x: f32,
	/// Y component
	pub y: f32,
	/// Z component
	pub z: f32,
	/// W component
	pub w: f32,
}

impl Quat {
	/// The identity rotation.
	pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

	/// Creates a quaternion from components.
	pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
		Self {
			x,
			y,
			z,
			w,
		}
	}
}

impl Default for Quat {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// 4x4 matrix, 16 floats in the order they appear on disk (row major).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
	/// Rows of the matrix
	pub rows: [[f32; 4]; 4],
}

impl Mat4 {
	/// The identity matrix.
	pub const IDENTITY: Self = Self {
		rows: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]],
	};

	/// Creates a matrix from 16 values in storage order.
	pub fn from_array(values: [f32; 16]) -> Self {
		let mut rows = [[0.0; 4]; 4];
		for (index, value) in values.into_iter().enumerate() {
			rows[index / 4][index % 4] = value;
		}
		Self {
			rows,
		}
	}

	/// Returns the 16 values in storage order.
	pub fn to_array(&self) -> [f32; 16] {
		let mut values = [0.0; 16];
		for (index, value) in values.iter_mut().enumerate() {
			*value = self.rows[index / 4][index % 4];
		}
		values
	}
}

impl Default for Mat4 {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// Floating point RGBA colour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
	/// Red channel
	pub r: f32,
	/// Green channel
	pub g: f32,
	/// Blue channel
	pub b: f32,
	/// Alpha channel
	pub a: f32,
}

impl Color4 {
	/// Creates a colour from channels.
	pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
		Self {
			r,
			g,
			b,
			a,
		}
	}

	/// Colour with every channel set to `value`.
	pub const fn splat(value: f32) -> Self {
		Self::new(value, value, value, value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_matrix_array_order() {
		let values: [f32; 16] = std::array::from_fn(|i| i as f32);
		let matrix = Mat4::from_array(values);
		assert_eq!(matrix.rows[0], [0.0, 1.0, 2.0, 3.0]);
		assert_eq!(matrix.rows[3][2], 14.0);
		assert_eq!(matrix.to_array(), values);
	}

	#[test]
	fn test_defaults() {
		assert_eq!(Quat::default(), Quat::IDENTITY);
		assert_eq!(Mat4::default(), Mat4::IDENTITY);
		assert_eq!(Vec3::default(), Vec3::splat(0.0));
	}
}
