//! Minimum/maximum pairs with component-wise range and random sampling.
//!
//! Particle systems describe most of their parameters as a range that a value is
//! drawn from each time a particle spawns. [`MinMax`] stores such a pair for the
//! element kinds the formats use: `i32`, `f32`, [`Vec2`], [`Vec3`], [`Vec4`] and
//! [`Color4`]. The set is closed; other element types do not implement
//! [`RangeElement`] and are rejected at compile time.
//!
//! ```
//! use rose_types::{math::Vec3, min_max::MinMax};
//!
//! let spread = MinMax::new(Vec3::splat(-1.0), Vec3::splat(1.0));
//! assert_eq!(spread.range(), Vec3::splat(2.0));
//!
//! let fixed = MinMax::new(5, 5);
//! assert_eq!(fixed.random_sample(), 5);
//! ```

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
	io::{ReadExt, WriteExt},
	math::{Color4, Vec2, Vec3, Vec4},
};

mod sealed {
	pub trait Sealed {}
}

/// Element kinds a [`MinMax`] can hold.
pub trait RangeElement: Copy + PartialEq + sealed::Sealed {
	/// Component-wise `|maximum - minimum|`.
	fn range_between(minimum: Self, maximum: Self) -> Self;

	/// Component-wise uniform sample in `[minimum, maximum]`.
	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self;

	/// Reads one element.
	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;

	/// Writes one element.
	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()>;
}

fn sample_f32<R: Rng + ?Sized>(a: f32, b: f32, rng: &mut R) -> f32 {
	if a == b {
		return a;
	}
	let (low, high) = if a < b { (a, b) } else { (b, a) };
	if !(low.is_finite() && high.is_finite()) {
		return a;
	}
	let t: f64 = rng.random();
	let value = f64::from(low) + (f64::from(high) - f64::from(low)) * t;
	(value as f32).clamp(low, high)
}

impl sealed::Sealed for i32 {}

impl RangeElement for i32 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		i32::try_from(maximum.abs_diff(minimum)).unwrap_or(i32::MAX)
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		if minimum == maximum {
			return minimum;
		}
		rng.random_range(minimum.min(maximum)..=minimum.max(maximum))
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_i32::<LittleEndian>()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_i32::<LittleEndian>(self)
	}
}

impl sealed::Sealed for f32 {}

impl RangeElement for f32 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		(maximum - minimum).abs()
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		sample_f32(minimum, maximum, rng)
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_f32::<LittleEndian>()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_f32::<LittleEndian>(self)
	}
}

impl sealed::Sealed for Vec2 {}

impl RangeElement for Vec2 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		Vec2::new(f32::range_between(minimum.x, maximum.x), f32::range_between(minimum.y, maximum.y))
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		Vec2::new(sample_f32(minimum.x, maximum.x, rng), sample_f32(minimum.y, maximum.y, rng))
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_vec2()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_vec2(self)
	}
}

impl sealed::Sealed for Vec3 {}

impl RangeElement for Vec3 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		Vec3::new(
			f32::range_between(minimum.x, maximum.x),
			f32::range_between(minimum.y, maximum.y),
			f32::range_between(minimum.z, maximum.z),
		)
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		Vec3::new(
			sample_f32(minimum.x, maximum.x, rng),
			sample_f32(minimum.y, maximum.y, rng),
			sample_f32(minimum.z, maximum.z, rng),
		)
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_vec3()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_vec3(self)
	}
}

impl sealed::Sealed for Vec4 {}

impl RangeElement for Vec4 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		Vec4::new(
			f32::range_between(minimum.x, maximum.x),
			f32::range_between(minimum.y, maximum.y),
			f32::range_between(minimum.z, maximum.z),
			f32::range_between(minimum.w, maximum.w),
		)
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		Vec4::new(
			sample_f32(minimum.x, maximum.x, rng),
			sample_f32(minimum.y, maximum.y, rng),
			sample_f32(minimum.z, maximum.z, rng),
			sample_f32(minimum.w, maximum.w, rng),
		)
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_vec4()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_vec4(self)
	}
}

impl sealed::Sealed for Color4 {}

impl RangeElement for Color4 {
	fn range_between(minimum: Self, maximum: Self) -> Self {
		Color4::new(
			f32::range_between(minimum.r, maximum.r),
			f32::range_between(minimum.g, maximum.g),
			f32::range_between(minimum.b, maximum.b),
			f32::range_between(minimum.a, maximum.a),
		)
	}

	fn sample_between<R: Rng + ?Sized>(minimum: Self, maximum: Self, rng: &mut R) -> Self {
		Color4::new(
			sample_f32(minimum.r, maximum.r, rng),
			sample_f32(minimum.g, maximum.g, rng),
			sample_f32(minimum.b, maximum.b, rng),
			sample_f32(minimum.a, maximum.a, rng),
		)
	}

	fn read_element<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		reader.read_color4()
	}

	fn write_element<W: Write + ?Sized>(self, writer: &mut W) -> io::Result<()> {
		writer.write_color4(self)
	}
}

/// A `(minimum, maximum)` pair. On disk the minimum comes first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
	/// Lower bound
	pub minimum: T,
	/// Upper bound
	pub maximum: T,
}

impl<T: RangeElement> MinMax<T> {
	/// Creates a range from its bounds.
	pub fn new(minimum: T, maximum: T) -> Self {
		Self {
			minimum,
			maximum,
		}
	}

	/// A range that always yields `value`.
	pub fn constant(value: T) -> Self {
		Self::new(value, value)
	}

	/// Component-wise `|maximum - minimum|`.
	pub fn range(&self) -> T {
		T::range_between(self.minimum, self.maximum)
	}

	/// Draws a component-wise uniform sample using the thread-local generator.
	///
	/// Components whose bounds are equal always yield that bound.
	pub fn random_sample(&self) -> T {
		self.random_sample_with(&mut rand::rng())
	}

	/// Draws a component-wise uniform sample from `rng`.
	pub fn random_sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
		T::sample_between(self.minimum, self.maximum, rng)
	}

	/// Reads minimum then maximum.
	pub fn read<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
		let minimum = T::read_element(reader)?;
		let maximum = T::read_element(reader)?;
		Ok(Self::new(minimum, maximum))
	}

	/// Writes minimum then maximum.
	pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
		self.minimum.write_element(writer)?;
		self.maximum.write_element(writer)
	}
}

#[cfg(test)]
mod tests {
	use rand::{SeedableRng, rngs::SmallRng};

	use super::*;

	#[test]
	fn test_degenerate_ranges() {
		assert_eq!(MinMax::new(5, 5).range(), 0);
		assert_eq!(MinMax::new(5, 5).random_sample(), 5);
		assert_eq!(MinMax::new(5.0f32, 5.0).range(), 0.0);
		assert_eq!(MinMax::new(5.0f32, 5.0).random_sample(), 5.0);
		assert_eq!(MinMax::constant(Vec3::splat(2.0)).random_sample(), Vec3::new(2.0, 2.0, 2.0));
	}

	#[test]
	fn test_range_is_component_wise() {
		let range = MinMax::new(Vec3::new(1.0, -2.0, 10.0), Vec3::new(4.0, 2.0, 5.0));
		assert_eq!(range.range(), Vec3::new(3.0, 4.0, 5.0));

		let colour = MinMax::new(Color4::new(0.0, 0.5, 1.0, 1.0), Color4::new(1.0, 0.5, 0.0, 0.25));
		assert_eq!(colour.range(), Color4::new(1.0, 0.0, 1.0, 0.75));

		assert_eq!(MinMax::new(i32::MIN, i32::MAX).range(), i32::MAX);
		assert_eq!(MinMax::new(10, -3).range(), 13);
	}

	#[test]
	fn test_samples_stay_in_bounds() {
		let mut rng = SmallRng::seed_from_u64(0x524F5345);
		let ints = MinMax::new(-3, 7);
		let floats = MinMax::new(Vec2::new(0.0, 10.0), Vec2::new(1.0, -10.0));
		let mixed = MinMax::new(Vec4::new(1.0, 0.0, 0.0, 0.0), Vec4::new(1.0, 1.0, 1.0, 1.0));

		for _ in 0..1000 {
			let i = ints.random_sample_with(&mut rng);
			assert!((-3..=7).contains(&i));

			let v = floats.random_sample_with(&mut rng);
			assert!((0.0..=1.0).contains(&v.x));
			assert!((-10.0..=10.0).contains(&v.y));

			let w = mixed.random_sample_with(&mut rng);
			assert_eq!(w.x, 1.0);
			assert!((0.0..=1.0).contains(&w.w));
		}
	}

	#[test]
	fn test_non_finite_bounds_do_not_panic() {
		let mut rng = SmallRng::seed_from_u64(1);
		let range = MinMax::new(f32::NEG_INFINITY, f32::INFINITY);
		assert_eq!(range.random_sample_with(&mut rng), f32::NEG_INFINITY);
		assert!(MinMax::new(f32::NAN, 1.0).random_sample_with(&mut rng).is_nan());
	}

	#[test]
	fn test_minimum_is_stored_first() {
		let mut buffer = Vec::new();
		MinMax::new(1.5f32, 2.5).write(&mut buffer).unwrap();
		assert_eq!(&buffer[..4], &1.5f32.to_le_bytes());
		assert_eq!(MinMax::<f32>::read(&mut buffer.as_slice()).unwrap(), MinMax::new(1.5, 2.5));
	}
}
