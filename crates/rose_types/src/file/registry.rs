//! Discriminant to record type registry.
//!
//! Several formats store heterogeneous records as `(type tag, payload)` where the
//! tag decides how the payload is laid out. A [`Registry`] is an explicit table
//! from tag to factory; decoders look the tag up before touching the payload and
//! fail with [`RoseFileError::InvalidDiscriminant`] on anything unregistered.
//!
//! Default tables are provided by the formats that need them (see
//! `zmo::channel_registry` and `ptl::event_registry`). A custom table can be
//! passed to their `read_with` functions to restrict or extend what is accepted.

use std::{collections::BTreeMap, fmt};

use super::{FileType, RoseFileError};

/// A record whose concrete kind is identified by an on-disk tag.
pub trait TaggedRecord {
	/// Record family name used in error messages.
	const KIND: &'static str;

	/// Format the records belong to.
	const FILE_TYPE: FileType;

	/// The tag this record is written with.
	fn tag(&self) -> u32;
}

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Table of factories keyed by discriminant.
pub struct Registry<T> {
	factories: BTreeMap<u32, Factory<T>>,
}

impl<T: TaggedRecord> Registry<T> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			factories: BTreeMap::new(),
		}
	}

	/// Registers `factory` for `tag`, replacing any previous entry.
	pub fn register<F>(&mut self, tag: u32, factory: F) -> &mut Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		self.factories.insert(tag, Box::new(factory));
		self
	}

	/// `true` if `tag` has a factory.
	pub fn contains(&self, tag: u32) -> bool {
		self.factories.contains_key(&tag)
	}

	/// Registered tags in ascending order.
	pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
		self.factories.keys().copied()
	}

	/// Number of registered tags.
	pub fn len(&self) -> usize {
		self.factories.len()
	}

	/// `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}

	/// Builds a fresh record for `tag`.
	///
	/// # Errors
	///
	/// [`RoseFileError::InvalidDiscriminant`] if `tag` is not registered, or if
	/// its factory builds a record that would be written back with another tag.
	pub fn create_instance(&self, tag: u32) -> Result<T, RoseFileError> {
		let factory = self
			.factories
			.get(&tag)
			.ok_or_else(|| RoseFileError::invalid_discriminant(T::FILE_TYPE, T::KIND, tag))?;
		let record = factory();
		if record.tag() != tag {
			return Err(RoseFileError::invalid_discriminant(T::FILE_TYPE, T::KIND, tag));
		}
		Ok(record)
	}
}

impl<T: TaggedRecord> Default for Registry<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for Registry<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry").field("tags", &self.factories.keys().collect::<Vec<_>>()).finish()
	}
}
