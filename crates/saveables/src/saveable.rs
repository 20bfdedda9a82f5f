//! Saveable models and their value identity.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::SaveError;
use crate::prompt::Page;
use crate::source::{SaveablePart, SourceId};

/// Value identity of a saveable model.
///
/// Two saveables with equal keys are the same model, even when they are
/// different instances owned by different sources. Implementations must make
/// equal-keyed saveables share their dirty state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaveableKey {
	/// A model backed by a named resource (path, URI, database row, ...).
	Resource(String),
	/// The implicit model of a single-target part.
	Part(SourceId),
	/// Caller-defined identity.
	Custom(u64),
}

impl SaveableKey {
	/// Shorthand for [`SaveableKey::Resource`].
	pub fn resource(name: impl Into<String>) -> Self {
		Self::Resource(name.into())
	}
}

impl fmt::Display for SaveableKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resource(name) => f.write_str(name),
			Self::Part(id) => write!(f, "part:{}", id.0),
			Self::Custom(id) => write!(f, "custom:{id}"),
		}
	}
}

/// A unit of dirty-trackable content.
pub trait Saveable {
	/// Value identity of this model.
	fn key(&self) -> SaveableKey;

	/// Name shown in save prompts.
	fn name(&self) -> String;

	/// Longer description shown as a tooltip.
	fn tool_tip(&self) -> String;

	/// Returns true if the model has unsaved changes.
	fn is_dirty(&self) -> bool;

	/// Persists the model.
	///
	/// Long-running saves should poll [`SaveMonitor::is_cancelled`]; calling
	/// [`SaveMonitor::cancel`] reports the batch as cancelled to the caller.
	fn do_save(&self, monitor: &SaveMonitor) -> Result<(), SaveError>;

	/// Reveals the part that hosts this model, if the model knows it.
	fn show_in(&self, _page: &dyn Page) -> bool {
		false
	}
}

/// Shared handle to a [`Saveable`] that compares and hashes by [`SaveableKey`].
#[derive(Clone)]
pub struct SaveableRef {
	key: SaveableKey,
	inner: Rc<dyn Saveable>,
}

impl SaveableRef {
	/// Wraps a saveable, capturing its key.
	pub fn new(saveable: impl Saveable + 'static) -> Self {
		Self::from_rc(Rc::new(saveable))
	}

	/// Wraps an already shared saveable.
	pub fn from_rc(inner: Rc<dyn Saveable>) -> Self {
		Self {
			key: inner.key(),
			inner,
		}
	}

	/// Value identity captured when the handle was created.
	pub fn key(&self) -> &SaveableKey {
		&self.key
	}

	/// Returns true when both handles wrap the same instance (not merely equal models).
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl std::ops::Deref for SaveableRef {
	type Target = dyn Saveable;

	fn deref(&self) -> &Self::Target {
		&*self.inner
	}
}

impl PartialEq for SaveableRef {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key
	}
}

impl Eq for SaveableRef {}

impl Hash for SaveableRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.key.hash(state);
	}
}

impl fmt::Debug for SaveableRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SaveableRef").field(&self.key).finish()
	}
}

/// The implicit model of a part that saves itself as a single unit.
pub struct DefaultSaveable {
	source: SourceId,
	part: Rc<dyn SaveablePart>,
}

impl DefaultSaveable {
	/// Creates the default saveable for `part`, owned by the source `source`.
	pub fn new(source: SourceId, part: Rc<dyn SaveablePart>) -> Self {
		Self { source, part }
	}
}

impl Saveable for DefaultSaveable {
	fn key(&self) -> SaveableKey {
		SaveableKey::Part(self.source)
	}

	fn name(&self) -> String {
		self.part.title()
	}

	fn tool_tip(&self) -> String {
		self.part.title_tool_tip()
	}

	fn is_dirty(&self) -> bool {
		self.part.is_dirty()
	}

	fn do_save(&self, monitor: &SaveMonitor) -> Result<(), SaveError> {
		self.part.do_save(monitor)
	}

	fn show_in(&self, page: &dyn Page) -> bool {
		page.reveal(self.source)
	}
}

/// Cooperative cancellation flag shared across one save batch.
#[derive(Debug, Default)]
pub struct SaveMonitor {
	cancelled: Cell<bool>,
}

impl SaveMonitor {
	/// Creates a monitor that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests cancellation of the remaining batch.
	pub fn cancel(&self) {
		self.cancelled.set(true);
	}

	/// Returns true once [`cancel`](Self::cancel) has been called.
	pub fn is_cancelled(&self) -> bool {
		self.cancelled.get()
	}
}
