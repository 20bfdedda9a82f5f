//! The page hosting open parts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use canopy_saveables::{Page, Source, SourceId};
use tracing::trace;

/// Ordered set of open parts with one active part.
///
/// Shared between the [`Workbench`](crate::Workbench) and the registry, which
/// calls [`Page::reveal`] to bring a model's part forward before prompting.
#[derive(Debug, Default)]
pub struct WorkbenchPage {
	parts: RefCell<Vec<Source>>,
	active: Cell<Option<SourceId>>,
}

impl WorkbenchPage {
	pub fn new() -> Rc<Self> {
		Rc::default()
	}

	/// Hosts `part` at the end of the tab order and activates it.
	///
	/// Returns false if the part is already hosted.
	pub fn add(&self, part: Source) -> bool {
		if self.contains(part.id()) {
			return false;
		}
		self.active.set(Some(part.id()));
		self.parts.borrow_mut().push(part);
		true
	}

	/// Removes a part. If it was active, the part now last in the tab order
	/// becomes active.
	pub fn remove(&self, id: SourceId) -> Option<Source> {
		let mut parts = self.parts.borrow_mut();
		let index = parts.iter().position(|part| part.id() == id)?;
		let removed = parts.remove(index);
		if self.active.get() == Some(id) {
			self.active.set(parts.last().map(Source::id));
		}
		Some(removed)
	}

	pub fn get(&self, id: SourceId) -> Option<Source> {
		self.parts.borrow().iter().find(|part| part.id() == id).cloned()
	}

	pub fn contains(&self, id: SourceId) -> bool {
		self.parts.borrow().iter().any(|part| part.id() == id)
	}

	/// Hosted parts in tab order.
	pub fn parts(&self) -> Vec<Source> {
		self.parts.borrow().clone()
	}

	pub fn len(&self) -> usize {
		self.parts.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.parts.borrow().is_empty()
	}

	pub fn active_part(&self) -> Option<Source> {
		self.active.get().and_then(|id| self.get(id))
	}

	/// Makes a hosted part active; false if `id` is not hosted.
	pub fn activate(&self, id: SourceId) -> bool {
		if !self.contains(id) {
			return false;
		}
		self.active.set(Some(id));
		true
	}
}

impl Page for WorkbenchPage {
	fn reveal(&self, source: SourceId) -> bool {
		let revealed = self.activate(source);
		trace!(source = source.0, revealed, "Reveal requested");
		revealed
	}
}
