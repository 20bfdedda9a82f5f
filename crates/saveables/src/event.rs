//! Lifecycle events exchanged between sources, the registry and listeners.

use std::cell::Cell;

use crate::saveable::SaveableRef;
use crate::source::Source;

/// Kind of lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
	/// Models were opened by the source.
	PostOpen,
	/// The source is about to close models; listeners and the user may veto.
	PreClose,
	/// Models were closed by the source.
	PostClose,
	/// The dirty state of models changed.
	DirtyChanged,
}

/// A lifecycle notification.
///
/// Only [`LifecycleEventKind::PreClose`] events are meaningfully vetoable;
/// the veto flag is interior so listeners can set it through a shared
/// reference.
#[derive(Debug)]
pub struct LifecycleEvent {
	kind: LifecycleEventKind,
	source: Source,
	models: Vec<SaveableRef>,
	force: bool,
	veto: Cell<bool>,
}

impl LifecycleEvent {
	/// Creates an event.
	pub fn new(
		kind: LifecycleEventKind,
		source: Source,
		models: Vec<SaveableRef>,
		force: bool,
	) -> Self {
		Self {
			kind,
			source,
			models,
			force,
			veto: Cell::new(false),
		}
	}

	/// `PostOpen` for `models`.
	pub fn post_open(source: Source, models: Vec<SaveableRef>) -> Self {
		Self::new(LifecycleEventKind::PostOpen, source, models, false)
	}

	/// `PreClose` for `models`; `force` disables cancelling.
	pub fn pre_close(source: Source, models: Vec<SaveableRef>, force: bool) -> Self {
		Self::new(LifecycleEventKind::PreClose, source, models, force)
	}

	/// `PostClose` for `models`.
	pub fn post_close(source: Source, models: Vec<SaveableRef>) -> Self {
		Self::new(LifecycleEventKind::PostClose, source, models, false)
	}

	/// `DirtyChanged` for `models`.
	pub fn dirty_changed(source: Source, models: Vec<SaveableRef>) -> Self {
		Self::new(LifecycleEventKind::DirtyChanged, source, models, false)
	}

	pub fn kind(&self) -> LifecycleEventKind {
		self.kind
	}

	pub fn source(&self) -> &Source {
		&self.source
	}

	pub fn models(&self) -> &[SaveableRef] {
		&self.models
	}

	/// Returns true if the close must not be cancelled.
	pub fn is_force(&self) -> bool {
		self.force
	}

	/// Vetoes the pending close.
	pub fn veto(&self) {
		self.veto.set(true);
	}

	/// Returns true once the event has been vetoed.
	pub fn is_vetoed(&self) -> bool {
		self.veto.get()
	}

	pub(crate) fn clear_veto(&self) {
		self.veto.set(false);
	}
}
