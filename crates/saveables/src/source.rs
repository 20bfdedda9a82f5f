//! Sources: the owners that display saveables.
//!
//! A [`Source`] is compared by reference identity through its [`SourceId`].
//! What a source can contribute is decided once, when it is constructed, and
//! recorded as a [`SaveCapability`]; the registry never re-probes a source.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SaveError;
use crate::saveable::{DefaultSaveable, SaveMonitor, SaveableRef};

/// Counter for generating unique source IDs.
static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl SourceId {
	/// Generates a new unique source ID.
	pub fn next() -> Self {
		Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// A source that declares its own list of saveables.
pub trait SaveablesSource {
	/// Every model currently displayed by the source.
	fn saveables(&self) -> Vec<SaveableRef>;

	/// The models relevant to the current selection; all of them by default.
	fn active_saveables(&self) -> Vec<SaveableRef> {
		self.saveables()
	}
}

/// Answer a part gives when asked to handle its own save-on-close prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseResponse {
	/// Save the part now and leave it out of the shared prompt.
	Yes,
	/// Close without saving and leave it out of the shared prompt.
	No,
	/// Abort the whole close.
	Cancel,
	/// No opinion; let the registry prompt as usual.
	Default,
}

/// A part that is saved as a single implicit unit.
pub trait SaveablePart {
	/// Title used as the default saveable's name.
	fn title(&self) -> String;

	/// Tooltip used as the default saveable's tooltip.
	fn title_tool_tip(&self) -> String {
		self.title()
	}

	/// Returns true if the part has unsaved changes.
	fn is_dirty(&self) -> bool;

	/// Persists the part.
	fn do_save(&self, monitor: &SaveMonitor) -> Result<(), SaveError>;

	/// Returns false if closing the part never needs to save it.
	fn is_save_on_close_needed(&self) -> bool {
		self.is_dirty()
	}

	/// Lets the part run its own prompt before the shared one.
	fn prompt_to_save_on_close(&self) -> CloseResponse {
		CloseResponse::Default
	}
}

/// What a source contributes to the registry.
#[derive(Clone)]
pub enum SaveCapability {
	/// The source declares its models itself. `part` is set when the source is
	/// also a [`SaveablePart`], which makes its save-on-close hooks available.
	Multi {
		/// Model provider.
		provider: Rc<dyn SaveablesSource>,
		/// Optional part-level save hooks.
		part: Option<Rc<dyn SaveablePart>>,
	},
	/// The source is saved as one implicit [`DefaultSaveable`].
	Single(Rc<dyn SaveablePart>),
	/// The source has nothing to save.
	Opaque,
}

impl SaveCapability {
	/// A source declaring its own models.
	pub fn multi(provider: Rc<dyn SaveablesSource>) -> Self {
		Self::Multi {
			provider,
			part: None,
		}
	}

	/// A source declaring its own models that also has part-level save hooks.
	pub fn multi_part(provider: Rc<dyn SaveablesSource>, part: Rc<dyn SaveablePart>) -> Self {
		Self::Multi {
			provider,
			part: Some(part),
		}
	}

	/// A source saved as one implicit unit.
	pub fn single(part: Rc<dyn SaveablePart>) -> Self {
		Self::Single(part)
	}
}

/// Whether a source is a UI part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
	/// A UI part; takes part in close prompting.
	Part,
	/// Anything else; tracked for enumeration only.
	NonPart,
}

struct SourceInner {
	id: SourceId,
	label: String,
	role: SourceRole,
	capability: SaveCapability,
	/// Built once so `Single` sources always report the same instance.
	default_saveable: Option<SaveableRef>,
}

/// Shared handle to an owner of saveables, compared by [`SourceId`].
#[derive(Clone)]
pub struct Source {
	inner: Rc<SourceInner>,
}

impl Source {
	/// Creates a UI part source.
	pub fn part(label: impl Into<String>, capability: SaveCapability) -> Self {
		Self::new(label, SourceRole::Part, capability)
	}

	/// Creates a non-part source backed by a model provider.
	pub fn non_part(label: impl Into<String>, provider: Rc<dyn SaveablesSource>) -> Self {
		Self::new(label, SourceRole::NonPart, SaveCapability::multi(provider))
	}

	/// Creates a source with a fresh [`SourceId`].
	pub fn new(label: impl Into<String>, role: SourceRole, capability: SaveCapability) -> Self {
		let label = label.into();
		let id = SourceId::next();
		let default_saveable = match &capability {
			SaveCapability::Single(part) => Some(SaveableRef::new(DefaultSaveable::new(
				id,
				Rc::clone(part),
			))),
			_ => None,
		};
		Self {
			inner: Rc::new(SourceInner {
				id,
				label,
				role,
				capability,
				default_saveable,
			}),
		}
	}

	/// Unique identity of this source.
	pub fn id(&self) -> SourceId {
		self.inner.id
	}

	/// Label used in logs and diagnostics.
	pub fn label(&self) -> &str {
		&self.inner.label
	}

	/// Part or non-part.
	pub fn role(&self) -> SourceRole {
		self.inner.role
	}

	/// Returns true for UI parts.
	pub fn is_part(&self) -> bool {
		self.inner.role == SourceRole::Part
	}

	/// The capability recorded at construction.
	pub fn capability(&self) -> &SaveCapability {
		&self.inner.capability
	}

	/// The models this source currently displays.
	pub fn saveables(&self) -> Vec<SaveableRef> {
		match &self.inner.capability {
			SaveCapability::Multi { provider, .. } => provider.saveables(),
			SaveCapability::Single(_) => self.inner.default_saveable.iter().cloned().collect(),
			SaveCapability::Opaque => Vec::new(),
		}
	}

	/// The models relevant to the source's current selection.
	pub fn active_saveables(&self) -> Vec<SaveableRef> {
		match &self.inner.capability {
			SaveCapability::Multi { provider, .. } => provider.active_saveables(),
			_ => self.saveables(),
		}
	}

	/// The part-level save hooks, if the source has them.
	pub fn saveable_part(&self) -> Option<&Rc<dyn SaveablePart>> {
		match &self.inner.capability {
			SaveCapability::Multi { part, .. } => part.as_ref(),
			SaveCapability::Single(part) => Some(part),
			SaveCapability::Opaque => None,
		}
	}
}

impl PartialEq for Source {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl Eq for Source {}

impl Hash for Source {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for Source {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Source")
			.field("id", &self.inner.id)
			.field("label", &self.inner.label)
			.field("role", &self.inner.role)
			.finish()
	}
}
