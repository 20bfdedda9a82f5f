//! The [`SaveablesRegistry`]: which sources display which models, and how
//! many sources reference each model.
//!
//! # Invariants
//!
//! 1. `ref_count(m)` equals the number of sources whose model set contains `m`.
//! 2. A model is a key of the count table only while its count is at least one.
//! 3. A `(source, model)` pair is registered at most once.
//!
//! Mutations live in `models` (open/close bookkeeping and event routing) and
//! `close` (the two-phase batch close and prompt decisions).

mod close;
mod models;
mod refcount;

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

pub use self::close::{PostCloseInfo, PreClose};
pub use self::refcount::RefCounts;
use crate::config::SaveablesConfig;
use crate::event::LifecycleEvent;
use crate::listener::{ListenerId, ListenerList};
use crate::prompt::{Page, SavePrompter};
use crate::saveable::SaveableRef;
use crate::source::{SaveCapability, Source, SourceRole};

type ModelSet = IndexSet<SaveableRef, FxBuildHasher>;

/// Tracks open saveables across sources and drives save prompting on close.
///
/// Constructed explicitly and owned by the session that hosts the parts; there
/// is no process-wide instance.
pub struct SaveablesRegistry {
	source: Source,
	model_map: IndexMap<Source, ModelSet, FxBuildHasher>,
	ref_counts: RefCounts<SaveableRef>,
	non_part_sources: IndexSet<Source, FxBuildHasher>,
	listeners: ListenerList,
	config: SaveablesConfig,
	prompter: Rc<dyn SavePrompter>,
	active_page: Option<Rc<dyn Page>>,
}

impl SaveablesRegistry {
	/// Creates an empty registry with default preferences.
	pub fn new(prompter: Rc<dyn SavePrompter>) -> Self {
		Self::with_config(SaveablesConfig::default(), prompter)
	}

	/// Creates an empty registry with the given preferences.
	pub fn with_config(config: SaveablesConfig, prompter: Rc<dyn SavePrompter>) -> Self {
		Self {
			source: Source::new("saveables-registry", SourceRole::NonPart, SaveCapability::Opaque),
			model_map: IndexMap::default(),
			ref_counts: RefCounts::new(),
			non_part_sources: IndexSet::default(),
			listeners: ListenerList::default(),
			config,
			prompter,
			active_page: None,
		}
	}

	/// The source named on events the registry raises itself, such as the
	/// batch `PostClose` from [`post_close`](Self::post_close).
	pub fn source(&self) -> &Source {
		&self.source
	}

	/// Live preferences, including changes made from prompts.
	pub fn config(&self) -> &SaveablesConfig {
		&self.config
	}

	/// Replaces the preferences.
	pub fn set_config(&mut self, config: SaveablesConfig) {
		self.config = config;
	}

	/// Page used to reveal models while prompting for lifecycle events.
	pub fn set_active_page(&mut self, page: Option<Rc<dyn Page>>) {
		self.active_page = page;
	}

	/// Subscribes to lifecycle events. Listeners run synchronously in
	/// registration order, after the registry has applied the change
	/// (`PreClose` excepted, which is delivered before anything happens).
	pub fn add_model_lifecycle_listener(
		&mut self,
		listener: impl Fn(&LifecycleEvent) -> anyhow::Result<()> + 'static,
	) -> ListenerId {
		self.listeners.add(Rc::new(listener))
	}

	/// Unsubscribes; returns false if `id` was not subscribed.
	pub fn remove_model_lifecycle_listener(&mut self, id: ListenerId) -> bool {
		self.listeners.remove(id)
	}

	/// Number of subscribed listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	fn fire(&self, event: &LifecycleEvent) {
		self.listeners.fire(event, self.config.listener_failures);
	}

	/// Snapshot of every distinct open model, in first-opened order.
	pub fn open_models(&self) -> Vec<SaveableRef> {
		let mut open = ModelSet::default();
		for models in self.model_map.values() {
			open.extend(models.iter().cloned());
		}
		open.into_iter().collect()
	}

	/// Number of sources currently displaying `model`.
	pub fn ref_count(&self, model: &SaveableRef) -> usize {
		self.ref_counts.count(model)
	}

	/// Returns true while at least one source displays `model`.
	pub fn is_open(&self, model: &SaveableRef) -> bool {
		self.ref_counts.contains(model)
	}

	/// Models registered for `source`.
	pub fn models_for_source(&self, source: &Source) -> Vec<SaveableRef> {
		self.model_map
			.get(source)
			.map(|models| models.iter().cloned().collect())
			.unwrap_or_default()
	}

	/// Registered models of `source` that it reports as active, in the order
	/// the source reports them.
	pub fn active_models_for_source(&self, source: &Source) -> Vec<SaveableRef> {
		let Some(models) = self.model_map.get(source) else {
			return Vec::new();
		};
		source
			.active_saveables()
			.into_iter()
			.filter(|model| models.contains(model))
			.collect()
	}

	/// Non-part sources that currently report at least one saveable.
	pub fn non_part_sources(&self) -> Vec<Source> {
		self.non_part_sources.iter().cloned().collect()
	}

	/// UI parts currently displaying `model`.
	pub fn parts_for_saveable(&self, model: &SaveableRef) -> Vec<Source> {
		self.model_map
			.iter()
			.filter(|(source, models)| source.is_part() && models.contains(model))
			.map(|(source, _)| source.clone())
			.collect()
	}

	/// Every source with `model` registered, parts or not. Diagnostic.
	pub fn sources_for_model(&self, model: &SaveableRef) -> Vec<Source> {
		self.model_map
			.iter()
			.filter(|(_, models)| models.contains(model))
			.map(|(source, _)| source.clone())
			.collect()
	}
}
