//! Open/close bookkeeping and lifecycle event routing.

use tracing::{debug, trace, warn};

use super::{ModelSet, RefCounts, SaveablesRegistry};
use crate::error::SaveError;
use crate::event::{LifecycleEvent, LifecycleEventKind};
use crate::saveable::SaveableRef;
use crate::source::Source;

impl SaveablesRegistry {
	/// Entry point for sources reporting lifecycle changes.
	///
	/// Events from non-part sources only refresh the non-part source set. For
	/// parts, `PostOpen`/`PostClose` update the bookkeeping, `DirtyChanged` is
	/// re-broadcast from [`SaveablesRegistry::source`], and `PreClose` asks
	/// listeners and then the user; a cancellation sets
	/// [`LifecycleEvent::veto`] and changes nothing.
	///
	/// A forced `PreClose` ignores listener vetoes and cannot be cancelled
	/// from the prompt.
	///
	/// Errors come only from a model's own save during `PreClose`; the event
	/// is vetoed before the error is returned.
	pub fn handle_lifecycle_event(&mut self, event: &LifecycleEvent) -> Result<(), SaveError> {
		let source = event.source();
		if !source.is_part() {
			trace!(source = source.label(), kind = ?event.kind(), "Non-part lifecycle event");
			self.update_non_part_source(source);
			return Ok(());
		}

		match event.kind() {
			LifecycleEventKind::PostOpen => {
				self.add_models(source, event.models());
			}
			LifecycleEventKind::PostClose => {
				self.remove_models(source, event.models());
			}
			LifecycleEventKind::DirtyChanged => {
				let rebroadcast =
					LifecycleEvent::dirty_changed(self.source.clone(), event.models().to_vec());
				self.fire(&rebroadcast);
			}
			LifecycleEventKind::PreClose => {
				self.fire(event);
				if event.is_vetoed() {
					if !event.is_force() {
						debug!(source = source.label(), "Close vetoed by listener");
						return Ok(());
					}
					warn!(source = source.label(), "Ignored listener veto of a forced close");
					event.clear_veto();
				}

				let mut decrementing = RefCounts::new();
				for model in event.models() {
					decrementing.increment(model.clone());
				}
				let closing = self.models_closing(&decrementing);
				let page = self.active_page.clone();
				match self.prompt_for_saving_if_necessary(
					page.as_deref(),
					&closing,
					&decrementing,
					!event.is_force(),
				) {
					Ok(false) => {}
					Ok(true) => {
						debug!(source = source.label(), "Close cancelled from save prompt");
						event.veto();
					}
					Err(error) => {
						event.veto();
						return Err(error);
					}
				}
			}
		}
		Ok(())
	}

	/// Registers `models` for `source`.
	///
	/// Returns the models whose count went from zero to one; `PostOpen` is
	/// fired with exactly those. Pairs that are already registered are logged
	/// and skipped.
	pub fn add_models(&mut self, source: &Source, models: &[SaveableRef]) -> Vec<SaveableRef> {
		let mut opened = Vec::new();
		for model in models {
			if self.add_model(source, model) {
				opened.push(model.clone());
			}
		}
		if !opened.is_empty() {
			debug!(source = source.label(), count = opened.len(), "Models opened");
			self.fire(&LifecycleEvent::post_open(source.clone(), opened.clone()));
		}
		opened
	}

	/// Unregisters `models` from `source`.
	///
	/// Returns the models whose count reached zero; `PostClose` is fired with
	/// exactly those. Pairs that are not registered are logged and skipped.
	pub fn remove_models(&mut self, source: &Source, models: &[SaveableRef]) -> Vec<SaveableRef> {
		let mut closed = Vec::new();
		for model in models {
			if self.remove_model(source, model) {
				closed.push(model.clone());
			}
		}
		if !closed.is_empty() {
			debug!(source = source.label(), count = closed.len(), "Models closed");
			self.fire(&LifecycleEvent::post_close(source.clone(), closed.clone()));
		}
		closed
	}

	/// Re-broadcasts `DirtyChanged`, from [`SaveablesRegistry::source`], for
	/// every saveable `source` reports.
	pub fn dirty_changed(&self, source: &Source) {
		let models = source.saveables();
		if !models.is_empty() {
			self.fire(&LifecycleEvent::dirty_changed(self.source.clone(), models));
		}
	}

	/// Tracks `source` as a non-part source while it reports any saveable.
	pub fn update_non_part_source(&mut self, source: &Source) {
		if source.saveables().is_empty() {
			self.non_part_sources.shift_remove(source);
		} else {
			self.non_part_sources.insert(source.clone());
		}
	}

	/// Returns true if this made `model` newly open.
	pub(super) fn add_model(&mut self, source: &Source, model: &SaveableRef) -> bool {
		let models = self.model_map.entry(source.clone()).or_insert_with(ModelSet::default);
		if !models.insert(model.clone()) {
			warn!(
				source = source.label(),
				model = %model.key(),
				"Ignored attempt to add saveable that was already registered"
			);
			return false;
		}
		self.ref_counts.increment(model.clone())
	}

	/// Returns true if this made `model` fully closed.
	pub(super) fn remove_model(&mut self, source: &Source, model: &SaveableRef) -> bool {
		let Some(models) = self.model_map.get_mut(source) else {
			warn!(
				source = source.label(),
				model = %model.key(),
				"Ignored attempt to remove a saveable when no saveables were known"
			);
			return false;
		};
		if !models.shift_remove(model) {
			warn!(
				source = source.label(),
				model = %model.key(),
				"Ignored attempt to remove a saveable that was not registered"
			);
			return false;
		}
		if models.is_empty() {
			self.model_map.shift_remove(source);
		}
		self.ref_counts.decrement(model)
	}
}
