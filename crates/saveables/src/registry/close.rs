//! Two-phase close of a batch of parts, and the save prompt decisions.
//!
//! [`SaveablesRegistry::pre_close_parts`] simulates the close on a private
//! count table, works out which models would disappear, and asks the user
//! about the dirty ones. Nothing in the registry changes until
//! [`SaveablesRegistry::post_close`] commits the returned [`PostCloseInfo`].

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::{debug, info, warn};

use super::{ModelSet, RefCounts, SaveablesRegistry};
use crate::error::SaveError;
use crate::event::LifecycleEvent;
use crate::prompt::{Page, PromptDecision, PromptRequest};
use crate::saveable::{SaveMonitor, SaveableRef};
use crate::source::{CloseResponse, Source};

/// Accounting computed by [`SaveablesRegistry::pre_close_parts`], consumed by
/// [`SaveablesRegistry::post_close`].
#[derive(Debug, Default)]
#[must_use = "a proposed close must be committed with `post_close`"]
pub struct PostCloseInfo {
	parts_closing: IndexSet<Source, FxBuildHasher>,
	models_decrementing: RefCounts<SaveableRef>,
	models_closing: ModelSet,
}

impl PostCloseInfo {
	/// Every part in the batch, including parts exempted from prompting.
	pub fn parts_closing(&self) -> impl Iterator<Item = &Source> {
		self.parts_closing.iter()
	}

	/// How many references the batch drops from each model.
	pub fn models_decrementing(&self) -> &RefCounts<SaveableRef> {
		&self.models_decrementing
	}

	/// Models whose every reference belongs to the batch.
	pub fn models_closing(&self) -> impl Iterator<Item = &SaveableRef> {
		self.models_closing.iter()
	}
}

/// Outcome of the propose phase.
#[derive(Debug)]
#[must_use]
pub enum PreClose {
	/// The batch may close; commit with [`SaveablesRegistry::post_close`].
	Proceed(PostCloseInfo),
	/// The user cancelled; the whole batch must stay open.
	Cancelled,
}

impl PreClose {
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

impl SaveablesRegistry {
	/// Proposes closing `parts` as one operation.
	///
	/// With `save` set, parts whose `is_save_on_close_needed` is false are left
	/// out of the prompt accounting, parts may answer their own prompt through
	/// `prompt_to_save_on_close`, and the user is asked about dirty models:
	/// first those that stay open in another part (optional), then those that
	/// would close (mandatory). Cancelling at any step cancels the whole batch.
	///
	/// Reference counts are never modified here.
	pub fn pre_close_parts(
		&mut self,
		parts: &[Source],
		save: bool,
		page: Option<&dyn Page>,
	) -> Result<PreClose, SaveError> {
		let mut info = PostCloseInfo::default();
		for part in parts {
			if !info.parts_closing.insert(part.clone()) {
				continue;
			}
			if save {
				if let Some(hooks) = part.saveable_part() {
					if !hooks.is_save_on_close_needed() {
						continue;
					}
					match hooks.prompt_to_save_on_close() {
						CloseResponse::Default => {}
						CloseResponse::No => continue,
						CloseResponse::Cancel => {
							debug!(part = part.label(), "Close cancelled by part");
							return Ok(PreClose::Cancelled);
						}
						CloseResponse::Yes => {
							let monitor = SaveMonitor::new();
							hooks.do_save(&monitor)?;
							if monitor.is_cancelled() {
								return Ok(PreClose::Cancelled);
							}
							continue;
						}
					}
				}
			}
			if let Some(models) = self.model_map.get(part) {
				for model in models {
					info.models_decrementing.increment(model.clone());
				}
			}
		}

		info.models_closing = self.models_closing(&info.models_decrementing);
		debug!(
			parts = info.parts_closing.len(),
			decrementing = info.models_decrementing.len(),
			closing = info.models_closing.len(),
			"Proposed close"
		);

		if save
			&& self.prompt_for_saving_if_necessary(
				page,
				&info.models_closing,
				&info.models_decrementing,
				true,
			)? {
			return Ok(PreClose::Cancelled);
		}
		Ok(PreClose::Proceed(info))
	}

	/// Commits a proposed close once the parts have been torn down.
	///
	/// Drops every association held by the closing parts and fires a single
	/// `PostClose`, from [`SaveablesRegistry::source`], carrying each model
	/// that is no longer displayed anywhere. Returns those models.
	pub fn post_close(&mut self, info: PostCloseInfo) -> Vec<SaveableRef> {
		let mut removed = ModelSet::default();
		for part in &info.parts_closing {
			let Some(models) = self.model_map.get(part) else {
				continue;
			};
			let models: Vec<SaveableRef> = models.iter().cloned().collect();
			for model in models {
				if self.remove_model(part, &model) {
					removed.insert(model);
				}
			}
		}

		let removed: Vec<SaveableRef> = removed.into_iter().collect();
		if !removed.is_empty() {
			debug!(count = removed.len(), "Models closed by batch");
			self.fire(&LifecycleEvent::post_close(self.source.clone(), removed.clone()));
		}
		removed
	}

	/// Models for which `decrementing` accounts for every live reference.
	pub(super) fn models_closing(&self, decrementing: &RefCounts<SaveableRef>) -> ModelSet {
		decrementing
			.iter()
			.filter(|(model, count)| *count == self.ref_counts.count(model))
			.map(|(model, _)| model.clone())
			.collect()
	}

	/// Prompts for the dirty models among `decrementing`; returns true if the
	/// user cancelled.
	pub(super) fn prompt_for_saving_if_necessary(
		&mut self,
		page: Option<&dyn Page>,
		closing: &ModelSet,
		decrementing: &RefCounts<SaveableRef>,
		can_cancel: bool,
	) -> Result<bool, SaveError> {
		let optional: Vec<SaveableRef> = decrementing
			.keys()
			.filter(|model| model.is_dirty() && !closing.contains(*model))
			.cloned()
			.collect();
		if self.prompt_for_saving(&optional, page, can_cancel, true)? {
			return Ok(true);
		}

		let mandatory: Vec<SaveableRef> = closing
			.iter()
			.filter(|model| model.is_dirty())
			.cloned()
			.collect();
		self.prompt_for_saving(&mandatory, page, can_cancel, false)
	}

	fn prompt_for_saving(
		&mut self,
		models: &[SaveableRef],
		page: Option<&dyn Page>,
		can_cancel: bool,
		still_open_elsewhere: bool,
	) -> Result<bool, SaveError> {
		if models.is_empty() {
			return Ok(false);
		}
		if still_open_elsewhere && !self.config.prompt_when_still_open {
			debug!(count = models.len(), "Skipping prompt for models still open elsewhere");
			return Ok(false);
		}
		if let ([model], Some(page)) = (models, page) {
			model.show_in(page);
		}

		let request = PromptRequest {
			models,
			can_cancel,
			still_open_elsewhere,
		};
		let response = self.prompter.prompt(&request);

		if still_open_elsewhere && response.stop_prompting_when_still_open {
			info!("Disabled prompting for models still open elsewhere");
			self.config.prompt_when_still_open = false;
		}

		match response.decision {
			PromptDecision::Discard => Ok(false),
			PromptDecision::Cancel if can_cancel => Ok(true),
			PromptDecision::Cancel => {
				warn!("Save prompt cancelled a close that cannot be cancelled; closing without saving");
				Ok(false)
			}
			PromptDecision::Save(selection) => {
				let selected: Vec<SaveableRef> = models
					.iter()
					.filter(|model| selection.contains(model))
					.cloned()
					.collect();
				self.save_models(&selected, can_cancel)
			}
		}
	}

	/// Saves each distinct model once; returns true if a save cancelled the batch.
	fn save_models(&self, models: &[SaveableRef], can_cancel: bool) -> Result<bool, SaveError> {
		let monitor = SaveMonitor::new();
		for model in models {
			if !model.is_dirty() {
				continue;
			}
			debug!(model = %model.key(), "Saving model");
			model.do_save(&monitor)?;
			if monitor.is_cancelled() {
				if can_cancel {
					return Ok(true);
				}
				warn!(model = %model.key(), "Save cancelled during a close that cannot be cancelled");
				return Ok(false);
			}
		}
		Ok(false)
	}
}
