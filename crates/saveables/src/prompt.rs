//! Boundary to the save-prompt UI.
//!
//! The registry decides *which* models need a decision; rendering the dialog
//! is left to a [`SavePrompter`] supplied by the embedding UI. The call is
//! treated as synchronous and modal: the registry mutates nothing while a
//! prompt is open.

use crate::saveable::SaveableRef;
use crate::source::SourceId;

/// A surface that can bring a part to the front.
pub trait Page {
	/// Activates the part owning `source`; returns false if it is not hosted here.
	fn reveal(&self, source: SourceId) -> bool;
}

/// Models the user is being asked about.
#[derive(Debug, Clone, Copy)]
pub struct PromptRequest<'a> {
	/// Distinct dirty models, in the order they were collected.
	pub models: &'a [SaveableRef],
	/// Whether a cancel button may be offered.
	pub can_cancel: bool,
	/// True when every model stays open in a part outside the closing batch,
	/// so not saving now loses nothing yet.
	pub still_open_elsewhere: bool,
}

/// What the user decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptDecision {
	/// Save the listed models (a subset of the request).
	Save(Vec<SaveableRef>),
	/// Close without saving.
	Discard,
	/// Abort the operation.
	Cancel,
}

/// The prompter's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptResponse {
	/// The decision itself.
	pub decision: PromptDecision,
	/// "Don't ask again" for models that stay open elsewhere.
	pub stop_prompting_when_still_open: bool,
}

impl PromptResponse {
	/// Saves every model in the request.
	pub fn save_all(request: &PromptRequest<'_>) -> Self {
		Self::from(PromptDecision::Save(request.models.to_vec()))
	}

	/// Saves the given selection.
	pub fn save(models: Vec<SaveableRef>) -> Self {
		Self::from(PromptDecision::Save(models))
	}

	/// Closes without saving.
	pub fn discard() -> Self {
		Self::from(PromptDecision::Discard)
	}

	/// Aborts the operation.
	pub fn cancel() -> Self {
		Self::from(PromptDecision::Cancel)
	}

	/// Sets the "don't ask again" toggle.
	pub fn with_stop_prompting(mut self) -> Self {
		self.stop_prompting_when_still_open = true;
		self
	}
}

impl From<PromptDecision> for PromptResponse {
	fn from(decision: PromptDecision) -> Self {
		Self {
			decision,
			stop_prompting_when_still_open: false,
		}
	}
}

/// Renders the save prompt and returns the user's decision.
pub trait SavePrompter {
	/// Asks the user about `request.models`.
	fn prompt(&self, request: &PromptRequest<'_>) -> PromptResponse;
}
