//! Test doubles for saveables, parts, prompts and listeners.
//!
//! Compiled for this crate's tests and, through the `test-support` feature,
//! for downstream crates' tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::SaveError;
use crate::event::{LifecycleEvent, LifecycleEventKind};
use crate::prompt::{Page, PromptRequest, PromptResponse, SavePrompter};
use crate::saveable::{SaveMonitor, Saveable, SaveableKey, SaveableRef};
use crate::source::{CloseResponse, SaveablePart, SaveablesSource, SourceId};

#[derive(Default)]
struct ModelState {
	dirty: Cell<bool>,
	saves: Cell<usize>,
	shown: Cell<usize>,
	cancel_on_save: Cell<bool>,
	failure: RefCell<Option<String>>,
}

/// In-memory model keyed by name.
///
/// Clones share state, so every [`handle`](Self::handle) is a distinct
/// instance of the same model.
#[derive(Clone)]
pub struct TestSaveable {
	name: String,
	state: Rc<ModelState>,
}

impl TestSaveable {
	/// A clean model.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_string(),
			state: Rc::default(),
		}
	}

	/// A dirty model.
	pub fn dirty(name: &str) -> Self {
		let model = Self::new(name);
		model.set_dirty(true);
		model
	}

	/// A fresh handle wrapping a new instance that shares this model's state.
	pub fn handle(&self) -> SaveableRef {
		SaveableRef::new(self.clone())
	}

	pub fn set_dirty(&self, dirty: bool) {
		self.state.dirty.set(dirty);
	}

	/// Number of successful `do_save` calls.
	pub fn save_count(&self) -> usize {
		self.state.saves.get()
	}

	/// Number of `show_in` calls.
	pub fn show_count(&self) -> usize {
		self.state.shown.get()
	}

	/// Makes the next saves fail with `reason`.
	pub fn fail_saves_with(&self, reason: &str) {
		*self.state.failure.borrow_mut() = Some(reason.to_string());
	}

	/// Makes the next save cancel its monitor instead of saving.
	pub fn cancel_on_save(&self) {
		self.state.cancel_on_save.set(true);
	}
}

impl Saveable for TestSaveable {
	fn key(&self) -> SaveableKey {
		SaveableKey::resource(&self.name)
	}

	fn name(&self) -> String {
		self.name.clone()
	}

	fn tool_tip(&self) -> String {
		format!("memory://{}", self.name)
	}

	fn is_dirty(&self) -> bool {
		self.state.dirty.get()
	}

	fn do_save(&self, monitor: &SaveMonitor) -> Result<(), SaveError> {
		if self.state.cancel_on_save.get() {
			monitor.cancel();
			return Ok(());
		}
		if let Some(reason) = self.state.failure.borrow().as_ref() {
			return Err(SaveError::failed(&self.name, reason.clone()));
		}
		self.state.saves.set(self.state.saves.get() + 1);
		self.state.dirty.set(false);
		Ok(())
	}

	fn show_in(&self, _page: &dyn Page) -> bool {
		self.state.shown.set(self.state.shown.get() + 1);
		true
	}
}

/// Mutable list of models for multi-model sources.
#[derive(Default)]
pub struct TestSaveables {
	models: RefCell<Vec<SaveableRef>>,
	active: RefCell<Option<Vec<SaveableRef>>>,
}

impl TestSaveables {
	pub fn new(models: impl IntoIterator<Item = SaveableRef>) -> Rc<Self> {
		Rc::new(Self {
			models: RefCell::new(models.into_iter().collect()),
			active: RefCell::default(),
		})
	}

	/// Replaces the reported models.
	pub fn set(&self, models: impl IntoIterator<Item = SaveableRef>) {
		*self.models.borrow_mut() = models.into_iter().collect();
	}

	/// Narrows the active models; every model is active until this is called.
	pub fn set_active(&self, models: impl IntoIterator<Item = SaveableRef>) {
		*self.active.borrow_mut() = Some(models.into_iter().collect());
	}
}

impl SaveablesSource for TestSaveables {
	fn saveables(&self) -> Vec<SaveableRef> {
		self.models.borrow().clone()
	}

	fn active_saveables(&self) -> Vec<SaveableRef> {
		match self.active.borrow().as_ref() {
			Some(active) => active.clone(),
			None => self.saveables(),
		}
	}
}

/// Single-target part with scriptable save-on-close behaviour.
pub struct TestPart {
	title: String,
	dirty: Cell<bool>,
	saves: Cell<usize>,
	save_on_close: Cell<Option<bool>>,
	close_response: Cell<CloseResponse>,
}

impl TestPart {
	pub fn new(title: &str) -> Rc<Self> {
		Rc::new(Self {
			title: title.to_string(),
			dirty: Cell::new(false),
			saves: Cell::new(0),
			save_on_close: Cell::new(None),
			close_response: Cell::new(CloseResponse::Default),
		})
	}

	pub fn set_dirty(&self, dirty: bool) {
		self.dirty.set(dirty);
	}

	pub fn save_count(&self) -> usize {
		self.saves.get()
	}

	/// Overrides `is_save_on_close_needed`.
	pub fn set_save_on_close_needed(&self, needed: bool) {
		self.save_on_close.set(Some(needed));
	}

	/// Scripts `prompt_to_save_on_close`.
	pub fn set_close_response(&self, response: CloseResponse) {
		self.close_response.set(response);
	}
}

impl SaveablePart for TestPart {
	fn title(&self) -> String {
		self.title.clone()
	}

	fn is_dirty(&self) -> bool {
		self.dirty.get()
	}

	fn do_save(&self, _monitor: &SaveMonitor) -> Result<(), SaveError> {
		self.saves.set(self.saves.get() + 1);
		self.dirty.set(false);
		Ok(())
	}

	fn is_save_on_close_needed(&self) -> bool {
		self.save_on_close.get().unwrap_or_else(|| self.is_dirty())
	}

	fn prompt_to_save_on_close(&self) -> CloseResponse {
		self.close_response.get()
	}
}

/// What a [`ScriptedPrompter`] was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
	pub models: Vec<SaveableKey>,
	pub can_cancel: bool,
	pub still_open_elsewhere: bool,
}

/// Reply used once the script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
	SaveAll,
	Discard,
	Cancel,
}

/// Prompter that replays queued responses and records every request.
pub struct ScriptedPrompter {
	script: RefCell<VecDeque<PromptResponse>>,
	fallback: Cell<Fallback>,
	requests: RefCell<Vec<RecordedPrompt>>,
}

impl ScriptedPrompter {
	/// Answers every prompt with `fallback` unless a response is queued.
	pub fn new(fallback: Fallback) -> Rc<Self> {
		Rc::new(Self {
			script: RefCell::default(),
			fallback: Cell::new(fallback),
			requests: RefCell::default(),
		})
	}

	/// Queues a response for the next prompt.
	pub fn push(&self, response: PromptResponse) {
		self.script.borrow_mut().push_back(response);
	}

	pub fn set_fallback(&self, fallback: Fallback) {
		self.fallback.set(fallback);
	}

	pub fn requests(&self) -> Vec<RecordedPrompt> {
		self.requests.borrow().clone()
	}

	pub fn prompt_count(&self) -> usize {
		self.requests.borrow().len()
	}
}

impl SavePrompter for ScriptedPrompter {
	fn prompt(&self, request: &PromptRequest<'_>) -> PromptResponse {
		self.requests.borrow_mut().push(RecordedPrompt {
			models: request.models.iter().map(|model| model.key().clone()).collect(),
			can_cancel: request.can_cancel,
			still_open_elsewhere: request.still_open_elsewhere,
		});
		if let Some(response) = self.script.borrow_mut().pop_front() {
			return response;
		}
		match self.fallback.get() {
			Fallback::SaveAll => PromptResponse::save_all(request),
			Fallback::Discard => PromptResponse::discard(),
			Fallback::Cancel => PromptResponse::cancel(),
		}
	}
}

/// Page that records reveal requests.
#[derive(Default)]
pub struct TestPage {
	revealed: RefCell<Vec<SourceId>>,
}

impl TestPage {
	pub fn new() -> Rc<Self> {
		Rc::default()
	}

	pub fn revealed(&self) -> Vec<SourceId> {
		self.revealed.borrow().clone()
	}
}

impl Page for TestPage {
	fn reveal(&self, source: SourceId) -> bool {
		self.revealed.borrow_mut().push(source);
		true
	}
}

/// A delivered lifecycle event, reduced to comparable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
	pub kind: LifecycleEventKind,
	pub source: SourceId,
	pub models: Vec<SaveableKey>,
}

/// Shared log of delivered events.
#[derive(Clone, Default)]
pub struct EventLog {
	events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl EventLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// A listener that appends to this log.
	pub fn listener(&self) -> impl Fn(&LifecycleEvent) -> anyhow::Result<()> + 'static {
		let events = Rc::clone(&self.events);
		move |event: &LifecycleEvent| {
			events.borrow_mut().push(RecordedEvent {
				kind: event.kind(),
				source: event.source().id(),
				models: event.models().iter().map(|model| model.key().clone()).collect(),
			});
			Ok(())
		}
	}

	pub fn events(&self) -> Vec<RecordedEvent> {
		self.events.borrow().clone()
	}

	/// Events of one kind.
	pub fn of_kind(&self, kind: LifecycleEventKind) -> Vec<RecordedEvent> {
		self.events
			.borrow()
			.iter()
			.filter(|event| event.kind == kind)
			.cloned()
			.collect()
	}

	pub fn clear(&self) {
		self.events.borrow_mut().clear();
	}
}

/// Resource key shorthand for assertions.
pub fn key(name: &str) -> SaveableKey {
	SaveableKey::resource(name)
}
