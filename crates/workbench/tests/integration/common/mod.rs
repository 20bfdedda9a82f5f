//! Common utilities for workbench integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use canopy_saveables::test_support::{Fallback, ScriptedPrompter, TestSaveable, TestSaveables};
use canopy_saveables::{
	PromptRequest, PromptResponse, SaveCapability, SavePrompter, SaveablesConfig, Source, SourceId,
};
use canopy_workbench::{Workbench, WorkbenchPage};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A session with default preferences answered by `prompter`.
pub fn workbench(prompter: &Rc<ScriptedPrompter>) -> Workbench {
	init_tracing();
	let prompter: Rc<dyn SavePrompter> = prompter.clone();
	Workbench::new(SaveablesConfig::default(), prompter)
}

pub fn prompter(fallback: Fallback) -> Rc<ScriptedPrompter> {
	ScriptedPrompter::new(fallback)
}

/// A multi-model part displaying `models`.
pub fn part_showing(label: &str, models: &[&TestSaveable]) -> Source {
	let provider = TestSaveables::new(models.iter().map(|model| model.handle()));
	Source::part(label, SaveCapability::multi(provider))
}

/// Prompter that records which part the page had active when asked, then
/// discards.
#[derive(Default)]
pub struct ActivePartProbe {
	page: RefCell<Option<Rc<WorkbenchPage>>>,
	seen: RefCell<Vec<Option<SourceId>>>,
}

impl ActivePartProbe {
	pub fn new() -> Rc<Self> {
		Rc::default()
	}

	pub fn watch(&self, page: &Rc<WorkbenchPage>) {
		*self.page.borrow_mut() = Some(Rc::clone(page));
	}

	pub fn seen(&self) -> Vec<Option<SourceId>> {
		self.seen.borrow().clone()
	}
}

impl SavePrompter for ActivePartProbe {
	fn prompt(&self, _request: &PromptRequest<'_>) -> PromptResponse {
		let active = self
			.page
			.borrow()
			.as_ref()
			.and_then(|page| page.active_part())
			.map(|part| part.id());
		self.seen.borrow_mut().push(active);
		PromptResponse::discard()
	}
}
