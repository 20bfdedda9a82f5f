//! Workbench session for canopy.
//!
//! A [`Workbench`] hosts parts on a [`WorkbenchPage`], owns the
//! [`SaveablesRegistry`] that tracks which models those parts display, and
//! persists the registry's preferences between sessions.
//!
//! Closing goes through the registry's two-phase protocol: the save prompt
//! runs before any part is torn down, and a cancelled prompt leaves both the
//! page and the registry exactly as they were.
//!
//! ```ignore
//! let mut workbench = Workbench::load(&path, prompter)?;
//! workbench.open_part(editor.clone())?;
//! if !workbench.close_parts(&[editor.id()], true)? {
//!     // user cancelled
//! }
//! workbench.save_preferences()?;
//! ```

pub mod error;
pub mod page;
pub mod preferences;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use canopy_saveables::{
	LifecycleEvent, Page, PreClose, SavePrompter, SaveableRef, SaveablesConfig, SaveablesRegistry,
	Source, SourceId,
};
use tracing::{debug, info};

pub use crate::error::{Result, WorkbenchError};
pub use crate::page::WorkbenchPage;

/// A running workbench session.
pub struct Workbench {
	registry: SaveablesRegistry,
	page: Rc<WorkbenchPage>,
	/// Open sources that are not hosted on the page.
	non_parts: Vec<Source>,
	preferences_path: Option<PathBuf>,
	/// Preferences as last read from or written to disk.
	stored_config: SaveablesConfig,
}

impl Workbench {
	/// Starts a session with in-memory preferences.
	pub fn new(config: SaveablesConfig, prompter: Rc<dyn SavePrompter>) -> Self {
		let page = WorkbenchPage::new();
		let mut registry = SaveablesRegistry::with_config(config.clone(), prompter);
		registry.set_active_page(Some(Rc::clone(&page) as Rc<dyn Page>));
		Self {
			registry,
			page,
			non_parts: Vec::new(),
			preferences_path: None,
			stored_config: config,
		}
	}

	/// Starts a session with preferences read from `path`; a missing file
	/// yields defaults and is created by [`save_preferences`](Self::save_preferences).
	pub fn load(path: impl AsRef<Path>, prompter: Rc<dyn SavePrompter>) -> Result<Self> {
		let path = path.as_ref();
		let config = preferences::load(path)?;
		let mut workbench = Self::new(config, prompter);
		workbench.preferences_path = Some(path.to_path_buf());
		Ok(workbench)
	}

	/// Starts a session with preferences from the platform config directory,
	/// or in-memory defaults if there is none.
	pub fn load_default(prompter: Rc<dyn SavePrompter>) -> Result<Self> {
		match preferences::default_path() {
			Some(path) => Self::load(path, prompter),
			None => Ok(Self::new(SaveablesConfig::default(), prompter)),
		}
	}

	pub fn registry(&self) -> &SaveablesRegistry {
		&self.registry
	}

	/// Mutable registry access, for subscribing listeners and the like.
	pub fn registry_mut(&mut self) -> &mut SaveablesRegistry {
		&mut self.registry
	}

	pub fn page(&self) -> &Rc<WorkbenchPage> {
		&self.page
	}

	pub fn preferences_path(&self) -> Option<&Path> {
		self.preferences_path.as_deref()
	}

	/// Opens a source and registers the models it displays.
	///
	/// Parts are hosted on the page. Other sources only count towards the
	/// registry's non-part set, and are remembered for as long as the registry
	/// lists them.
	pub fn open_part(&mut self, source: Source) -> Result<()> {
		if source.is_part() {
			self.page.add(source.clone());
		} else if !self.non_parts.contains(&source) {
			self.non_parts.push(source.clone());
		}
		debug!(source = source.label(), part = source.is_part(), "Opening source");
		let models = source.saveables();
		self.registry
			.handle_lifecycle_event(&LifecycleEvent::post_open(source.clone(), models))?;
		self.forget_if_closed(&source);
		Ok(())
	}

	/// Registers models an already open source has started displaying.
	///
	/// Returns the models that were not open anywhere before.
	pub fn open_models(&mut self, id: SourceId, models: &[SaveableRef]) -> Result<Vec<SaveableRef>> {
		let source = self.source(id)?;
		if !source.is_part() {
			self.registry.update_non_part_source(&source);
			self.forget_if_closed(&source);
			return Ok(Vec::new());
		}
		Ok(self.registry.add_models(&source, models))
	}

	/// Registered models the active part reports as active.
	pub fn active_models(&self) -> Vec<SaveableRef> {
		self.page
			.active_part()
			.map(|part| self.registry.active_models_for_source(&part))
			.unwrap_or_default()
	}

	/// Closes parts as one batch.
	///
	/// Returns `Ok(false)` if the user cancelled, in which case every part
	/// stays open. A failed save is returned as an error and also keeps every
	/// part open.
	pub fn close_parts(&mut self, ids: &[SourceId], save: bool) -> Result<bool> {
		let parts = ids
			.iter()
			.map(|&id| self.page.get(id).ok_or(WorkbenchError::UnknownPart(id)))
			.collect::<Result<Vec<_>>>()?;
		if parts.is_empty() {
			return Ok(true);
		}

		let page = Rc::clone(&self.page) as Rc<dyn Page>;
		let info = match self.registry.pre_close_parts(&parts, save, Some(&*page))? {
			PreClose::Proceed(info) => info,
			PreClose::Cancelled => {
				info!(parts = parts.len(), "Close cancelled");
				return Ok(false);
			}
		};

		for part in info.parts_closing() {
			self.page.remove(part.id());
		}
		let closed = self.registry.post_close(info);
		debug!(parts = parts.len(), models = closed.len(), "Closed parts");
		Ok(true)
	}

	/// Closes every part on the page as one batch.
	pub fn close_all_parts(&mut self, save: bool) -> Result<bool> {
		let ids: Vec<SourceId> = self.page.parts().iter().map(Source::id).collect();
		self.close_parts(&ids, save)
	}

	/// Closes some models of an open source while the source stays open.
	///
	/// Listeners and then the user may veto unless `force` is set; returns
	/// `Ok(false)` when vetoed. A non-part source that no longer reports any
	/// saveable is forgotten afterwards.
	pub fn close_models(&mut self, id: SourceId, models: &[SaveableRef], force: bool) -> Result<bool> {
		let source = self.source(id)?;
		let pre_close = LifecycleEvent::pre_close(source.clone(), models.to_vec(), force);
		self.registry.handle_lifecycle_event(&pre_close)?;
		if pre_close.is_vetoed() {
			info!(source = source.label(), "Closing models vetoed");
			return Ok(false);
		}
		self.registry
			.handle_lifecycle_event(&LifecycleEvent::post_close(source.clone(), models.to_vec()))?;
		self.forget_if_closed(&source);
		Ok(true)
	}

	/// Reports a change in the dirty state of a source's models.
	pub fn part_dirty_changed(&mut self, id: SourceId) -> Result<()> {
		let source = self.source(id)?;
		let models = source.saveables();
		self.registry
			.handle_lifecycle_event(&LifecycleEvent::dirty_changed(source.clone(), models))?;
		self.forget_if_closed(&source);
		Ok(())
	}

	/// Writes the live preferences if they changed since they were loaded or
	/// last written. Returns true if the file was written.
	///
	/// Sessions created with [`new`](Self::new) have no preferences file and
	/// never write.
	pub fn save_preferences(&mut self) -> Result<bool> {
		let Some(path) = &self.preferences_path else {
			return Ok(false);
		};
		let config = self.registry.config();
		if *config == self.stored_config {
			return Ok(false);
		}
		preferences::store(path, config)?;
		self.stored_config = config.clone();
		Ok(true)
	}

	/// Drops a non-part source once the registry no longer lists it.
	fn forget_if_closed(&mut self, source: &Source) {
		if source.is_part() || self.registry.non_part_sources().contains(source) {
			return;
		}
		if let Some(index) = self.non_parts.iter().position(|known| known == source) {
			self.non_parts.remove(index);
			debug!(source = source.label(), "Forgot non-part source without saveables");
		}
	}

	fn source(&self, id: SourceId) -> Result<Source> {
		self.page
			.get(id)
			.or_else(|| self.non_parts.iter().find(|source| source.id() == id).cloned())
			.ok_or(WorkbenchError::UnknownPart(id))
	}
}
