//! Preferences persisted across sessions.

use std::fs;
use std::rc::Rc;

use canopy_saveables::test_support::{Fallback, TestSaveable};
use canopy_saveables::{ListenerFailurePolicy, PromptResponse, SavePrompter, SaveablesConfig};
use canopy_workbench::preferences::FILE_NAME;
use canopy_workbench::{Workbench, WorkbenchError};

use crate::common::{init_tracing, part_showing, prompter, workbench};

#[test]
fn missing_file_starts_with_defaults_and_writes_nothing() -> anyhow::Result<()> {
	init_tracing();
	let dir = tempfile::tempdir()?;
	let path = dir.path().join(FILE_NAME);
	let prompter: Rc<dyn SavePrompter> = prompter(Fallback::Discard);

	let mut workbench = Workbench::load(&path, prompter)?;

	assert_eq!(workbench.registry().config(), &SaveablesConfig::default());
	assert_eq!(workbench.preferences_path(), Some(path.as_path()));
	assert!(!workbench.save_preferences()?);
	assert!(!path.exists());
	Ok(())
}

#[test]
fn dont_ask_again_survives_restart() -> anyhow::Result<()> {
	init_tracing();
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("canopy").join(FILE_NAME);
	let scripted = prompter(Fallback::Discard);
	scripted.push(PromptResponse::discard().with_stop_prompting());

	let mut first = Workbench::load(&path, scripted.clone())?;
	let m = TestSaveable::dirty("shared.txt");
	let p1 = part_showing("p1", &[&m]);
	let p2 = part_showing("p2", &[&m]);
	first.open_part(p1.clone())?;
	first.open_part(p2)?;
	assert!(first.close_parts(&[p1.id()], true)?);

	assert!(first.save_preferences()?);
	assert!(!first.save_preferences()?);

	let second = Workbench::load(&path, scripted)?;
	assert!(!second.registry().config().prompt_when_still_open);
	Ok(())
}

#[test]
fn loaded_preferences_configure_the_registry() -> anyhow::Result<()> {
	init_tracing();
	let dir = tempfile::tempdir()?;
	let path = dir.path().join(FILE_NAME);
	fs::write(&path, "listener-failures = \"stop\"\n")?;

	let workbench = Workbench::load(&path, prompter(Fallback::Discard))?;

	let config = workbench.registry().config();
	assert_eq!(config.listener_failures, ListenerFailurePolicy::StopPropagation);
	assert!(config.prompt_when_still_open);
	Ok(())
}

#[test]
fn malformed_preferences_fail_to_load() {
	init_tracing();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join(FILE_NAME);
	fs::write(&path, "prompt-when-still-open = [").unwrap();

	let result = Workbench::load(&path, prompter(Fallback::Discard));

	assert!(matches!(result, Err(WorkbenchError::Config(_))));
}

#[test]
fn in_memory_session_never_writes() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let mut config = workbench.registry().config().clone();
	config.prompt_when_still_open = false;
	workbench.registry_mut().set_config(config);

	assert_eq!(workbench.preferences_path(), None);
	assert!(!workbench.save_preferences().unwrap());
}
