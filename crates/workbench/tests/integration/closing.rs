//! Closing parts and models through a workbench session.

use std::rc::Rc;

use canopy_saveables::test_support::{
	EventLog, Fallback, TestPart, TestSaveable, TestSaveables, key,
};
use canopy_saveables::{
	LifecycleEventKind, PromptResponse, SaveCapability, SavePrompter, SaveableRef, SaveablesConfig,
	Source, SourceId,
};
use canopy_workbench::{Workbench, WorkbenchError};

use crate::common::{ActivePartProbe, init_tracing, part_showing, prompter, workbench};

#[test]
fn cancelled_close_keeps_parts_and_models() {
	let prompter = prompter(Fallback::Cancel);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("notes.md");
	let part = part_showing("editor", &[&m]);
	workbench.open_part(part.clone()).unwrap();

	assert!(!workbench.close_parts(&[part.id()], true).unwrap());

	assert!(workbench.page().contains(part.id()));
	assert!(workbench.registry().is_open(&m.handle()));
	assert_eq!(m.save_count(), 0);
	assert_eq!(prompter.prompt_count(), 1);
}

#[test]
fn closing_one_of_two_parts_keeps_shared_model_open() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("shared.rs");
	let p1 = part_showing("left", &[&m]);
	let p2 = part_showing("right", &[&m]);
	workbench.open_part(p1.clone()).unwrap();
	workbench.open_part(p2.clone()).unwrap();

	assert!(workbench.close_parts(&[p1.id()], true).unwrap());

	let requests = prompter.requests();
	assert_eq!(requests.len(), 1);
	assert!(requests[0].still_open_elsewhere);
	assert_eq!(workbench.page().parts(), vec![p2.clone()]);
	assert_eq!(workbench.registry().ref_count(&m.handle()), 1);
	assert_eq!(workbench.registry().parts_for_saveable(&m.handle()), vec![p2]);
}

#[test]
fn close_all_saves_each_model_once_and_empties_registry() {
	let prompter = prompter(Fallback::SaveAll);
	let mut workbench = workbench(&prompter);
	let log = EventLog::new();
	workbench.registry_mut().add_model_lifecycle_listener(log.listener());

	let a = TestSaveable::dirty("a.txt");
	let b = TestSaveable::new("b.txt");
	workbench.open_part(part_showing("p1", &[&a, &b])).unwrap();
	workbench.open_part(part_showing("p2", &[&a])).unwrap();

	assert!(workbench.close_all_parts(true).unwrap());

	assert_eq!(a.save_count(), 1);
	assert_eq!(b.save_count(), 0);
	assert!(workbench.page().is_empty());
	assert!(workbench.registry().open_models().is_empty());

	let closes = log.of_kind(LifecycleEventKind::PostClose);
	assert_eq!(closes.len(), 1);
	assert_eq!(closes[0].source, workbench.registry().source().id());
	assert_eq!(closes[0].models, vec![key("b.txt"), key("a.txt")]);
}

#[test]
fn close_without_save_never_prompts() {
	let prompter = prompter(Fallback::Cancel);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("scratch");
	let part = part_showing("scratch", &[&m]);
	workbench.open_part(part.clone()).unwrap();

	assert!(workbench.close_parts(&[part.id()], false).unwrap());
	assert_eq!(prompter.prompt_count(), 0);
	assert!(!workbench.registry().is_open(&m.handle()));
}

#[test]
fn failed_save_keeps_parts_open() {
	let prompter = prompter(Fallback::SaveAll);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("readonly.cfg");
	m.fail_saves_with("permission denied");
	let part = part_showing("config", &[&m]);
	workbench.open_part(part.clone()).unwrap();

	let error = workbench.close_parts(&[part.id()], true).unwrap_err();

	assert!(matches!(error, WorkbenchError::Save(_)));
	assert!(error.to_string().contains("permission denied"));
	assert!(workbench.page().contains(part.id()));
	assert!(workbench.registry().is_open(&m.handle()));
}

#[test]
fn unknown_part_is_rejected_before_prompting() {
	let prompter = prompter(Fallback::SaveAll);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("kept");
	let part = part_showing("kept", &[&m]);
	workbench.open_part(part.clone()).unwrap();
	let stranger = SourceId::next();

	let error = workbench.close_parts(&[part.id(), stranger], true).unwrap_err();

	assert!(matches!(error, WorkbenchError::UnknownPart(id) if id == stranger));
	assert_eq!(prompter.prompt_count(), 0);
	assert!(workbench.page().contains(part.id()));
}

#[test]
fn single_model_prompt_activates_its_part() {
	init_tracing();
	let probe = ActivePartProbe::new();
	let prompter: Rc<dyn SavePrompter> = probe.clone();
	let mut workbench = Workbench::new(SaveablesConfig::default(), prompter);
	probe.watch(workbench.page());

	let hooks = TestPart::new("draft");
	hooks.set_dirty(true);
	let draft = Source::part("draft", SaveCapability::single(hooks.clone()));
	let other = part_showing("other", &[]);
	workbench.open_part(draft.clone()).unwrap();
	workbench.open_part(other.clone()).unwrap();
	assert_eq!(workbench.page().active_part(), Some(other.clone()));

	assert!(workbench.close_parts(&[draft.id()], true).unwrap());

	assert_eq!(probe.seen(), vec![Some(draft.id())]);
	assert_eq!(hooks.save_count(), 0);
	assert_eq!(workbench.page().active_part(), Some(other));
}

#[test]
fn listener_can_veto_closing_models() {
	let prompter = prompter(Fallback::SaveAll);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("locked.db");
	let part = part_showing("db", &[&m]);
	workbench.open_part(part.clone()).unwrap();
	workbench.registry_mut().add_model_lifecycle_listener(|event| {
		if event.kind() == LifecycleEventKind::PreClose {
			event.veto();
		}
		Ok(())
	});

	assert!(!workbench.close_models(part.id(), &[m.handle()], false).unwrap());
	assert!(workbench.registry().is_open(&m.handle()));
	assert_eq!(prompter.prompt_count(), 0);
}

#[test]
fn forced_close_of_models_cannot_be_cancelled() {
	let prompter = prompter(Fallback::Cancel);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("report.txt");
	let other = TestSaveable::new("index.txt");
	let part = part_showing("viewer", &[&m, &other]);
	workbench.open_part(part.clone()).unwrap();

	assert!(workbench.close_models(part.id(), &[m.handle()], true).unwrap());

	let requests = prompter.requests();
	assert_eq!(requests.len(), 1);
	assert!(!requests[0].can_cancel);
	assert!(!workbench.registry().is_open(&m.handle()));
	assert!(workbench.registry().is_open(&other.handle()));
	assert!(workbench.page().contains(part.id()));
}

#[test]
fn opened_models_are_reported_once() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let a = TestSaveable::new("a");
	let b = TestSaveable::new("b");
	let p1 = part_showing("p1", &[&a]);
	let p2 = part_showing("p2", &[]);
	workbench.open_part(p1).unwrap();
	workbench.open_part(p2.clone()).unwrap();

	let opened = workbench.open_models(p2.id(), &[a.handle(), b.handle()]).unwrap();

	assert_eq!(opened, vec![b.handle()]);
	assert_eq!(workbench.registry().ref_count(&a.handle()), 2);
}

#[test]
fn dirty_change_is_rebroadcast() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let log = EventLog::new();
	workbench.registry_mut().add_model_lifecycle_listener(log.listener());
	let m = TestSaveable::new("live.log");
	let part = part_showing("tail", &[&m]);
	workbench.open_part(part.clone()).unwrap();

	m.set_dirty(true);
	workbench.part_dirty_changed(part.id()).unwrap();

	let changes = log.of_kind(LifecycleEventKind::DirtyChanged);
	assert_eq!(changes.len(), 1);
	assert_eq!(changes[0].source, workbench.registry().source().id());
	assert_eq!(changes[0].models, vec![key("live.log")]);
}

#[test]
fn non_part_sources_stay_off_the_page() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("background.job");
	let provider = TestSaveables::new([m.handle()]);
	let job = Source::non_part("job", provider.clone());

	workbench.open_part(job.clone()).unwrap();

	assert!(workbench.page().is_empty());
	assert!(!workbench.registry().is_open(&m.handle()));
	assert_eq!(workbench.registry().non_part_sources(), vec![job.clone()]);

	provider.set(Vec::<SaveableRef>::new());
	workbench.part_dirty_changed(job.id()).unwrap();
	assert!(workbench.registry().non_part_sources().is_empty());
	assert!(matches!(
		workbench.part_dirty_changed(job.id()),
		Err(WorkbenchError::UnknownPart(id)) if id == job.id()
	));
}

#[test]
fn closed_non_part_source_is_forgotten() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::new("sync.queue");
	let provider = TestSaveables::new([m.handle()]);
	let queue = Source::non_part("queue", provider.clone());
	workbench.open_part(queue.clone()).unwrap();

	assert!(workbench.close_models(queue.id(), &[m.handle()], false).unwrap());
	assert_eq!(workbench.registry().non_part_sources(), vec![queue.clone()]);
	assert!(workbench.open_models(queue.id(), &[m.handle()]).is_ok());

	provider.set(Vec::<SaveableRef>::new());
	assert!(workbench.close_models(queue.id(), &[m.handle()], false).unwrap());

	assert!(workbench.registry().non_part_sources().is_empty());
	assert!(matches!(
		workbench.open_models(queue.id(), &[m.handle()]),
		Err(WorkbenchError::UnknownPart(_))
	));
	assert!(matches!(
		workbench.part_dirty_changed(queue.id()),
		Err(WorkbenchError::UnknownPart(_))
	));
}

#[test]
fn forced_close_of_models_ignores_listener_veto() {
	let prompter = prompter(Fallback::Cancel);
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("audit.log");
	let part = part_showing("audit", &[&m]);
	workbench.open_part(part.clone()).unwrap();
	workbench.registry_mut().add_model_lifecycle_listener(|event| {
		if event.kind() == LifecycleEventKind::PreClose {
			event.veto();
		}
		Ok(())
	});

	assert!(workbench.close_models(part.id(), &[m.handle()], true).unwrap());

	let requests = prompter.requests();
	assert_eq!(requests.len(), 1);
	assert!(!requests[0].can_cancel);
	assert!(!workbench.registry().is_open(&m.handle()));
	assert_eq!(m.save_count(), 0);
}

#[test]
fn active_models_follow_the_active_part() {
	let prompter = prompter(Fallback::Discard);
	let mut workbench = workbench(&prompter);
	assert!(workbench.active_models().is_empty());

	let a = TestSaveable::new("a.rs");
	let b = TestSaveable::new("b.rs");
	let provider = TestSaveables::new([a.handle(), b.handle()]);
	provider.set_active([b.handle()]);
	let split = Source::part("split", SaveCapability::multi(provider));
	let other = part_showing("other", &[&a]);
	workbench.open_part(split.clone()).unwrap();
	workbench.open_part(other.clone()).unwrap();

	assert_eq!(workbench.active_models(), vec![a.handle()]);
	assert!(workbench.page().activate(split.id()));
	assert_eq!(workbench.active_models(), vec![b.handle()]);
}

#[test]
fn stop_prompting_response_is_remembered() {
	let prompter = prompter(Fallback::Discard);
	prompter.push(PromptResponse::discard().with_stop_prompting());
	let mut workbench = workbench(&prompter);
	let m = TestSaveable::dirty("shared");
	let parts: Vec<Source> = (0..3)
		.map(|i| part_showing(&format!("p{i}"), &[&m]))
		.collect();
	for part in &parts {
		workbench.open_part(part.clone()).unwrap();
	}

	assert!(workbench.close_parts(&[parts[0].id()], true).unwrap());
	assert!(!workbench.registry().config().prompt_when_still_open);

	assert!(workbench.close_parts(&[parts[1].id()], true).unwrap());
	assert_eq!(prompter.prompt_count(), 1);
}
