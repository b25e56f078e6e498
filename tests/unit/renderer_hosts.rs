use explorer_engine::cli::EngineContext;
use explorer_engine::config::EngineConfig;
use explorer_engine::constants::{ACTION_DELETE, ACTION_SAVE, REFERENCE_SECTION_RENDERER};
use explorer_engine::host::{ActionInput, ActionRendererHost, ColumnRendererHost, HostInput, HostStats, UpdateOutcome};
use explorer_engine::metadata::{ColumnType, ExplorerAction, ExplorerColumn, Variant};
use explorer_engine::renderer::{EntityForm, RenderOutput};
use explorer_engine::test_utils::{init_test_logging, sample_service};
use serde_json::json;
use std::sync::Arc;

fn engine() -> EngineContext {
    init_test_logging(None);
    EngineContext::new(EngineConfig::default(), sample_service())
}

#[tokio::test]
async fn test_reference_cell_links_to_referenced_row() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Section)).await.unwrap();
    let users = engine.cache.resolve("UserEntity", Some(Variant::Section)).await.unwrap();
    let owner = tasks.entity.column("owner").unwrap().clone();
    let row = json!({ "id": 1, "owner": { "id": 1, "login": "annika" } });

    let mut host = ColumnRendererHost::new(Arc::clone(&engine.resolver));
    let outcome = host.update(
        HostInput::new(Arc::clone(&tasks), owner.clone(), Variant::Section, row.clone()).with_referenced(Some(users)),
    );
    assert_eq!(outcome, UpdateOutcome::Mounted);
    assert_eq!(host.resolution().unwrap().code, REFERENCE_SECTION_RENDERER);
    assert_eq!(host.output().unwrap(), RenderOutput::linked("annika", "UserEntity/1"));

    // An equal bundle behind a new Arc is not a change
    let refreshed = engine.cache.refresh("UserEntity", Some(Variant::Section)).await.unwrap();
    let outcome = host.update(HostInput::new(tasks, owner, Variant::Section, row).with_referenced(Some(refreshed)));
    assert_eq!(outcome, UpdateOutcome::Unchanged);
    assert_eq!(host.stats().patches, 0);
}

#[tokio::test]
async fn test_column_params_override_kind_defaults() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Section)).await.unwrap();
    let row = json!({ "id": 1, "due": 1_700_000_000_000_i64 });

    let mut configured = ColumnRendererHost::new(Arc::clone(&engine.resolver));
    let due = tasks.entity.column("due").unwrap().clone();
    configured.update(HostInput::new(Arc::clone(&tasks), due, Variant::Section, row.clone()));
    assert_eq!(configured.output().unwrap().text, "2023-11-14");

    let mut plain = ColumnRendererHost::new(Arc::clone(&engine.resolver));
    plain.update(HostInput::new(tasks, ExplorerColumn::new("due", ColumnType::Date), Variant::Section, row));
    assert_eq!(plain.output().unwrap().text, "2023-11-14 22:13");
    assert_eq!(plain.context().unwrap().param_str("format"), Some("%Y-%m-%d %H:%M"));
}

#[tokio::test]
async fn test_row_change_patches_and_target_change_remounts() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Section)).await.unwrap();
    let users = engine.cache.resolve("UserEntity", Some(Variant::Section)).await.unwrap();
    let id = ExplorerColumn::new("id", ColumnType::Number);

    let mut host = ColumnRendererHost::new(Arc::clone(&engine.resolver));
    host.update(HostInput::new(Arc::clone(&tasks), id.clone(), Variant::Section, json!({ "id": 1 })));
    assert_eq!(
        host.update(HostInput::new(Arc::clone(&tasks), id.clone(), Variant::Section, json!({ "id": 2 }))),
        UpdateOutcome::Patched
    );
    assert_eq!(host.output().unwrap().text, "2");

    assert_eq!(
        host.update(HostInput::new(users, id, Variant::Section, json!({ "id": 2 }))),
        UpdateOutcome::Remounted
    );
    assert_eq!(host.stats(), HostStats { mounts: 2, patches: 1, teardowns: 1 });
}

#[tokio::test]
async fn test_action_children_matched_by_code() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Object)).await.unwrap();
    let row = json!({ "id": 1, "title": "Write release notes" });
    let input = |codes: &[&str]| ActionInput {
        target: Arc::clone(&tasks),
        actions: codes.iter().map(|code| ExplorerAction::new(*code)).collect(),
        variant: Variant::Object,
        data: row.clone(),
    };

    let mut host = ActionRendererHost::new(Arc::clone(&engine.resolver), Arc::new(EntityForm::from_row(&row)));
    host.update(input(&[ACTION_SAVE, ACTION_DELETE]));
    host.update(input(&[ACTION_DELETE]));

    assert_eq!(host.codes(), vec![ACTION_DELETE]);
    assert_eq!(host.stats(), HostStats { mounts: 2, patches: 0, teardowns: 1 });
    assert_eq!(host.outputs()[0].1, RenderOutput::linked("[Delete]", "TaskEntity/1"));
}

#[tokio::test]
async fn test_action_host_remounts_for_another_target() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Object)).await.unwrap();
    let users = engine.cache.resolve("UserEntity", Some(Variant::Object)).await.unwrap();

    let mut host = ActionRendererHost::new(Arc::clone(&engine.resolver), Arc::new(EntityForm::new()));
    host.update(ActionInput::for_target(tasks, Variant::Object, json!({ "id": 1 })));
    assert_eq!(host.codes(), vec!["save", "duplicate", "delete"]);

    host.update(ActionInput::for_target(users, Variant::Object, json!({ "id": 1 })));
    assert_eq!(host.codes(), vec!["save", "delete"]);
    assert_eq!(host.stats(), HostStats { mounts: 5, patches: 0, teardowns: 3 });
}

#[tokio::test]
async fn test_owned_form_receives_host_values() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Object)).await.unwrap();
    let row = json!({ "id": 1, "title": "Write release notes", "done": false });
    let form = Arc::new(EntityForm::from_row(&row));

    let mut host = ActionRendererHost::new(Arc::clone(&engine.resolver), Arc::clone(&form));
    host.update(ActionInput::for_target(Arc::clone(&tasks), Variant::Object, row.clone()));
    assert_eq!(host.stats().patches, 0);

    let copy = host.child_form("duplicate").unwrap();
    assert!(!Arc::ptr_eq(&copy, &form));
    assert_eq!(copy.value("title"), Some(json!("Write release notes")));
    assert_eq!(copy.value("id"), None);

    let mut listener = copy.subscribe();
    for _ in 0..3 {
        host.update(ActionInput::for_target(Arc::clone(&tasks), Variant::Object, row.clone()));
    }
    assert_eq!(host.stats().patches, 0);
    assert!(!listener.has_changed().unwrap());
    assert_eq!(copy.value("id"), None);
    assert_eq!(form.value("id"), Some(json!(1)));

    // save, duplicate and delete all see the edit
    form.patch_value("title", json!("Draft"));
    host.update(ActionInput::for_target(Arc::clone(&tasks), Variant::Object, row.clone()));
    assert_eq!(host.stats().patches, 3);
    assert!(listener.has_changed().unwrap());
    assert_eq!(copy.value("title"), Some(json!("Draft")));
    assert_eq!(copy.value("id"), None);

    host.update(ActionInput::for_target(tasks, Variant::Object, row));
    assert_eq!(host.stats().patches, 3);
    assert_eq!(host.stats().mounts, 3);
}

#[tokio::test]
async fn test_save_marks_pending_edits() {
    let engine = engine();
    let tasks = engine.cache.resolve("TaskEntity", Some(Variant::Object)).await.unwrap();
    let row = json!({ "id": 1, "title": "Write release notes" });
    let save = |form: EntityForm| {
        let mut host = ActionRendererHost::new(Arc::clone(&engine.resolver), Arc::new(form));
        host.update(ActionInput {
            target: Arc::clone(&tasks),
            actions: vec![ExplorerAction::new(ACTION_SAVE)],
            variant: Variant::Object,
            data: row.clone(),
        });
        host.outputs()[0].1.clone()
    };

    assert_eq!(save(EntityForm::from_row(&row)), RenderOutput::linked("[Save]", "TaskEntity/1"));
    assert_eq!(
        save(EntityForm::from_row(&json!({ "id": 1, "title": "Draft" }))),
        RenderOutput::linked("[Save *]", "TaskEntity/1")
    );
}
