use explorer_engine::cli::EngineContext;
use explorer_engine::config::EngineConfig;
use explorer_engine::host::{ObjectView, SectionView};
use explorer_engine::renderer::RenderOutput;
use explorer_engine::service::{ExplorerService, PageableParams};
use explorer_engine::test_utils::{init_test_logging, sample_service};
use serde_json::{Value, json};
use std::sync::Arc;

fn engine() -> EngineContext {
    init_test_logging(None);
    EngineContext::new(EngineConfig::default(), sample_service())
}

async fn rows(engine: &EngineContext, target: &str) -> Vec<Value> {
    engine
        .cache
        .service()
        .get_section_list(target, &PageableParams::default())
        .await
        .unwrap()
        .content
}

fn texts(row: &[RenderOutput]) -> Vec<&str> {
    row.iter().map(|output| output.text.as_str()).collect()
}

#[tokio::test]
async fn test_section_view_renders_enabled_columns() {
    let engine = engine();
    let rows = rows(&engine, "TaskEntity").await;
    let mut view = SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity").await.unwrap();

    assert_eq!(view.headers(), vec!["ID", "Title", "Done", "Owner", "Due"]);

    let rendered = view.render(&rows);
    assert_eq!(rendered.len(), 3);
    assert_eq!(texts(&rendered[0]), vec!["1", "Write release notes", "no", "annika", "2023-11-14"]);
    assert_eq!(texts(&rendered[1]), vec!["2", "Fix pagination", "yes", "bruno", "2023-12-14"]);
    assert_eq!(rendered[1][3].link.as_deref(), Some("UserEntity/2"));
    assert!(rendered[0][1].link.is_none());
}

#[tokio::test]
async fn test_section_view_reuses_hosts_across_renders() {
    let engine = engine();
    let rows = rows(&engine, "TaskEntity").await;
    let mut view = SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity").await.unwrap();

    view.render(&rows);
    let first = view.stats();
    assert_eq!(first.mounts, 16);

    view.render(&rows);
    assert_eq!(view.stats(), first);

    let reversed: Vec<Value> = rows.iter().rev().cloned().collect();
    let rendered = view.render(&reversed);
    assert_eq!(rendered[0][1].text, "Plan roadmap");
    assert_eq!(view.stats().mounts, 16);
    assert!(view.stats().patches > 0);
}

#[tokio::test]
async fn test_section_view_actions() {
    let engine = engine();
    let view = SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "tasks").await.unwrap();

    assert_eq!(view.target().name(), "TaskEntity");
    let actions = view.actions();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].0, "create");
    assert_eq!(actions[0].1, RenderOutput::linked("[Create]", "TaskEntity/new"));
}

#[tokio::test]
async fn test_section_view_of_users_uses_column_format() {
    let engine = engine();
    let rows = rows(&engine, "UserEntity").await;
    let mut view = SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "UserEntity").await.unwrap();

    let rendered = view.render(&rows);
    assert_eq!(texts(&rendered[0]), vec!["1", "annika", "yes", "2023-11-14"]);
    assert_eq!(rendered.len(), 3);
}

#[tokio::test]
async fn test_object_view_groups_fields_by_tab() {
    let engine = engine();
    let row = engine.cache.service().get_entity("TaskEntity", "1").await.unwrap();
    let mut view = ObjectView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity", row).await.unwrap();
    let rendered = view.render();

    let layout: Vec<(Option<&str>, Vec<&str>)> = rendered
        .tabs
        .iter()
        .map(|tab| (tab.id.as_deref(), tab.fields.iter().map(|(label, _)| label.as_str()).collect()))
        .collect();
    assert_eq!(
        layout,
        vec![
            (None, vec!["Due", "Notes"]),
            (Some("general"), vec!["ID", "Title", "Done"]),
            (Some("relations"), vec!["Owner", "Cover"]),
        ]
    );

    let relations = &rendered.tabs[2].fields;
    assert_eq!(relations[0].1, RenderOutput::linked("annika", "UserEntity/1"));
    assert_eq!(relations[1].1, RenderOutput::linked("notes.png", "https://cdn.example/notes.png"));
    assert_eq!(rendered.tabs[0].fields[1].1.text, "Mention the new filter syntax");
}

#[tokio::test]
async fn test_object_view_actions_share_form() {
    let engine = engine();
    let row = engine.cache.service().get_entity("TaskEntity", "1").await.unwrap();
    let mut view = ObjectView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity", row).await.unwrap();
    let rendered = view.render();

    let codes: Vec<&str> = rendered.actions.iter().map(|(code, _)| code.as_str()).collect();
    assert_eq!(codes, vec!["save", "duplicate", "delete"]);
    assert_eq!(rendered.actions[0].1, RenderOutput::linked("[Save]", "TaskEntity/1"));
    assert_eq!(rendered.actions[1].1, RenderOutput::linked("[Duplicate]", "TaskEntity/1"));
    assert_eq!(view.form().value("title"), Some(json!("Write release notes")));
}

#[tokio::test]
async fn test_object_view_shows_edits_made_before_render() {
    let engine = engine();
    let row = engine.cache.service().get_entity("TaskEntity", "2").await.unwrap();
    let mut view = ObjectView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity", row).await.unwrap();

    view.form().patch_value("title", json!("Fix paging"));
    let rendered = view.render();

    let general = &rendered.tabs[1].fields;
    assert_eq!(general[1], ("Title".to_string(), RenderOutput::text("Fix paging")));
    assert_eq!(rendered.actions[0].1.text, "[Save *]");
}

#[tokio::test]
async fn test_object_view_shows_edits_made_after_render() {
    let engine = engine();
    let row = engine.cache.service().get_entity("TaskEntity", "2").await.unwrap();
    let mut view = ObjectView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity", row).await.unwrap();

    let first = view.render();
    assert_eq!(first.actions[0].1.text, "[Save]");
    let mounted = view.stats();

    view.form().patch_value("title", json!("Fix paging"));
    let rendered = view.render();

    assert_eq!(rendered.tabs[1].fields[1], ("Title".to_string(), RenderOutput::text("Fix paging")));
    assert_eq!(rendered.actions[0].1.text, "[Save *]");
    assert_eq!(view.stats().mounts, mounted.mounts);
    assert!(view.stats().patches > mounted.patches);

    let settled = view.stats();
    view.render();
    assert_eq!(view.stats().patches, settled.patches);
}

#[tokio::test]
async fn test_object_view_without_duplicate() {
    let engine = engine();
    let row = engine.cache.service().get_entity("users", "3").await.unwrap();
    let mut view = ObjectView::open(&engine.cache, Arc::clone(&engine.resolver), "users", row).await.unwrap();
    let rendered = view.render();

    let codes: Vec<&str> = rendered.actions.iter().map(|(code, _)| code.as_str()).collect();
    assert_eq!(codes, vec!["save", "delete"]);
    assert_eq!(rendered.tabs.len(), 1);
    assert_eq!(rendered.tabs[0].id, None);
    assert_eq!(rendered.tabs[0].fields[1].1.text, "carla");
}

#[tokio::test]
async fn test_views_share_cached_targets() {
    let engine = engine();
    SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity").await.unwrap();
    SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "TaskEntity").await.unwrap();

    let stats = engine.cache.stats();
    assert_eq!(stats.fetches, 2);
    assert_eq!(stats.hits, 2);
}

#[tokio::test]
async fn test_unknown_target_fails_to_open() {
    let engine = engine();
    let error = SectionView::open(&engine.cache, Arc::clone(&engine.resolver), "Ghost").await.unwrap_err();
    assert!(error.to_string().contains("Ghost"));
}
