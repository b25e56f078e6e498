use explorer_engine::constants::{
    BOOLEAN_OBJECT_RENDERER, BOOLEAN_SECTION_RENDERER, MEDIA_SECTION_RENDERER, REFERENCE_OBJECT_RENDERER,
    STRING_OBJECT_RENDERER, STRING_SECTION_RENDERER,
};
use explorer_engine::metadata::{ExplorerAction, ExplorerColumn, Variant};
use explorer_engine::renderer::{
    RenderContext, RenderOutput, Renderer, RendererFamily, RendererKind, RendererLoader, RendererProvider,
    RendererRegistry, RendererResolver, ResolutionSource,
};
use explorer_engine::test_utils::WarningCounter;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn column(value: serde_json::Value) -> ExplorerColumn {
    serde_json::from_value(value).unwrap()
}

fn resolver() -> RendererResolver {
    RendererResolver::new(Arc::new(RendererRegistry::with_builtins()))
}

struct Badge;

impl RendererKind for Badge {
    fn code(&self) -> &str {
        "status-badge"
    }

    fn instantiate(&self) -> Box<dyn Renderer> {
        Box::new(BadgeRenderer(RenderOutput::default()))
    }
}

struct BadgeRenderer(RenderOutput);

impl Renderer for BadgeRenderer {
    fn mount(&mut self, context: &RenderContext) {
        self.0 = RenderOutput::text(format!("<{}>", context.value()));
    }

    fn patch(&mut self, context: &RenderContext) {
        self.mount(context);
    }

    fn output(&self) -> RenderOutput {
        self.0.clone()
    }
}

#[test]
fn test_boolean_type_default_and_unknown_type_fallback() {
    let resolver = resolver();
    let counter = WarningCounter::new();

    let boolean = column(json!({ "id": "done", "property": "done", "type": "boolean" }));
    let resolution = counter.capture(|| resolver.resolve_column(&boolean, Variant::Object));
    assert_eq!(resolution.code, BOOLEAN_OBJECT_RENDERER);
    assert_eq!(resolution.source, ResolutionSource::TypeDefault);
    assert_eq!(counter.count(), 0);

    let currency = column(json!({ "id": "price", "property": "price", "type": "currency" }));
    let resolution = counter.capture(|| resolver.resolve_column(&currency, Variant::Object));
    assert_eq!(resolution.code, STRING_OBJECT_RENDERER);
    assert_eq!(resolution.source, ResolutionSource::Fallback);
    assert_eq!(counter.count(), 1);
    assert!(counter.messages()[0].contains("currency"));
}

#[test]
fn test_number_columns_use_string_renderer_silently() {
    let counter = WarningCounter::new();
    let number = column(json!({ "id": "amount", "property": "amount", "type": "number" }));

    let resolution = counter.capture(|| resolver().resolve_column(&number, Variant::Section));
    assert_eq!(resolution.code, STRING_SECTION_RENDERER);
    assert_eq!(resolution.source, ResolutionSource::TypeDefault);
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_references_are_told_apart_by_entity() {
    let resolver = resolver();
    let media = column(json!({
        "id": "cover", "property": "cover", "type": "reference", "referencedEntityName": "MediaEntity"
    }));
    let user = column(json!({
        "id": "owner", "property": "owner", "type": "reference", "referencedEntityName": "UserEntity"
    }));

    assert_eq!(resolver.resolve_column(&media, Variant::Section).code, MEDIA_SECTION_RENDERER);
    assert_eq!(resolver.resolve_column(&user, Variant::Object).code, REFERENCE_OBJECT_RENDERER);
}

#[test]
fn test_explicit_code_is_per_variant() {
    let resolver = resolver();
    let flag = column(json!({
        "id": "done",
        "property": "done",
        "type": "string",
        "section": { "renderer": { "code": "boolean-section-renderer" } }
    }));

    let section = resolver.resolve_column(&flag, Variant::Section);
    assert_eq!(section.code, BOOLEAN_SECTION_RENDERER);
    assert_eq!(section.source, ResolutionSource::Explicit);

    // The object context has no explicit code, so the type decides
    assert_eq!(resolver.resolve_column(&flag, Variant::Object).code, STRING_OBJECT_RENDERER);
}

#[test]
fn test_missing_explicit_code_warns_once_with_suggestion() {
    let resolver = resolver();
    let counter = WarningCounter::new();
    let typo = column(json!({
        "id": "done",
        "property": "done",
        "type": "boolean",
        "section": { "renderer": { "code": "boolean-section-rendrer" } }
    }));

    let resolution = counter.capture(|| resolver.resolve_column(&typo, Variant::Section));
    assert_eq!(resolution.code, STRING_SECTION_RENDERER);
    assert_eq!(counter.count(), 1);
    assert!(counter.messages()[0].contains("did you mean 'boolean-section-renderer'"));
}

#[test]
fn test_custom_renderer_loads_lazily_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counted = Arc::clone(&loads);
    let loader = RendererLoader::new("status-badge", move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Arc::new(Badge) as Arc<dyn RendererKind>
    });

    let mut registry = RendererRegistry::with_builtins();
    registry.register(RendererFamily::Section, [loader]);
    let resolver = RendererResolver::new(Arc::new(registry));

    let status = column(json!({
        "id": "status",
        "property": "status",
        "type": "string",
        "section": { "renderer": { "code": "status-badge" } }
    }));

    let first = resolver.resolve_column(&status, Variant::Section);
    assert!(!first.loader.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    let kind = first.loader.load();
    assert_eq!(kind.code(), "status-badge");
    resolver.resolve_column(&status, Variant::Section).loader.load();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_first_registration_wins() {
    let mut registry = RendererRegistry::new();
    registry.register_providers([
        RendererProvider::new(RendererFamily::Section, RendererLoader::ready(Arc::new(Badge))),
        RendererProvider::new(
            RendererFamily::Section,
            RendererLoader::new("status-badge", || Arc::new(Badge) as Arc<dyn RendererKind>),
        ),
    ]);

    assert_eq!(registry.codes(RendererFamily::Section), vec!["status-badge", "status-badge"]);
    assert!(registry.find(RendererFamily::Section, "status-badge").unwrap().is_loaded());
    assert!(registry.find(RendererFamily::Object, "status-badge").is_none());
}

#[test]
fn test_empty_registry_still_falls_back() {
    let resolver = RendererResolver::new(Arc::new(RendererRegistry::new()));
    let boolean = column(json!({ "id": "done", "property": "done", "type": "boolean" }));

    let counter = WarningCounter::new();
    let resolution = counter.capture(|| resolver.resolve_column(&boolean, Variant::Section));
    assert_eq!(resolution.code, STRING_SECTION_RENDERER);
    assert_eq!(resolution.source, ResolutionSource::Fallback);
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_aliases_share_the_target_implementation() {
    let mut registry = RendererRegistry::with_builtins();
    let unresolved = registry.register_aliases(&BTreeMap::from([
        ("flag-section-renderer".to_string(), BOOLEAN_SECTION_RENDERER.to_string()),
        ("ghost-renderer".to_string(), "no-such-renderer".to_string()),
    ]));
    assert_eq!(unresolved, vec!["ghost-renderer".to_string()]);

    let alias = registry.find(RendererFamily::Section, "flag-section-renderer").unwrap();
    let original = registry.find(RendererFamily::Section, BOOLEAN_SECTION_RENDERER).unwrap();
    assert!(Arc::ptr_eq(&alias.load(), &original.load()));
}

#[test]
fn test_unknown_actions_are_skipped_with_warning() {
    let resolver = resolver();
    let counter = WarningCounter::new();

    let missing = counter.capture(|| resolver.resolve_action(&ExplorerAction::new("export-csv")));
    assert!(missing.is_none());
    assert_eq!(counter.count(), 1);
}
