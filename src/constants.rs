//! Global constants used throughout the explorer engine.
//!
//! Renderer codes, default action codes, special entity names and
//! environment variable names live here so the registry, resolver and
//! configuration agree on them.

/// Generic string renderer for list views. Also the last-resort fallback.
pub const STRING_SECTION_RENDERER: &str = "string-section-renderer";
/// Generic string renderer for detail views. Also the last-resort fallback.
pub const STRING_OBJECT_RENDERER: &str = "string-object-renderer";

/// Boolean renderer for list views.
pub const BOOLEAN_SECTION_RENDERER: &str = "boolean-section-renderer";
/// Boolean renderer for detail views.
pub const BOOLEAN_OBJECT_RENDERER: &str = "boolean-object-renderer";

/// Date renderer for list views.
pub const DATE_SECTION_RENDERER: &str = "date-section-renderer";
/// Date renderer for detail views.
pub const DATE_OBJECT_RENDERER: &str = "date-object-renderer";

/// Generic reference renderer for list views.
pub const REFERENCE_SECTION_RENDERER: &str = "reference-section-renderer";
/// Generic reference renderer for detail views.
pub const REFERENCE_OBJECT_RENDERER: &str = "reference-object-renderer";

/// Media reference renderer for list views.
pub const MEDIA_SECTION_RENDERER: &str = "media-section-renderer";
/// Media reference renderer for detail views.
pub const MEDIA_OBJECT_RENDERER: &str = "media-object-renderer";

/// Localized string reference renderer for list views.
pub const LOCALIZED_STRING_SECTION_RENDERER: &str = "localized-string-section-renderer";
/// Localized string reference renderer for detail views.
pub const LOCALIZED_STRING_OBJECT_RENDERER: &str = "localized-string-object-renderer";

/// Localized media reference renderer for list views.
pub const LOCALIZED_MEDIA_SECTION_RENDERER: &str = "localized-media-section-renderer";
/// Localized media reference renderer for detail views.
pub const LOCALIZED_MEDIA_OBJECT_RENDERER: &str = "localized-media-object-renderer";

/// Default "create" action code.
pub const ACTION_CREATE: &str = "create";
/// Default "save" action code.
pub const ACTION_SAVE: &str = "save";
/// Default "delete" action code.
pub const ACTION_DELETE: &str = "delete";
/// Default "duplicate" action code.
pub const ACTION_DUPLICATE: &str = "duplicate";

/// Default name of the media target.
pub const DEFAULT_MEDIA_ENTITY: &str = "MediaEntity";
/// Default name of the localized string target.
pub const DEFAULT_LOCALIZED_STRING_ENTITY: &str = "LocalizedStringEntity";
/// Default name of the localized media target.
pub const DEFAULT_LOCALIZED_MEDIA_ENTITY: &str = "LocalizedMediaEntity";

/// Page size used when a list request does not carry a limit.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "EXPLORER_CONFIG_PATH";

/// Maximum edit distance for "did you mean" renderer code suggestions.
pub const SUGGESTION_MAX_DISTANCE: usize = 4;

/// Environment variable naming the fixture used by the preview binary.
pub const FIXTURE_PATH_ENV: &str = "EXPLORER_FIXTURE";
