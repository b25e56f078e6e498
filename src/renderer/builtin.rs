//! Built-in renderers
//!
//! Text renderers for every column type in both views, plus renderers for the
//! default actions (`create`, `save`, `delete`, `duplicate`). The text
//! renderers are registered by [`super::RendererRegistry::with_builtins`]; the
//! action renderers are opt-in through [`default_action_loaders`].
//!
//! | Code prefix | Value shape | Parameters |
//! |-------------|-------------|------------|
//! | `string` | any scalar, arrays joined | `maxLength` |
//! | `boolean` | bool or `"true"`/`"false"` | `trueLabel`, `falseLabel` |
//! | `date` | epoch ms or RFC 3339 | `format` (strftime) |
//! | `reference` | embedded row or foreign key | `displayProperty` |
//! | `media` | `{url or path, name}` or URL string | |
//! | `localized-string` | `{locale: text}` | `locale` |
//! | `localized-media` | `{locale: media}` | `locale` |

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::{EntityForm, RenderContext, RenderOutput, Renderer, RendererKind, RendererLoader};
use crate::config::DisplayConfig;
use crate::constants::{
    ACTION_CREATE, ACTION_DELETE, ACTION_DUPLICATE, ACTION_SAVE, BOOLEAN_OBJECT_RENDERER,
    BOOLEAN_SECTION_RENDERER, DATE_OBJECT_RENDERER, DATE_SECTION_RENDERER,
    LOCALIZED_MEDIA_OBJECT_RENDERER, LOCALIZED_MEDIA_SECTION_RENDERER,
    LOCALIZED_STRING_OBJECT_RENDERER, LOCALIZED_STRING_SECTION_RENDERER, MEDIA_OBJECT_RENDERER,
    MEDIA_SECTION_RENDERER, REFERENCE_OBJECT_RENDERER, REFERENCE_SECTION_RENDERER,
    STRING_OBJECT_RENDERER, STRING_SECTION_RENDERER,
};
use crate::metadata::{Variant, scalar_to_string};

/// Section cell text longer than this is truncated unless overridden.
const SECTION_MAX_LENGTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    String,
    Boolean,
    Date,
    Reference,
    Media,
    LocalizedString,
    LocalizedMedia,
}

struct TextKind {
    code: &'static str,
    format: Format,
    defaults: Map<String, Value>,
}

impl RendererKind for TextKind {
    fn code(&self) -> &str {
        self.code
    }

    fn default_params(&self) -> Map<String, Value> {
        self.defaults.clone()
    }

    fn instantiate(&self) -> Box<dyn Renderer> {
        Box::new(TextRenderer {
            format: self.format,
            output: RenderOutput::default(),
        })
    }
}

struct TextRenderer {
    format: Format,
    output: RenderOutput,
}

impl Renderer for TextRenderer {
    fn mount(&mut self, context: &RenderContext) {
        self.output = render(self.format, &context.value(), context);
    }

    fn patch(&mut self, context: &RenderContext) {
        self.output = render(self.format, &context.value(), context);
    }

    fn destroy(&mut self) {
        self.output = RenderOutput::default();
    }

    fn output(&self) -> RenderOutput {
        self.output.clone()
    }
}

fn render(format: Format, value: &Value, context: &RenderContext) -> RenderOutput {
    if let Value::Array(items) = value {
        let text = items
            .iter()
            .map(|item| render(format, item, context).text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        return RenderOutput::text(truncate(text, context.param_usize("maxLength")));
    }

    match format {
        Format::String => RenderOutput::text(truncate(plain_text(value), context.param_usize("maxLength"))),
        Format::Boolean => RenderOutput::text(boolean_text(value, context)),
        Format::Date => RenderOutput::text(date_text(value, context.param_str("format"))),
        Format::Reference => reference_output(value, context),
        Format::Media => media_output(value),
        Format::LocalizedString => RenderOutput::text(
            localized(value, context.param_str("locale")).map(plain_text).unwrap_or_default(),
        ),
        Format::LocalizedMedia => localized(value, context.param_str("locale")).map(media_output).unwrap_or_default(),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(_) => value.to_string(),
        _ => scalar_to_string(value).unwrap_or_default(),
    }
}

fn truncate(text: String, max: Option<usize>) -> String {
    match max {
        Some(max) if text.chars().count() > max => {
            let mut short: String = text.chars().take(max).collect();
            short.push('…');
            short
        }
        _ => text,
    }
}

fn boolean_text(value: &Value, context: &RenderContext) -> String {
    let flag = match value {
        Value::Bool(flag) => *flag,
        Value::String(s) if s.eq_ignore_ascii_case("true") => true,
        Value::String(s) if s.eq_ignore_ascii_case("false") => false,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => return plain_text(value),
    };
    let (key, default) = if flag { ("trueLabel", "true") } else { ("falseLabel", "false") };
    context.param_str(key).unwrap_or(default).to_string()
}

fn date_text(value: &Value, format: Option<&str>) -> String {
    let date = match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc)),
        _ => None,
    };
    let Some(date) = date else {
        return plain_text(value);
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(format.unwrap_or("%Y-%m-%d %H:%M")).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return date.to_rfc3339();
    }
    date.format_with_items(items.iter()).to_string()
}

fn reference_output(value: &Value, context: &RenderContext) -> RenderOutput {
    let entity = context
        .referenced
        .as_ref()
        .map(|data| data.name().to_string())
        .or_else(|| context.column().and_then(|c| c.referenced_entity_name.clone()));

    let (text, id) = match value {
        Value::Null => return RenderOutput::default(),
        Value::Object(row) => {
            let text = if let Some(property) = context.param_str("displayProperty") {
                row.get(property).map(plain_text)
            } else if let Some(referenced) = &context.referenced {
                Some(referenced.display_of(value))
            } else {
                row.get("name").or_else(|| row.get("id")).map(plain_text)
            };
            let id = match &context.referenced {
                Some(referenced) => referenced.identity_of(value),
                None => row.get("id").and_then(scalar_to_string),
            };
            (text.unwrap_or_default(), id)
        }
        scalar => {
            let id = scalar_to_string(scalar);
            (id.clone().unwrap_or_default(), id)
        }
    };

    match (entity, id) {
        (Some(entity), Some(id)) => RenderOutput::linked(text, format!("{entity}/{id}")),
        _ => RenderOutput::text(text),
    }
}

fn media_output(value: &Value) -> RenderOutput {
    match value {
        Value::String(url) => {
            let name = url.rsplit('/').next().unwrap_or(url);
            RenderOutput::linked(name, url.clone())
        }
        Value::Object(media) => {
            let url = media.get("url").or_else(|| media.get("path")).and_then(scalar_to_string);
            let name = ["name", "title", "filename"]
                .iter()
                .find_map(|key| media.get(*key).and_then(scalar_to_string))
                .or_else(|| url.clone())
                .unwrap_or_default();
            match url {
                Some(url) => RenderOutput::linked(name, url),
                None => RenderOutput::text(name),
            }
        }
        other => RenderOutput::text(plain_text(other)),
    }
}

/// Pick the entry for `locale`, else the first non-null entry.
fn localized<'a>(value: &'a Value, locale: Option<&str>) -> Option<&'a Value> {
    let Value::Object(entries) = value else {
        return (!value.is_null()).then_some(value);
    };
    let entries = match entries.get("translations") {
        Some(Value::Object(nested)) => nested,
        _ => entries,
    };
    locale
        .and_then(|locale| entries.get(locale))
        .filter(|v| !v.is_null())
        .or_else(|| entries.values().find(|v| !v.is_null()))
}

fn text_loader(code: &'static str, format: Format, defaults: Value) -> RendererLoader {
    let defaults = match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    RendererLoader::new(code, move || {
        Arc::new(TextKind {
            code,
            format,
            defaults: defaults.clone(),
        }) as Arc<dyn RendererKind>
    })
}

/// Generic string renderer for `variant`.
#[must_use]
pub fn string_loader(variant: Variant) -> RendererLoader {
    match variant {
        Variant::Section => text_loader(
            STRING_SECTION_RENDERER,
            Format::String,
            json!({ "maxLength": SECTION_MAX_LENGTH }),
        ),
        Variant::Object => text_loader(STRING_OBJECT_RENDERER, Format::String, json!({})),
    }
}

/// All built-in column renderers for `variant`, string renderer first.
#[must_use]
pub fn column_loaders(variant: Variant, display: &DisplayConfig) -> Vec<RendererLoader> {
    let booleans = json!({ "trueLabel": display.boolean_true, "falseLabel": display.boolean_false });
    let dates = json!({ "format": display.date_format });
    let locale = json!({ "locale": display.locale });

    let codes = match variant {
        Variant::Section => [
            BOOLEAN_SECTION_RENDERER,
            DATE_SECTION_RENDERER,
            REFERENCE_SECTION_RENDERER,
            MEDIA_SECTION_RENDERER,
            LOCALIZED_STRING_SECTION_RENDERER,
            LOCALIZED_MEDIA_SECTION_RENDERER,
        ],
        Variant::Object => [
            BOOLEAN_OBJECT_RENDERER,
            DATE_OBJECT_RENDERER,
            REFERENCE_OBJECT_RENDERER,
            MEDIA_OBJECT_RENDERER,
            LOCALIZED_STRING_OBJECT_RENDERER,
            LOCALIZED_MEDIA_OBJECT_RENDERER,
        ],
    };
    let [boolean, date, reference, media, localized_string, localized_media] = codes;

    vec![
        string_loader(variant),
        text_loader(boolean, Format::Boolean, booleans),
        text_loader(date, Format::Date, dates),
        text_loader(reference, Format::Reference, json!({})),
        text_loader(media, Format::Media, json!({})),
        text_loader(localized_string, Format::LocalizedString, locale.clone()),
        text_loader(localized_media, Format::LocalizedMedia, locale),
    ]
}

struct ActionKind {
    code: &'static str,
    label: &'static str,
    owns_form: bool,
}

impl RendererKind for ActionKind {
    fn code(&self) -> &str {
        self.code
    }

    fn instantiate(&self) -> Box<dyn Renderer> {
        Box::new(ActionRenderer {
            code: self.code,
            label: self.label.to_string(),
            form: self.owns_form.then(|| Arc::new(EntityForm::new())),
            owns_form: self.owns_form,
            output: RenderOutput::default(),
        })
    }
}

/// Button-like renderer of a default action.
///
/// `duplicate` edits a private copy of the entity with the primary key
/// cleared; the others work on the form assigned by their host.
struct ActionRenderer {
    code: &'static str,
    label: String,
    form: Option<Arc<EntityForm>>,
    owns_form: bool,
    output: RenderOutput,
}

impl ActionRenderer {
    fn refresh(&mut self, context: &RenderContext) {
        if let Some(action) = context.action()
            && !action.name.is_empty()
            && action.name != action.code
        {
            self.label.clone_from(&action.name);
        }

        if self.owns_form
            && let Some(form) = &self.form
        {
            let mut copy = form.raw_values();
            if copy.remove(&context.target.primary_column.property).is_some() {
                form.set_raw_values(copy);
            }
        }

        let target = context.target.name();
        let dirty = self.code == ACTION_SAVE
            && self.form.as_ref().is_some_and(|form| match &context.data {
                Value::Object(row) => form.raw_values() != *row,
                _ => false,
            });
        let text = if dirty { format!("[{} *]", self.label) } else { format!("[{}]", self.label) };

        self.output = match (self.code, context.target.identity_of(&context.data)) {
            (ACTION_CREATE, _) => RenderOutput::linked(text, format!("{target}/new")),
            (_, Some(id)) => RenderOutput::linked(text, format!("{target}/{id}")),
            (_, None) => RenderOutput::text(text),
        };
    }
}

impl Renderer for ActionRenderer {
    fn mount(&mut self, context: &RenderContext) {
        self.refresh(context);
    }

    fn patch(&mut self, context: &RenderContext) {
        self.refresh(context);
    }

    fn destroy(&mut self) {
        self.output = RenderOutput::default();
    }

    fn output(&self) -> RenderOutput {
        self.output.clone()
    }

    fn entity_form(&self) -> Option<Arc<EntityForm>> {
        self.form.clone()
    }

    fn assign_entity_form(&mut self, form: Arc<EntityForm>) {
        self.form = Some(form);
    }
}

/// Renderers for `create`, `save`, `delete` and `duplicate`.
#[must_use]
pub fn default_action_loaders() -> Vec<RendererLoader> {
    [
        (ACTION_CREATE, "Create", false),
        (ACTION_SAVE, "Save", false),
        (ACTION_DELETE, "Delete", false),
        (ACTION_DUPLICATE, "Duplicate", true),
    ]
    .into_iter()
    .map(|(code, label, owns_form)| {
        RendererLoader::new(code, move || Arc::new(ActionKind { code, label, owns_form }) as Arc<dyn RendererKind>)
    })
    .collect()
}
