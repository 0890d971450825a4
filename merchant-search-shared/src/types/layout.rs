//! Result row layouts.
//!
//! A layout pairs a template (the row shape the palette renders) with a set of
//! bindings from template slots to record fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::record::IndexableRecord;

/// Prefix marking a binding as an icon literal instead of a field name.
pub const ICON_PREFIX: &str = "icon:";

/// Separator rendered between secondary text values.
pub const SECONDARY_SEPARATOR: &str = "·";

/// Row templates known to the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    SingleRow,
    DoubleRow,
    DoubleRowNoMedia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Image,
    Text,
}

/// Content of a single template slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotContent {
    #[serde(rename = "type")]
    pub kind: SlotKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub content: SlotContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSize {
    Span(u8),
    Auto(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateColumn {
    pub size: ColumnSize,
    pub rows: Vec<TemplateRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStructure {
    pub columns: Vec<TemplateColumn>,
}

fn image_slot() -> TemplateRow {
    TemplateRow {
        content: SlotContent {
            kind: SlotKind::Image,
            name: "primary_image".to_string(),
            required: None,
            separator: None,
        },
    }
}

fn primary_text_slot() -> TemplateRow {
    TemplateRow {
        content: SlotContent {
            kind: SlotKind::Text,
            name: "primary_text".to_string(),
            required: None,
            separator: None,
        },
    }
}

fn secondary_text_slot() -> TemplateRow {
    TemplateRow {
        content: SlotContent {
            kind: SlotKind::Text,
            name: "secondary_text".to_string(),
            required: Some(false),
            separator: Some(SECONDARY_SEPARATOR.to_string()),
        },
    }
}

impl Template {
    pub fn slug(&self) -> &'static str {
        match self {
            Template::SingleRow => "single-row",
            Template::DoubleRow => "double-row",
            Template::DoubleRowNoMedia => "double-row-no-media",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "single-row" => Some(Template::SingleRow),
            "double-row" => Some(Template::DoubleRow),
            "double-row-no-media" => Some(Template::DoubleRowNoMedia),
            _ => None,
        }
    }

    /// Column/row structure of the template.
    pub fn structure(&self) -> TemplateStructure {
        let image_column = TemplateColumn {
            size: ColumnSize::Span(1),
            rows: vec![image_slot()],
        };

        match self {
            Template::SingleRow => TemplateStructure {
                columns: vec![
                    image_column,
                    TemplateColumn {
                        size: ColumnSize::Auto("auto".to_string()),
                        rows: vec![primary_text_slot()],
                    },
                    TemplateColumn {
                        size: ColumnSize::Auto("auto".to_string()),
                        rows: vec![secondary_text_slot()],
                    },
                ],
            },
            Template::DoubleRow => TemplateStructure {
                columns: vec![
                    image_column,
                    TemplateColumn {
                        size: ColumnSize::Span(11),
                        rows: vec![primary_text_slot(), secondary_text_slot()],
                    },
                ],
            },
            Template::DoubleRowNoMedia => TemplateStructure {
                columns: vec![TemplateColumn {
                    size: ColumnSize::Span(12),
                    rows: vec![primary_text_slot(), secondary_text_slot()],
                }],
            },
        }
    }
}

/// Link bound to a template action slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub label: String,
    /// Record field holding the target URL.
    pub url: String,
}

/// What a template slot is bound to.
///
/// Serializes to the plain shapes the palette front end consumes: a string,
/// an array of strings or a `{label, url}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    /// A record field name, dotted path, or `icon:<name>` literal.
    Field(String),
    /// Several fields joined into one slot.
    Fields(Vec<String>),
    Action(ActionBinding),
}

impl Binding {
    pub fn field(name: &str) -> Self {
        Binding::Field(name.to_string())
    }

    pub fn icon(name: &str) -> Self {
        Binding::Field(format!("{}{}", ICON_PREFIX, name))
    }

    pub fn fields(names: &[&str]) -> Self {
        Binding::Fields(names.iter().map(|name| name.to_string()).collect())
    }

    pub fn action(label: &str, url_field: &str) -> Self {
        Binding::Action(ActionBinding {
            label: label.to_string(),
            url: url_field.to_string(),
        })
    }
}

/// A binding resolved against a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedSlot {
    Empty,
    Icon(String),
    Value(Value),
    Values(Vec<String>),
    Link { label: String, url: Option<String> },
}

/// Template plus slot bindings. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    template: Template,
    bindings: BTreeMap<String, Binding>,
}

impl Layout {
    pub fn new(template: Template, bindings: impl IntoIterator<Item = (&'static str, Binding)>) -> Self {
        Self {
            template,
            bindings: bindings
                .into_iter()
                .map(|(slot, binding)| (slot.to_string(), binding))
                .collect(),
        }
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn bindings(&self) -> &BTreeMap<String, Binding> {
        &self.bindings
    }

    pub fn binding(&self, slot: &str) -> Option<&Binding> {
        self.bindings.get(slot)
    }

    /// Resolve every binding against a record.
    pub fn resolve(&self, record: &IndexableRecord) -> BTreeMap<String, ResolvedSlot> {
        self.bindings
            .iter()
            .map(|(slot, binding)| (slot.clone(), resolve_binding(binding, record)))
            .collect()
    }
}

fn resolve_binding(binding: &Binding, record: &IndexableRecord) -> ResolvedSlot {
    match binding {
        Binding::Field(key) => {
            if let Some(icon) = key.strip_prefix(ICON_PREFIX) {
                return ResolvedSlot::Icon(icon.to_string());
            }
            match record.lookup_path(key) {
                Some(value) if !is_blank(value) => ResolvedSlot::Value(value.clone()),
                _ => ResolvedSlot::Empty,
            }
        }
        Binding::Fields(keys) => {
            let mut values: Vec<String> = Vec::with_capacity(keys.len());
            for key in keys {
                let text = match key.strip_prefix(ICON_PREFIX) {
                    Some(_) => Some(key.clone()),
                    None => record.lookup_path(key).and_then(value_text),
                };
                if let Some(text) = text {
                    if !values.contains(&text) {
                        values.push(text);
                    }
                }
            }
            ResolvedSlot::Values(values)
        }
        Binding::Action(action) => ResolvedSlot::Link {
            label: action.label.clone(),
            url: record
                .get_str(&action.url)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        },
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
