use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum TemplateValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<TemplateValue>),
    Map(BTreeMap<String, TemplateValue>),
}

impl TemplateValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Property access used by dotted paths: map keys, or decimal indexes
    /// into arrays.
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        match self {
            Self::Map(entries) => entries.get(key),
            Self::Array(values) => key
                .parse::<usize>()
                .ok()
                .and_then(|index| values.get(index)),
            _ => None,
        }
    }

    /// Text rendering used when a value is substituted into the document.
    pub fn to_template_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::String(value) => value.clone(),
            Self::Array(values) => values
                .iter()
                .map(TemplateValue::to_template_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl From<serde_json::Value> for TemplateValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(value) => Self::Number(value.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(values) => {
                Self::Array(values.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for TemplateValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl<T: Into<TemplateValue>> From<Vec<T>> for TemplateValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, TemplateValue>> for TemplateValue {
    fn from(entries: BTreeMap<String, TemplateValue>) -> Self {
        Self::Map(entries)
    }
}

/// Scope chain seen by expressions. A loop iteration layers one binding on
/// top of its parent; the parent is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct DataContext<'a> {
    root: &'a TemplateValue,
    binding: Option<(&'a str, &'a TemplateValue)>,
    parent: Option<&'a DataContext<'a>>,
}

impl<'a> DataContext<'a> {
    pub fn new(root: &'a TemplateValue) -> Self {
        Self {
            root,
            binding: None,
            parent: None,
        }
    }

    pub fn bind(&'a self, name: &'a str, value: &'a TemplateValue) -> DataContext<'a> {
        DataContext {
            root: self.root,
            binding: Some((name, value)),
            parent: Some(self),
        }
    }

    /// Looks up a top-level name; inner bindings shadow outer ones and the
    /// root data.
    pub fn lookup(&self, name: &str) -> Option<&'a TemplateValue> {
        let mut current = Some(self);
        while let Some(context) = current {
            if let Some((bound, value)) = context.binding {
                if bound == name {
                    return Some(value);
                }
            }
            current = context.parent;
        }
        self.root.get(name)
    }
}
