use std::sync::OnceLock;

use regex::Regex;
use tpl_core::{DataContext, MissingValuePolicy, TemplateError};

use crate::expression::resolve;

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // `{`, `#` and `/` are excluded so loop markers never read as placeholders.
    REGEX.get_or_init(|| Regex::new(r"\{([^{#/]+?)\}").expect("placeholder regex must compile"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Expression { expression: String, matched: String },
}

/// Literal text and expressions in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationPlan {
    segments: Vec<Segment>,
}

impl InterpolationPlan {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn fill(
        &self,
        context: &DataContext<'_>,
        policy: MissingValuePolicy,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expression {
                    expression,
                    matched,
                } => match resolve(expression, context) {
                    Some(value) if !value.is_null() => out.push_str(&value.to_template_string()),
                    _ => match policy {
                        MissingValuePolicy::Empty => {
                            tracing::warn!(
                                expression = %expression,
                                placeholder = %matched,
                                "placeholder resolved to no value, substituting empty text"
                            );
                        }
                        MissingValuePolicy::Error => {
                            return Err(TemplateError::data(
                                "TEMPLATE_VALUE_MISSING",
                                format!("Placeholder {} has no value.", matched),
                            ));
                        }
                    },
                },
            }
        }
        Ok(out)
    }
}

/// Returns `None` when `text` holds no placeholder at all.
pub fn scan(text: &str) -> Option<InterpolationPlan> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    for captures in placeholder_regex().captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(Segment::Literal(text[cursor..whole.start()].to_string()));
        }
        segments.push(Segment::Expression {
            expression: inner.as_str().trim().to_string(),
            matched: whole.as_str().to_string(),
        });
        cursor = whole.end();
    }

    if cursor == 0 {
        return None;
    }
    if cursor < text.len() {
        segments.push(Segment::Literal(text[cursor..].to_string()));
    }
    Some(InterpolationPlan { segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpl_core::TemplateValue;

    fn data(raw: &str) -> TemplateValue {
        serde_json::from_str(raw).expect("json should parse")
    }

    #[test]
    fn scan_returns_none_without_placeholders() {
        assert_eq!(scan("plain text"), None);
        assert_eq!(scan(""), None);
        assert_eq!(scan("{#each items as item}"), None);
        assert_eq!(scan("{/each}"), None);
        assert_eq!(scan("{}"), None);
    }

    #[test]
    fn scan_builds_ordered_segments() {
        let plan = scan("Yo {nom} !\nTu es né.e le { dateNaissance }\n").expect("plan expected");
        assert_eq!(
            plan.segments(),
            &[
                Segment::Literal("Yo ".to_string()),
                Segment::Expression {
                    expression: "nom".to_string(),
                    matched: "{nom}".to_string(),
                },
                Segment::Literal(" !\nTu es né.e le ".to_string()),
                Segment::Expression {
                    expression: "dateNaissance".to_string(),
                    matched: "{ dateNaissance }".to_string(),
                },
                Segment::Literal("\n".to_string()),
            ]
        );
    }

    #[test]
    fn scan_handles_repeated_identical_placeholders() {
        let plan = scan("{a}-{a}").expect("plan expected");
        let value = data(r#"{"a": "x"}"#);
        let filled = plan
            .fill(&DataContext::new(&value), MissingValuePolicy::Empty)
            .expect("fill should pass");
        assert_eq!(filled, "x-x");
    }

    #[test]
    fn fill_replaces_placeholders_and_keeps_literals() {
        let value = data(r#"{"nom": "David Bruant", "dateNaissance": "8 mars 1987"}"#);
        let plan = scan("Yo {nom} !\nTu es né.e le {dateNaissance}\n").expect("plan expected");
        let filled = plan
            .fill(&DataContext::new(&value), MissingValuePolicy::Empty)
            .expect("fill should pass");
        assert_eq!(filled, "Yo David Bruant !\nTu es né.e le 8 mars 1987\n");
    }

    #[test]
    fn fill_stringifies_scalars() {
        let value = data(r#"{"n": 42, "f": 1.5, "b": false}"#);
        let plan = scan("{n}|{f}|{b}").expect("plan expected");
        let filled = plan
            .fill(&DataContext::new(&value), MissingValuePolicy::Empty)
            .expect("fill should pass");
        assert_eq!(filled, "42|1.5|false");
    }

    #[test]
    fn fill_missing_value_defaults_to_empty() {
        let value = data(r#"{"n": null}"#);
        let plan = scan("[{missing}][{n}]").expect("plan expected");
        let filled = plan
            .fill(&DataContext::new(&value), MissingValuePolicy::Empty)
            .expect("fill should pass");
        assert_eq!(filled, "[][]");
    }

    #[test]
    fn fill_missing_value_errors_under_strict_policy() {
        let value = data("{}");
        let plan = scan("{missing.path}").expect("plan expected");
        let error = plan
            .fill(&DataContext::new(&value), MissingValuePolicy::Error)
            .expect_err("missing value should fail");
        assert_eq!(error.code, "TEMPLATE_VALUE_MISSING");
        assert!(error.is_data());
    }
}
