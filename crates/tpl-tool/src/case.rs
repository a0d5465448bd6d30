use serde::{Deserialize, Serialize};
use tpl_core::{FillOptions, TemplateValue};

pub const TESTCASE_SCHEMA_V1: &str = "tpl-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default)]
    pub data: TemplateValue,
    /// Treat `template.xml` as an OpenDocument content part.
    #[serde(default)]
    pub odt: bool,
    #[serde(default)]
    pub options: FillOptions,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedOutcome {
    /// Exact serialized output.
    Xml { xml: String },
    /// Plain text of the filled document body, one line per paragraph.
    Text { text: String },
    Error { code: String },
}

impl ExpectedOutcome {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Xml { .. } => "xml",
            Self::Text { .. } => "text",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod case_tests {
    use super::*;
    use tpl_core::MissingValuePolicy;

    #[test]
    fn testcase_deserialize_applies_defaults() {
        let parsed: TestCase = serde_json::from_str(
            r#"{
  "schemaVersion": "tpl-tool-case.v1",
  "expected": {"kind": "xml", "xml": "<doc/>"}
}"#,
        )
        .expect("testcase should deserialize");

        assert_eq!(parsed.schema_version, TESTCASE_SCHEMA_V1);
        assert_eq!(parsed.data, TemplateValue::Null);
        assert!(!parsed.odt);
        assert_eq!(parsed.options, FillOptions::default());
        assert_eq!(parsed.expected.kind_name(), "xml");
    }

    #[test]
    fn expected_outcome_deserialize_supports_all_variants() {
        let parsed: Vec<ExpectedOutcome> = serde_json::from_str(
            r#"[
  {"kind":"xml","xml":"<a/>"},
  {"kind":"text","text":"a\n"},
  {"kind":"error","code":"TEMPLATE_ITERABLE_MISSING"}
]"#,
        )
        .expect("outcomes should deserialize");

        assert_eq!(parsed.len(), 3);
        assert!(matches!(parsed[0], ExpectedOutcome::Xml { .. }));
        assert!(matches!(parsed[1], ExpectedOutcome::Text { .. }));
        assert!(matches!(parsed[2], ExpectedOutcome::Error { .. }));
    }

    #[test]
    fn testcase_reads_options() {
        let parsed: TestCase = serde_json::from_str(
            r#"{
  "schemaVersion": "tpl-tool-case.v1",
  "data": {"a": 1},
  "odt": true,
  "options": {"missingValue": "error"},
  "expected": {"kind": "error", "code": "TEMPLATE_VALUE_MISSING"}
}"#,
        )
        .expect("testcase should deserialize");
        assert!(parsed.odt);
        assert_eq!(parsed.options.missing_value, MissingValuePolicy::Error);
        assert_eq!(parsed.expected.kind_name(), "error");
    }
}
