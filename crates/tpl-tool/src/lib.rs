mod case;
mod runner;
mod source;
mod text;

pub use case::{ExpectedOutcome, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, run_case, RunReport};
pub use source::{
    bundled_cases_root, discover_case_dirs, read_template, read_test_case, TEMPLATE_FILE,
    TESTCASE_FILE,
};
pub use text::odt_text_content;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TplToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No {file} found under {path}.")]
    CasesEmpty { path: PathBuf, file: String },
    #[error("Template error: {0}")]
    Template(#[from] tpl_core::TemplateError),
    #[error("Failed to read filled document: {0}")]
    OutputXml(#[from] roxmltree::Error),
    #[error("Output mismatch.\nexpected:\n{expected}\nactual:\n{actual}")]
    OutputMismatch { expected: String, actual: String },
    #[error("Expected error {expected_code}, but fill succeeded with:\n{output}")]
    UnexpectedSuccess {
        expected_code: String,
        output: String,
    },
    #[error("Expected error {expected}, got {actual}.")]
    ErrorCodeMismatch { expected: String, actual: String },
}
