use std::path::Path;

use tpl_api::{fill_odt_content, fill_template_with_options};
use tpl_core::TemplateError;

use crate::source::{read_template, read_test_case};
use crate::text::odt_text_content;
use crate::{ExpectedOutcome, TestCase, TplToolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: Result<String, TemplateError>,
}

pub fn run_case(case_dir: &Path, case: &TestCase) -> Result<RunReport, TplToolError> {
    let template = read_template(case_dir)?;
    let outcome = if case.odt {
        fill_odt_content(&template, &case.data, &case.options)
    } else {
        fill_template_with_options(&template, &case.data, &case.options)
    };
    Ok(RunReport { outcome })
}

pub fn assert_case(case_dir: &Path, case_path: &Path) -> Result<(), TplToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(case_dir, &case)?;

    match (&case.expected, report.outcome) {
        (ExpectedOutcome::Xml { xml }, outcome) => {
            let actual = outcome?;
            if actual.trim_end() != xml.trim_end() {
                return Err(TplToolError::OutputMismatch {
                    expected: xml.clone(),
                    actual,
                });
            }
        }
        (ExpectedOutcome::Text { text }, outcome) => {
            let actual = odt_text_content(&outcome?)?;
            if actual != *text {
                return Err(TplToolError::OutputMismatch {
                    expected: text.clone(),
                    actual,
                });
            }
        }
        (ExpectedOutcome::Error { code }, Ok(output)) => {
            return Err(TplToolError::UnexpectedSuccess {
                expected_code: code.clone(),
                output,
            });
        }
        (ExpectedOutcome::Error { code }, Err(error)) => {
            if error.code != *code {
                return Err(TplToolError::ErrorCodeMismatch {
                    expected: code.clone(),
                    actual: error.code,
                });
            }
        }
    }

    Ok(())
}
