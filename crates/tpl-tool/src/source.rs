use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{TestCase, TplToolError, TESTCASE_SCHEMA_V1};

pub const TEMPLATE_FILE: &str = "template.xml";
pub const TESTCASE_FILE: &str = "testcase.json";

/// Cases kept in the workspace under `fixtures/cases`.
pub fn bundled_cases_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("cases")
}

pub fn read_template(case_dir: &Path) -> Result<String, TplToolError> {
    let path = case_dir.join(TEMPLATE_FILE);
    fs::read_to_string(&path).map_err(|source| TplToolError::ReadFile { path, source })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, TplToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| TplToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| TplToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(TplToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

/// Every directory under `root` holding a `testcase.json`, sorted by path.
pub fn discover_case_dirs(root: &Path) -> Result<Vec<PathBuf>, TplToolError> {
    let mut dirs = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == TESTCASE_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect::<Vec<_>>();
    dirs.sort();

    if dirs.is_empty() {
        return Err(TplToolError::CasesEmpty {
            path: root.to_path_buf(),
            file: TESTCASE_FILE.to_string(),
        });
    }
    Ok(dirs)
}
