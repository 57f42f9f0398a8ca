//! Data-driven extraction fixtures.
//!
//! Each `tests/fixtures/*.fixture` file holds the expected line-format
//! output, a line containing only `---`, and the PHP source to extract.
//! Expected lines starting with `!` name declarations that must produce
//! a diagnostic instead of a record.

use std::path::Path;

use phpdoc_extract::{ExtractOptions, extract_source};

fn run_fixture(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let (expected, php) = content
        .split_once("\n---\n")
        .ok_or("fixture is missing the `---` separator")?;

    let extraction = extract_source(php, &ExtractOptions::default())?;

    let mut actual: Vec<String> = extraction
        .functions
        .iter()
        .map(|f| f.to_string().trim_end().to_string())
        .collect();
    actual.extend(
        extraction
            .diagnostics
            .iter()
            .map(|d| format!("!{}", d.declaration)),
    );

    let expected: Vec<String> = expected
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if actual != expected {
        return Err(format!(
            "{}: output mismatch\nexpected:\n{}\nactual:\n{}",
            path.display(),
            expected.join("\n"),
            actual.join("\n"),
        )
        .into());
    }
    Ok(())
}

datatest_stable::harness! {
    { test = run_fixture, root = "tests/fixtures", pattern = r"^.*\.fixture$" },
}
