//! Output formatting for extracted records.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::pipeline::FileReport;
use crate::types::FunctionType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `name; returns; param; ...; ` line per record.
    #[default]
    Line,
    /// A JSON array of `{file, name, params, returns}` objects.
    Json,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    file: String,
    #[serde(flatten)]
    function: &'a FunctionType,
}

/// Write the records of every successfully extracted file to `out`.
///
/// Failed files contribute nothing here; the caller reports them.
pub fn render(reports: &[FileReport], format: OutputFormat, out: &mut impl Write) -> io::Result<()> {
    let records = reports.iter().flat_map(|report| {
        report
            .outcome
            .iter()
            .flat_map(|extraction| extraction.functions.iter())
            .map(move |function| (report, function))
    });

    match format {
        OutputFormat::Line => {
            for (_, function) in records {
                writeln!(out, "{}", function)?;
            }
        }
        OutputFormat::Json => {
            let json: Vec<JsonRecord<'_>> = records
                .map(|(report, function)| JsonRecord {
                    file: report.path.display().to_string(),
                    function,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
