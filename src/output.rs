/// JSON rendering of a parsed report.
use crate::report::StatisticsReport;
use std::io::Write;

#[derive(Debug)]
pub enum OutputError {
    Serialize { source: serde_json::Error },
    Write { source: std::io::Error },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Serialize { source } => write!(f, "failed to serialize report: {source}"),
            OutputError::Write { source } => write!(f, "failed to write output: {source}"),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Serialize { source } => Some(source),
            OutputError::Write { source } => Some(source),
        }
    }
}

/// Render the report as JSON: one line by default, indented when `pretty`.
pub fn render(report: &StatisticsReport, pretty: bool) -> Result<String, OutputError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    json.map_err(|e| OutputError::Serialize { source: e })
}

/// Write the rendered report plus a trailing newline.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &StatisticsReport,
    pretty: bool,
) -> Result<(), OutputError> {
    let json = render(report, pretty)?;
    writeln!(out, "{json}")
        .and_then(|_| out.flush())
        .map_err(|e| OutputError::Write { source: e })
}
