/// Report parser: apply the rule table to report text and build a
/// `StatisticsReport`.
///
/// Absent and malformed fields are collected as `FieldIssue`s. Under the
/// lenient policy they are logged and left at their defaults; under the
/// strict policy any issue fails the parse.
use crate::report::{ReportField, StatisticsReport};
use crate::rules::{self, RULES};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fmt;

/// How to treat fields that are absent or fail coercion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Leave the field at its default and continue.
    #[default]
    Lenient,
    /// Fail, naming every offending field.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// No line matched the field's pattern.
    Missing,
    /// A line matched but its value could not be coerced.
    Malformed { raw: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: ReportField,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: not found", self.field),
            IssueKind::Malformed { reason, .. } => write!(f, "{}: {reason}", self.field),
        }
    }
}

/// A parsed report plus the issues tolerated while building it.
#[derive(Debug)]
pub struct ParseOutcome {
    pub report: StatisticsReport,
    pub issues: Vec<FieldIssue>,
}

#[derive(Debug)]
pub enum ParseError {
    /// Strict mode: at least one field was missing or malformed.
    Incomplete { issues: Vec<FieldIssue> },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Incomplete { issues } => {
                write!(f, "{} field(s) could not be extracted: ", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse report text, stamping `stats_time` with the current time.
pub fn parse_report(text: &str, policy: MissingFieldPolicy) -> Result<ParseOutcome, ParseError> {
    parse_report_at(text, policy, Local::now())
}

/// Parse report text with an explicit collection time.
pub fn parse_report_at(
    text: &str,
    policy: MissingFieldPolicy,
    now: DateTime<Local>,
) -> Result<ParseOutcome, ParseError> {
    let mut report = StatisticsReport::new(now);
    let mut issues = Vec::new();

    for rule in RULES.iter() {
        let Some(raw) = rule.capture(text) else {
            issues.push(FieldIssue {
                field: rule.field,
                kind: IssueKind::Missing,
            });
            continue;
        };

        let coerced = rules::coerce(rule.kind, raw).and_then(|value| {
            report
                .assign(rule.field, value)
                .map_err(|v| format!("value {v:?} does not fit this field"))
        });

        match coerced {
            Ok(()) => tracing::debug!(field = %rule.field, raw, "extracted field"),
            Err(reason) => issues.push(FieldIssue {
                field: rule.field,
                kind: IssueKind::Malformed {
                    raw: raw.to_string(),
                    reason,
                },
            }),
        }
    }

    if policy == MissingFieldPolicy::Strict && !issues.is_empty() {
        return Err(ParseError::Incomplete { issues });
    }

    for issue in &issues {
        match &issue.kind {
            IssueKind::Missing => {
                tracing::warn!(field = %issue.field, "field not found, leaving default")
            }
            IssueKind::Malformed { raw, reason } => tracing::warn!(
                field = %issue.field,
                raw = %raw,
                reason = %reason,
                "malformed field value, leaving default"
            ),
        }
    }

    Ok(ParseOutcome { report, issues })
}
