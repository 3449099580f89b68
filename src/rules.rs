/// Field extraction rules for ccache statistics reports.
///
/// Each rule is a `(field, kind, pattern)` triple. Patterns are anchored at
/// line start so one label cannot match inside another (`cache size` vs
/// `max cache size`), and capture the rest of the line so that a present
/// but malformed value can be told apart from a missing line.
use crate::report::{FieldValue, ReportField};
use chrono::{Local, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

/// Format of the `stats zero time` value, e.g. `Fri Nov  9 11:04:45 2018`.
/// Whitespace runs are collapsed before parsing.
const ZERO_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Target type of a captured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Count,
    Percentage,
    Timestamp,
}

pub struct FieldRule {
    pub field: ReportField,
    pub kind: FieldKind,
    pub pattern: Regex,
}

const REST_OF_LINE: &str = r"(.+)";
const OPTIONAL_READONLY: &str = r"(?:\(readonly\)[ \t]+)?(.+)";

/// Compiled rule table, in report order.
pub static RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    use FieldKind::{Count, Percentage, Text, Timestamp};
    use ReportField as F;

    [
        (F::CacheDirectory, Text, "cache directory", REST_OF_LINE),
        (F::PrimaryConfig, Text, "primary config", REST_OF_LINE),
        (F::SecondaryConfigReadonly, Text, "secondary config", OPTIONAL_READONLY),
        (F::StatsZeroTime, Timestamp, "stats zero time", REST_OF_LINE),
        (F::CacheHitDirect, Count, "cache hit (direct)", REST_OF_LINE),
        (F::CacheHitPreprocessed, Count, "cache hit (preprocessed)", REST_OF_LINE),
        (F::CacheMiss, Count, "cache miss", REST_OF_LINE),
        (F::CacheHitRate, Percentage, "cache hit rate", REST_OF_LINE),
        (F::CalledForLink, Count, "called for link", REST_OF_LINE),
        (F::CalledForPreprocessing, Count, "called for preprocessing", REST_OF_LINE),
        (F::UnsupportedCodeDirective, Count, "unsupported code directive", REST_OF_LINE),
        (F::NoInputFile, Count, "no input file", REST_OF_LINE),
        (F::CleanupsPerformed, Count, "cleanups performed", REST_OF_LINE),
        (F::FilesInCache, Count, "files in cache", REST_OF_LINE),
        (F::CacheSize, Text, "cache size", REST_OF_LINE),
        (F::MaxCacheSize, Text, "max cache size", REST_OF_LINE),
    ]
    .into_iter()
    .map(|(field, kind, label, value)| FieldRule {
        field,
        kind,
        pattern: Regex::new(&format!(
            r"(?m)^[ \t]*{}[ \t]+{value}",
            regex::escape(label)
        ))
        .unwrap(),
    })
    .collect()
});

impl FieldRule {
    /// Raw value captured from the first matching line, trimmed.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }
}

/// Convert a raw capture into a typed value.
///
/// The error is a human-readable reason, used in diagnostics.
pub fn coerce(kind: FieldKind, raw: &str) -> Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty value".to_string());
    }

    match kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Count => parse_count(raw).map(FieldValue::Count),
        FieldKind::Percentage => parse_percentage(raw).map(FieldValue::Percentage),
        FieldKind::Timestamp => parse_zero_time(raw).map(FieldValue::Timestamp),
    }
}

fn parse_count(raw: &str) -> Result<u64, String> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected an unsigned integer, found {raw:?}"));
    }
    raw.parse::<u64>().map_err(|e| format!("{raw:?}: {e}"))
}

fn parse_percentage(raw: &str) -> Result<f64, String> {
    let number = raw.strip_suffix('%').unwrap_or(raw).trim_end();
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let well_formed = match number.split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction),
        None => digits(number),
    };
    if !well_formed {
        return Err(format!("expected a percentage like 27.11 %, found {raw:?}"));
    }
    number.parse::<f64>().map_err(|e| format!("{raw:?}: {e}"))
}

fn parse_zero_time(raw: &str) -> Result<chrono::DateTime<Local>, String> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let naive = NaiveDateTime::parse_from_str(&normalized, ZERO_TIME_FORMAT)
        .map_err(|e| format!("{raw:?} is not a date like \"Mon Jan 2 15:04:05 2006\": {e}"))?;

    // Ambiguous local times (DST fall-back) resolve to the earlier instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{raw:?} does not exist in the local timezone"))
}
