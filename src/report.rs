/// The structured form of a ccache statistics report.
///
/// One `StatisticsReport` is built per invocation: the parser fills it in a
/// single pass over the input and the output module serializes it. Field
/// names double as the JSON keys.
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub cache_directory: String,
    pub primary_config: String,
    pub secondary_config_readonly: String,
    pub stats_time: DateTime<Local>,
    pub stats_zero_time: Option<DateTime<Local>>,
    pub cache_hit_direct: u64,
    pub cache_hit_preprocessed: u64,
    pub cache_miss: u64,
    pub cache_hit_rate: f64,
    pub called_for_link: u64,
    pub called_for_preprocessing: u64,
    pub unsupported_code_directive: u64,
    pub no_input_file: u64,
    pub cleanups_performed: u64,
    pub files_in_cache: u64,
    pub cache_size: String,
    /// Reserved for size-unit conversion; never filled by the parser.
    pub cache_size_bytes: u64,
    pub max_cache_size: String,
    /// Reserved for size-unit conversion; never filled by the parser.
    pub max_cache_size_bytes: u64,
}

impl StatisticsReport {
    /// An empty report stamped with the given collection time.
    pub fn new(stats_time: DateTime<Local>) -> Self {
        Self {
            cache_directory: String::new(),
            primary_config: String::new(),
            secondary_config_readonly: String::new(),
            stats_time,
            stats_zero_time: None,
            cache_hit_direct: 0,
            cache_hit_preprocessed: 0,
            cache_miss: 0,
            cache_hit_rate: 0.0,
            called_for_link: 0,
            called_for_preprocessing: 0,
            unsupported_code_directive: 0,
            no_input_file: 0,
            cleanups_performed: 0,
            files_in_cache: 0,
            cache_size: String::new(),
            cache_size_bytes: 0,
            max_cache_size: String::new(),
            max_cache_size_bytes: 0,
        }
    }

    /// Store a coerced value in the slot for `field`.
    ///
    /// Hands the value back unchanged if its type does not fit the field.
    pub fn assign(&mut self, field: ReportField, value: FieldValue) -> Result<(), FieldValue> {
        use FieldValue::{Count, Percentage, Text, Timestamp};
        use ReportField as F;

        match (field, value) {
            (F::CacheDirectory, Text(v)) => self.cache_directory = v,
            (F::PrimaryConfig, Text(v)) => self.primary_config = v,
            (F::SecondaryConfigReadonly, Text(v)) => self.secondary_config_readonly = v,
            (F::StatsZeroTime, Timestamp(v)) => self.stats_zero_time = Some(v),
            (F::CacheHitDirect, Count(v)) => self.cache_hit_direct = v,
            (F::CacheHitPreprocessed, Count(v)) => self.cache_hit_preprocessed = v,
            (F::CacheMiss, Count(v)) => self.cache_miss = v,
            (F::CacheHitRate, Percentage(v)) => self.cache_hit_rate = v,
            (F::CalledForLink, Count(v)) => self.called_for_link = v,
            (F::CalledForPreprocessing, Count(v)) => self.called_for_preprocessing = v,
            (F::UnsupportedCodeDirective, Count(v)) => self.unsupported_code_directive = v,
            (F::NoInputFile, Count(v)) => self.no_input_file = v,
            (F::CleanupsPerformed, Count(v)) => self.cleanups_performed = v,
            (F::FilesInCache, Count(v)) => self.files_in_cache = v,
            (F::CacheSize, Text(v)) => self.cache_size = v,
            (F::MaxCacheSize, Text(v)) => self.max_cache_size = v,
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

/// The report fields that are extracted from input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    CacheDirectory,
    PrimaryConfig,
    SecondaryConfigReadonly,
    StatsZeroTime,
    CacheHitDirect,
    CacheHitPreprocessed,
    CacheMiss,
    CacheHitRate,
    CalledForLink,
    CalledForPreprocessing,
    UnsupportedCodeDirective,
    NoInputFile,
    CleanupsPerformed,
    FilesInCache,
    CacheSize,
    MaxCacheSize,
}

impl ReportField {
    /// JSON key of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportField::CacheDirectory => "cache_directory",
            ReportField::PrimaryConfig => "primary_config",
            ReportField::SecondaryConfigReadonly => "secondary_config_readonly",
            ReportField::StatsZeroTime => "stats_zero_time",
            ReportField::CacheHitDirect => "cache_hit_direct",
            ReportField::CacheHitPreprocessed => "cache_hit_preprocessed",
            ReportField::CacheMiss => "cache_miss",
            ReportField::CacheHitRate => "cache_hit_rate",
            ReportField::CalledForLink => "called_for_link",
            ReportField::CalledForPreprocessing => "called_for_preprocessing",
            ReportField::UnsupportedCodeDirective => "unsupported_code_directive",
            ReportField::NoInputFile => "no_input_file",
            ReportField::CleanupsPerformed => "cleanups_performed",
            ReportField::FilesInCache => "files_in_cache",
            ReportField::CacheSize => "cache_size",
            ReportField::MaxCacheSize => "max_cache_size",
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw capture after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Count(u64),
    Percentage(f64),
    Timestamp(DateTime<Local>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Local> {
        Local.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn new_report_is_zeroed() {
        let r = StatisticsReport::new(epoch());
        assert_eq!(r.stats_time, epoch());
        assert!(r.stats_zero_time.is_none());
        assert!(r.cache_directory.is_empty());
        assert_eq!(r.cache_miss, 0);
        assert_eq!(r.cache_hit_rate, 0.0);
        assert_eq!(r.cache_size_bytes, 0);
        assert_eq!(r.max_cache_size_bytes, 0);
    }

    #[test]
    fn assign_stores_matching_types() {
        let mut r = StatisticsReport::new(epoch());
        r.assign(ReportField::CacheMiss, FieldValue::Count(207))
            .unwrap();
        r.assign(ReportField::CacheHitRate, FieldValue::Percentage(27.11))
            .unwrap();
        r.assign(ReportField::CacheSize, FieldValue::Text("12.1 MB".into()))
            .unwrap();
        r.assign(ReportField::StatsZeroTime, FieldValue::Timestamp(epoch()))
            .unwrap();

        assert_eq!(r.cache_miss, 207);
        assert_eq!(r.cache_hit_rate, 27.11);
        assert_eq!(r.cache_size, "12.1 MB");
        assert_eq!(r.stats_zero_time, Some(epoch()));
    }

    #[test]
    fn assign_rejects_mismatched_type() {
        let mut r = StatisticsReport::new(epoch());
        let result = r.assign(ReportField::CacheMiss, FieldValue::Text("207".into()));
        assert_eq!(result, Err(FieldValue::Text("207".into())));
        assert_eq!(r.cache_miss, 0);
    }

    #[test]
    fn field_names_match_serialized_keys() {
        let r = StatisticsReport::new(epoch());
        let v = serde_json::to_value(&r).unwrap();
        let obj = v.as_object().unwrap();
        for field in [
            ReportField::CacheDirectory,
            ReportField::SecondaryConfigReadonly,
            ReportField::StatsZeroTime,
            ReportField::UnsupportedCodeDirective,
            ReportField::MaxCacheSize,
        ] {
            assert!(obj.contains_key(field.as_str()), "missing key {field}");
        }
        assert_eq!(obj.len(), 19);
    }
}
