//! Run reports for the import and export pipelines.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ErrorKind, MapperError};

/// Why a record was left out of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownVariant,
    UnresolvedReference,
    MissingRequiredField,
    StoreFailure,
    /// The owner names a variant but no row of it exists
    NotStored,
}

impl SkipReason {
    #[must_use]
    pub fn from_error(err: &MapperError) -> Self {
        match err.kind() {
            ErrorKind::UnknownVariant => Self::UnknownVariant,
            ErrorKind::UnresolvedReference => Self::UnresolvedReference,
            ErrorKind::MissingRequiredField | ErrorKind::Document => Self::MissingRequiredField,
            ErrorKind::StoreFailure => Self::StoreFailure,
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariant => write!(f, "unknown variant"),
            Self::UnresolvedReference => write!(f, "unresolved reference"),
            Self::MissingRequiredField => write!(f, "missing required field"),
            Self::StoreFailure => write!(f, "store failure"),
            Self::NotStored => write!(f, "not stored"),
        }
    }
}

/// A record that was skipped (import) or omitted (export)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// What was skipped, e.g. `track adapter`
    pub entity: &'static str,
    /// `name` of the owning assembly or `trackId` of the owning track
    pub owner: String,
    pub reason: SkipReason,
    pub detail: String,
}

impl SkippedRecord {
    pub fn unknown(entity: &'static str, owner: impl Into<String>, type_tag: &str) -> Self {
        Self {
            entity,
            owner: owner.into(),
            reason: SkipReason::UnknownVariant,
            detail: format!("unknown type `{type_tag}`"),
        }
    }

    pub fn from_error(entity: &'static str, owner: impl Into<String>, err: &MapperError) -> Self {
        Self {
            entity,
            owner: owner.into(),
            reason: SkipReason::from_error(err),
            detail: err.to_string(),
        }
    }
}

/// Outcome of one import run
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub assemblies: usize,
    pub sequence_adapters: usize,
    pub ref_name_alias_features: usize,
    pub tracks: usize,
    pub track_adapters: usize,
    pub displays: usize,
    pub renderers: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            assemblies: 0,
            sequence_adapters: 0,
            ref_name_alias_features: 0,
            tracks: 0,
            track_adapters: 0,
            displays: 0,
            renderers: 0,
            skipped: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn skip(&mut self, record: SkippedRecord) {
        self.skipped.push(record);
    }

    /// Records skipped for `reason`
    pub fn skipped_for(&self, reason: SkipReason) -> impl Iterator<Item = &SkippedRecord> {
        self.skipped.iter().filter(move |r| r.reason == reason)
    }
}

/// Outcome of one export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub assemblies: usize,
    pub tracks: usize,
    pub adapters: usize,
    pub displays: usize,
    pub renderers: usize,
    pub omitted: Vec<SkippedRecord>,
}

impl ExportReport {
    #[must_use]
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            assemblies: 0,
            tracks: 0,
            adapters: 0,
            displays: 0,
            renderers: 0,
            omitted: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn omit(&mut self, record: SkippedRecord) {
        self.omitted.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_from_error() {
        let err = MapperError::UnresolvedReference {
            track_id: "reads".to_string(),
            adapter_type: "BamAdapter".to_string(),
            reference: "BgzipFastaAdapter of assembly `hg38`".to_string(),
        };
        let record = SkippedRecord::from_error("track adapter", "reads", &err);
        assert_eq!(record.reason, SkipReason::UnresolvedReference);
        assert!(record.detail.contains("hg38"));
    }

    #[test]
    fn test_import_report_filters_by_reason() {
        let mut report = ImportReport::start();
        report.skip(SkippedRecord::unknown("track adapter", "foo", "FooAdapter"));
        report.skip(SkippedRecord::unknown("sequence adapter", "hg38", "TwoBitAdapter"));
        report.finish();

        assert_eq!(report.skipped_for(SkipReason::UnknownVariant).count(), 2);
        assert_eq!(report.skipped_for(SkipReason::UnresolvedReference).count(), 0);
        assert!(report.finished_at.unwrap() >= report.started_at);
    }

    #[test]
    fn test_report_serializes_reason_snake_case() {
        let mut report = ExportReport::start();
        report.omit(SkippedRecord::unknown("track adapter", "foo", "FooAdapter"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["omitted"][0]["reason"], "unknown_variant");
        assert_eq!(json["omitted"][0]["owner"], "foo");
    }
}
