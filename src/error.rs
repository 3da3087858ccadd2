use thiserror::Error;

use crate::dispatch::VariantFamily;
use crate::store::StoreError;

/// Errors raised while mapping between documents and the relational store
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("{entity} `{key}` is missing required field `{field}`")]
    MissingRequiredField {
        entity: &'static str,
        key: String,
        field: String,
    },

    #[error("{adapter_type} on track `{track_id}` requires at least {required} assemblyNames, found {found}")]
    AssemblyNamesCardinality {
        track_id: String,
        adapter_type: String,
        required: usize,
        found: usize,
    },

    #[error("{adapter_type} on track `{track_id}` cannot resolve {reference}")]
    UnresolvedReference {
        track_id: String,
        adapter_type: String,
        reference: String,
    },

    #[error("Unknown {family} type `{type_tag}`")]
    UnknownVariant {
        family: VariantFamily,
        type_tag: String,
    },

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to read or write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`MapperError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingRequiredField,
    UnresolvedReference,
    UnknownVariant,
    StoreFailure,
    Document,
}

impl MapperError {
    pub fn missing(entity: &'static str, key: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            entity,
            key: key.into(),
            field: field.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredField { .. } | Self::AssemblyNamesCardinality { .. } => {
                ErrorKind::MissingRequiredField
            }
            Self::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            Self::UnknownVariant { .. } => ErrorKind::UnknownVariant,
            Self::Store(_) => ErrorKind::StoreFailure,
            Self::Io(_) | Self::Json(_) => ErrorKind::Document,
        }
    }

    /// Whether an import run must stop and roll back on this error.
    ///
    /// Unresolved references only cost the one adapter record and unknown
    /// variants are skipped where they are found.
    #[must_use]
    pub fn is_fatal_to_run(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::UnresolvedReference | ErrorKind::UnknownVariant
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_is_missing_field_class() {
        let err = MapperError::AssemblyNamesCardinality {
            track_id: "synteny".to_string(),
            adapter_type: "PAFAdapter".to_string(),
            required: 2,
            found: 1,
        };
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert!(err.is_fatal_to_run());
        assert!(err.to_string().contains("at least 2 assemblyNames, found 1"));
    }

    #[test]
    fn test_unresolved_reference_is_not_fatal() {
        let err = MapperError::UnresolvedReference {
            track_id: "reads".to_string(),
            adapter_type: "BamAdapter".to_string(),
            reference: "BgzipFastaAdapter of assembly `hg38`".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnresolvedReference);
        assert!(!err.is_fatal_to_run());
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let err = MapperError::from(StoreError::Constraint("duplicate".to_string()));
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert!(err.is_fatal_to_run());
    }

    #[test]
    fn test_missing_message() {
        let err = MapperError::missing("track", "genes", "adapter.type");
        assert_eq!(
            err.to_string(),
            "track `genes` is missing required field `adapter.type`"
        );
    }
}
