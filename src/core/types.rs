use serde::{Deserialize, Serialize};

/// Generated identity of a persisted row
pub type RowId = i64;

/// The `locationType` most documents use for their file locations
pub const URI_LOCATION: &str = "UriLocation";

/// A `{locationType, uri}` pair pointing at a data or index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Location kind, usually `UriLocation`. Absent in some hand-written configs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,

    /// File URI or path
    pub uri: String,
}

impl Location {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            location_type: Some(URI_LOCATION.to_string()),
            uri: uri.into(),
        }
    }

    /// A location without an explicit `locationType`
    pub fn bare(uri: impl Into<String>) -> Self {
        Self {
            location_type: None,
            uri: uri.into(),
        }
    }
}

/// Which kind of entity owns a display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParentType {
    /// The display belongs to an assembly's reference sequence
    Assembly,
    /// The display belongs to a track
    Track,
}

impl ParentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assembly => "Assembly",
            Self::Track => "Track",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Assembly" => Some(Self::Assembly),
            "Track" => Some(Self::Track),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of the entity a display hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayParent {
    pub parent_type: ParentType,
    pub id: RowId,
}

impl DisplayParent {
    #[must_use]
    pub fn assembly(id: RowId) -> Self {
        Self {
            parent_type: ParentType::Assembly,
            id,
        }
    }

    #[must_use]
    pub fn track(id: RowId) -> Self {
        Self {
            parent_type: ParentType::Track,
            id,
        }
    }
}

/// Outcome of dispatching one polymorphic node on its `type` tag.
///
/// A known tag with all required fields resolves; an unknown tag is
/// skipped. A known tag with a missing field is an error and never
/// reaches this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Resolved(T),
    Skipped { type_tag: String },
}

impl<T> Resolution<T> {
    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
