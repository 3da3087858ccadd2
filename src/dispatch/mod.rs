//! Type dispatch for the polymorphic parts of a configuration.
//!
//! Each adapter family has one static table of handlers keyed by the
//! document `type` tag. A handler carries both directions:
//!
//! | Family | Table | Import | Export |
//! |--------|-------|--------|--------|
//! | Sequence adapters | [`sequence_adapter::HANDLERS`] | node → [`SequenceAdapter`](crate::core::assembly::SequenceAdapter) | row → node |
//! | Track adapters | [`track_adapter::HANDLERS`] | node → [`TrackAdapter`](crate::core::track::TrackAdapter) | row → node |
//!
//! Renderers need no table: any typed renderer is kept, with its payload
//! stored opaquely ([`renderer::import`], [`renderer::export`]).
//!
//! Supporting a new adapter variant means adding one entry to its table
//! plus the table that stores it in [`crate::store::schema`].

use serde::Serialize;

pub mod renderer;
pub mod sequence_adapter;
pub mod track_adapter;

/// The polymorphic families that are dispatched on a `type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantFamily {
    SequenceAdapter,
    TrackAdapter,
    Renderer,
}

impl std::fmt::Display for VariantFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SequenceAdapter => write!(f, "sequence adapter"),
            Self::TrackAdapter => write!(f, "track adapter"),
            Self::Renderer => write!(f, "renderer"),
        }
    }
}
