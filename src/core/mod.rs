//! Data model shared by the import and export pipelines.
//!
//! - [`Assembly`](assembly::Assembly): a reference genome with its
//!   [`Sequence`](assembly::Sequence), FASTA [`SequenceAdapter`](assembly::SequenceAdapter)
//!   and optional [`RefNameAlias`](assembly::RefNameAlias) table
//! - [`Track`](track::Track): a data layer with a polymorphic
//!   [`TrackAdapter`](track::TrackAdapter)
//! - [`Display`](display::Display) and [`Renderer`](display::Renderer): visual
//!   configuration attached to either of the above
//! - [`types`]: row identities, file locations and dispatch outcomes
//!
//! ## Adapter variants
//!
//! | Family      | Variants                                               | Index          |
//! |-------------|--------------------------------------------------------|----------------|
//! | Sequence    | `IndexedFastaAdapter`, `BgzipFastaAdapter`             | fai (+gzi)     |
//! | Tabix       | `Gff3TabixAdapter`, `BedTabixAdapter`, `VcfTabixAdapter` | `index.location` |
//! | Alignment   | `BamAdapter`, `CramAdapter`                            | `index.location` / `craiLocation` |
//! | Comparative | `PAFAdapter`, `DeltaAdapter`                           | none           |

pub mod assembly;
pub mod display;
pub mod track;
pub mod types;
