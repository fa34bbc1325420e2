//! Core workflows for Poetry Hub.
//!
//! The centrepiece is the bulk import pipeline: a ZIP archive is unpacked
//! ([`archive`]), its CSV entry parsed ([`tabular`]) into [`ImportRecord`]s,
//! and an [`Importer`] persists them through a [`CatalogStore`] with
//! poet/poem deduplication and streamed [`ImportProgress`].
//!
//! [`search`] and [`analysis`] layer the completion service over the catalog.

pub mod analysis;
pub mod archive;
pub mod ingest;
pub mod record;
pub mod search;
pub mod store;
pub mod tabular;

#[cfg(test)]
pub(crate) mod test_support;

pub use ingest::{ImportOptions, ImportProgress, ImportSummary, Importer, import_archive};
pub use record::ImportRecord;
pub use store::CatalogStore;
