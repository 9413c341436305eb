//! Mapmerge – a one-shot batch-enrichment utility for GeoJSON-like feature
//! collections.
//!
//! A run joins a document against a relational reference table by a
//! normalized identifier and writes the enriched result to a dated file:
//! * [`document::normalize`] canonicalizes identifiers (trim, lowercase) so
//!   reference rows, features and fetched rows all compare on the same key.
//! * [`store::Store`] loads the reference set and batch-fetches attribute
//!   rows for the matched identifiers over a fixed-size connection pool.
//! * [`document::matched_identifiers`] filters the document's features down
//!   to the identifiers storage knows about, in document order.
//! * [`document::merge_rows`] merges fetched columns into the matching
//!   features' `properties` maps in place.
//! * [`writer`] persists the mutated document as `merged_<YYYYMMDD>.json`
//!   beside the input, but only when at least one feature was updated.
//!
//! ## Modules
//! * [`datatype`] – The closed [`datatype::ColumnValue`] scalar model and the
//!   one-time conversion from storage types to JSON-safe values.
//! * [`document`] – Normalization, feature scanning and the merge engine.
//! * [`store`] – Connection pool and the two query shapes against storage.
//! * [`writer`] – Dated, pretty-printed output serialization.
//! * [`pipeline`] – Wires the stages together and exposes an awaitable run.
//! * [`settings`] – Configuration file and environment overrides.
//!
//! ## Error Handling
//! Read-side storage failures are logged and degrade to empty results; the
//! run then completes without output. A malformed input document or a failed
//! output write comes back as [`error::MergeError`].
//!
//! ## Quick Start
//! ```no_run
//! use std::path::Path;
//! use mapmerge::{pipeline, settings::Settings, store::Store};
//! let settings = Settings::load(Path::new("mapmerge.toml")).unwrap();
//! let store = Store::open(&settings.storage).unwrap();
//! let outcome = pipeline::run(&store, &settings.input.path).unwrap();
//! if let Some(path) = outcome.output {
//!     println!("merged document saved to {}", path.display());
//! }
//! ```

pub mod datatype;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod settings;
pub mod store;
pub mod writer;
