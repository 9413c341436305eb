//! Orchestrates one run: reference set, document scan, batch fetch, merge,
//! and (only when something changed) the dated output file. Data flows one
//! way through those stages; nothing loops back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::document;
use crate::error::Result;
use crate::store::Store;
use crate::writer;

/// What a completed run did.
#[derive(Debug)]
pub struct Outcome {
    /// Identifiers from the document that were found in the reference set,
    /// duplicates included.
    pub matched: usize,
    /// Path of the merged output, when at least one feature was updated.
    pub output: Option<PathBuf>,
}

impl Outcome {
    fn unchanged(matched: usize) -> Outcome {
        Outcome {
            matched,
            output: None,
        }
    }
}

/// Runs the whole pipeline once, synchronously.
///
/// Storage trouble on the read side has already degraded to empty results by
/// the time it reaches this function, so the only errors coming back are an
/// unreadable or malformed input document and a failed output write.
pub fn run(store: &Store, input: &Path) -> Result<Outcome> {
    info!(input = %input.display(), "starting JSON conversion");

    let reference = store.reference_set();
    if reference.is_empty() {
        info!("reference set is empty, no matches possible");
        return Ok(Outcome::unchanged(0));
    }

    let mut doc = document::load(input)?;
    let matched = document::matched_identifiers(&doc, store.column(), &reference);
    let rows = store.rows_for(&matched);
    let changed = document::merge_rows(&mut doc, store.column(), &rows);
    if !changed {
        info!("no features updated, nothing written");
        return Ok(Outcome::unchanged(matched.len()));
    }

    let output = writer::write_merged(&doc, input)?;
    Ok(Outcome {
        matched: matched.len(),
        output: Some(output),
    })
}

/// Runs the pipeline on a blocking worker and hands the caller a handle to
/// await, so completion and failure stay observable instead of disappearing
/// into a detached thread.
pub fn spawn(store: Arc<Store>, input: PathBuf) -> JoinHandle<Result<Outcome>> {
    tokio::task::spawn_blocking(move || run(&store, &input))
}
