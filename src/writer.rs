//! Output side of the pipeline: serializes the merged document next to the
//! input, one file per calendar day. Unlike the read side, a failure here is
//! fatal, since a merge was computed but could not be persisted.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{error, info};

use crate::error::{MergeError, Result};

/// `merged_<YYYYMMDD>.json` in the input's directory. Re-running on the same
/// day overwrites the previous merge output.
pub fn output_path(input: &Path, date: NaiveDate) -> PathBuf {
    let dir = input.parent().filter(|p| !p.as_os_str().is_empty());
    dir.unwrap_or_else(|| Path::new("."))
        .join(format!("merged_{}.json", date.format("%Y%m%d")))
}

/// Writes the merged document beside the input, dated today.
pub fn write_merged(doc: &Value, input: &Path) -> Result<PathBuf> {
    write_merged_at(doc, input, Local::now().date_naive())
}

/// Same as [`write_merged`] but with an explicit date, for deterministic use.
pub fn write_merged_at(doc: &Value, input: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = output_path(input, date);
    match write_pretty(doc, &path) {
        Ok(()) => {
            info!(path = %path.display(), "JSON data merged and saved");
            Ok(path)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "error saving merged document");
            Err(MergeError::Write { path, source: e })
        }
    }
}

// 4-space indentation, matching the pretty-printing the output consumers expect.
fn write_pretty(doc: &Value, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    doc.serialize(&mut serializer)?;
    writer.flush()
}
