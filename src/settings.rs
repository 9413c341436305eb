//! Persisted configuration: storage location, reference table layout and the
//! input document path. Read from an optional `mapmerge.toml` with
//! `MAPMERGE_*` environment variables layered on top.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;

pub const CONFIG_FILE: &str = "mapmerge.toml";

const TEMPLATE: &str = "\
# mapmerge configuration
#
# [storage]
# path   = path to the SQLite database holding the reference table
# table  = reference table name            (default: mapexport)
# column = identifier column in that table (default: field)

[storage]
path = \"\"

[input]
# the feature collection to enrich
path = \"\"
";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub input: InputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub path: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_column")]
    pub column: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    pub path: PathBuf,
}

fn default_table() -> String {
    "mapexport".to_owned()
}

fn default_column() -> String {
    "field".to_owned()
}

fn default_pool_size() -> usize {
    5
}

impl Settings {
    /// Loads settings from the given file with environment overrides, e.g.
    /// `MAPMERGE_STORAGE__PATH` or `MAPMERGE_INPUT__PATH`.
    pub fn load(path: &Path) -> Result<Settings> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("MAPMERGE").separator("__"))
            .build()?
            .try_deserialize()?;
        info!(path = %path.display(), "read configuration");
        Ok(settings)
    }

    /// Writes a commented template so a first run leaves something to fill in.
    pub fn write_template(path: &Path) -> io::Result<()> {
        fs::write(path, TEMPLATE)?;
        info!(path = %path.display(), "created default configuration file");
        Ok(())
    }
}
