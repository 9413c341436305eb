use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;

use mapmerge::error::{MergeError, Result};
use mapmerge::pipeline;
use mapmerge::settings::{Settings, CONFIG_FILE};
use mapmerge::store::Store;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "run failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    if !config_path.exists() {
        Settings::write_template(config_path).map_err(|e| MergeError::Config(e.to_string()))?;
        println!(
            "Created default config file {CONFIG_FILE}. \
             Please update it with your database and input paths."
        );
        return Ok(());
    }
    let settings = Settings::load(config_path)?;

    // a path on the command line overrides the configured input document
    let input = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.input.path.clone());
    if input.as_os_str().is_empty() {
        return Err(MergeError::Config(
            "no input document configured; set input.path or pass a path".to_owned(),
        ));
    }

    let store = Arc::new(Store::open(&settings.storage)?);
    let outcome = pipeline::spawn(store, input)
        .await
        .map_err(|e| MergeError::Task(e.to_string()))??;

    match outcome.output {
        Some(path) => println!("JSON conversion complete and saved to {}", path.display()),
        None => println!("No feature updates, nothing written"),
    }
    Ok(())
}
