use std::io::Write;
use std::sync::Arc;

use tracing::info;

use stash::config::{Config, Secrets};
use stash::files::FileService;
use stash::store::{BlobStore, MetadataStore};
use stash::web::WebServer;
use stash::{Result, StashError};

/// Prompt for the master password on first run.
fn prompt_master_password() -> Result<String> {
    print!("First run. Choose a master password (min 8 chars): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim().to_string();

    stash::auth::validate_password(&password)?;
    Ok(password)
}

async fn run() -> Result<()> {
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = stash::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        stash::logging::init_console_only(&config.logging.level);
    }

    let secrets = Secrets::load_or_create(&config.storage.secrets_file, prompt_master_password)?;

    let blobs = BlobStore::new(&config.storage.upload_dir)?;
    let meta = MetadataStore::open(&config.storage.metadata_file)?;
    let service = Arc::new(FileService::new(blobs, meta));

    let server = WebServer::new(&config, secrets, service)?;

    info!("stash file distribution service");
    info!("Admin panel at {}{}", config.server.base_url, server.admin_path());

    server.run().await.map_err(StashError::Io)
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal: {e}");
        std::process::exit(1);
    }
}
