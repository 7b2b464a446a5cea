//! CLI command implementations
//!
//! `serve` boot sequence:
//! 1. Resolve configuration
//! 2. Open the table and seed the id counter
//! 3. Start the tokio runtime and serve until a shutdown signal

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::http_server::{HttpServer, ServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::table::RecordStore;

use super::args::{Command, SettingsArgs};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { settings } => init(&settings),
        Command::Serve { settings } => serve(&settings),
    }
}

/// Load a JSON config file. Missing keys take their defaults.
pub fn load_config_file(path: &Path) -> CliResult<ServerConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    Ok(serde_json::from_str(&content)?)
}

/// Resolve the effective configuration: defaults, file, then overrides.
///
/// Environment values arrive through the same overrides, since clap
/// fills them in when the matching flag is absent.
pub fn resolve_config(settings: &SettingsArgs) -> CliResult<ServerConfig> {
    let mut config = match &settings.config {
        Some(path) => load_config_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(host) = &settings.host {
        config.host = host.clone();
    }
    if let Some(port) = settings.port {
        config.port = port;
    }
    if let Some(table) = &settings.table {
        config.table_path = table.clone();
    }

    config.validate().map_err(CliError::config_error)?;
    Ok(config)
}

/// Create the table file with only its header
pub fn init(settings: &SettingsArgs) -> CliResult<()> {
    let config = resolve_config(settings)?;
    let table_path = &config.table_path;

    if table_path.exists() {
        return Err(CliError::already_initialized(table_path));
    }

    RecordStore::create_table(table_path)?;

    log_event_with_fields(
        Event::TableInitialized,
        &[("path", &table_path.display().to_string())],
    );
    Ok(())
}

/// Boot and serve the HTTP API until shutdown
pub fn serve(settings: &SettingsArgs) -> CliResult<()> {
    log_event(Event::BootStart);

    boot_and_serve(settings).map_err(|e| {
        log_event_with_fields(
            Event::StartupFailed,
            &[("code", e.code_str()), ("message", e.message())],
        );
        e
    })
}

fn boot_and_serve(settings: &SettingsArgs) -> CliResult<()> {
    let config = resolve_config(settings)?;
    let table_path = config.table_path.display().to_string();

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("host", &config.host),
            ("port", &config.port.to_string()),
            ("table_path", &table_path),
        ],
    );

    let store = open_store(&config.table_path)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to start runtime: {}", e)))?;

    runtime
        .block_on(HttpServer::new(config, Arc::new(store)).start())
        .map_err(|e| CliError::boot_failed(format!("HTTP server error: {}", e)))
}

/// Open the table and report the seeded counter
pub fn open_store(table_path: &Path) -> CliResult<RecordStore> {
    let store = RecordStore::open(table_path)?;
    let next_id = store
        .next_id()
        .map_or_else(|| "exhausted".to_string(), |id| id.to_string());

    log_event_with_fields(
        Event::TableOpened,
        &[
            ("path", &table_path.display().to_string()),
            ("next_id", &next_id),
        ],
    );
    Ok(store)
}
