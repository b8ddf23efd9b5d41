//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pantry_core` linkage and schema bootstrap without a web layer.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `pantry_cli [config.toml]`. Without an argument an in-memory
//! store is opened.

use log::error;
use pantry_core::db::migrations::latest_version;
use pantry_core::db::open_db_in_memory;
use pantry_core::PantryConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pantry_core version={}", pantry_core::core_version());
    println!("pantry_core schema_version={}", latest_version());

    let opened = match std::env::args().nth(1) {
        Some(path) => PantryConfig::load(&path).and_then(|config| {
            config.init_logging()?;
            config.open_database()
        }),
        None => open_db_in_memory().map_err(pantry_core::ConfigError::Database),
    };

    match opened {
        Ok(_conn) => {
            println!("pantry_core store=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("pantry_core store=error: {err}");
            ExitCode::FAILURE
        }
    }
}
