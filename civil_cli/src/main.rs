//! # Civilkit CLI
//!
//! Terminal front end for `civil_core`: manage calculation profiles,
//! materials and sections, and run section checks.
//!
//! Data files (`profiles.json`, `settings.json`) live in `CIVIL_DATA_DIR`,
//! or in the current directory when it is unset. Log level follows
//! `RUST_LOG` (default `info`).

mod session;

use std::io;
use std::path::PathBuf;
use std::process;

use civil_core::AppContext;
use session::Session;

fn data_dir() -> PathBuf {
    std::env::var_os("CIVIL_DATA_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("civil_cli {}", env!("CARGO_PKG_VERSION"));

    let dir = data_dir();
    let app = match AppContext::open(&dir) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(app, stdin.lock(), stdout.lock());
    if let Err(e) = session.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
