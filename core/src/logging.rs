//! Logging setup. `init()` is called exactly once, from the binary's
//! `main`, never from library code or tests — `env_logger::init()` panics
//! if called twice in the same process.

use env_logger::{Builder, Target};

use crate::config::SimConfig;

/// Initializes the global logger, writing to `config.logs_path` when set
/// or stderr otherwise. Respects `RUST_LOG` if present; otherwise defaults
/// to `info`.
pub fn init(config: &SimConfig) {
    let mut builder = Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);

    if let Some(path) = &config.logs_path {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("logging: could not open {path} for appending ({e}), falling back to stderr");
            }
        }
    }

    let _ = builder.try_init();
}
