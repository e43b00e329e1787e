// logging_setup.rs
use anyhow::anyhow;
use std::fs;
use std::path::Path;

/// Configures log4rs from `config_path`, or env_logger when that file is
/// missing or unusable. Returns which backend is active.
pub fn setup_logging(config_path: &Path) -> anyhow::Result<&'static str> {
    // Create logs directory if it doesn't exist
    fs::create_dir_all("logs")?;

    if config_path.exists() {
        match log4rs::init_file(config_path, Default::default()) {
            Ok(()) => return Ok("log4rs"),
            Err(e) => eprintln!(
                "Invalid log config {} ({}), falling back to env_logger",
                config_path.display(),
                e
            ),
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .map_err(|e| anyhow!(e))?;
    Ok("env_logger")
}
