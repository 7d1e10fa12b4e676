// Logging setup
// fern dispatcher behind the `log` facade: stderr plus an optional log file

use crate::utils::ensure_parent_dir;
use log::LevelFilter;
use std::path::Path;

/// Install the global logger once at startup
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        ensure_parent_dir(path)?;
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    log::debug!("logging initialised at {}", level);
    Ok(())
}
