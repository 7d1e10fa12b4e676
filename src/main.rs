use anyhow::Context;
use clap::Parser;
use dataman::commands::{execute, Cli, Command, Console};
use dataman::{logging, open_storage, AppConfig, Operations, UserHistory};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::process::ExitCode;

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(kind) = cli.storage {
        config.storage = kind;
    }
    if let Some(path) = &cli.data_path {
        config.data_path = Some(path.clone());
    }
    // flags are relative to the working directory, not the data directory
    if let Some(path) = &cli.history_file {
        config.history_file = std::env::current_dir()?.join(path);
    }
    config.bump_log_level(cli.verbose)?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    logging::init_logging(config.level_filter()?, config.log_file.as_deref())
        .context("failed to initialise logging")?;

    let storage_path = config.storage_path();
    let storage = open_storage(config.storage, &storage_path).with_context(|| {
        format!(
            "failed to open {} storage at {}",
            config.storage,
            storage_path.display()
        )
    })?;
    let history_path = config.history_path();
    let history = UserHistory::open(&history_path)
        .with_context(|| format!("failed to open history at {}", history_path.display()))?;

    let mut ops = Operations::new(storage, history);
    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            Console::new(&mut ops, stdin.lock(), io::stdout(), &config.default_set_name).run()?;
        }
        command => {
            let mut rng = StdRng::from_entropy();
            execute(command, &mut ops, &mut io::stdout(), &mut rng)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("{:#}", e);
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
