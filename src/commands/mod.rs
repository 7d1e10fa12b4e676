// Command modules
// User-facing entry points: the interactive console and the one-shot CLI commands

pub mod cli;
pub mod menu;

pub use cli::{execute, write_history, write_problem_set, write_set_statistics, Cli, Command};

pub use menu::{Console, Screen};
