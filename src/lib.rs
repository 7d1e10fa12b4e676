//! Dataman: arithmetic practice with stored problem sets, timed drills and
//! per-user history.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use error::{DatamanError, DomainError, Result};
pub use models::{Difficulty, Operator, Problem, ProblemSet, ProblemSetStats};
pub use services::{open_storage, Operations, ProblemSetStore, StorageKind, UserHistory};
