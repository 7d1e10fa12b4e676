//! Command line interface
//! clap definitions and the one-shot subcommands; `menu` hands over to the console

use crate::error::{DatamanError, Result};
use crate::models::{Difficulty, Problem, ProblemSet, ProblemSetStats};
use crate::services::generator::GeneratorConfig;
use crate::services::operations::{check_problem_line, HistoryReport, Operations};
use crate::services::parser::parse_operator_list;
use crate::services::storage::StorageKind;
use clap::{Parser, Subcommand};
use rand::Rng;
use std::io::Write;
use std::path::PathBuf;

/// Dataman - arithmetic practice: check answers, keep problem sets, run timed drills.
#[derive(Debug, Parser)]
#[command(name = "dataman")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend (json or sqlite).
    #[arg(long, global = true)]
    pub storage: Option<StorageKind>,

    /// Storage file or database path.
    #[arg(long = "data-path", global = true)]
    pub data_path: Option<PathBuf>,

    /// User history file.
    #[arg(long = "history-file", global = true)]
    pub history_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive menu (the default).
    Menu,

    /// Check one problem, e.g. "2 + 2 = 4".
    Check {
        /// Problem with the proposed answer.
        #[arg(allow_hyphen_values = true)]
        problem: String,
    },

    /// Generate and save a random problem set.
    Generate {
        /// Problem set name.
        #[arg(short, long)]
        name: String,

        /// Optional description.
        #[arg(short, long)]
        description: Option<String>,

        /// Number of problems.
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// easy, medium or hard.
        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,

        /// Comma separated operators.
        #[arg(short, long, default_value = "+,-,*,/")]
        operators: String,

        /// Smallest operand, overrides the difficulty range.
        #[arg(long, allow_negative_numbers = true)]
        min: Option<i64>,

        /// Largest operand, overrides the difficulty range.
        #[arg(long, allow_negative_numbers = true)]
        max: Option<i64>,
    },

    /// List stored problem sets.
    List,

    /// Print the problems of a set.
    Show {
        name: String,
    },

    /// Accuracy statistics of a set.
    Stats {
        name: String,
    },

    /// Delete a stored problem set.
    Delete {
        name: String,
    },

    /// Practice history, achievements and suggestions.
    History,
}

/// Run a one-shot command. `Menu` is handled by the caller.
pub fn execute<W: Write, R: Rng + ?Sized>(
    command: Command,
    ops: &mut Operations,
    out: &mut W,
    rng: &mut R,
) -> Result<()> {
    match command {
        Command::Menu => Err(DatamanError::validation(
            "the interactive menu needs a terminal",
        )),
        Command::Check { problem } => {
            let check = check_problem_line(&problem)?;
            if check.correct {
                writeln!(out, "Correct!")?;
            } else {
                writeln!(out, "Incorrect. The correct answer is {}.", check.expected)?;
            }
            Ok(())
        }
        Command::Generate {
            name,
            description,
            count,
            difficulty,
            operators,
            min,
            max,
        } => {
            let mut config =
                GeneratorConfig::for_difficulty(difficulty, count, parse_operator_list(&operators)?);
            if let Some(min) = min {
                config.min_operand = min;
            }
            if let Some(max) = max {
                config.max_operand = max;
            }

            let set = ops.generate_problem_set(&name, description.as_deref(), &config, rng)?;
            writeln!(
                out,
                "Generated problem set '{}' with {} problems.",
                set.name(),
                set.len()
            )?;
            write_problem_set(out, set)
        }
        Command::List => {
            let names = ops.list_problem_sets()?;
            if names.is_empty() {
                writeln!(out, "No problem sets found.")?;
            }
            for name in names {
                writeln!(out, "{}", name)?;
            }
            Ok(())
        }
        Command::Show { name } => {
            let set = ops.load_problem_set(&name)?;
            write_problem_set(out, set)
        }
        Command::Stats { name } => {
            let set = ops.load_problem_set(&name)?;
            write_set_statistics(out, set.name(), &set.statistics())
        }
        Command::Delete { name } => {
            ops.delete_problem_set(&name)?;
            writeln!(out, "Deleted problem set '{}'.", name)?;
            Ok(())
        }
        Command::History => write_history(out, &ops.history_report(5)),
    }
}

// ==================== Rendering ====================

pub fn write_problem_set<W: Write>(out: &mut W, set: &ProblemSet) -> Result<()> {
    writeln!(out, "{}", set.name())?;
    if let Some(description) = set.description() {
        writeln!(out, "  {}", description)?;
    }
    if let Some(difficulty) = set.difficulty() {
        writeln!(out, "  difficulty: {}", difficulty)?;
    }
    if set.is_empty() {
        writeln!(out, "  (no problems)")?;
    }
    for (i, problem) in set.iter().enumerate() {
        writeln!(out, "{:>3}. [{}] {}", i + 1, status_mark(problem), problem)?;
    }
    Ok(())
}

/// ✓ correct, ✗ wrong, blank when not attempted
pub fn status_mark(problem: &Problem) -> &'static str {
    match problem.attempt_outcome() {
        Some(true) => "✓",
        Some(false) => "✗",
        None => " ",
    }
}

pub fn write_set_statistics<W: Write>(out: &mut W, name: &str, stats: &ProblemSetStats) -> Result<()> {
    writeln!(out, "Statistics for '{}'", name)?;
    writeln!(out, "Total problems: {}", stats.total)?;
    writeln!(out, "Attempted: {}", stats.attempted)?;
    writeln!(out, "Correct: {}", stats.correct)?;
    writeln!(out, "Accuracy: {:.1}%", stats.accuracy)?;
    for (op, op_stats) in stats.by_operator.iter().filter(|(_, s)| s.total > 0) {
        writeln!(
            out,
            "  {} ({}): {}/{} ({:.1}%)",
            op.name(),
            op,
            op_stats.correct,
            op_stats.attempted,
            op_stats.accuracy
        )?;
    }
    Ok(())
}

pub fn write_history<W: Write>(out: &mut W, report: &HistoryReport) -> Result<()> {
    let stats = &report.statistics;
    writeln!(out, "Problems attempted: {}", stats.total_problems_attempted)?;
    writeln!(out, "Problems correct: {}", stats.total_problems_correct)?;
    writeln!(out, "Accuracy: {:.1}%", stats.accuracy())?;
    writeln!(out, "Average time per problem: {:.1}s", stats.average_time_per_problem)?;

    for (op, outcome) in stats.by_operator.iter().filter(|(_, o)| o.attempted > 0) {
        writeln!(
            out,
            "  {}: {}/{} ({:.1}%)",
            op.name(),
            outcome.correct,
            outcome.attempted,
            outcome.accuracy()
        )?;
    }

    if !report.achievements.is_empty() {
        writeln!(out, "\nAchievements:")?;
        for achievement in &report.achievements {
            writeln!(out, "  {} - {}", achievement.name, achievement.description)?;
        }
    }
    if !report.suggestions.is_empty() {
        writeln!(out, "\nSuggestions:")?;
        for suggestion in report.suggestions.all() {
            writeln!(out, "  - {}", suggestion)?;
        }
    }
    if !report.recent.is_empty() {
        writeln!(out, "\nRecent attempts:")?;
        for attempt in report.recent.iter().rev() {
            writeln!(
                out,
                "  [{}] {} ({:.1}s)",
                if attempt.is_correct { "✓" } else { "✗" },
                attempt.problem,
                attempt.time_taken
            )?;
        }
    }
    Ok(())
}
