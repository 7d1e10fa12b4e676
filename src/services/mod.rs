// Services
// Core logic: parsing, generation, persistence, history and the operations context

pub mod generator;
pub mod history;
pub mod operations;
pub mod parser;
pub mod sqlite;
pub mod storage;

pub use generator::{generate_problem, generate_problem_set, GeneratorConfig};

pub use history::{
    Achievement,
    AttemptRecord,
    HistoryStatistics,
    LearningSuggestions,
    OutcomeStats,
    ProblemSetUsage,
    SessionRecord,
    UserHistory,
};

pub use operations::{
    check_problem_line,
    track_attempt,
    AnswerOutcome,
    AttemptContext,
    Drill,
    DrillResult,
    HistoryReport,
    LineCheck,
    Operations,
    DRILL_SET_NAME,
};

pub use parser::{
    parse_index,
    parse_integer,
    parse_operator_choices,
    parse_operator_list,
    parse_problem_line,
    ParsedProblem,
    PROBLEM_FORMAT_HINT,
};

pub use sqlite::SqliteStorage;

pub use storage::{available_storage_types, open_storage, JsonStorage, ProblemSetStore, StorageKind};
