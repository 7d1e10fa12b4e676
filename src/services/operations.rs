// Operations service
// Explicit application context: storage, user history and the current problem set

use crate::error::{DatamanError, Result};
use crate::models::{Difficulty, Problem, ProblemSet, ProblemSetStats};
use crate::services::generator::{self, GeneratorConfig};
use crate::services::history::{
    Achievement, AttemptRecord, HistoryStatistics, LearningSuggestions, UserHistory,
};
use crate::services::parser::parse_problem_line;
use crate::services::storage::ProblemSetStore;
use chrono::Utc;
use rand::Rng;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DRILL_SET_NAME: &str = "Timed Drill";

/// Where an attempt came from
#[derive(Debug, Clone, Default)]
pub struct AttemptContext {
    pub session_id: Option<Uuid>,
    pub problem_set_name: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// Result of a tracked answer check
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub expected: i64,
    pub achievements: Vec<Achievement>,
}

/// Run `check` against `problem` and record the attempt in `history`.
///
/// `started` is when the problem was shown; the elapsed time is stored with
/// the attempt. A failing check is returned as is and nothing is recorded.
pub fn track_attempt<F>(
    history: &mut UserHistory,
    context: &AttemptContext,
    problem: &Problem,
    started: Instant,
    check: F,
) -> Result<AnswerOutcome>
where
    F: FnOnce(&Problem) -> Result<bool>,
{
    let correct = check(problem)?;
    let expected = problem.solve()?;
    let elapsed = started.elapsed().as_secs_f64();

    log::info!(
        "attempt {} -> {} ({:.1}s, set {:?})",
        problem.prompt().trim_end(),
        if correct { "correct" } else { "incorrect" },
        elapsed,
        context.problem_set_name
    );

    let record = AttemptRecord::new(problem.clone(), correct, elapsed)
        .in_session(context.session_id)
        .from_set(context.problem_set_name.as_deref(), context.difficulty);
    let achievements = history.record_attempt(record)?;

    Ok(AnswerOutcome {
        correct,
        expected,
        achievements,
    })
}

/// Outcome of checking a typed `a op b = c` line
#[derive(Debug, Clone, PartialEq)]
pub struct LineCheck {
    pub problem: Problem,
    pub given: i64,
    pub expected: i64,
    pub correct: bool,
}

/// Check a full problem line such as `2 + 2 = 4`
pub fn check_problem_line(line: &str) -> Result<LineCheck> {
    let parsed = parse_problem_line(line)?;
    let given = parsed
        .answer
        .ok_or_else(|| DatamanError::validation("the problem needs an answer after '='"))?;
    let problem = Problem::new(parsed.first, parsed.operator, parsed.second)?;
    let expected = problem.answer();

    Ok(LineCheck {
        correct: problem.check_answer(given)?,
        problem,
        given,
        expected,
    })
}

/// A generated batch of problems answered in one sitting
#[derive(Debug, Clone)]
pub struct Drill {
    pub problems: Vec<Problem>,
    pub difficulty: Option<Difficulty>,
    session_id: Uuid,
    started: Instant,
}

impl Drill {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Reset the timer, e.g. once the user is ready
    pub fn start_clock(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillResult {
    pub answers: Vec<Option<i64>>,
    pub correct: Vec<bool>,
    pub total_correct: usize,
    pub accuracy: f64,
    pub elapsed: Duration,
    pub achievements: Vec<Achievement>,
}

/// Everything shown on the statistics screen
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub current_set: Option<(String, ProblemSetStats)>,
    pub statistics: HistoryStatistics,
    pub achievements: Vec<Achievement>,
    pub suggestions: LearningSuggestions,
    pub recent: Vec<AttemptRecord>,
}

fn no_current_set() -> DatamanError {
    DatamanError::not_found("no problem set loaded")
}

/// Application context passed to every interface call
pub struct Operations {
    storage: Box<dyn ProblemSetStore>,
    history: UserHistory,
    current: Option<ProblemSet>,
    session_id: Option<Uuid>,
}

impl Operations {
    pub fn new(storage: Box<dyn ProblemSetStore>, history: UserHistory) -> Self {
        Self {
            storage,
            history,
            current: None,
            session_id: None,
        }
    }

    pub fn history(&self) -> &UserHistory {
        &self.history
    }

    pub fn storage(&self) -> &dyn ProblemSetStore {
        self.storage.as_ref()
    }

    // ==================== Sessions ====================

    pub fn begin_session(&mut self) -> Result<Uuid> {
        if let Some(id) = self.session_id {
            return Ok(id);
        }
        let id = self.history.start_session()?;
        self.session_id = Some(id);
        Ok(id)
    }

    pub fn finish_session(&mut self) -> Result<()> {
        match self.session_id.take() {
            Some(id) => self.history.end_session(id),
            None => Ok(()),
        }
    }

    // ==================== Problem set management ====================

    pub fn current(&self) -> Option<&ProblemSet> {
        self.current.as_ref()
    }

    fn current_mut(&mut self) -> Result<&mut ProblemSet> {
        self.current.as_mut().ok_or_else(no_current_set)
    }

    /// Create an empty set, make it current and save it
    pub fn create_problem_set(&mut self, name: &str, description: Option<&str>) -> Result<&ProblemSet> {
        let set = ProblemSet::new(name, description)?;
        if self.storage.contains(set.name())? {
            return Err(DatamanError::validation(format!(
                "problem set '{}' already exists",
                set.name()
            )));
        }
        self.storage.save(&set)?;
        Ok(&*self.current.insert(set))
    }

    pub fn load_problem_set(&mut self, name: &str) -> Result<&ProblemSet> {
        let set = self.storage.load(name)?;
        log::debug!("loaded problem set '{}' ({} problems)", set.name(), set.len());
        Ok(&*self.current.insert(set))
    }

    /// Load `name`, creating and saving it when missing
    pub fn open_or_create(&mut self, name: &str) -> Result<&ProblemSet> {
        if self.storage.contains(name.trim())? {
            self.load_problem_set(name.trim())
        } else {
            self.create_problem_set(name, None)
        }
    }

    pub fn save_current(&mut self) -> Result<()> {
        let set = self.current.as_ref().ok_or_else(no_current_set)?;
        self.storage.save(set)
    }

    pub fn list_problem_sets(&self) -> Result<Vec<String>> {
        self.storage.list()
    }

    pub fn delete_problem_set(&mut self, name: &str) -> Result<()> {
        self.storage.delete(name)?;
        if self.current.as_ref().map(|s| s.name()) == Some(name) {
            self.current = None;
        }
        Ok(())
    }

    /// Apply `change` to a copy of the current set, save the copy and only
    /// then make it current
    fn commit<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut ProblemSet) -> Result<T>,
    {
        let mut staged = self.current.as_ref().ok_or_else(no_current_set)?.clone();
        let value = change(&mut staged)?;
        self.storage.save(&staged)?;
        self.current = Some(staged);
        Ok(value)
    }

    pub fn add_problem(&mut self, problem: Problem) -> Result<()> {
        self.commit(|set| {
            set.add(problem);
            Ok(())
        })
    }

    pub fn remove_problem(&mut self, index: usize) -> Result<Problem> {
        self.commit(|set| set.remove(index))
    }

    pub fn current_problems(&self) -> &[Problem] {
        self.current.as_ref().map(|s| s.problems()).unwrap_or(&[])
    }

    /// Index of the next unanswered problem, starting over when all are answered
    pub fn next_problem_index(&mut self) -> Result<usize> {
        let set = self.current_mut()?;
        if set.is_empty() {
            return Err(DatamanError::not_found("no problems in the current problem set"));
        }
        match set.next_unanswered() {
            Some(index) => Ok(index),
            None => {
                set.reset_attempts();
                Ok(0)
            }
        }
    }

    // ==================== Answering ====================

    pub fn check_answer(&mut self, index: usize, answer: i64) -> Result<bool> {
        Ok(self.answer_problem(index, answer, Instant::now())?.correct)
    }

    /// Check an answer for the problem at `index` of the current set,
    /// track it in the history and save the set
    pub fn answer_problem(&mut self, index: usize, answer: i64, shown_at: Instant) -> Result<AnswerOutcome> {
        let mut staged = self.current.as_ref().ok_or_else(no_current_set)?.clone();
        let problem = staged.get(index)?.clone();
        let context = AttemptContext {
            session_id: self.session_id,
            problem_set_name: Some(staged.name().to_string()),
            difficulty: staged.difficulty(),
        };

        // the set is saved inside the check so a failed save records no attempt
        let storage = &mut self.storage;
        let mut saved = false;
        let outcome = track_attempt(&mut self.history, &context, &problem, shown_at, |p| {
            let correct = p.check_answer(answer)?;
            staged.get_mut(index)?.record_answer(answer);
            storage.save(&staged)?;
            saved = true;
            Ok(correct)
        });

        if saved {
            self.current = Some(staged);
        }
        outcome
    }

    // ==================== Generation ====================

    /// Generate a random set, make it current and save it
    pub fn generate_problem_set<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        description: Option<&str>,
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> Result<&ProblemSet> {
        let set = generator::generate_problem_set(name, description, config, rng)?;
        self.storage.save(&set)?;
        Ok(&*self.current.insert(set))
    }

    pub fn start_drill<R: Rng + ?Sized>(&mut self, config: &GeneratorConfig, rng: &mut R) -> Result<Drill> {
        config.validate()?;
        let problems = (0..config.count)
            .map(|_| generator::generate_problem(config, rng))
            .collect::<Result<Vec<_>>>()?;
        let session_id = self.history.start_session()?;

        Ok(Drill {
            problems,
            difficulty: config.difficulty,
            session_id,
            started: Instant::now(),
        })
    }

    /// Score a drill. `None` marks a skipped problem: it counts as wrong and
    /// is not recorded in the history. Missing trailing answers count as skipped.
    pub fn complete_drill(&mut self, drill: &Drill, answers: &[Option<i64>]) -> Result<DrillResult> {
        let context = AttemptContext {
            session_id: Some(drill.session_id),
            problem_set_name: Some(DRILL_SET_NAME.to_string()),
            difficulty: drill.difficulty,
        };

        let elapsed = drill.started.elapsed();
        let per_problem = elapsed
            .checked_div(u32::try_from(drill.problems.len().max(1)).unwrap_or(u32::MAX))
            .unwrap_or_default();

        let mut given = Vec::with_capacity(drill.problems.len());
        let mut correct = Vec::with_capacity(drill.problems.len());
        let mut achievements = Vec::new();

        for (index, problem) in drill.problems.iter().enumerate() {
            let answer = answers.get(index).copied().flatten();
            given.push(answer);
            let Some(answer) = answer else {
                correct.push(false);
                continue;
            };

            let shown_at = Instant::now().checked_sub(per_problem).unwrap_or_else(Instant::now);
            let outcome = track_attempt(&mut self.history, &context, problem, shown_at, |p| {
                p.check_answer(answer)
            })?;
            correct.push(outcome.correct);
            achievements.extend(outcome.achievements);
        }

        self.history.end_session(drill.session_id)?;

        let total_correct = correct.iter().filter(|c| **c).count();
        Ok(DrillResult {
            answers: given,
            correct,
            total_correct,
            accuracy: crate::models::percentage(total_correct, drill.problems.len()),
            elapsed,
            achievements,
        })
    }

    /// Keep a drill's problems as a new saved set and make it current
    pub fn save_drill(&mut self, drill: &Drill, name: &str, description: Option<&str>) -> Result<&ProblemSet> {
        let mut set = ProblemSet::new(name, description)?.with_difficulty(drill.difficulty);
        if self.storage.contains(set.name())? {
            return Err(DatamanError::validation(format!(
                "problem set '{}' already exists",
                set.name()
            )));
        }
        for problem in &drill.problems {
            set.add(problem.clone());
        }
        self.storage.save(&set)?;
        Ok(&*self.current.insert(set))
    }

    // ==================== Statistics ====================

    pub fn statistics(&self) -> ProblemSetStats {
        self.current
            .as_ref()
            .map(|s| s.statistics())
            .unwrap_or_default()
    }

    pub fn history_report(&self, recent_limit: usize) -> HistoryReport {
        HistoryReport {
            current_set: self
                .current
                .as_ref()
                .map(|s| (s.name().to_string(), s.statistics())),
            statistics: self.history.statistics().clone(),
            achievements: self.history.achievements().to_vec(),
            suggestions: self.history.learning_suggestions(Utc::now()),
            recent: self.history.recent_attempts(recent_limit).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operator;
    use crate::services::sqlite::SqliteStorage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn operations() -> Operations {
        Operations::new(
            Box::new(SqliteStorage::open_in_memory().unwrap()),
            UserHistory::in_memory(),
        )
    }

    #[test]
    fn test_operations_need_a_current_set() {
        let mut ops = operations();
        assert!(matches!(ops.save_current(), Err(DatamanError::NotFound(_))));
        assert!(matches!(ops.check_answer(0, 1), Err(DatamanError::NotFound(_))));
        assert!(ops.current_problems().is_empty());
        assert_eq!(ops.statistics().total, 0);
    }

    #[test]
    fn test_create_add_remove_and_persist() {
        let mut ops = operations();
        ops.create_problem_set("bank", Some("memory")).unwrap();
        ops.add_problem(Problem::new(2, Operator::Add, 2).unwrap()).unwrap();
        ops.add_problem(Problem::new(9, Operator::Divide, 3).unwrap()).unwrap();

        assert!(matches!(
            ops.remove_problem(5),
            Err(DatamanError::IndexOutOfRange { index: 5, len: 2 })
        ));
        let removed = ops.remove_problem(0).unwrap();
        assert_eq!(removed.to_string(), "2 + 2 = 4");

        let stored = ops.storage().load("bank").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.description(), Some("memory"));

        assert!(matches!(
            ops.create_problem_set("bank", None),
            Err(DatamanError::Validation(_))
        ));
    }

    #[test]
    fn test_check_answer_tracks_history() {
        let mut ops = operations();
        ops.begin_session().unwrap();
        ops.create_problem_set("tracked", None).unwrap();
        ops.add_problem(Problem::new(6, Operator::Multiply, 7).unwrap()).unwrap();

        assert!(ops.check_answer(0, 42).unwrap());
        assert!(!ops.check_answer(0, 41).unwrap());
        assert!(matches!(
            ops.check_answer(3, 1),
            Err(DatamanError::IndexOutOfRange { .. })
        ));

        let stats = ops.history().statistics();
        assert_eq!(stats.total_problems_attempted, 2);
        assert_eq!(stats.total_problems_correct, 1);
        assert_eq!(ops.history().problem_set_usage("tracked").unwrap().attempts, 2);
        assert_eq!(ops.history().sessions()[0].problems_attempted, 2);
        assert_eq!(ops.current().unwrap().get(0).unwrap().user_answer(), Some(41));

        ops.finish_session().unwrap();
        assert!(ops.history().sessions()[0].end_time.is_some());
    }

    #[test]
    fn test_failed_save_keeps_current_set_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let storage = crate::services::storage::JsonStorage::open(&path).unwrap();
        let mut ops = Operations::new(Box::new(storage), UserHistory::in_memory());
        ops.create_problem_set("bank", None).unwrap();
        ops.add_problem(Problem::new(4, Operator::Multiply, 5).unwrap()).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(ops.add_problem(Problem::new(1, Operator::Add, 1).unwrap()).is_err());
        assert_eq!(ops.current().unwrap().len(), 1);

        assert!(ops.remove_problem(0).is_err());
        assert_eq!(ops.current().unwrap().len(), 1);

        assert!(ops.check_answer(0, 20).is_err());
        assert_eq!(ops.current().unwrap().get(0).unwrap().user_answer(), None);
        assert_eq!(ops.history().statistics().total_problems_attempted, 0);
        assert_eq!(ops.storage().load("bank").unwrap(), *ops.current().unwrap());
    }

    #[test]
    fn test_domain_errors_are_not_recorded() {
        let mut ops = operations();
        ops.create_problem_set("broken", None).unwrap();
        ops.add_problem(Problem::with_answer(1, Operator::Divide, 0, 0)).unwrap();

        assert!(matches!(ops.check_answer(0, 0), Err(DatamanError::Domain(_))));
        assert_eq!(ops.history().statistics().total_problems_attempted, 0);
    }

    #[test]
    fn test_next_problem_index_starts_over() {
        let mut ops = operations();
        ops.create_problem_set("cycle", None).unwrap();
        assert!(ops.next_problem_index().is_err());

        ops.add_problem(Problem::new(1, Operator::Add, 1).unwrap()).unwrap();
        ops.add_problem(Problem::new(2, Operator::Add, 2).unwrap()).unwrap();
        assert_eq!(ops.next_problem_index().unwrap(), 0);
        ops.check_answer(0, 2).unwrap();
        assert_eq!(ops.next_problem_index().unwrap(), 1);
        ops.check_answer(1, 4).unwrap();
        assert_eq!(ops.next_problem_index().unwrap(), 0);
        assert!(ops.current().unwrap().iter().all(|p| p.user_answer().is_none()));
    }

    #[test]
    fn test_generate_load_and_delete() {
        let mut ops = operations();
        let mut rng = StdRng::seed_from_u64(5);
        let config = GeneratorConfig::for_difficulty(
            Difficulty::Medium,
            6,
            [Operator::Add, Operator::Multiply].into_iter().collect(),
        );
        let generated = ops
            .generate_problem_set("generated", None, &config, &mut rng)
            .unwrap()
            .clone();

        ops.delete_problem_set("nothing").unwrap_err();
        let loaded = ops.load_problem_set("generated").unwrap();
        assert_eq!(loaded, &generated);

        ops.delete_problem_set("generated").unwrap();
        assert!(ops.current().is_none());
        assert!(ops.list_problem_sets().unwrap().is_empty());
    }

    #[test]
    fn test_open_or_create() {
        let mut ops = operations();
        ops.open_or_create("memory-bank").unwrap();
        ops.add_problem(Problem::new(3, Operator::Subtract, 1).unwrap()).unwrap();
        ops.delete_problem_set("missing").unwrap_err();

        let mut other = operations();
        assert_eq!(other.open_or_create("memory-bank").unwrap().len(), 0);
        assert_eq!(ops.open_or_create("memory-bank").unwrap().len(), 1);
    }

    #[test]
    fn test_drill_scoring() {
        let mut ops = operations();
        let mut rng = StdRng::seed_from_u64(9);
        let config = GeneratorConfig::for_difficulty(
            Difficulty::Easy,
            4,
            [Operator::Add].into_iter().collect(),
        );
        let drill = ops.start_drill(&config, &mut rng).unwrap();
        let session = drill.session_id();
        let mut answers: Vec<Option<i64>> = drill.problems.iter().map(|p| Some(p.answer())).collect();
        answers[1] = answers[1].map(|a| a + 1);
        answers[2] = None;
        answers.pop();

        let result = ops.complete_drill(&drill, &answers).unwrap();
        assert_eq!(result.correct, vec![true, false, false, false]);
        assert_eq!(result.answers[3], None);
        assert_eq!(result.total_correct, 1);
        assert!((result.accuracy - 25.0).abs() < 1e-9);

        let history = ops.history();
        assert_eq!(history.statistics().total_problems_attempted, 2);
        assert_eq!(history.problem_set_usage(DRILL_SET_NAME).unwrap().attempts, 2);
        let session = history.sessions().iter().find(|s| s.session_id == session).unwrap();
        assert!(session.end_time.is_some());
        assert_eq!(history.statistics().by_difficulty[&Difficulty::Easy].attempted, 2);

        let saved = ops.save_drill(&drill, "drill copy", Some("Timed drill")).unwrap();
        assert_eq!(saved.len(), 4);
        assert_eq!(saved.difficulty(), Some(Difficulty::Easy));
        assert!(ops.save_drill(&drill, "drill copy", None).is_err());
    }

    #[test]
    fn test_check_problem_line() {
        let check = check_problem_line("2 + 2 = 4").unwrap();
        assert!(check.correct);
        assert_eq!(check.expected, 4);

        let check = check_problem_line("7 / 2 = 4").unwrap();
        assert!(!check.correct);
        assert_eq!(check.expected, 3);

        assert!(matches!(check_problem_line("2 + 2 = ?"), Err(DatamanError::Validation(_))));
        assert!(matches!(check_problem_line("1 / 0 = 0"), Err(DatamanError::Domain(_))));
    }

    #[test]
    fn test_history_report() {
        let mut ops = operations();
        ops.create_problem_set("report", None).unwrap();
        ops.add_problem(Problem::new(5, Operator::Subtract, 2).unwrap()).unwrap();
        ops.check_answer(0, 3).unwrap();

        let report = ops.history_report(5);
        let (name, stats) = report.current_set.unwrap();
        assert_eq!(name, "report");
        assert_eq!(stats.correct, 1);
        assert_eq!(report.recent.len(), 1);
        assert_eq!(report.achievements.len(), 2);
        assert_eq!(report.statistics.total_problems_correct, 1);
    }
}
