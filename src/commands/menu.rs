// Interactive console
// Menu state machine over any BufRead/Write pair, so it can be driven by scripted input

use crate::error::DatamanError;
use crate::models::{Difficulty, Problem};
use crate::commands::cli::{status_mark, write_history, write_set_statistics};
use crate::services::generator::GeneratorConfig;
use crate::services::history::Achievement;
use crate::services::operations::{check_problem_line, Operations};
use crate::services::parser::{
    parse_index, parse_integer, parse_operator_choices, parse_problem_line, PROBLEM_FORMAT_HINT,
};
use crate::utils::format_duration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::time::Instant;

const RECENT_ATTEMPTS: usize = 5;
const DEFAULT_SET_COUNT: usize = 10;
const DEFAULT_DRILL_COUNT: usize = 20;

/// Console states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    AnswerChecker,
    MemoryBank,
    ProblemSets,
    TimedDrill,
    Statistics,
    Exit,
}

/// Why a screen stopped early
enum Stop {
    Eof,
    Io(io::Error),
}

impl From<io::Error> for Stop {
    fn from(e: io::Error) -> Self {
        Stop::Io(e)
    }
}

type Step<T> = std::result::Result<T, Stop>;

pub struct Console<'a, R, W> {
    ops: &'a mut Operations,
    input: R,
    output: W,
    default_set: String,
    rng: StdRng,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(ops: &'a mut Operations, input: R, output: W, default_set: &str) -> Self {
        Self {
            ops,
            input,
            output,
            default_set: default_set.to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Run until the user exits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        if let Err(e) = self.ops.begin_session() {
            log::warn!("could not start a session: {}", e);
        }

        writeln!(self.output, "Welcome to Dataman!")?;
        writeln!(self.output, "===================")?;

        let mut screen = Screen::MainMenu;
        let result = loop {
            let step = match screen {
                Screen::MainMenu => self.main_menu(),
                Screen::AnswerChecker => self.answer_checker(),
                Screen::MemoryBank => self.memory_bank(),
                Screen::ProblemSets => self.problem_sets(),
                Screen::TimedDrill => self.timed_drill(),
                Screen::Statistics => self.statistics(),
                Screen::Exit => break Ok(()),
            };
            match step {
                Ok(next) => screen = next,
                Err(Stop::Eof) => break Ok(()),
                Err(Stop::Io(e)) => break Err(e),
            }
        };

        if let Err(e) = self.ops.finish_session() {
            log::warn!("could not close the session: {}", e);
        }
        if result.is_ok() {
            writeln!(self.output, "Goodbye!")?;
        }
        result
    }

    // ==================== Input helpers ====================

    fn read_line(&mut self, prompt: &str) -> Step<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Stop::Eof);
        }
        Ok(line.trim().to_string())
    }

    fn report(&mut self, error: &DatamanError) -> Step<()> {
        if !error.is_user_error() {
            log::error!("{}", error);
        }
        writeln!(self.output, "Error: {}", error)?;
        Ok(())
    }

    fn announce(&mut self, achievements: &[Achievement]) -> Step<()> {
        for achievement in achievements {
            writeln!(
                self.output,
                "Achievement unlocked: {} - {}",
                achievement.name, achievement.description
            )?;
        }
        Ok(())
    }

    fn confirm(&mut self, prompt: &str) -> Step<bool> {
        Ok(self.read_line(prompt)?.eq_ignore_ascii_case("y"))
    }

    // ==================== Main menu ====================

    fn main_menu(&mut self) -> Step<Screen> {
        writeln!(self.output, "\nMain Menu:")?;
        writeln!(self.output, "1. Answer Checker")?;
        writeln!(self.output, "2. Memory Bank")?;
        writeln!(self.output, "3. Problem Sets")?;
        writeln!(self.output, "4. Timed Drill")?;
        writeln!(self.output, "5. Statistics")?;
        writeln!(self.output, "0. Exit")?;

        let next = match self.read_line("Enter your choice: ")?.as_str() {
            "1" => Screen::AnswerChecker,
            "2" => Screen::MemoryBank,
            "3" => Screen::ProblemSets,
            "4" => Screen::TimedDrill,
            "5" => Screen::Statistics,
            "0" => Screen::Exit,
            _ => {
                writeln!(self.output, "Invalid choice. Please try again.")?;
                Screen::MainMenu
            }
        };
        Ok(next)
    }

    fn answer_checker(&mut self) -> Step<Screen> {
        writeln!(self.output, "\nAnswer Checker")?;
        writeln!(self.output, "==============")?;
        writeln!(self.output, "Problem format: 2 + 2 = 4")?;

        let line = self.read_line("Enter math problem: ")?;
        match check_problem_line(&line) {
            Ok(check) if check.correct => writeln!(self.output, "Correct!")?,
            Ok(check) => writeln!(
                self.output,
                "Incorrect. The correct answer is {}.",
                check.expected
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Screen::MainMenu)
    }

    // ==================== Memory bank ====================

    fn memory_bank(&mut self) -> Step<Screen> {
        if self.ops.current().is_none() {
            let name = self.default_set.clone();
            if let Err(e) = self.ops.open_or_create(&name) {
                self.report(&e)?;
                return Ok(Screen::MainMenu);
            }
        }

        let name = self.ops.current().map(|s| s.name().to_string()).unwrap_or_default();
        writeln!(self.output, "\nMemory Bank - {}", name)?;
        writeln!(self.output, "=============")?;
        writeln!(self.output, "1. Enter Problem")?;
        writeln!(self.output, "2. View Problem List")?;
        writeln!(self.output, "3. Solve Problem by Number")?;
        writeln!(self.output, "4. Solve Next Problem")?;
        writeln!(self.output, "5. Remove Problem")?;
        writeln!(self.output, "0. Back to Main Menu")?;

        match self.read_line("Enter your choice: ")?.as_str() {
            "1" => self.enter_problem()?,
            "2" => {
                self.list_problems()?;
            }
            "3" => self.solve_by_number()?,
            "4" => self.solve_next()?,
            "5" => self.remove_problem()?,
            "0" => return Ok(Screen::MainMenu),
            _ => writeln!(self.output, "Invalid choice. Please try again.")?,
        }
        Ok(Screen::MemoryBank)
    }

    fn enter_problem(&mut self) -> Step<()> {
        writeln!(self.output, "Problem format: {}", PROBLEM_FORMAT_HINT)?;
        let line = self.read_line("Enter math problem: ")?;

        let added = parse_problem_line(&line)
            .and_then(|parsed| parsed.into_problem())
            .and_then(|problem| {
                let shown = problem.to_string();
                self.ops.add_problem(problem).map(|_| shown)
            });
        match added {
            Ok(shown) => writeln!(self.output, "Problem '{}' added.", shown)?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    /// Print the numbered list; false when there is nothing to show
    fn list_problems(&mut self) -> Step<bool> {
        let problems = self.ops.current_problems();
        if problems.is_empty() {
            writeln!(self.output, "No problems in the current problem set.")?;
            return Ok(false);
        }

        let lines: Vec<String> = problems
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. [{}] {}", i + 1, status_mark(p), p))
            .collect();
        writeln!(self.output, "\nAll Problems:")?;
        for line in lines {
            writeln!(self.output, "{}", line)?;
        }
        Ok(true)
    }

    fn pick_problem(&mut self, prompt: &str) -> Step<Option<usize>> {
        if !self.list_problems()? {
            return Ok(None);
        }
        let input = self.read_line(prompt)?;
        match parse_index(&input, self.ops.current_problems().len()) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                self.report(&e)?;
                Ok(None)
            }
        }
    }

    fn solve_by_number(&mut self) -> Step<()> {
        if let Some(index) = self.pick_problem("\nEnter the number of the problem to solve: ")? {
            self.ask_problem(index)?;
        }
        Ok(())
    }

    fn solve_next(&mut self) -> Step<()> {
        let all_answered = self.ops.current().map_or(false, |s| {
            !s.is_empty() && s.next_unanswered().is_none()
        });
        match self.ops.next_problem_index() {
            Ok(index) => {
                if all_answered {
                    writeln!(self.output, "All problems have been answered. Starting over...")?;
                }
                self.ask_problem(index)
            }
            Err(e) => self.report(&e),
        }
    }

    fn ask_problem(&mut self, index: usize) -> Step<()> {
        let prompt = match self.ops.current() {
            Some(set) => set.get(index).map(Problem::prompt),
            None => return Ok(()),
        };
        let prompt = match prompt {
            Ok(prompt) => prompt,
            Err(e) => return self.report(&e),
        };

        writeln!(self.output, "\nProblem #{}:", index + 1)?;
        writeln!(self.output, "{}", prompt)?;
        let shown_at = Instant::now();
        let input = self.read_line("Your answer: ")?;

        let outcome = parse_integer(&input)
            .and_then(|answer| self.ops.answer_problem(index, answer, shown_at));
        match outcome {
            Ok(outcome) => {
                if outcome.correct {
                    writeln!(self.output, "Correct!")?;
                } else {
                    writeln!(
                        self.output,
                        "Incorrect. The correct answer is {}.",
                        outcome.expected
                    )?;
                }
                self.announce(&outcome.achievements)?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn remove_problem(&mut self) -> Step<()> {
        if let Some(index) = self.pick_problem("\nEnter the number of the problem to remove: ")? {
            match self.ops.remove_problem(index) {
                Ok(removed) => writeln!(self.output, "Problem '{}' removed.", removed)?,
                Err(e) => self.report(&e)?,
            }
        }
        Ok(())
    }

    // ==================== Problem sets ====================

    fn problem_sets(&mut self) -> Step<Screen> {
        writeln!(self.output, "\nProblem Sets")?;
        writeln!(self.output, "============")?;
        if let Some(set) = self.ops.current() {
            let line = format!("Current: {} ({} problems)", set.name(), set.len());
            writeln!(self.output, "{}", line)?;
        }
        writeln!(self.output, "1. Create New Problem Set")?;
        writeln!(self.output, "2. Load Problem Set")?;
        writeln!(self.output, "3. Generate Random Problem Set")?;
        writeln!(self.output, "4. Delete Problem Set")?;
        writeln!(self.output, "0. Back to Main Menu")?;

        match self.read_line("Enter your choice: ")?.as_str() {
            "1" => self.create_set()?,
            "2" => self.load_set()?,
            "3" => self.generate_set()?,
            "4" => self.delete_set()?,
            "0" => return Ok(Screen::MainMenu),
            _ => writeln!(self.output, "Invalid choice. Please try again.")?,
        }
        Ok(Screen::ProblemSets)
    }

    fn create_set(&mut self) -> Step<()> {
        let name = self.read_line("Enter a name for the problem set: ")?;
        let description = self.read_line("Enter a description (optional): ")?;

        match self.ops.create_problem_set(&name, Some(&description)) {
            Ok(set) => {
                let line = format!("Problem set '{}' created.", set.name());
                writeln!(self.output, "{}", line)?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn pick_set(&mut self, prompt: &str) -> Step<Option<String>> {
        let names = match self.ops.list_problem_sets() {
            Ok(names) => names,
            Err(e) => {
                self.report(&e)?;
                return Ok(None);
            }
        };
        if names.is_empty() {
            writeln!(self.output, "No problem sets available.")?;
            return Ok(None);
        }

        writeln!(self.output, "\nAvailable Problem Sets:")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, name)?;
        }
        let input = self.read_line(prompt)?;
        match parse_index(&input, names.len()) {
            Ok(index) => Ok(names.into_iter().nth(index)),
            Err(e) => {
                self.report(&e)?;
                Ok(None)
            }
        }
    }

    fn load_set(&mut self) -> Step<()> {
        let Some(name) = self.pick_set("\nEnter the number of the problem set to load: ")? else {
            return Ok(());
        };
        match self.ops.load_problem_set(&name) {
            Ok(set) => {
                let line = format!("Problem set '{}' loaded ({} problems).", set.name(), set.len());
                writeln!(self.output, "{}", line)?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn delete_set(&mut self) -> Step<()> {
        let Some(name) = self.pick_set("\nEnter the number of the problem set to delete: ")? else {
            return Ok(());
        };
        let question = format!("Are you sure you want to delete problem set '{}'? (y/N): ", name);
        if !self.confirm(&question)? {
            return Ok(());
        }
        match self.ops.delete_problem_set(&name) {
            Ok(()) => writeln!(self.output, "Problem set '{}' deleted.", name)?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    /// Ask for count, difficulty and operators; None after reporting bad input
    fn read_generator_config(&mut self, default_count: usize) -> Step<Option<GeneratorConfig>> {
        let count = self.read_line(&format!(
            "Enter the number of problems (default: {}): ",
            default_count
        ))?;
        let count = if count.is_empty() {
            Ok(default_count)
        } else {
            count.parse::<usize>().map_err(|_| {
                DatamanError::validation(format!("'{}' is not a valid number of problems", count))
            })
        };

        writeln!(self.output, "\nDifficulty levels:")?;
        for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
            let (min, max) = difficulty.operand_range();
            writeln!(self.output, "{}. {} ({}-{})", i + 1, difficulty, min, max)?;
        }
        let difficulty = self.read_line("Select difficulty (default: 1): ")?;
        let difficulty = if difficulty.is_empty() {
            Ok(Difficulty::Easy)
        } else {
            difficulty.parse::<Difficulty>()
        };

        writeln!(self.output, "\nOperators:")?;
        writeln!(self.output, "1. Addition (+)")?;
        writeln!(self.output, "2. Subtraction (-)")?;
        writeln!(self.output, "3. Multiplication (*)")?;
        writeln!(self.output, "4. Division (/)")?;
        writeln!(self.output, "5. All operators")?;
        let operators = self.read_line("Select operators (comma-separated, default: 5): ")?;

        let config = count.and_then(|count| {
            let difficulty = difficulty?;
            let operators = parse_operator_choices(&operators)?;
            let config = GeneratorConfig::for_difficulty(difficulty, count, operators);
            config.validate()?;
            Ok(config)
        });
        match config {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                self.report(&e)?;
                Ok(None)
            }
        }
    }

    fn generate_set(&mut self) -> Step<()> {
        let name = self.read_line("Enter a name for the problem set: ")?;
        let description = self.read_line("Enter a description (optional): ")?;
        let Some(config) = self.read_generator_config(DEFAULT_SET_COUNT)? else {
            return Ok(());
        };

        let generated =
            self.ops
                .generate_problem_set(&name, Some(&description), &config, &mut self.rng);
        match generated {
            Ok(set) => {
                let line = format!(
                    "Problem set '{}' with {} problems generated.",
                    set.name(),
                    set.len()
                );
                writeln!(self.output, "{}", line)?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    // ==================== Timed drill ====================

    fn timed_drill(&mut self) -> Step<Screen> {
        writeln!(self.output, "\nTimed Drill")?;
        writeln!(self.output, "===========")?;
        writeln!(self.output, "Complete a set of problems as quickly as possible.")?;

        let Some(config) = self.read_generator_config(DEFAULT_DRILL_COUNT)? else {
            return Ok(Screen::MainMenu);
        };
        let mut drill = match self.ops.start_drill(&config, &mut self.rng) {
            Ok(drill) => drill,
            Err(e) => {
                self.report(&e)?;
                return Ok(Screen::MainMenu);
            }
        };

        let mut interrupted = None;
        let mut answers = Vec::with_capacity(drill.problems.len());
        match self.read_line("\nPress Enter to start the drill...") {
            Ok(_) => {
                drill.start_clock();
                let total = drill.problems.len();
                for (i, problem) in drill.problems.iter().enumerate() {
                    match self.drill_question(i, total, problem) {
                        Ok(answer) => answers.push(answer),
                        Err(stop) => {
                            interrupted = Some(stop);
                            break;
                        }
                    }
                }
            }
            Err(stop) => interrupted = Some(stop),
        }

        let result = match self.ops.complete_drill(&drill, &answers) {
            Ok(result) => result,
            Err(e) => {
                self.report(&e)?;
                return Ok(Screen::MainMenu);
            }
        };
        if let Some(stop) = interrupted {
            return Err(stop);
        }

        let total = drill.problems.len();
        let time = format_duration(result.elapsed);
        writeln!(self.output, "\nDrill completed!")?;
        writeln!(self.output, "Time: {}", time)?;
        writeln!(
            self.output,
            "Score: {}/{} ({:.1}%)",
            result.total_correct, total, result.accuracy
        )?;
        writeln!(self.output, "{}", praise(result.accuracy))?;
        self.announce(&result.achievements)?;

        if self.confirm("\nDo you want to save these problems as a problem set? (y/N): ")? {
            let name = self.read_line("Enter a name for the problem set: ")?;
            let description = format!("Timed drill - {} - {}/{}", time, result.total_correct, total);
            match self.ops.save_drill(&drill, &name, Some(&description)) {
                Ok(set) => {
                    let line = format!("Problem set '{}' saved.", set.name());
                    writeln!(self.output, "{}", line)?;
                }
                Err(e) => self.report(&e)?,
            }
        }
        Ok(Screen::MainMenu)
    }

    fn drill_question(&mut self, i: usize, total: usize, problem: &Problem) -> Step<Option<i64>> {
        writeln!(self.output, "\nProblem {}/{}:", i + 1, total)?;
        writeln!(self.output, "{}", problem.prompt())?;
        let input = self.read_line("Your answer: ")?;

        let answer = match parse_integer(&input) {
            Ok(answer) => answer,
            Err(_) => {
                writeln!(self.output, "Invalid input. Skipping problem.")?;
                return Ok(None);
            }
        };
        match problem.check_answer(answer) {
            Ok(true) => writeln!(self.output, "Correct!")?,
            Ok(false) => writeln!(
                self.output,
                "Incorrect. The correct answer is {}.",
                problem.answer()
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Some(answer))
    }

    // ==================== Statistics ====================

    fn render<F>(&mut self, write: F) -> Step<()>
    where
        F: FnOnce(&mut W) -> crate::error::Result<()>,
    {
        match write(&mut self.output) {
            Ok(()) => Ok(()),
            Err(DatamanError::Io(e)) => Err(Stop::Io(e)),
            Err(e) => self.report(&e),
        }
    }

    fn statistics(&mut self) -> Step<Screen> {
        let report = self.ops.history_report(RECENT_ATTEMPTS);

        match &report.current_set {
            Some((name, stats)) => {
                writeln!(self.output)?;
                self.render(|out| write_set_statistics(out, name, stats))?;
            }
            None => writeln!(self.output, "\nNo problem set loaded.")?,
        }

        writeln!(self.output, "\nPractice History")?;
        writeln!(self.output, "================")?;
        self.render(|out| write_history(out, &report))?;
        Ok(Screen::MainMenu)
    }
}

fn praise(accuracy: f64) -> &'static str {
    if accuracy >= 100.0 {
        "Perfect score! Excellent work!"
    } else if accuracy >= 80.0 {
        "Great job!"
    } else if accuracy >= 60.0 {
        "Good effort!"
    } else {
        "Keep practicing!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::history::UserHistory;
    use crate::services::sqlite::SqliteStorage;

    fn operations() -> Operations {
        Operations::new(
            Box::new(SqliteStorage::open_in_memory().unwrap()),
            UserHistory::in_memory(),
        )
    }

    fn drive(ops: &mut Operations, script: &str) -> String {
        let mut output = Vec::new();
        Console::new(ops, script.as_bytes(), &mut output, "memory-bank")
            .with_rng(StdRng::seed_from_u64(1))
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_invalid_choice_and_exit() {
        let mut ops = operations();
        let output = drive(&mut ops, "9\nhello\n0\n");
        assert_eq!(output.matches("Invalid choice").count(), 2);
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_eof_exits_cleanly() {
        let mut ops = operations();
        let output = drive(&mut ops, "2\n1\n");
        assert!(output.contains("Enter math problem: "));
        assert!(output.contains("Goodbye!"));
        assert!(ops.history().sessions()[0].end_time.is_some());
    }

    #[test]
    fn test_answer_checker() {
        let mut ops = operations();
        let output = drive(&mut ops, "1\n2 + 2 = 4\n1\n7 / 2 = 4\n1\n5 / 0 = 1\n1\nnonsense\n0\n");
        assert!(output.contains("Correct!"));
        assert!(output.contains("Incorrect. The correct answer is 3."));
        assert!(output.contains("Error: domain error: cannot divide 5 by zero"));
        assert!(output.contains("Error: validation error:"));
    }

    #[test]
    fn test_memory_bank_flow() {
        let mut ops = operations();
        let script = "2\n1\n2 + 3\n1\n4 * 5 = ?\n4\n5\n3\n7\n3\n2\n21\n2\n5\n1\n0\n0\n";
        let output = drive(&mut ops, script);

        assert!(output.contains("Memory Bank - memory-bank"));
        assert!(output.contains("Problem '2 + 3 = 5' added."));
        assert!(output.contains("Correct!"));
        assert!(output.contains("Error: index 6 is out of range"));
        assert!(output.contains("Incorrect. The correct answer is 20."));
        assert!(output.contains("Problem '2 + 3 = 5' removed."));

        let set = ops.current().unwrap();
        assert_eq!(set.name(), "memory-bank");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().user_answer(), Some(21));
        assert_eq!(ops.history().statistics().total_problems_attempted, 2);
        assert_eq!(ops.storage().load("memory-bank").unwrap().len(), 1);
    }

    #[test]
    fn test_problem_sets_menu() {
        let mut ops = operations();
        let script = "3\n1\nfractions\nhalves\n3\ngenerated\n\n4\n2\n1,3\n2\n2\n4\n1\ny\n7\n0\n0\n";
        let output = drive(&mut ops, script);

        assert!(output.contains("Problem set 'fractions' created."));
        assert!(output.contains("Problem set 'generated' with 4 problems generated."));
        assert!(output.contains("Problem set 'generated' loaded (4 problems)."));
        assert!(output.contains("Problem set 'fractions' deleted."));
        assert!(output.contains("Invalid choice"));
        assert_eq!(ops.list_problem_sets().unwrap(), vec!["generated"]);

        let set = ops.current().unwrap();
        assert_eq!(set.difficulty(), Some(Difficulty::Medium));
        assert!(set.iter().all(|p| matches!(
            p.operator(),
            crate::models::Operator::Add | crate::models::Operator::Multiply
        )));
    }

    #[test]
    fn test_timed_drill() {
        let mut ops = operations();
        let script = "4\n3\n1\n1\n\n1\nskip\n1\nn\n0\n";
        let output = drive(&mut ops, script);

        assert!(output.contains("Problem 1/3:"));
        assert!(output.contains("Invalid input. Skipping problem."));
        assert!(output.contains("Drill completed!"));
        assert!(output.contains("Time: 00:0"));
        assert_eq!(ops.history().statistics().total_problems_attempted, 2);
    }

    #[test]
    fn test_statistics_screen() {
        let mut ops = operations();
        let output = drive(&mut ops, "5\n2\n1\n6 - 1\n4\n5\n0\n5\n0\n");

        assert!(output.contains("No problem set loaded."));
        assert!(output.contains("Statistics for 'memory-bank'"));
        assert!(output.contains("Problems attempted: 1"));
        assert!(output.contains("First Steps - Attempted your first problem"));
        assert!(output.contains("[✓] 6 - 1 = 5"));
    }
}
