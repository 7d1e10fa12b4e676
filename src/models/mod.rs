// Domain models
// Arithmetic problems, problem sets and their statistics

use crate::error::{DatamanError, DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Arithmetic operator of a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Human name, used by learning suggestions
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Add => "addition",
            Operator::Subtract => "subtraction",
            Operator::Multiply => "multiplication",
            Operator::Divide => "division",
        }
    }

    /// Apply the operator. Division truncates toward zero.
    pub fn apply(&self, first: i64, second: i64) -> std::result::Result<i64, DomainError> {
        let result = match self {
            Operator::Add => first.checked_add(second),
            Operator::Subtract => first.checked_sub(second),
            Operator::Multiply => first.checked_mul(second),
            Operator::Divide => {
                if second == 0 {
                    return Err(DomainError::DivisionByZero { dividend: first });
                }
                first.checked_div(second)
            }
        };

        result.ok_or_else(|| DomainError::Overflow {
            expression: format!("{} {} {}", first, self.symbol(), second),
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = DatamanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" | "x" | "×" => Ok(Operator::Multiply),
            "/" | "÷" => Ok(Operator::Divide),
            other => Err(DatamanError::validation(format!(
                "unsupported operator '{}', expected one of + - * /",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = DatamanError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}

/// Difficulty preset for generated problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Inclusive operand range used by the generator
    pub fn operand_range(&self) -> (i64, i64) {
        match self {
            Difficulty::Easy => (1, 10),
            Difficulty::Medium => (10, 50),
            Difficulty::Hard => (50, 100),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DatamanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            other => Err(DatamanError::validation(format!(
                "invalid difficulty '{}', expected easy, medium or hard",
                other
            ))),
        }
    }
}

/// A single arithmetic problem
///
/// Operands, operator and expected answer are fixed at construction.
/// Only the recorded user answer changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    first: i64,
    operator: Operator,
    second: i64,
    answer: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_answer: Option<i64>,
}

impl Problem {
    /// Build a problem whose expected answer is computed by `solve`
    pub fn new(first: i64, operator: Operator, second: i64) -> Result<Self> {
        let answer = operator.apply(first, second)?;
        Ok(Self::with_answer(first, operator, second, answer))
    }

    /// Build a problem with a supplied expected answer, which may be wrong
    pub fn with_answer(first: i64, operator: Operator, second: i64, answer: i64) -> Self {
        Self {
            first,
            operator,
            second,
            answer,
            user_answer: None,
        }
    }

    pub fn first(&self) -> i64 {
        self.first
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn second(&self) -> i64 {
        self.second
    }

    /// Expected answer as stored, not recomputed
    pub fn answer(&self) -> i64 {
        self.answer
    }

    pub fn user_answer(&self) -> Option<i64> {
        self.user_answer
    }

    pub fn solve(&self) -> Result<i64> {
        Ok(self.operator.apply(self.first, self.second)?)
    }

    pub fn check_answer(&self, candidate: i64) -> Result<bool> {
        Ok(self.solve()? == candidate)
    }

    /// Whether the stored answer matches the computed one
    pub fn is_consistent(&self) -> bool {
        matches!(self.solve(), Ok(result) if result == self.answer)
    }

    /// Rendering without the answer, e.g. `2 + 2 = `
    pub fn prompt(&self) -> String {
        format!("{} {} {} = ", self.first, self.operator, self.second)
    }

    pub(crate) fn record_answer(&mut self, answer: i64) {
        self.user_answer = Some(answer);
    }

    pub(crate) fn clear_answer(&mut self) {
        self.user_answer = None;
    }

    /// Some(true/false) once attempted; None while unanswered
    pub fn attempt_outcome(&self) -> Option<bool> {
        let given = self.user_answer?;
        Some(matches!(self.solve(), Ok(result) if result == given))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            self.first, self.operator, self.second, self.answer
        )
    }
}

/// Named, ordered collection of problems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredProblemSet")]
pub struct ProblemSet {
    name: String,
    description: Option<String>,
    difficulty: Option<Difficulty>,
    problems: Vec<Problem>,
}

/// Serialized form, checked on the way in
#[derive(Deserialize)]
struct StoredProblemSet {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    problems: Vec<Problem>,
}

impl TryFrom<StoredProblemSet> for ProblemSet {
    type Error = DatamanError;

    fn try_from(stored: StoredProblemSet) -> Result<Self> {
        let mut set = ProblemSet::new(&stored.name, stored.description.as_deref())?
            .with_difficulty(stored.difficulty);
        set.problems = stored.problems;
        Ok(set)
    }
}

impl ProblemSet {
    pub fn new(name: &str, description: Option<&str>) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatamanError::validation("problem set name must not be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            difficulty: None,
            problems: Vec::new(),
        })
    }

    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter()
    }

    pub fn add(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn remove(&mut self, index: usize) -> Result<Problem> {
        self.check_index(index)?;
        Ok(self.problems.remove(index))
    }

    pub fn get(&self, index: usize) -> Result<&Problem> {
        self.check_index(index)?;
        Ok(&self.problems[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Problem> {
        self.check_index(index)?;
        Ok(&mut self.problems[index])
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.problems.len() {
            return Err(DatamanError::IndexOutOfRange {
                index,
                len: self.problems.len(),
            });
        }
        Ok(())
    }

    /// First problem without a recorded answer
    pub fn next_unanswered(&self) -> Option<usize> {
        self.problems.iter().position(|p| p.user_answer.is_none())
    }

    pub fn reset_attempts(&mut self) {
        for problem in &mut self.problems {
            problem.clear_answer();
        }
    }

    /// Number of problems per operator; operators with no problems are omitted
    pub fn operator_counts(&self) -> BTreeMap<Operator, usize> {
        let mut counts = BTreeMap::new();
        for problem in &self.problems {
            *counts.entry(problem.operator).or_insert(0) += 1;
        }
        counts
    }

    pub fn statistics(&self) -> ProblemSetStats {
        let mut stats = ProblemSetStats::default();
        for op in Operator::ALL {
            stats.by_operator.insert(op, OperatorStats::default());
        }

        for problem in &self.problems {
            let outcome = problem.attempt_outcome();
            stats.total += 1;
            let entry = stats.by_operator.entry(problem.operator).or_default();
            entry.total += 1;

            if let Some(correct) = outcome {
                stats.attempted += 1;
                entry.attempted += 1;
                if correct {
                    stats.correct += 1;
                    entry.correct += 1;
                }
            }
        }

        stats.accuracy = percentage(stats.correct, stats.attempted);
        for entry in stats.by_operator.values_mut() {
            entry.accuracy = percentage(entry.correct, entry.attempted);
        }

        stats
    }
}

/// Statistics for one operator inside a set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorStats {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Statistics for a whole set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemSetStats {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub by_operator: BTreeMap<Operator, OperatorStats>,
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
