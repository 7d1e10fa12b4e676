// User history service
// Practice sessions, attempt log, running statistics and achievements,
// persisted as one JSON document

use crate::error::{DatamanError, Result};
use crate::models::{percentage, Difficulty, Operator, Problem};
use crate::utils::ensure_parent_dir;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub problems_attempted: u32,
    pub problems_correct: u32,
    pub problem_sets_used: Vec<String>,
}

/// Per problem set usage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemSetUsage {
    pub attempts: u32,
    pub correct: u32,
    pub last_used: Option<DateTime<Utc>>,
}

/// One answered problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub problem: Problem,
    pub is_correct: bool,
    /// Seconds
    pub time_taken: f64,
    pub session_id: Option<Uuid>,
    pub problem_set_name: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl AttemptRecord {
    pub fn new(problem: Problem, is_correct: bool, time_taken: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            problem,
            is_correct,
            time_taken,
            session_id: None,
            problem_set_name: None,
            difficulty: None,
        }
    }

    pub fn in_session(mut self, session_id: Option<Uuid>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn from_set(mut self, name: Option<&str>, difficulty: Option<Difficulty>) -> Self {
        self.problem_set_name = name.map(str::to_string);
        self.difficulty = difficulty;
        self
    }
}

/// Attempted/correct counters with a running average time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStats {
    pub attempted: u32,
    pub correct: u32,
    pub average_time: f64,
}

impl OutcomeStats {
    fn record(&mut self, is_correct: bool, time_taken: f64) {
        self.attempted += 1;
        if is_correct {
            self.correct += 1;
        }
        self.average_time = running_average(self.average_time, self.attempted, time_taken);
    }

    pub fn accuracy(&self) -> f64 {
        percentage(self.correct as usize, self.attempted as usize)
    }
}

/// Lifetime statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatistics {
    pub total_problems_attempted: u32,
    pub total_problems_correct: u32,
    pub by_operator: BTreeMap<Operator, OutcomeStats>,
    pub by_difficulty: BTreeMap<Difficulty, OutcomeStats>,
    pub average_time_per_problem: f64,
}

impl Default for HistoryStatistics {
    fn default() -> Self {
        Self {
            total_problems_attempted: 0,
            total_problems_correct: 0,
            by_operator: Operator::ALL
                .into_iter()
                .map(|op| (op, OutcomeStats::default()))
                .collect(),
            by_difficulty: Difficulty::ALL
                .into_iter()
                .map(|d| (d, OutcomeStats::default()))
                .collect(),
            average_time_per_problem: 0.0,
        }
    }
}

impl HistoryStatistics {
    pub fn accuracy(&self) -> f64 {
        percentage(
            self.total_problems_correct as usize,
            self.total_problems_attempted as usize,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

/// Suggestions grouped by topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningSuggestions {
    pub operators: Vec<String>,
    pub difficulty: Vec<String>,
    pub general: Vec<String>,
}

impl LearningSuggestions {
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty() && self.difficulty.is_empty() && self.general.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.operators
            .iter()
            .chain(self.difficulty.iter())
            .chain(self.general.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryData {
    user_id: Uuid,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    sessions: Vec<SessionRecord>,
    #[serde(default)]
    problem_sets: BTreeMap<String, ProblemSetUsage>,
    #[serde(default)]
    completed_problems: Vec<AttemptRecord>,
    #[serde(default)]
    statistics: HistoryStatistics,
    #[serde(default)]
    achievements: Vec<Achievement>,
}

impl HistoryData {
    fn fresh() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_login: None,
            sessions: Vec::new(),
            problem_sets: BTreeMap::new(),
            completed_problems: Vec::new(),
            statistics: HistoryStatistics::default(),
            achievements: Vec::new(),
        }
    }
}

struct AchievementRule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    earned: fn(&HistoryData) -> bool,
}

const PERFECT_STREAK: usize = 10;

const ACHIEVEMENT_RULES: &[AchievementRule] = &[
    AchievementRule {
        id: "first_problem",
        name: "First Steps",
        description: "Attempted your first problem",
        earned: |h| h.statistics.total_problems_attempted >= 1,
    },
    AchievementRule {
        id: "first_correct",
        name: "Math Novice",
        description: "Solved your first problem correctly",
        earned: |h| h.statistics.total_problems_correct >= 1,
    },
    AchievementRule {
        id: "ten_correct",
        name: "Math Apprentice",
        description: "Solved 10 problems correctly",
        earned: |h| h.statistics.total_problems_correct >= 10,
    },
    AchievementRule {
        id: "fifty_correct",
        name: "Math Expert",
        description: "Solved 50 problems correctly",
        earned: |h| h.statistics.total_problems_correct >= 50,
    },
    AchievementRule {
        id: "hundred_correct",
        name: "Math Master",
        description: "Solved 100 problems correctly",
        earned: |h| h.statistics.total_problems_correct >= 100,
    },
    AchievementRule {
        id: "perfect_ten",
        name: "Perfect Ten",
        description: "Solved 10 problems in a row correctly",
        earned: |h| {
            h.completed_problems.len() >= PERFECT_STREAK
                && h.completed_problems[h.completed_problems.len() - PERFECT_STREAK..]
                    .iter()
                    .all(|a| a.is_correct)
        },
    },
];

fn running_average(current: f64, count: u32, value: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (current * f64::from(count - 1) + value) / f64::from(count)
}

/// Practice history for one user
#[derive(Debug)]
pub struct UserHistory {
    data: HistoryData,
    path: Option<PathBuf>,
}

impl UserHistory {
    /// Load the history file or start a fresh one.
    /// An unreadable or corrupt file is replaced on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(data) => Some(data),
                Err(e) => {
                    log::warn!(
                        "history file {} is corrupt ({}), starting a new history",
                        path.display(),
                        e
                    );
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let history = match data {
            Some(data) => Self {
                data,
                path: Some(path),
            },
            None => {
                let history = Self {
                    data: HistoryData::fresh(),
                    path: Some(path),
                };
                history.save()?;
                history
            }
        };
        Ok(history)
    }

    /// History that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            data: HistoryData::fresh(),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn user_id(&self) -> Uuid {
        self.data.user_id
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        ensure_parent_dir(path)?;
        fs::write(path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }

    // ==================== Sessions ====================

    pub fn start_session(&mut self) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        self.data.sessions.push(SessionRecord {
            session_id,
            start_time: now,
            end_time: None,
            problems_attempted: 0,
            problems_correct: 0,
            problem_sets_used: Vec::new(),
        });
        self.data.last_login = Some(now);
        self.save()?;

        log::debug!("started session {}", session_id);
        Ok(session_id)
    }

    pub fn end_session(&mut self, session_id: Uuid) -> Result<()> {
        self.end_session_at(session_id, Utc::now())
    }

    pub fn end_session_at(&mut self, session_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let session = self
            .data
            .sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| DatamanError::not_found(format!("session {}", session_id)))?;
        session.end_time = Some(at);
        self.save()
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.data.sessions
    }

    // ==================== Attempts ====================

    /// Record an attempt and return achievements earned by it
    pub fn record_attempt(&mut self, attempt: AttemptRecord) -> Result<Vec<Achievement>> {
        let stats = &mut self.data.statistics;
        stats.total_problems_attempted += 1;
        if attempt.is_correct {
            stats.total_problems_correct += 1;
        }
        stats.average_time_per_problem = running_average(
            stats.average_time_per_problem,
            stats.total_problems_attempted,
            attempt.time_taken,
        );
        stats
            .by_operator
            .entry(attempt.problem.operator())
            .or_default()
            .record(attempt.is_correct, attempt.time_taken);
        if let Some(difficulty) = attempt.difficulty {
            stats
                .by_difficulty
                .entry(difficulty)
                .or_default()
                .record(attempt.is_correct, attempt.time_taken);
        }

        if let Some(session_id) = attempt.session_id {
            if let Some(session) = self
                .data
                .sessions
                .iter_mut()
                .find(|s| s.session_id == session_id)
            {
                session.problems_attempted += 1;
                if attempt.is_correct {
                    session.problems_correct += 1;
                }
                if let Some(name) = &attempt.problem_set_name {
                    if !session.problem_sets_used.contains(name) {
                        session.problem_sets_used.push(name.clone());
                    }
                }
            }
        }

        if let Some(name) = &attempt.problem_set_name {
            let usage = self.data.problem_sets.entry(name.clone()).or_default();
            usage.attempts += 1;
            if attempt.is_correct {
                usage.correct += 1;
            }
            usage.last_used = Some(attempt.timestamp);
        }

        self.data.completed_problems.push(attempt);
        let earned = self.award_achievements();
        self.save()?;
        Ok(earned)
    }

    fn award_achievements(&mut self) -> Vec<Achievement> {
        let mut earned = Vec::new();
        for rule in ACHIEVEMENT_RULES {
            let already = self.data.achievements.iter().any(|a| a.id == rule.id);
            if !already && (rule.earned)(&self.data) {
                let achievement = Achievement {
                    id: rule.id.to_string(),
                    name: rule.name.to_string(),
                    description: rule.description.to_string(),
                    earned_at: Utc::now(),
                };
                log::info!("achievement earned: {}", achievement.name);
                self.data.achievements.push(achievement.clone());
                earned.push(achievement);
            }
        }
        earned
    }

    // ==================== Queries ====================

    pub fn statistics(&self) -> &HistoryStatistics {
        &self.data.statistics
    }

    /// Most recent attempts, oldest first
    pub fn recent_attempts(&self, limit: usize) -> &[AttemptRecord] {
        let all = &self.data.completed_problems;
        &all[all.len().saturating_sub(limit)..]
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.data.achievements
    }

    pub fn problem_set_usage(&self, name: &str) -> Option<&ProblemSetUsage> {
        self.data.problem_sets.get(name)
    }

    pub fn learning_suggestions(&self, now: DateTime<Utc>) -> LearningSuggestions {
        let mut suggestions = LearningSuggestions::default();
        let stats = &self.data.statistics;

        for (op, outcome) in &stats.by_operator {
            if outcome.attempted > 0 && outcome.accuracy() < 60.0 {
                suggestions
                    .operators
                    .push(format!("Practice more {} problems", op.name()));
            }
        }

        for (difficulty, outcome) in &stats.by_difficulty {
            if outcome.attempted == 0 {
                continue;
            }
            let accuracy = outcome.accuracy();
            match difficulty {
                Difficulty::Easy if accuracy > 90.0 && outcome.attempted >= 20 => suggestions
                    .difficulty
                    .push("Try some medium difficulty problems".to_string()),
                Difficulty::Medium if accuracy > 90.0 && outcome.attempted >= 20 => suggestions
                    .difficulty
                    .push("Try some hard difficulty problems".to_string()),
                Difficulty::Hard if accuracy < 50.0 && outcome.attempted >= 5 => {
                    suggestions.difficulty.push(
                        "Practice more medium difficulty problems before hard ones".to_string(),
                    )
                }
                _ => {}
            }
        }

        if stats.total_problems_attempted < 10 {
            suggestions
                .general
                .push("Complete more problems to get personalized suggestions".to_string());
        } else if self.data.sessions.len() > 1 {
            // an open session has no end time; look back to the last one that ended
            let last_end = self.data.sessions.iter().rev().find_map(|s| s.end_time);
            if let Some(last_end) = last_end {
                let days = (now - last_end).num_days();
                if days > 7 {
                    suggestions.general.push(format!(
                        "It's been {} days since your last session. Regular practice helps build math skills!",
                        days
                    ));
                }
            }
        }

        suggestions
    }
}
