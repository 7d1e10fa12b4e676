// SQLite storage service
// One row per problem set, one row per problem, ordered by position

use crate::error::{DatamanError, Result};
use crate::models::{Difficulty, Operator, Problem, ProblemSet};
use crate::services::storage::ProblemSetStore;
use crate::utils::ensure_parent_dir;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Raw problem row before operator validation
type ProblemRow = (i64, String, i64, i64, Option<i64>);

/// SQLite backed problem set store
pub struct SqliteStorage {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStorage {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;

        let storage = Self {
            conn: Connection::open(path)?,
            db_path: Some(path.to_path_buf()),
        };
        storage.initialize()?;
        Ok(storage)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Create tables and indexes
    fn initialize(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;

        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS problem_sets (
                name TEXT PRIMARY KEY,
                description TEXT,
                difficulty TEXT CHECK(difficulty IN ('easy', 'medium', 'hard')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS problems (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                problem_set_name TEXT NOT NULL,
                position INTEGER NOT NULL,
                first INTEGER NOT NULL,
                operator TEXT NOT NULL,
                second INTEGER NOT NULL,
                answer INTEGER NOT NULL,
                user_answer INTEGER,
                FOREIGN KEY (problem_set_name) REFERENCES problem_sets(name) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_problems_set_position
                ON problems(problem_set_name, position);
            ",
        )?;

        Ok(())
    }

    fn load_problems(&self, name: &str) -> Result<Vec<Problem>> {
        let mut stmt = self.conn.prepare(
            "SELECT first, operator, second, answer, user_answer
             FROM problems WHERE problem_set_name = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map([name], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<Vec<ProblemRow>, _>>()?;

        rows.into_iter().map(row_to_problem).collect()
    }
}

fn row_to_problem((first, operator, second, answer, user_answer): ProblemRow) -> Result<Problem> {
    let operator: Operator = operator.parse()?;
    let mut problem = Problem::with_answer(first, operator, second, answer);
    if let Some(given) = user_answer {
        problem.record_answer(given);
    }
    Ok(problem)
}

impl ProblemSetStore for SqliteStorage {
    fn save(&mut self, set: &ProblemSet) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO problem_sets (name, description, difficulty, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(name) DO UPDATE SET
                description = excluded.description,
                difficulty = excluded.difficulty,
                updated_at = excluded.updated_at",
            rusqlite::params![
                set.name(),
                set.description(),
                set.difficulty().map(|d| d.as_str()),
                now,
            ],
        )?;

        tx.execute(
            "DELETE FROM problems WHERE problem_set_name = ?1",
            [set.name()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO problems
                 (problem_set_name, position, first, operator, second, answer, user_answer)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for (position, problem) in set.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    set.name(),
                    position as i64,
                    problem.first(),
                    problem.operator().symbol(),
                    problem.second(),
                    problem.answer(),
                    problem.user_answer(),
                ])?;
            }
        }

        tx.commit()?;
        log::debug!("saved problem set '{}' ({} problems)", set.name(), set.len());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ProblemSet> {
        let header: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT description, difficulty FROM problem_sets WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (description, difficulty) =
            header.ok_or_else(|| DatamanError::not_found(format!("problem set '{}'", name)))?;

        let difficulty = difficulty
            .map(|d| d.parse::<Difficulty>())
            .transpose()?;

        let mut set = ProblemSet::new(name, description.as_deref())?.with_difficulty(difficulty);
        for problem in self.load_problems(name)? {
            set.add(problem);
        }
        Ok(set)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM problems WHERE problem_set_name = ?1", [name])?;
        let removed = tx.execute("DELETE FROM problem_sets WHERE name = ?1", [name])?;
        if removed == 0 {
            return Err(DatamanError::not_found(format!("problem set '{}'", name)));
        }
        tx.commit()?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM problem_sets ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn contains(&self, name: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM problem_sets WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
