//! Random problem generator
//! Builds problem sets from an operand range, an operator subset and a count

use crate::error::{DatamanError, Result};
use crate::models::{Difficulty, Operator, Problem, ProblemSet};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Generator options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub count: usize,
    pub operators: BTreeSet<Operator>,
    pub min_operand: i64,
    pub max_operand: i64,
    pub difficulty: Option<Difficulty>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::Easy, 10, Operator::ALL.into_iter().collect())
    }
}

impl GeneratorConfig {
    /// Options using the difficulty's operand range
    pub fn for_difficulty(
        difficulty: Difficulty,
        count: usize,
        operators: BTreeSet<Operator>,
    ) -> Self {
        let (min_operand, max_operand) = difficulty.operand_range();
        Self {
            count,
            operators,
            min_operand,
            max_operand,
            difficulty: Some(difficulty),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(DatamanError::validation("problem count must be at least 1"));
        }
        if self.operators.is_empty() {
            return Err(DatamanError::validation("at least one operator is required"));
        }
        if self.min_operand > self.max_operand {
            return Err(DatamanError::validation(format!(
                "minimum operand {} is greater than maximum operand {}",
                self.min_operand, self.max_operand
            )));
        }
        if self.operators.contains(&Operator::Divide)
            && self.min_operand == 0
            && self.max_operand == 0
        {
            return Err(DatamanError::validation(
                "division needs a non-zero operand in the range",
            ));
        }
        if let Some((first, operator, second)) = self.overflowing_pair() {
            return Err(DatamanError::validation(format!(
                "operand range {}..={} is too large for {}: {} {} {} overflows",
                self.min_operand,
                self.max_operand,
                operator.name(),
                first,
                operator,
                second
            )));
        }
        Ok(())
    }

    /// First operand pair in range whose result does not fit in an i64.
    /// Sums, differences and products peak at the corners of the range;
    /// generated quotients never exceed the dividend except for `MIN / -1`.
    fn overflowing_pair(&self) -> Option<(i64, Operator, i64)> {
        let corners = [self.min_operand, self.max_operand];
        for &operator in &self.operators {
            if operator == Operator::Divide {
                if self.min_operand == i64::MIN && self.max_operand >= -1 {
                    return Some((i64::MIN, operator, -1));
                }
                continue;
            }
            for first in corners {
                for second in corners {
                    if operator.apply(first, second).is_err() {
                        return Some((first, operator, second));
                    }
                }
            }
        }
        None
    }
}

/// Generate one problem; the config is assumed valid
fn generate_one<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Result<Problem> {
    let operator = config
        .operators
        .iter()
        .copied()
        .choose(rng)
        .ok_or_else(|| DatamanError::validation("at least one operator is required"))?;

    let (first, second) = match operator {
        Operator::Divide => exact_division_operands(config.min_operand, config.max_operand, rng),
        _ => (
            rng.gen_range(config.min_operand..=config.max_operand),
            rng.gen_range(config.min_operand..=config.max_operand),
        ),
    };

    Problem::new(first, operator, second)
}

/// Pick a non-zero divisor in range, then a dividend that is a multiple of it.
/// The divisor itself is such a multiple, so a candidate always exists.
fn exact_division_operands<R: Rng + ?Sized>(min: i64, max: i64, rng: &mut R) -> (i64, i64) {
    let divisor = loop {
        let candidate = rng.gen_range(min..=max);
        if candidate != 0 {
            break candidate;
        }
    };

    let step = i128::from(divisor).abs();
    let low = ceil_div(i128::from(min), step);
    let high = i128::from(max).div_euclid(step);
    let multiplier = rng.gen_range(low..=high);

    // multiplier * step lies in [min, max], so it fits in i64
    let dividend = i64::try_from(multiplier * step).unwrap_or(divisor);
    (dividend, divisor)
}

fn ceil_div(value: i128, step: i128) -> i128 {
    -((-value).div_euclid(step))
}

/// Generate a single random problem
pub fn generate_problem<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Result<Problem> {
    config.validate()?;
    generate_one(config, rng)
}

/// Generate a named set of `config.count` problems
pub fn generate_problem_set<R: Rng + ?Sized>(
    name: &str,
    description: Option<&str>,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<ProblemSet> {
    config.validate()?;

    let mut set = ProblemSet::new(name, description)?.with_difficulty(config.difficulty);
    for _ in 0..config.count {
        set.add(generate_one(config, rng)?);
    }

    log::debug!(
        "generated {} problems for set '{}' in range {}..={}",
        set.len(),
        set.name(),
        config.min_operand,
        config.max_operand
    );
    Ok(set)
}
