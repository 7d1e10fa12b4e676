//! Problem line parser
//! Turns console input such as `12 / 4 = 3` into problem parts

use crate::error::{DatamanError, Result};
use crate::models::{Operator, Problem};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const PROBLEM_FORMAT_HINT: &str = "a op b = c (for example: 2 + 2 = 4)";

/// Parts of a problem line; the answer is absent for `a op b = ?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedProblem {
    pub first: i64,
    pub operator: Operator,
    pub second: i64,
    pub answer: Option<i64>,
}

impl ParsedProblem {
    /// Problem with the typed answer kept as the expected answer
    pub fn into_problem(self) -> Result<Problem> {
        match self.answer {
            Some(answer) => Ok(Problem::with_answer(
                self.first,
                self.operator,
                self.second,
                answer,
            )),
            None => Problem::new(self.first, self.operator, self.second),
        }
    }
}

fn problem_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-?[0-9]+)\s*([^\s0-9])\s*(-?[0-9]+)\s*(?:=\s*(-?[0-9]+|\?)?)?\s*$")
            .expect("problem pattern is a valid regex")
    })
}

/// Parse `a op b = c`, `a op b = ?` or `a op b`
pub fn parse_problem_line(line: &str) -> Result<ParsedProblem> {
    let invalid = || {
        DatamanError::validation(format!(
            "invalid problem '{}', expected format {}",
            line.trim(),
            PROBLEM_FORMAT_HINT
        ))
    };

    let caps = problem_pattern().captures(line).ok_or_else(invalid)?;

    let first = parse_operand(&caps[1])?;
    let operator: Operator = caps[2].parse()?;
    let second = parse_operand(&caps[3])?;
    let answer = match caps.get(4).map(|m| m.as_str()) {
        None | Some("?") => None,
        Some(text) => Some(parse_operand(text)?),
    };

    Ok(ParsedProblem {
        first,
        operator,
        second,
        answer,
    })
}

fn parse_operand(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| DatamanError::validation(format!("number '{}' is out of range", text)))
}

/// Parse a whole number typed at a prompt
pub fn parse_integer(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| DatamanError::validation(format!("'{}' is not a whole number", trimmed)))
}

/// Convert a 1-based menu number into a 0-based index below `len`
pub fn parse_index(input: &str, len: usize) -> Result<usize> {
    let trimmed = input.trim();
    let number: usize = trimmed
        .parse()
        .map_err(|_| DatamanError::validation(format!("'{}' is not a valid number", trimmed)))?;

    if number == 0 || number > len {
        return Err(DatamanError::IndexOutOfRange {
            index: number.saturating_sub(1),
            len,
        });
    }
    Ok(number - 1)
}

/// Parse `+,-,*` style operator lists; an empty list means every operator
pub fn parse_operator_list(input: &str) -> Result<BTreeSet<Operator>> {
    let operators = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<BTreeSet<Operator>>>()?;

    if operators.is_empty() {
        return Ok(Operator::ALL.into_iter().collect());
    }
    Ok(operators)
}

/// Parse the numbered operator menu: 1 = +, 2 = -, 3 = *, 4 = /, 5 = all
pub fn parse_operator_choices(input: &str) -> Result<BTreeSet<Operator>> {
    let mut operators = BTreeSet::new();
    for choice in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match choice {
            "1" => operators.insert(Operator::Add),
            "2" => operators.insert(Operator::Subtract),
            "3" => operators.insert(Operator::Multiply),
            "4" => operators.insert(Operator::Divide),
            "5" => return Ok(Operator::ALL.into_iter().collect()),
            other => {
                return Err(DatamanError::validation(format!(
                    "unknown operator choice '{}'",
                    other
                )))
            }
        };
    }

    if operators.is_empty() {
        return Ok(Operator::ALL.into_iter().collect());
    }
    Ok(operators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_problem() {
        let parsed = parse_problem_line("2 + 2 = 4").unwrap();
        assert_eq!(
            parsed,
            ParsedProblem {
                first: 2,
                operator: Operator::Add,
                second: 2,
                answer: Some(4),
            }
        );
    }

    #[test]
    fn test_parse_flexible_spacing_and_negatives() {
        let parsed = parse_problem_line("  -7/2=-3 ").unwrap();
        assert_eq!(parsed.first, -7);
        assert_eq!(parsed.operator, Operator::Divide);
        assert_eq!(parsed.second, 2);
        assert_eq!(parsed.answer, Some(-3));

        let parsed = parse_problem_line("5 - -3 = 8").unwrap();
        assert_eq!(parsed.operator, Operator::Subtract);
        assert_eq!(parsed.second, -3);
    }

    #[test]
    fn test_parse_without_answer() {
        assert_eq!(parse_problem_line("3 * 4 = ?").unwrap().answer, None);
        assert_eq!(parse_problem_line("3 * 4").unwrap().answer, None);
        assert_eq!(parse_problem_line("3 * 4 =").unwrap().answer, None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for line in ["", "2 +", "two + 2 = 4", "2 + 2 = 4 = 4", "2 + 2 == 4"] {
            assert!(
                matches!(parse_problem_line(line), Err(DatamanError::Validation(_))),
                "expected validation error for {:?}",
                line
            );
        }
    }

    #[test]
    fn test_parse_only_ascii_digits() {
        for line in ["٣ + 2", "3 + ٢ = 5", "１ + 1 = 2"] {
            let err = parse_problem_line(line).unwrap_err();
            assert!(
                err.to_string().contains("expected format"),
                "unexpected error for {:?}: {}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_parse_unknown_operator_names_symbol() {
        let err = parse_problem_line("2 % 2 = 0").unwrap_err();
        assert!(err.to_string().contains("'%'"));
    }

    #[test]
    fn test_into_problem_keeps_typed_answer() {
        let problem = parse_problem_line("2 + 2 = 5").unwrap().into_problem().unwrap();
        assert_eq!(problem.answer(), 5);
        assert!(!problem.is_consistent());

        let problem = parse_problem_line("9 / 3 = ?").unwrap().into_problem().unwrap();
        assert_eq!(problem.answer(), 3);

        assert!(parse_problem_line("9 / 0").unwrap().into_problem().is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("1", 3).unwrap(), 0);
        assert_eq!(parse_index(" 3 ", 3).unwrap(), 2);
        assert!(matches!(
            parse_index("4", 3),
            Err(DatamanError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            parse_index("0", 3),
            Err(DatamanError::IndexOutOfRange { .. })
        ));
        assert!(matches!(parse_index("1", 0), Err(DatamanError::IndexOutOfRange { .. })));
        assert!(matches!(parse_index("x", 3), Err(DatamanError::Validation(_))));
    }

    #[test]
    fn test_parse_operator_lists() {
        let ops = parse_operator_list("+, -").unwrap();
        assert_eq!(ops.into_iter().collect::<Vec<_>>(), vec![Operator::Add, Operator::Subtract]);
        assert_eq!(parse_operator_list("").unwrap().len(), 4);
        assert!(parse_operator_list("+,^").is_err());

        let ops = parse_operator_choices("3,4").unwrap();
        assert_eq!(ops.into_iter().collect::<Vec<_>>(), vec![Operator::Multiply, Operator::Divide]);
        assert_eq!(parse_operator_choices("1,5").unwrap().len(), 4);
        assert_eq!(parse_operator_choices("").unwrap().len(), 4);
        assert!(parse_operator_choices("9").is_err());
    }
}
