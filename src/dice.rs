//! Dice roller with calculator logic for `/roll`.
//!
//! A calculation is a whitespace-separated sequence of dice (`3d8`, `d20`),
//! plain numbers and the operators `+ - * /`. An operator combines the
//! running total with the term that follows it.

use std::sync::OnceLock;

use fancy_regex::Regex;
use rand::Rng;

use crate::common::error::DiceError;

/// Characters accepted as operators.
pub const NUMERIC_OPERATORS: &[char] = &['+', '-', '*', '/'];

/// Default upper bound for numbers, roll counts and die sides.
pub const DEFAULT_MAX_VALUE: u32 = 10000;

fn dice_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?P<rolls>[0-9]*)d(?P<sides>[0-9]+)").unwrap())
}

/// One visible step of a calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum RollStep {
    /// A dice term was rolled.
    Dice {
        rolls: u32,
        sides: u32,
        results: Vec<u32>,
        total: f64,
    },
    /// An operator combined the previous total with a term.
    Operator {
        operator: char,
        previous: f64,
        operand: f64,
        total: f64,
    },
}

/// Outcome of a full calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct RollOutcome {
    /// Tokens of the calculation as entered.
    pub query: Vec<String>,
    pub steps: Vec<RollStep>,
    pub total: f64,
}

/// Evaluate `calculation`, rolling dice with `rng`.
pub fn roll<R: Rng>(
    calculation: &str,
    max_value: u32,
    rng: &mut R,
) -> Result<RollOutcome, DiceError> {
    let tokens: Vec<&str> = calculation.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DiceError::Empty);
    }

    let mut steps = Vec::new();
    let mut operator: Option<char> = None;
    let mut running_total = 0.0;

    for (index, token) in tokens.iter().enumerate() {
        if token.chars().all(|c| NUMERIC_OPERATORS.contains(&c)) {
            if index == 0 {
                return Err(DiceError::OperatorFirst(token.to_string()));
            }
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(op), None) => operator = Some(op),
                _ => return Err(DiceError::UnknownOperator(token.to_string())),
            }
            continue;
        }

        let section_total = match token.parse::<f64>() {
            Ok(number) => {
                if !(number <= max_value as f64) {
                    return Err(DiceError::InvalidSize(token.to_string()));
                }
                number
            }
            Err(_) => {
                let (rolls, sides) = parse_dice(token, max_value)?;
                let results: Vec<u32> = (0..rolls).map(|_| rng.gen_range(1..=sides)).collect();
                let total = results.iter().map(|r| f64::from(*r)).sum();
                steps.push(RollStep::Dice {
                    rolls,
                    sides,
                    results,
                    total,
                });
                total
            }
        };

        running_total = match operator.take() {
            Some(op) => {
                let previous = running_total;
                let total = apply(op, previous, section_total)?;
                steps.push(RollStep::Operator {
                    operator: op,
                    previous,
                    operand: section_total,
                    total,
                });
                total
            }
            None => section_total,
        };
    }

    Ok(RollOutcome {
        query: tokens.iter().map(|t| t.to_string()).collect(),
        steps,
        total: running_total,
    })
}

/// Split a dice token into roll count and sides.
fn parse_dice(token: &str, max_value: u32) -> Result<(u32, u32), DiceError> {
    let lowered = token.to_lowercase();
    let captures = dice_pattern()
        .captures(&lowered)
        .ok()
        .flatten()
        .ok_or_else(|| {
            DiceError::InvalidArgument(
                "NO DICE SIDES DETECTED! TRY CHECKING YOUR SYNTAX AND /roll USAGE".to_string(),
            )
        })?;

    let rolls = match captures.name("rolls").map(|m| m.as_str()) {
        None | Some("") => 1,
        Some(raw) => {
            let rolls: u32 = raw
                .parse()
                .map_err(|_| DiceError::InvalidArgument(raw.to_string()))?;
            if rolls >= max_value {
                return Err(DiceError::InvalidSize(raw.to_string()));
            }
            rolls
        }
    };

    let raw_sides = captures.name("sides").map(|m| m.as_str()).unwrap_or("");
    let sides: u32 = raw_sides
        .parse()
        .map_err(|_| DiceError::InvalidArgument(raw_sides.to_string()))?;
    if sides < 2 || sides >= max_value {
        return Err(DiceError::InvalidSize(raw_sides.to_string()));
    }

    Ok((rolls, sides))
}

fn apply(operator: char, previous: f64, operand: f64) -> Result<f64, DiceError> {
    match operator {
        '+' => Ok(previous + operand),
        '-' => Ok(previous - operand),
        '*' => Ok(previous * operand),
        '/' if operand == 0.0 => Err(DiceError::DivideByZero),
        '/' => Ok(previous / operand),
        other => Err(DiceError::UnknownOperator(other.to_string())),
    }
}

/// Render a total without a trailing `.0` for whole numbers.
pub fn format_total(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
