//! What the interactive shells do with a submitted line.

use std::time::{Duration, Instant};

use crate::calc_engine::{self, format_result, EngineError, EvaluationTrace, Step};

const DETAILS: &str = "details";

#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Empty,
    Quit,
    Clear,
    ClearHistory,
    Help,
    Evaluate { expression: &'a str, detailed: bool },
}

/// Recognises the shell keywords; anything else is an expression. A leading
/// `details ` or trailing ` details` asks for the evaluation steps.
pub fn parse_command(input: &str) -> Command<'_> {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    match input.to_lowercase().as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "clear" | "reset" => return Command::Clear,
        "clear history" | "reset history" => return Command::ClearHistory,
        "help" => return Command::Help,
        _ => {}
    }

    if input.eq_ignore_ascii_case(DETAILS) {
        return Command::Evaluate {
            expression: "",
            detailed: true,
        };
    }
    let prefix_len = DETAILS.len() + 1;
    if let Some(head) = input.get(..prefix_len) {
        if head.eq_ignore_ascii_case("details ") {
            return Command::Evaluate {
                expression: input[prefix_len..].trim(),
                detailed: true,
            };
        }
    }
    if let Some(split) = input.len().checked_sub(prefix_len) {
        if let Some(tail) = input.get(split..) {
            if tail.eq_ignore_ascii_case(" details") {
                return Command::Evaluate {
                    expression: input[..split].trim(),
                    detailed: true,
                };
            }
        }
    }
    Command::Evaluate {
        expression: input,
        detailed: false,
    }
}

pub struct Evaluation {
    pub input: String,
    pub result: Result<String, String>,
    pub steps: Vec<Step>,
    pub detailed: bool,
    pub duration: Duration,
}

pub fn evaluate(expression: &str, detailed: bool) -> Evaluation {
    if expression.is_empty() {
        return Evaluation {
            input: expression.to_string(),
            result: Err("Please enter a valid expression after 'details'".to_string()),
            steps: Vec::new(),
            detailed: false,
            duration: Duration::ZERO,
        };
    }

    let start_time = Instant::now();
    let mut trace = EvaluationTrace::new(detailed);
    let result = calc_engine::evaluate_traced(expression, &mut trace)
        .and_then(|value| format_result(value).map_err(EngineError::from))
        .map_err(|e| e.to_string());
    let duration = start_time.elapsed();

    Evaluation {
        input: expression.to_string(),
        result,
        steps: trace.steps,
        detailed,
        duration,
    }
}

/// Renders an intermediate value; values the formatter refuses (NaN, inf)
/// are shown as Rust prints them.
pub fn display_value(value: f64) -> String {
    format_result(value).unwrap_or_else(|_| value.to_string())
}

/// Re-spaces an expression for display: binary operators get a space on
/// each side, commas one after. Unary signs stay attached.
pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut last: Option<char> = None;

    for c in expr.chars().filter(|c| !c.is_whitespace()) {
        match c {
            '+' | '-' | '*' | '/' | '^' if last.is_some_and(ends_operand) => {
                result.push(' ');
                result.push(c);
                result.push(' ');
            }
            ',' => result.push_str(", "),
            _ => result.push(c),
        }
        last = Some(c);
    }

    result
}

fn ends_operand(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ')' | '!' | '\'' | '.')
}
