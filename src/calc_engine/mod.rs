//! Expression engine: lexer → parser → evaluator → formatter.
//!
//! Every call is independent; nothing is cached between calls.

pub mod ast;
pub mod error;
pub mod eval;
pub mod factorials;
pub mod format;
pub mod functions;
pub mod lexer;
pub mod parser;

use log::{debug, trace};

pub use ast::{BinaryOp, Node, UnaryOp};
pub use error::{EngineError, EvalError, FormatError, LexError, ParseError};
pub use eval::{evaluate, evaluate_traced as evaluate_node_traced, EvaluationTrace, Step};
pub use format::{format_result, MAX_OUTPUT_LEN};
pub use lexer::{tokenize, Token, MAX_INPUT_LEN};
pub use parser::{parse, Parser};

/// Lexes and parses `input` into a syntax tree.
pub fn parse_expression(input: &str) -> Result<Node, EngineError> {
    let tokens = tokenize(input)?;
    trace!("tokens: {:?}", tokens);
    let ast = parse(tokens)?;
    trace!("ast: {}", ast);
    Ok(ast)
}

/// Computes the raw value of `input`.
pub fn evaluate_str(input: &str) -> Result<f64, EngineError> {
    let ast = parse_expression(input)?;
    Ok(evaluate(&ast)?)
}

/// Like [`evaluate_str`], recording each intermediate operation in `trace`.
pub fn evaluate_traced(input: &str, trace: &mut EvaluationTrace) -> Result<f64, EngineError> {
    let ast = parse_expression(input)?;
    Ok(eval::evaluate_traced(&ast, trace)?)
}

/// Evaluates `input` and renders the result in at most [`MAX_OUTPUT_LEN`]
/// characters.
pub fn calculate(input: &str) -> Result<String, EngineError> {
    let outcome =
        evaluate_str(input).and_then(|value| format_result(value).map_err(EngineError::from));
    match &outcome {
        Ok(result) => debug!("{:?} = {}", input, result),
        Err(e) => debug!("{:?} failed: {}", input, e),
    }
    outcome
}

/// Entry point for shells: the error side is a message ready to show.
pub fn evaluate_expression(input: &str) -> Result<String, String> {
    calculate(input).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_reports_the_failing_stage() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert!(matches!(calculate("2#"), Err(EngineError::Lex(_))));
        assert!(matches!(calculate("2+"), Err(EngineError::Parse(_))));
        assert!(matches!(calculate("1/0"), Err(EngineError::Eval(_))));
        assert!(matches!(calculate("root(-8,3)"), Err(EngineError::Format(_))));
    }

    #[test]
    fn evaluate_expression_returns_messages() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(evaluate_expression("2 + 3 * 4"), Ok("14".to_string()));
        assert_eq!(
            evaluate_expression("1/0"),
            Err("evaluation failed: division by zero".to_string())
        );
    }

    #[test]
    fn traced_evaluation_matches_plain() {
        let mut trace = EvaluationTrace::new(true);
        let traced = evaluate_traced("2^3*pi", &mut trace).unwrap();
        assert_eq!(traced, evaluate_str("2^3*pi").unwrap());
        assert_eq!(trace.steps.len(), 3);
        assert_eq!(trace.steps[0].operation, "2 ^ 3");
        assert_eq!(trace.steps[1].operation, "pi");
    }
}
