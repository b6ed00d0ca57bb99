//! Error types for every stage of the engine.
//!
//! Each stage fails fast with its own enum; [`EngineError`] wraps them so the
//! pipeline can use `?` and the caller still knows which stage gave up.

use thiserror::Error;

/// Failures while turning the raw input into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("expression is {len} characters long, the limit is {max}")]
    InputTooLong { len: usize, max: usize },

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
}

/// Failures while building the syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected a number, constant, function, '(' or '|'")]
    ExpectedExpression,

    #[error("unexpected end of input after '{0}'")]
    UnexpectedEndOfInput(String),

    #[error("unbalanced parentheses: expected ')'")]
    UnbalancedParens,

    #[error("missing closing '|'")]
    UnbalancedBar,

    #[error("expected ',' or ')' in the arguments of {0}")]
    ExpectedCommaOrParen(String),

    #[error("expected '(' after function name {0}")]
    ExpectedCallParen(String),

    #[error("unknown function or constant '{0}'")]
    UnknownIdentifier(String),

    #[error("{name} takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("unexpected '{0}' after the end of the expression")]
    TrailingTokens(String),
}

/// Failures while computing the value of a syntax tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("0^0 is undefined")]
    ZeroPowZero,

    #[error("{function} is only defined on [-1, 1], got {value}")]
    DomainError { function: &'static str, value: f64 },

    #[error("square root of negative number {0}")]
    NegativeSqrt(f64),

    #[error("logarithm is only defined for positive values, got {0}")]
    NonPositiveLog(f64),

    #[error("logarithm base must be positive and not equal to 1, got {0}")]
    InvalidLogBase(f64),

    #[error("tan has a pole at {0}")]
    TangentPole(f64),

    #[error("root degree cannot be zero")]
    ZeroRoot,

    #[error("even root of negative number {0}")]
    EvenRootOfNegative(f64),

    #[error("factorial argument is not a finite number")]
    NotFinite,

    #[error("factorial is not defined for negative value {0}")]
    NegativeFactorial(f64),

    #[error("factorial is only defined for integers, got {0}")]
    NonIntegerFactorial(f64),

    #[error("factorial of {0} is too large")]
    FactorialOverflow(f64),

    #[error("{name} called with {actual} argument(s) instead of {expected}")]
    ArgumentCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failures while rendering the result for display.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("result is not a number")]
    NotANumber,

    #[error("result is too large in magnitude")]
    MagnitudeTooLarge,

    #[error("{0} cannot be written in {max} characters", max = super::format::MAX_OUTPUT_LEN)]
    UnrepresentableWithinBudget(f64),
}

/// Any failure of the full pipeline, tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("lexing failed: {0}")]
    Lex(#[from] LexError),

    #[error("parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn engine_error_is_send_sync_static() {
        _assert_send_sync_static::<EngineError>();
    }

    #[test]
    fn stage_is_named_in_message() {
        let err: EngineError = LexError::InvalidCharacter('#').into();
        assert_eq!(err.to_string(), "lexing failed: invalid character '#'");

        let err: EngineError = ParseError::ArityMismatch {
            name: "sin".to_string(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "parsing failed: sin takes 1 argument(s), got 2"
        );

        let err: EngineError = EvalError::DivisionByZero.into();
        assert_eq!(err.to_string(), "evaluation failed: division by zero");

        let err: EngineError = FormatError::NotANumber.into();
        assert_eq!(err.to_string(), "formatting failed: result is not a number");
    }

    #[test]
    fn budget_error_mentions_limit() {
        let msg = FormatError::UnrepresentableWithinBudget(1.5).to_string();
        assert!(msg.contains("15 characters"), "{msg}");
    }
}
