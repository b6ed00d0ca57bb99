use fastcalc::calc_engine::{
    evaluate_str, format_result, EngineError, EvalError, FormatError, LexError, ParseError,
    MAX_INPUT_LEN, MAX_OUTPUT_LEN,
};
use fastcalc::{calculate, evaluate_expression};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn value(input: &str) -> f64 {
    evaluate_str(input).unwrap_or_else(|e| panic!("{input}: {e}"))
}

#[test]
fn literals_evaluate_to_themselves() {
    init();
    for (literal, expected) in [
        ("0", 0.0),
        ("7", 7.0),
        ("12.5", 12.5),
        (".25", 0.25),
        ("1000000", 1e6),
        ("0.001", 0.001),
    ] {
        assert_eq!(value(literal), expected, "{literal}");
    }
}

#[test]
fn degree_literals_become_radians() {
    init();
    assert!((value("180'") - std::f64::consts::PI).abs() < 1e-15);
    assert!((value("90'") - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
    assert!((value("45.5'") - 45.5f64.to_radians()).abs() < 1e-15);
}

#[test]
fn precedence_and_associativity() {
    init();
    assert_eq!(calculate("2+3*4").unwrap(), "14");
    assert_eq!(calculate("(2+3)*4").unwrap(), "20");
    assert_eq!(calculate("2^3^2").unwrap(), "512");
    assert_eq!(calculate("10-4-3").unwrap(), "3");
    assert_eq!(calculate("100/10/5").unwrap(), "2");
}

#[test]
fn unary_minus_binds_tighter_than_power() {
    init();
    assert_eq!(value("-2^2"), 4.0);
    assert_eq!(value("-(2^2)"), -4.0);
    assert_eq!(value("2^-2"), 0.25);
    assert_eq!(value("-2!"), -2.0);
}

#[test]
fn factorial() {
    init();
    assert_eq!(calculate("5!").unwrap(), "120");
    assert_eq!(
        calculate("3.5!"),
        Err(EngineError::Eval(EvalError::NonIntegerFactorial(3.5)))
    );
    assert_eq!(
        calculate("(-1)!"),
        Err(EngineError::Eval(EvalError::NegativeFactorial(-1.0)))
    );
}

#[test]
fn arithmetic_failures() {
    init();
    assert_eq!(calculate("1/0"), Err(EngineError::Eval(EvalError::DivisionByZero)));
    assert_eq!(calculate("0^0"), Err(EngineError::Eval(EvalError::ZeroPowZero)));
}

#[test]
fn functions_and_bars() {
    init();
    assert_eq!(calculate("|-5|").unwrap(), "5");
    assert_eq!(calculate("log(100,10)").unwrap(), "2");
    assert_eq!(calculate("sqrt(2)^2").unwrap(), "2");
    assert_eq!(calculate("sin(30')").unwrap(), "0.5");
    assert_eq!(
        calculate("sqrt(-1)"),
        Err(EngineError::Eval(EvalError::NegativeSqrt(-1.0)))
    );
    assert!(matches!(
        calculate("asin(2)"),
        Err(EngineError::Eval(EvalError::DomainError { function: "asin", .. }))
    ));
}

#[test]
fn arity_is_checked_while_parsing() {
    init();
    // 1/0 would fail evaluation; the arity error must come first
    assert_eq!(
        calculate("sin(1/0,2)"),
        Err(EngineError::Parse(ParseError::ArityMismatch {
            name: "sin".to_string(),
            expected: 1,
            actual: 2,
        }))
    );
    assert!(matches!(
        calculate("sin(1,2)"),
        Err(EngineError::Parse(ParseError::ArityMismatch { .. }))
    ));
}

#[test]
fn lexing_failures() {
    init();
    let long = "1".repeat(MAX_INPUT_LEN + 1);
    assert_eq!(
        calculate(&long),
        Err(EngineError::Lex(LexError::InputTooLong {
            len: MAX_INPUT_LEN + 1,
            max: MAX_INPUT_LEN,
        }))
    );
    // whitespace does not count towards the limit
    let spaced = "1 ".repeat(MAX_INPUT_LEN);
    assert!(calculate(&spaced).is_ok());
    assert_eq!(
        calculate("Sin(1)"),
        Err(EngineError::Lex(LexError::InvalidCharacter('S')))
    );
}

#[test]
fn formatted_results_fit_the_budget() {
    init();
    let mut samples = vec![
        0.0,
        -0.0,
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        5e-324,
        1.0 / 3.0,
        -2.0 / 3.0,
        123456789012345678.0,
    ];
    for exp in (-300..=300).step_by(7) {
        let base = 10f64.powi(exp);
        samples.push(base);
        samples.push(-1.234567890123456 * base);
        samples.push(9.999999999999999 * base);
    }

    for x in samples {
        let text = format_result(x).unwrap_or_else(|e| panic!("{x}: {e}"));
        assert!(text.chars().count() <= MAX_OUTPUT_LEN, "{x} -> {text}");
    }
    assert_eq!(format_result(f64::NAN), Err(FormatError::NotANumber));
    assert_eq!(format_result(f64::INFINITY), Err(FormatError::MagnitudeTooLarge));
    assert_eq!(format_result(f64::NEG_INFINITY), Err(FormatError::MagnitudeTooLarge));
}

#[test]
fn repeated_evaluation_is_identical() {
    init();
    for input in ["2+3*4", "sin(1)/3", "1/0", "pi^e", "foo(1)"] {
        assert_eq!(evaluate_expression(input), evaluate_expression(input));
    }
}

#[test]
fn messages_name_the_failing_stage() {
    init();
    let message = |input: &str| evaluate_expression(input).unwrap_err();
    assert!(message("2#").starts_with("lexing failed"));
    assert!(message("(2").starts_with("parsing failed"));
    assert!(message("ln(0)").starts_with("evaluation failed"));
    assert!(message("root(-8,3)").starts_with("formatting failed"));
}
