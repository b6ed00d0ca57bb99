use super::ast::{BinaryOp, Node, UnaryOp};
use super::error::EvalError;
use super::factorials::{self, MAX_FACTORIAL};

const INTEGER_TOLERANCE: f64 = 1e-12;

pub struct Step {
    pub operation: String,
    pub result: f64,
}

/// Records intermediate results when `detailed_mode` is on.
pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    pub fn add_step(&mut self, operation: impl FnOnce() -> String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step {
                operation: operation(),
                result,
            });
        }
    }
}

pub fn evaluate(node: &Node) -> Result<f64, EvalError> {
    evaluate_traced(node, &mut EvaluationTrace::new(false))
}

pub fn evaluate_traced(node: &Node, trace: &mut EvaluationTrace) -> Result<f64, EvalError> {
    match node {
        Node::Number(n) => Ok(*n),
        Node::Constant(constant) => {
            trace.add_step(|| constant.name.to_string(), constant.value);
            Ok(constant.value)
        }
        Node::Unary { op, operand } => {
            let value = evaluate_traced(operand, trace)?;
            match op {
                UnaryOp::Identity => Ok(value),
                UnaryOp::Negate => {
                    trace.add_step(|| format!("-{}", value), -value);
                    Ok(-value)
                }
                UnaryOp::Factorial => {
                    let result = factorial(value)?;
                    trace.add_step(|| format!("{}!", value), result);
                    Ok(result)
                }
            }
        }
        Node::Binary { op, left, right } => {
            let left = evaluate_traced(left, trace)?;
            let right = evaluate_traced(right, trace)?;
            let result = binary(*op, left, right)?;
            trace.add_step(|| format!("{} {} {}", left, op.symbol(), right), result);
            Ok(result)
        }
        Node::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate_traced(arg, trace))
                .collect::<Result<Vec<_>, _>>()?;
            let result = function.apply(&values)?;
            trace.add_step(
                || {
                    let args_str = values
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}({})", function.name, args_str)
                },
                result,
            );
            Ok(result)
        }
    }
}

fn binary(op: BinaryOp, left: f64, right: f64) -> Result<f64, EvalError> {
    match op {
        BinaryOp::Add => Ok(left + right),
        BinaryOp::Sub => Ok(left - right),
        BinaryOp::Mul => Ok(left * right),
        BinaryOp::Div => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(left / right)
        }
        BinaryOp::Pow => {
            if left == 0.0 && right == 0.0 {
                return Err(EvalError::ZeroPowZero);
            }
            Ok(left.powf(right))
        }
    }
}

fn factorial(x: f64) -> Result<f64, EvalError> {
    if !x.is_finite() {
        return Err(EvalError::NotFinite);
    }
    if x < 0.0 {
        return Err(EvalError::NegativeFactorial(x));
    }
    let n = x.round();
    if (n - x).abs() > INTEGER_TOLERANCE {
        return Err(EvalError::NonIntegerFactorial(x));
    }
    if n > MAX_FACTORIAL as f64 {
        return Err(EvalError::FactorialOverflow(x));
    }
    factorials::factorial(n as usize).ok_or(EvalError::FactorialOverflow(x))
}
