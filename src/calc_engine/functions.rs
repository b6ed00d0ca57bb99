//! Built-in functions and constants.
//!
//! The parser looks names up here to recognise them and check arity, the
//! evaluator calls [`Function::apply`]. Nothing else lists function names.

use std::f64::consts::{E, PI};
use std::fmt;

use super::error::EvalError;

type Apply = fn(&[f64]) -> Result<f64, EvalError>;

pub struct Function {
    pub name: &'static str,
    pub arity: usize,
    apply: Apply,
}

impl Function {
    pub fn apply(&self, args: &[f64]) -> Result<f64, EvalError> {
        if args.len() != self.arity {
            return Err(EvalError::ArgumentCount {
                name: self.name,
                expected: self.arity,
                actual: args.len(),
            });
        }
        (self.apply)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

pub struct Constant {
    pub name: &'static str,
    pub value: f64,
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Golden ratio, `(1 + sqrt(5)) / 2`.
const PHI: f64 = 1.618_033_988_749_895;

pub static CONSTANTS: [Constant; 3] = [
    Constant {
        name: "pi",
        value: PI,
    },
    Constant {
        name: "e",
        value: E,
    },
    Constant {
        name: "phi",
        value: PHI,
    },
];

pub static FUNCTIONS: [Function; 13] = [
    Function {
        name: "sin",
        arity: 1,
        apply: |a| Ok(a[0].sin()),
    },
    Function {
        name: "cos",
        arity: 1,
        apply: |a| Ok(a[0].cos()),
    },
    Function {
        name: "tan",
        arity: 1,
        apply: tan,
    },
    Function {
        name: "asin",
        arity: 1,
        apply: asin,
    },
    Function {
        name: "acos",
        arity: 1,
        apply: acos,
    },
    Function {
        name: "atan",
        arity: 1,
        apply: |a| Ok(a[0].atan()),
    },
    Function {
        name: "sqrt",
        arity: 1,
        apply: sqrt,
    },
    Function {
        name: "ln",
        arity: 1,
        apply: ln,
    },
    Function {
        name: "lg",
        arity: 1,
        apply: lg,
    },
    Function {
        name: "abs",
        arity: 1,
        apply: |a| Ok(a[0].abs()),
    },
    Function {
        name: "pow",
        arity: 2,
        apply: |a| Ok(a[0].powf(a[1])),
    },
    Function {
        name: "root",
        arity: 2,
        apply: root,
    },
    Function {
        name: "log",
        arity: 2,
        apply: log,
    },
];

pub fn lookup_function(name: &str) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

pub fn lookup_constant(name: &str) -> Option<&'static Constant> {
    CONSTANTS.iter().find(|c| c.name == name)
}

/// Any name the parser accepts, used by the shells for highlighting.
pub fn is_known_name(name: &str) -> bool {
    lookup_function(name).is_some() || lookup_constant(name).is_some()
}

fn tan(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if x.cos().abs() < 1e-16 {
        return Err(EvalError::TangentPole(x));
    }
    Ok(x.tan())
}

fn asin(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if !(-1.0..=1.0).contains(&x) {
        return Err(EvalError::DomainError {
            function: "asin",
            value: x,
        });
    }
    Ok(x.asin())
}

fn acos(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if !(-1.0..=1.0).contains(&x) {
        return Err(EvalError::DomainError {
            function: "acos",
            value: x,
        });
    }
    Ok(x.acos())
}

fn sqrt(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if x < 0.0 {
        return Err(EvalError::NegativeSqrt(x));
    }
    Ok(x.sqrt())
}

fn ln(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if x <= 0.0 {
        return Err(EvalError::NonPositiveLog(x));
    }
    Ok(x.ln())
}

fn lg(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    if x <= 0.0 {
        return Err(EvalError::NonPositiveLog(x));
    }
    Ok(x.log10())
}

fn root(a: &[f64]) -> Result<f64, EvalError> {
    let (x, n) = (a[0], a[1]);
    if n == 0.0 {
        return Err(EvalError::ZeroRoot);
    }
    if x < 0.0 && n % 2.0 == 0.0 {
        return Err(EvalError::EvenRootOfNegative(x));
    }
    Ok(x.powf(1.0 / n))
}

fn log(a: &[f64]) -> Result<f64, EvalError> {
    let (x, base) = (a[0], a[1]);
    if x <= 0.0 {
        return Err(EvalError::NonPositiveLog(x));
    }
    if base <= 0.0 || base == 1.0 {
        return Err(EvalError::InvalidLogBase(base));
    }
    Ok(x.ln() / base.ln())
}
