use super::ast::{BinaryOp, Node, UnaryOp};
use super::error::ParseError;
use super::functions::{lookup_constant, lookup_function};
use super::lexer::Token;

/// Recursive-descent parser over a token vector.
///
/// ```text
/// expr    := add
/// add     := mul (('+' | '-') mul)*
/// mul     := pow (('*' | '/') pow)*
/// pow     := unary ('^' pow)?
/// unary   := ('+' | '-') unary | postfix
/// postfix := primary '!'*
/// primary := NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')' | '|' expr '|'
/// ```
///
/// Prefix signs are consumed before `pow` sees `^`, so `-2^2` is `(-2)^2`.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseError> {
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let node = self.expr()?;
        if let Some(token) = self.peek() {
            return Err(ParseError::TrailingTokens(token.to_string()));
        }
        Ok(node)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next token if it is one of `ops`, returning the operator.
    fn eat_op(&mut self, ops: &[char]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => {
                let op = BinaryOp::from_symbol(*c);
                self.current += 1;
                op
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        self.add()
    }

    fn add(&mut self) -> Result<Node, ParseError> {
        let mut left = self.mul()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let right = self.mul()?;
            left = Node::binary(op, left, right);
        }
        Ok(left)
    }

    fn mul(&mut self) -> Result<Node, ParseError> {
        let mut left = self.pow()?;
        while let Some(op) = self.eat_op(&['*', '/']) {
            let right = self.pow()?;
            left = Node::binary(op, left, right);
        }
        Ok(left)
    }

    // right-associative: 2^3^2 == 2^(3^2)
    fn pow(&mut self) -> Result<Node, ParseError> {
        let base = self.unary()?;
        if let Some(op) = self.eat_op(&['^']) {
            let exponent = self.pow()?;
            return Ok(Node::binary(op, base, exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        if self.eat(&Token::Op('+')) {
            return Ok(Node::unary(UnaryOp::Identity, self.unary()?));
        }
        if self.eat(&Token::Op('-')) {
            return Ok(Node::unary(UnaryOp::Negate, self.unary()?));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Node, ParseError> {
        let mut node = self.primary()?;
        while self.eat(&Token::Factorial) {
            node = Node::unary(UnaryOp::Factorial, node);
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(ParseError::ExpectedExpression);
        };

        match token {
            Token::Number(n) => {
                self.current += 1;
                Ok(Node::Number(n))
            }
            Token::Ident(name) => {
                self.current += 1;
                self.identifier(name)
            }
            Token::LParen => {
                self.current += 1;
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(ParseError::UnbalancedParens);
                }
                Ok(inner)
            }
            Token::Bar => {
                self.current += 1;
                let inner = self.expr()?;
                if !self.eat(&Token::Bar) {
                    return Err(ParseError::UnbalancedBar);
                }
                // |x| is sugar for abs(x)
                match lookup_function("abs") {
                    Some(function) => Ok(Node::Call {
                        function,
                        args: vec![inner],
                    }),
                    None => Err(ParseError::UnknownIdentifier("abs".to_string())),
                }
            }
            _ => Err(ParseError::ExpectedExpression),
        }
    }

    fn identifier(&mut self, name: String) -> Result<Node, ParseError> {
        if let Some(constant) = lookup_constant(&name) {
            return Ok(Node::Constant(constant));
        }

        let Some(function) = lookup_function(&name) else {
            return Err(ParseError::UnknownIdentifier(name));
        };

        if self.peek().is_none() {
            return Err(ParseError::UnexpectedEndOfInput(name));
        }
        if !self.eat(&Token::LParen) {
            return Err(ParseError::ExpectedCallParen(name));
        }

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.expr()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                if self.eat(&Token::Comma) {
                    continue;
                }
                return Err(match self.peek() {
                    None => ParseError::UnbalancedParens,
                    Some(_) => ParseError::ExpectedCommaOrParen(name),
                });
            }
        }

        if args.len() != function.arity {
            return Err(ParseError::ArityMismatch {
                name,
                expected: function.arity,
                actual: args.len(),
            });
        }

        Ok(Node::Call { function, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::lexer::tokenize;

    fn parse_str(input: &str) -> Result<Node, ParseError> {
        parse(tokenize(input).unwrap())
    }

    fn shape(input: &str) -> String {
        parse_str(input).unwrap().to_string()
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(shape("2+3*4"), "(2 + (3 * 4))");
        assert_eq!(shape("2*3+4"), "((2 * 3) + 4)");
        assert_eq!(shape("8-3-2"), "((8 - 3) - 2)");
        assert_eq!(shape("8/4/2"), "((8 / 4) / 2)");
        assert_eq!(shape("2^3^2"), "(2 ^ (3 ^ 2))");
        assert_eq!(shape("2*3^2"), "(2 * (3 ^ 2))");
    }

    #[test]
    fn unary_minus_binds_before_power() {
        assert_eq!(shape("-2^2"), "((-2) ^ 2)");
        assert_eq!(shape("2^-2"), "(2 ^ (-2))");
        assert_eq!(shape("--3"), "(-(-3))");
        assert_eq!(shape("+-3"), "(+(-3))");
        assert_eq!(shape("1-+2"), "(1 - (+2))");
    }

    #[test]
    fn postfix_factorial() {
        assert_eq!(shape("3!"), "3!");
        assert_eq!(shape("3!!"), "3!!");
        assert_eq!(shape("-3!"), "(-3!)");
        assert_eq!(shape("(1+2)!^2"), "((1 + 2)! ^ 2)");
    }

    #[test]
    fn bars_become_abs() {
        assert_eq!(shape("|-5|"), "abs((-5))");
        assert_eq!(shape("|1|+|2|"), "(abs(1) + abs(2))");
        assert_eq!(shape("||-1||"), "abs(abs((-1)))");
        assert_eq!(parse_str("|1+2"), Err(ParseError::UnbalancedBar));
    }

    #[test]
    fn constants_and_calls() {
        assert_eq!(shape("pi*e+phi"), "((pi * e) + phi)");
        assert_eq!(shape("log(100,10)"), "log(100, 10)");
        assert_eq!(shape("sin(cos(0))"), "sin(cos(0))");
        assert_eq!(shape("root(2+6,1+2)"), "root((2 + 6), (1 + 2))");
    }

    #[test]
    fn arity_is_checked_while_parsing() {
        assert_eq!(
            parse_str("sin(1,2)"),
            Err(ParseError::ArityMismatch {
                name: "sin".to_string(),
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(
            parse_str("log(8)"),
            Err(ParseError::ArityMismatch {
                name: "log".to_string(),
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            parse_str("abs()"),
            Err(ParseError::ArityMismatch {
                name: "abs".to_string(),
                expected: 1,
                actual: 0
            })
        );
        // arity is checked even when evaluating would fail
        assert!(matches!(
            parse_str("sqrt(-1,1/0)"),
            Err(ParseError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn unknown_identifiers() {
        assert_eq!(
            parse_str("foo(1)"),
            Err(ParseError::UnknownIdentifier("foo".to_string()))
        );
        assert_eq!(
            parse_str("x"),
            Err(ParseError::UnknownIdentifier("x".to_string()))
        );
        assert_eq!(
            parse_str("pi2"),
            Err(ParseError::UnknownIdentifier("pi2".to_string()))
        );
    }

    #[test]
    fn function_name_needs_parenthesis() {
        assert_eq!(
            parse_str("sin"),
            Err(ParseError::UnexpectedEndOfInput("sin".to_string()))
        );
        assert_eq!(
            parse_str("sin1"),
            Err(ParseError::UnknownIdentifier("sin1".to_string()))
        );
        assert_eq!(
            parse_str("sin 1"),
            Err(ParseError::UnknownIdentifier("sin1".to_string()))
        );
        assert_eq!(
            parse_str("sin|1|"),
            Err(ParseError::ExpectedCallParen("sin".to_string()))
        );
    }

    #[test]
    fn argument_list_errors() {
        assert_eq!(parse_str("pow(2,3"), Err(ParseError::UnbalancedParens));
        assert_eq!(
            parse_str("pow(2(3))"),
            Err(ParseError::ExpectedCommaOrParen("pow".to_string()))
        );
        assert_eq!(parse_str("pow(2,)"), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str("pow(,2)"), Err(ParseError::ExpectedExpression));
    }

    #[test]
    fn grouping_errors() {
        assert_eq!(parse_str("(1+2"), Err(ParseError::UnbalancedParens));
        assert_eq!(
            parse_str("(1+2))"),
            Err(ParseError::TrailingTokens(")".to_string()))
        );
        assert_eq!(
            parse_str("2pi"),
            Err(ParseError::TrailingTokens("pi".to_string()))
        );
        assert_eq!(
            parse_str("2(3)"),
            Err(ParseError::TrailingTokens("(".to_string()))
        );
    }

    #[test]
    fn missing_operands() {
        assert_eq!(parse_str(""), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str("1+"), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str("*2"), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str("()"), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str("!"), Err(ParseError::ExpectedExpression));
        assert_eq!(parse_str(","), Err(ParseError::ExpectedExpression));
    }
}
