use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::error::LexError;

/// Longest accepted expression, counted after whitespace is removed.
pub const MAX_INPUT_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    /// One of `+ - * / ^`.
    Op(char),
    Factorial,
    LParen,
    RParen,
    Comma,
    Bar,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => f.write_str(name),
            Token::Op(c) => write!(f, "{}", c),
            Token::Factorial => f.write_str("!"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Bar => f.write_str("|"),
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let len = stripped.chars().count();
    if len > MAX_INPUT_LEN {
        return Err(LexError::InputTooLong {
            len,
            max: MAX_INPUT_LEN,
        });
    }

    let mut tokens = Vec::with_capacity(len);
    let mut chars = stripped.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' | '.' => {
                tokens.push(lex_number(&mut chars)?);
            }
            'a'..='z' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '!' => {
                tokens.push(Token::Factorial);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '|' => {
                tokens.push(Token::Bar);
                chars.next();
            }
            // uppercase letters land here too: names are strictly lowercase
            _ => return Err(LexError::InvalidCharacter(c)),
        }
    }
    Ok(tokens)
}

/// Reads `digits [. digits]` or `. digits`, then an optional degree marker.
fn lex_number(chars: &mut Peekable<Chars<'_>>) -> Result<Token, LexError> {
    let mut literal = String::new();
    let mut has_dot = false;

    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' => {
                literal.push(ch);
                chars.next();
            }
            '.' if has_dot => {
                literal.push(ch);
                return Err(LexError::MalformedNumber(literal));
            }
            '.' => {
                has_dot = true;
                literal.push(ch);
                chars.next();
                if !chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                    return Err(LexError::MalformedNumber(literal));
                }
            }
            _ => break,
        }
    }

    let mut value = literal
        .parse::<f64>()
        .map_err(|_| LexError::MalformedNumber(literal.clone()))?;

    if chars.peek() == Some(&'\'') {
        chars.next();
        value = value.to_radians();
    }

    Ok(Token::Number(value))
}
