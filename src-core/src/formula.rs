//! Spreadsheet-style cell formulas.
//!
//! A formula is a string starting with `=` followed by an arithmetic expression over
//! decimal numbers, `+ - * /`, parentheses and whitespace. Expressions are tokenized
//! against that whitelist and evaluated by a small recursive-descent parser:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula must start with '='")]
    MissingPrefix,
    #[error("formula is empty")]
    Empty,
    #[error("character '{0}' is not allowed in a formula")]
    InvalidCharacter(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected token at position {0}")]
    UnexpectedToken(usize),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("division by zero")]
    DivisionByZero,
    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest run of parentheses and unary signs a formula may nest.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

pub fn is_formula(input: &str) -> bool {
    input.trim_start().starts_with('=')
}

/// Evaluates a `=`-prefixed formula.
pub fn evaluate(formula: &str) -> Result<f64, FormulaError> {
    let body = formula
        .trim_start()
        .strip_prefix('=')
        .ok_or(FormulaError::MissingPrefix)?;
    evaluate_expression(body)
}

/// Evaluates a formula, mapping any error to zero.
pub fn evaluate_or_zero(formula: &str) -> f64 {
    evaluate(formula).unwrap_or(0.0)
}

/// Evaluates a bare expression (no `=` prefix).
pub fn evaluate_expression(expression: &str) -> Result<f64, FormulaError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(FormulaError::UnexpectedToken(parser.pos));
    }
    if !value.is_finite() {
        return Err(FormulaError::DivisionByZero);
    }
    Ok(value)
}

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(number));
            }
            other => return Err(FormulaError::InvalidCharacter(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Token::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.factor()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(FormulaError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, FormulaError> {
        let position = self.pos;
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Minus) => self.nested(|p| p.factor().map(|v| -v)),
            Some(Token::Plus) => self.nested(Parser::factor),
            Some(Token::LParen) => self.nested(|p| {
                let value = p.expr()?;
                match p.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(_) => Err(FormulaError::UnexpectedToken(p.pos - 1)),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }),
            Some(_) => Err(FormulaError::UnexpectedToken(position)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    /// Runs `f` one nesting level deeper, failing past `MAX_DEPTH`.
    fn nested<F>(&mut self, f: F) -> Result<f64, FormulaError>
    where
        F: FnOnce(&mut Parser) -> Result<f64, FormulaError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }
}
