//! Numeric text entry: tokenizer, evaluator and value formatting.
//!
//! Typing into a number field accepts small arithmetic expressions with
//! optional unit suffixes: `2*(3+1)`, `1m 20cm`, `90deg`, `pi/2 rad`.
//! Adjacent unit terms are summed, so `1m 20cm` is `1.2` in metres.
//!
//! Token priority follows logos rules: longest match wins, so `**` is a
//! single [`Token::Caret`] and `1.5e3` is one [`Token::Number`].

use logos::Logos;

use crate::property::UnitType;

/// Errors from evaluating numeric text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected `{0}`")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
}

/// Expression token.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    /// Decimal literal with optional fraction and exponent.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][-+]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][-+]?[0-9]+)?")]
    Number,

    /// Unit suffix, constant or function name.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("^")]
    #[token("**")]
    Caret,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,
}

/// Tokenize `input` into `(token, text)` pairs.
///
/// Unrecognized characters are reported as [`ExprError::UnexpectedToken`].
pub fn tokenize(input: &str) -> Result<Vec<(Token, &str)>, ExprError> {
    let mut out = Vec::new();
    let mut lexer = Token::lexer(input);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => out.push((token, lexer.slice())),
            Err(()) => return Err(ExprError::UnexpectedToken(lexer.slice().to_owned())),
        }
    }
    Ok(out)
}

/// Scale of `unit` relative to the base unit of `category`.
fn unit_scale(category: UnitType, name: &str) -> Option<f64> {
    match category {
        UnitType::Length => Some(match name {
            "m" => 1.0,
            "cm" => 0.01,
            "mm" => 0.001,
            "um" => 1e-6,
            "km" => 1000.0,
            "ft" => 0.3048,
            "in" => 0.0254,
            _ => return None,
        }),
        UnitType::Rotation => Some(match name {
            "deg" | "d" => 1.0,
            "rad" | "r" => 180.0 / std::f64::consts::PI,
            _ => return None,
        }),
        UnitType::Time => Some(match name {
            "s" | "sec" => 1.0,
            "ms" => 0.001,
            "min" => 60.0,
            _ => return None,
        }),
        UnitType::None | UnitType::Percentage => None,
    }
}

/// Evaluate `input` in the context of `unit`.
///
/// The result is expressed in the base unit of the category (metres,
/// degrees, seconds). Plain numbers are already in the base unit.
pub fn evaluate(input: &str, unit: UnitType) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0, unit };
    let mut value = parser.expr()?;
    // Implicit sum of adjacent terms: `1m 20cm`.
    while parser.pos < parser.tokens.len() {
        match parser.peek() {
            Some(Token::Number) | Some(Token::ParenOpen) => value += parser.expr()?,
            _ => {
                let (_, text) = parser.tokens[parser.pos];
                return Err(ExprError::UnexpectedToken(text.to_owned()));
            }
        }
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NotFinite)
    }
}

struct Parser<'a> {
    tokens: Vec<(Token, &'a str)>,
    pos: usize,
    unit: UnitType,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Result<(Token, &'a str), ExprError> {
        let tok = self.tokens.get(self.pos).copied().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, want: Token) -> Result<(), ExprError> {
        let (tok, text) = self.next()?;
        if tok == want {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken(text.to_owned()))
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    value /= rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<f64, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := atom ('^' unary)?
    fn power(&mut self) -> Result<f64, ExprError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    // atom := Number Ident? | Ident | Ident '(' expr ')' | '(' expr ')' Ident?
    fn atom(&mut self) -> Result<f64, ExprError> {
        let (tok, text) = self.next()?;
        match tok {
            Token::Number => {
                let value: f64 =
                    text.parse().map_err(|_| ExprError::UnexpectedToken(text.to_owned()))?;
                self.unit_suffix(value)
            }
            Token::ParenOpen => {
                let value = self.expr()?;
                self.expect(Token::ParenClose)?;
                self.unit_suffix(value)
            }
            Token::Ident => self.ident(text),
            _ => Err(ExprError::UnexpectedToken(text.to_owned())),
        }
    }

    fn unit_suffix(&mut self, value: f64) -> Result<f64, ExprError> {
        if self.peek() != Some(Token::Ident) {
            return Ok(value);
        }
        let (_, name) = self.tokens[self.pos];
        // Constants may follow a number as an implicit product: `2pi`.
        if name == "pi" {
            self.pos += 1;
            return Ok(value * std::f64::consts::PI);
        }
        let scale = unit_scale(self.unit, name).ok_or_else(|| ExprError::UnknownUnit(name.to_owned()))?;
        self.pos += 1;
        Ok(value * scale)
    }

    fn ident(&mut self, name: &str) -> Result<f64, ExprError> {
        match name {
            "pi" => return self.unit_suffix(std::f64::consts::PI),
            "e" => return self.unit_suffix(std::f64::consts::E),
            _ => {}
        }
        if self.peek() != Some(Token::ParenOpen) {
            return Err(ExprError::UnexpectedToken(name.to_owned()));
        }
        let func: fn(f64) -> f64 = match name {
            "sqrt" => f64::sqrt,
            "abs" => f64::abs,
            "sin" => f64::sin,
            "cos" => f64::cos,
            "tan" => f64::tan,
            "floor" => f64::floor,
            "ceil" => f64::ceil,
            "round" => f64::round,
            _ => return Err(ExprError::UnknownFunction(name.to_owned())),
        };
        self.pos += 1;
        let arg = self.expr()?;
        self.expect(Token::ParenClose)?;
        Ok(func(arg))
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Suffix shown after a value of the given unit category.
fn unit_suffix_display(unit: UnitType) -> &'static str {
    match unit {
        UnitType::Length => " m",
        UnitType::Rotation => "°",
        UnitType::Time => " s",
        UnitType::Percentage => "%",
        UnitType::None => "",
    }
}

/// Format a value for display with a fixed number of decimals.
pub fn format_value(value: f64, precision: usize, unit: UnitType) -> String {
    format!("{value:.precision$}{}", unit_suffix_display(unit))
}

/// Format a value for text editing: full precision, no trailing zeros,
/// no unit suffix.
pub fn format_for_edit(value: f64, is_int: bool) -> String {
    if is_int {
        return format!("{}", value.round() as i64);
    }
    let mut s = format!("{value:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".to_owned();
    }
    s
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        evaluate(s, UnitType::None).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── Tokenizer ────────────────────────────────────────────────────

    #[test]
    fn tokenize_simple() {
        let toks: Vec<Token> = tokenize("1.5*(2+x)").unwrap().into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            toks,
            vec![
                Token::Number,
                Token::Star,
                Token::ParenOpen,
                Token::Number,
                Token::Plus,
                Token::Ident,
                Token::ParenClose
            ]
        );
    }

    #[test]
    fn tokenize_double_star_is_caret() {
        let toks = tokenize("2**3").unwrap();
        assert_eq!(toks[1], (Token::Caret, "**"));
    }

    #[test]
    fn tokenize_number_then_unit() {
        let toks = tokenize("20cm").unwrap();
        assert_eq!(toks, vec![(Token::Number, "20"), (Token::Ident, "cm")]);
    }

    #[test]
    fn tokenize_rejects_garbage() {
        assert_eq!(tokenize("1 # 2"), Err(ExprError::UnexpectedToken("#".into())));
    }

    // ── Arithmetic ───────────────────────────────────────────────────

    #[test]
    fn precedence() {
        assert_eq!(eval("1+2*3"), 7.0);
        assert_eq!(eval("(1+2)*3"), 9.0);
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("-2^2"), -4.0);
        assert_eq!(eval("10/4"), 2.5);
    }

    #[test]
    fn constants_and_functions() {
        assert!(approx(eval("pi"), std::f64::consts::PI));
        assert!(approx(eval("2pi"), 2.0 * std::f64::consts::PI));
        assert_eq!(eval("sqrt(16)"), 4.0);
        assert_eq!(eval("abs(-3)+floor(1.7)"), 4.0);
    }

    #[test]
    fn leading_dot_and_exponent() {
        assert_eq!(eval(".5"), 0.5);
        assert_eq!(eval("1.5e3"), 1500.0);
    }

    #[test]
    fn errors() {
        assert_eq!(evaluate("", UnitType::None), Err(ExprError::Empty));
        assert_eq!(evaluate("1+", UnitType::None), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1/0", UnitType::None), Err(ExprError::DivisionByZero));
        assert_eq!(evaluate("foo(2)", UnitType::None), Err(ExprError::UnknownFunction("foo".into())));
        assert_eq!(evaluate("(1", UnitType::None), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1 )", UnitType::None), Err(ExprError::UnexpectedToken(")".into())));
    }

    // ── Units ────────────────────────────────────────────────────────

    #[test]
    fn length_units() {
        assert!(approx(evaluate("1m 20cm", UnitType::Length).unwrap(), 1.2));
        assert!(approx(evaluate("5mm*2", UnitType::Length).unwrap(), 0.01));
        assert!(approx(evaluate("3", UnitType::Length).unwrap(), 3.0));
    }

    #[test]
    fn rotation_units() {
        assert!(approx(evaluate("90deg", UnitType::Rotation).unwrap(), 90.0));
        assert!(approx(evaluate("pi rad", UnitType::Rotation).unwrap(), 180.0));
    }

    #[test]
    fn unit_outside_category_rejected() {
        assert_eq!(evaluate("2cm", UnitType::None), Err(ExprError::UnknownUnit("cm".into())));
        assert_eq!(evaluate("2deg", UnitType::Length), Err(ExprError::UnknownUnit("deg".into())));
    }

    // ── Formatting ───────────────────────────────────────────────────

    #[test]
    fn format_display() {
        assert_eq!(format_value(0.5, 3, UnitType::None), "0.500");
        assert_eq!(format_value(1.25, 2, UnitType::Length), "1.25 m");
        assert_eq!(format_value(45.0, 0, UnitType::Rotation), "45°");
    }

    #[test]
    fn format_edit_strips_zeros() {
        assert_eq!(format_for_edit(0.5, false), "0.5");
        assert_eq!(format_for_edit(2.0, false), "2");
        assert_eq!(format_for_edit(3.6, true), "4");
        assert_eq!(format_for_edit(-0.0000001, false), "0");
    }
}
