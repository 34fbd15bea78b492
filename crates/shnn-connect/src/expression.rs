//! Distance expressions
//!
//! Connection probability, weight and delay kernels are written as small
//! formulas in the distance `d`, for example `exp(-d/2)` or
//! `(d < 3) * 0.5`. An expression is parsed once and then evaluated for every
//! distance.
//!
//! ## Grammar
//!
//! ```text
//! expr       := or
//! or         := and (("|" | "or") and)*
//! and        := not (("&" | "and") not)*
//! not        := "not" not | comparison
//! comparison := additive (("<" | "<=" | ">" | ">=" | "==" | "!=") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("-" | "+") unary | power
//! power      := atom ("**" unary)?
//! atom       := number | "d" | "pi" | "e" | call | "(" expr ")"
//! call       := name "(" expr ("," expr)* ")"
//! ```
//!
//! Comparisons and logical operators yield `1.0` or `0.0`. Unlike numpy,
//! `&` and `|` bind looser than comparisons, so `d > 1 & d < 3` needs no
//! parentheses.

use core::fmt;
use core::str::FromStr;

use crate::error::{ConnectError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Ident(usize, usize),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    Amp,
    Pipe,
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func1 {
    Exp,
    Log,
    Log10,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Abs,
    Floor,
    Ceil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func2 {
    Atan2,
    Hypot,
    Pow,
    Fmod,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    Distance,
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call1(Func1, Box<Node>),
    Call2(Func2, Box<Node>, Box<Node>),
    Where(Box<Node>, Box<Node>, Box<Node>),
}

fn truth(x: f64) -> f64 {
    if x != 0.0 {
        1.0
    } else {
        0.0
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl Node {
    fn eval(&self, d: f64) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::Distance => d,
            Node::Unary(UnaryOp::Neg, x) => -x.eval(d),
            Node::Unary(UnaryOp::Not, x) => 1.0 - truth(x.eval(d)),
            Node::Binary(op, a, b) => {
                let (a, b) = (a.eval(d), b.eval(d));
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    // floored modulo, sign follows the divisor
                    BinaryOp::Mod => a - b * (a / b).floor(),
                    BinaryOp::Pow => a.powf(b),
                    BinaryOp::Lt => flag(a < b),
                    BinaryOp::Le => flag(a <= b),
                    BinaryOp::Gt => flag(a > b),
                    BinaryOp::Ge => flag(a >= b),
                    BinaryOp::Eq => flag(a == b),
                    BinaryOp::Ne => flag(a != b),
                    BinaryOp::And => truth(a) * truth(b),
                    BinaryOp::Or => truth(truth(a) + truth(b)),
                }
            }
            Node::Call1(f, x) => {
                let x = x.eval(d);
                match f {
                    Func1::Exp => x.exp(),
                    Func1::Log => x.ln(),
                    Func1::Log10 => x.log10(),
                    Func1::Sqrt => x.sqrt(),
                    Func1::Sin => x.sin(),
                    Func1::Cos => x.cos(),
                    Func1::Tan => x.tan(),
                    Func1::Asin => x.asin(),
                    Func1::Acos => x.acos(),
                    Func1::Atan => x.atan(),
                    Func1::Sinh => x.sinh(),
                    Func1::Cosh => x.cosh(),
                    Func1::Tanh => x.tanh(),
                    Func1::Abs => x.abs(),
                    Func1::Floor => x.floor(),
                    Func1::Ceil => x.ceil(),
                }
            }
            Node::Call2(f, a, b) => {
                let (a, b) = (a.eval(d), b.eval(d));
                match f {
                    Func2::Atan2 => a.atan2(b),
                    Func2::Hypot => a.hypot(b),
                    Func2::Pow => a.powf(b),
                    Func2::Fmod => a % b,
                    Func2::Min => a.min(b),
                    Func2::Max => a.max(b),
                }
            }
            Node::Where(c, a, b) => {
                if c.eval(d) != 0.0 {
                    a.eval(d)
                } else {
                    b.eval(d)
                }
            }
        }
    }
}

/// A parsed formula in the distance `d`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    /// Parse `source`
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            source,
            tokens,
            pos: 0,
        };
        let root = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected trailing {:?}", token)));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Source text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Evaluate at distance `d`
    pub fn eval(&self, d: f64) -> f64 {
        self.root.eval(d)
    }

    /// Evaluate at every distance of `distances`
    pub fn eval_all(&self, distances: &[f64]) -> Vec<f64> {
        #[cfg(feature = "parallel")]
        let values: Vec<f64> = {
            use rayon::prelude::*;
            distances.par_iter().map(|&d| self.eval(d)).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let values: Vec<f64> = distances.iter().map(|&d| self.eval(d)).collect();

        values
    }
}

impl FromStr for Expression {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let two = bytes.get(i + 1).copied();
        let (token, width) = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                let mut end = i;
                while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
                    end += 1;
                }
                if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
                    let mut exp = end + 1;
                    if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
                        exp += 1;
                    }
                    if exp < bytes.len() && bytes[exp].is_ascii_digit() {
                        end = exp;
                        while end < bytes.len() && bytes[end].is_ascii_digit() {
                            end += 1;
                        }
                    }
                }
                let text = &source[start..end];
                let value: f64 = text.parse().map_err(|_| {
                    ConnectError::expression(source, format!("bad number '{}'", text))
                })?;
                (Token::Number(value), end - start)
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = i;
                let mut end = i;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                (Token::Ident(start, end), end - start)
            }
            b'*' if two == Some(b'*') => (Token::Pow, 2),
            b'<' if two == Some(b'=') => (Token::Le, 2),
            b'>' if two == Some(b'=') => (Token::Ge, 2),
            b'=' if two == Some(b'=') => (Token::EqEq, 2),
            b'!' if two == Some(b'=') => (Token::Ne, 2),
            b'+' => (Token::Plus, 1),
            b'-' => (Token::Minus, 1),
            b'*' => (Token::Star, 1),
            b'/' => (Token::Slash, 1),
            b'%' => (Token::Percent, 1),
            b'<' => (Token::Lt, 1),
            b'>' => (Token::Gt, 1),
            b'&' => (Token::Amp, 1),
            b'|' => (Token::Pipe, 1),
            b'(' => (Token::LParen, 1),
            b')' => (Token::RParen, 1),
            b',' => (Token::Comma, 1),
            _ => {
                let ch = source[i..].chars().next().unwrap_or('?');
                return Err(ConnectError::expression(
                    source,
                    format!("unexpected character '{}' at {}", ch, i),
                ));
            }
        };
        tokens.push(token);
        i += width;
    }

    if tokens.is_empty() {
        return Err(ConnectError::expression(source, "empty expression"));
    }
    Ok(tokens)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn error(&self, reason: impl Into<String>) -> ConnectError {
        ConnectError::expression(self.source, reason)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn ident(&self, token: Token) -> Option<&'s str> {
        match token {
            Token::Ident(start, end) => Some(&self.source[start..end]),
            _ => None,
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().and_then(|t| self.ident(t)) == Some(keyword)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {:?}, found {:?}", expected, token))),
            None => Err(self.error(format!("expected {:?}, found end of input", expected))),
        }
    }

    fn parse_or(&mut self) -> Result<Node> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(Token::Pipe) || self.peek_keyword("or") {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Node::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some(Token::Amp) || self.peek_keyword("and") {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Node::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Node> {
        if self.peek_keyword("not") {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Node::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_additive(&mut self) -> Result<Node> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_term(&mut self) -> Result<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Node> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Node::Unary(UnaryOp::Neg, Box::new(operand)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Node> {
        let base = self.parse_atom()?;
        if self.peek() == Some(Token::Pow) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Node::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Node> {
        let token = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of input"))?;

        match token {
            Token::Number(v) => Ok(Node::Const(v)),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(..) => {
                let name = self.ident(token).unwrap_or_default();
                if self.peek() == Some(Token::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    return self.call(name, args);
                }
                match name {
                    "d" => Ok(Node::Distance),
                    "pi" => Ok(Node::Const(core::f64::consts::PI)),
                    "e" => Ok(Node::Const(core::f64::consts::E)),
                    other => Err(self.error(format!("unknown name '{}'", other))),
                }
            }
            other => Err(self.error(format!("unexpected {:?}", other))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Node>> {
        let mut args = vec![self.parse_or()?];
        while self.peek() == Some(Token::Comma) {
            self.advance();
            args.push(self.parse_or()?);
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn call(&self, name: &str, mut args: Vec<Node>) -> Result<Node> {
        let unary = match name {
            "exp" => Some(Func1::Exp),
            "log" => Some(Func1::Log),
            "log10" => Some(Func1::Log10),
            "sqrt" => Some(Func1::Sqrt),
            "sin" => Some(Func1::Sin),
            "cos" => Some(Func1::Cos),
            "tan" => Some(Func1::Tan),
            "arcsin" | "asin" => Some(Func1::Asin),
            "arccos" | "acos" => Some(Func1::Acos),
            "arctan" | "atan" => Some(Func1::Atan),
            "sinh" => Some(Func1::Sinh),
            "cosh" => Some(Func1::Cosh),
            "tanh" => Some(Func1::Tanh),
            "fabs" | "abs" => Some(Func1::Abs),
            "floor" => Some(Func1::Floor),
            "ceil" => Some(Func1::Ceil),
            _ => None,
        };
        let binary = match name {
            "arctan2" | "atan2" => Some(Func2::Atan2),
            "hypot" => Some(Func2::Hypot),
            "power" | "pow" => Some(Func2::Pow),
            "fmod" => Some(Func2::Fmod),
            "minimum" | "min" => Some(Func2::Min),
            "maximum" | "max" => Some(Func2::Max),
            _ => None,
        };

        let arity = match (unary, binary, name) {
            (Some(_), _, _) => 1,
            (_, Some(_), _) => 2,
            (_, _, "where") => 3,
            _ => return Err(self.error(format!("unknown function '{}'", name))),
        };
        if args.len() != arity {
            return Err(self.error(format!(
                "{}() takes {} argument(s), got {}",
                name,
                arity,
                args.len()
            )));
        }

        let node = match (unary, binary) {
            (Some(f), _) => Node::Call1(f, Box::new(args.remove(0))),
            (_, Some(f)) => {
                let b = args.remove(1);
                let a = args.remove(0);
                Node::Call2(f, Box::new(a), Box::new(b))
            }
            _ => {
                let b = args.remove(2);
                let a = args.remove(1);
                let c = args.remove(0);
                Node::Where(Box::new(c), Box::new(a), Box::new(b))
            }
        };
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, d: f64) -> f64 {
        Expression::parse(src).unwrap().eval(d)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("-d**2", 3.0), -9.0);
        assert_eq!(eval("2**3**2", 0.0), 512.0);
        assert_eq!(eval("2**-1", 0.0), 0.5);
        assert_eq!(eval("-7 % 3", 0.0), 2.0);
        assert!((eval("1e-3 * 2E2", 0.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_comparisons_yield_flags() {
        let near = Expression::parse("d<1").unwrap();
        assert_eq!(near.eval_all(&[0.0, 0.5, 1.0, 2.0]), vec![1.0, 1.0, 0.0, 0.0]);

        assert_eq!(eval("d > 1 & d < 3", 2.0), 1.0);
        assert_eq!(eval("d > 1 and d < 3", 4.0), 0.0);
        assert_eq!(eval("d < 1 | d > 3", 4.0), 1.0);
        assert_eq!(eval("not d < 1", 0.5), 0.0);
        assert_eq!(eval("(d <= 2) * 0.5", 2.0), 0.5);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("exp(-d/2)", 2.0) - (-1.0f64).exp()).abs() < 1e-12);
        assert!((eval("cos(pi)", 0.0) + 1.0).abs() < 1e-12);
        assert!((eval("log(e)", 0.0) - 1.0).abs() < 1e-12);
        assert_eq!(eval("hypot(3, 4)", 0.0), 5.0);
        assert_eq!(eval("minimum(d, 2)", 5.0), 2.0);
        assert_eq!(eval("where(d < 1, 10, 20)", 3.0), 20.0);
        assert_eq!(eval("fabs(-d)", 1.5), 1.5);
    }

    #[test]
    fn test_rejects_unknown_names() {
        for src in ["x + 1", "__import__(d)", "foo(d)", "d ^ 2", ""] {
            let err = Expression::parse(src).unwrap_err();
            assert!(matches!(err, ConnectError::Expression { .. }), "{}: {}", src, err);
        }
    }

    #[test]
    fn test_rejects_bad_arity_and_syntax() {
        assert!(Expression::parse("exp(d, 2)").is_err());
        assert!(Expression::parse("hypot(d)").is_err());
        assert!(Expression::parse("(d + 1").is_err());
        assert!(Expression::parse("d 1").is_err());
    }

    #[test]
    fn test_display_roundtrips_source() {
        let expr: Expression = "0.1*exp(-d)".parse().unwrap();
        assert_eq!(expr.to_string(), "0.1*exp(-d)");
    }
}
