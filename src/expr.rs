//! User-defined patterns written as arithmetic expressions.
//!
//! Expressions are compiled once into a small postfix [`Program`] and then
//! evaluated per pixel without allocation. The language can only do
//! arithmetic on the pixel's inputs, so a user pattern can never touch memory,
//! I/O or other pixels.
//!
//! # Syntax
//!
//! - numbers: `1`, `0.25`, `.5`
//! - variables: `t`, `dt`, `x`, `y`; constants: `pi`, `tau`
//! - operators: `+ - * / % ^` and unary `-`, with the usual precedence
//!   (`^` binds tightest and is right-associative; `%` is floor modulo)
//! - functions: `sin cos abs floor ceil fract sqrt` (one argument), `min max`
//!   (two), `clamp(v, lo, hi)`, `wave_sine wave_cubic wave_triangle` (one),
//!   `wave_pulse(t, duty)`
//!
//! Trig functions take radians; the `wave_*` functions have a period of 1.0.
//!
//! A program that produces a non-finite number (division by zero, square
//! root of a negative) evaluates to 0.0.

use crate::colors::Palette;
use crate::primary::PrimaryPattern;
use crate::secondary::SecondaryPattern;
use crate::types::{Color, ColorSpace, Modulation, PatternError, PatternOutput, PatternState, Sample};
use crate::waves::{fract, wave_cubic, wave_pulse, wave_sine, wave_triangle};
use core::f32::consts::{PI, TAU};
use heapless::Vec;
use rand::RngCore;

/// Maximum number of operations in a compiled program.
pub const MAX_OPS: usize = 64;

/// Maximum evaluation stack depth a program may need.
pub const MAX_STACK: usize = 16;

const MAX_NESTING: usize = 32;

/// Expression compile errors. Positions are byte offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExprError {
    /// The source contains no expression.
    Empty,

    /// A character that is not part of the language.
    UnexpectedChar { position: usize },

    /// A malformed number literal.
    InvalidNumber { position: usize },

    /// A token that cannot appear here.
    UnexpectedToken { position: usize },

    /// A name that is not a variable, constant or function.
    UnknownIdentifier { position: usize },

    /// A function called with the wrong number of arguments.
    WrongArity {
        position: usize,
        expected: u8,
        found: u8,
    },

    /// A parenthesis without its partner.
    UnbalancedParens { position: usize },

    /// The program exceeds [`MAX_OPS`], [`MAX_STACK`] or the nesting limit.
    TooComplex,
}

impl core::fmt::Display for ExprError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExprError::Empty => write!(f, "expression is empty"),
            ExprError::UnexpectedChar { position } => {
                write!(f, "unexpected character at offset {}", position)
            }
            ExprError::InvalidNumber { position } => {
                write!(f, "invalid number at offset {}", position)
            }
            ExprError::UnexpectedToken { position } => {
                write!(f, "unexpected token at offset {}", position)
            }
            ExprError::UnknownIdentifier { position } => {
                write!(f, "unknown identifier at offset {}", position)
            }
            ExprError::WrongArity {
                position,
                expected,
                found,
            } => write!(
                f,
                "function at offset {} takes {} arguments, got {}",
                position, expected, found
            ),
            ExprError::UnbalancedParens { position } => {
                write!(f, "unbalanced parenthesis at offset {}", position)
            }
            ExprError::TooComplex => write!(f, "expression is too complex"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExprError {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Var {
    T,
    Dt,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sin,
    Cos,
    Abs,
    Floor,
    Ceil,
    Fract,
    Sqrt,
    Min,
    Max,
    Clamp,
    WaveSine,
    WaveCubic,
    WaveTriangle,
    WavePulse,
}

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "abs" => Func::Abs,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "fract" => Func::Fract,
            "sqrt" => Func::Sqrt,
            "min" => Func::Min,
            "max" => Func::Max,
            "clamp" => Func::Clamp,
            "wave_sine" => Func::WaveSine,
            "wave_cubic" => Func::WaveCubic,
            "wave_triangle" => Func::WaveTriangle,
            "wave_pulse" => Func::WavePulse,
            _ => return None,
        };
        Some(func)
    }

    fn arity(self) -> usize {
        match self {
            Func::Min | Func::Max | Func::WavePulse => 2,
            Func::Clamp => 3,
            _ => 1,
        }
    }

    fn apply(self, args: &[f32]) -> f32 {
        match self {
            Func::Sin => libm::sinf(args[0]),
            Func::Cos => libm::cosf(args[0]),
            Func::Abs => libm::fabsf(args[0]),
            Func::Floor => libm::floorf(args[0]),
            Func::Ceil => libm::ceilf(args[0]),
            Func::Fract => fract(args[0]),
            Func::Sqrt => libm::sqrtf(args[0]),
            Func::Min => args[0].min(args[1]),
            Func::Max => args[0].max(args[1]),
            // f32::clamp panics on lo > hi, which user input may well produce
            Func::Clamp => args[0].max(args[1]).min(args[2]),
            Func::WaveSine => wave_sine(args[0]),
            Func::WaveCubic => wave_cubic(args[0]),
            Func::WaveTriangle => wave_triangle(args[0]),
            Func::WavePulse => wave_pulse(args[0], args[1]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Const(f32),
    Var(Var),
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Call(Func),
}

impl Op {
    fn binary(self, a: f32, b: f32) -> f32 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => a / b,
            Op::Rem => a - b * libm::floorf(a / b),
            Op::Pow => libm::powf(a, b),
            _ => unreachable!("not a binary operator"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'s> {
    Number(f32),
    Ident(&'s str),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

struct Lexer<'s> {
    source: &'s str,
    position: usize,
    peeked: Option<(Token<'s>, usize)>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            position: 0,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<(Token<'s>, usize), ExprError> {
        if let Some(peeked) = self.peeked {
            return Ok(peeked);
        }
        let token = self.scan()?;
        self.peeked = Some(token);
        Ok(token)
    }

    fn next(&mut self) -> Result<(Token<'s>, usize), ExprError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn scan(&mut self) -> Result<(Token<'s>, usize), ExprError> {
        let bytes = self.source.as_bytes();
        while self.position < bytes.len() && bytes[self.position].is_ascii_whitespace() {
            self.position += 1;
        }

        let start = self.position;
        let Some(&byte) = bytes.get(start) else {
            return Ok((Token::End, start));
        };

        if byte.is_ascii_digit() || byte == b'.' {
            while self.position < bytes.len()
                && (bytes[self.position].is_ascii_digit() || bytes[self.position] == b'.')
            {
                self.position += 1;
            }
            let literal = &self.source[start..self.position];
            let value = literal
                .parse::<f32>()
                .map_err(|_| ExprError::InvalidNumber { position: start })?;
            return Ok((Token::Number(value), start));
        }

        if byte.is_ascii_alphabetic() || byte == b'_' {
            while self.position < bytes.len()
                && (bytes[self.position].is_ascii_alphanumeric() || bytes[self.position] == b'_')
            {
                self.position += 1;
            }
            return Ok((Token::Ident(&self.source[start..self.position]), start));
        }

        let token = match byte {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'^' => Token::Caret,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            _ => return Err(ExprError::UnexpectedChar { position: start }),
        };
        self.position += 1;
        Ok((token, start))
    }
}

/// Recursive descent parser emitting postfix operations.
struct Compiler<'s> {
    lexer: Lexer<'s>,
    ops: Vec<Op, MAX_OPS>,
    depth: usize,
    nesting: usize,
}

impl<'s> Compiler<'s> {
    fn emit(&mut self, op: Op) -> Result<(), ExprError> {
        self.depth = match op {
            Op::Const(_) | Op::Var(_) => self.depth + 1,
            Op::Neg => self.depth,
            Op::Call(func) => self.depth + 1 - func.arity(),
            _ => self.depth - 1,
        };
        if self.depth > MAX_STACK {
            return Err(ExprError::TooComplex);
        }
        self.ops.push(op).map_err(|_| ExprError::TooComplex)
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ExprError::TooComplex);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<(), ExprError> {
        self.enter()?;
        self.term()?;
        loop {
            let op = match self.lexer.peek()?.0 {
                Token::Plus => Op::Add,
                Token::Minus => Op::Sub,
                _ => break,
            };
            self.lexer.next()?;
            self.term()?;
            self.emit(op)?;
        }
        self.leave();
        Ok(())
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<(), ExprError> {
        self.unary()?;
        loop {
            let op = match self.lexer.peek()?.0 {
                Token::Star => Op::Mul,
                Token::Slash => Op::Div,
                Token::Percent => Op::Rem,
                _ => break,
            };
            self.lexer.next()?;
            self.unary()?;
            self.emit(op)?;
        }
        Ok(())
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<(), ExprError> {
        if self.lexer.peek()?.0 == Token::Minus {
            self.lexer.next()?;
            self.enter()?;
            self.unary()?;
            self.leave();
            return self.emit(Op::Neg);
        }
        self.power()
    }

    // power := atom ('^' unary)?
    fn power(&mut self) -> Result<(), ExprError> {
        self.atom()?;
        if self.lexer.peek()?.0 == Token::Caret {
            self.lexer.next()?;
            self.enter()?;
            self.unary()?;
            self.leave();
            self.emit(Op::Pow)?;
        }
        Ok(())
    }

    fn atom(&mut self) -> Result<(), ExprError> {
        let (token, position) = self.lexer.next()?;
        match token {
            Token::Number(value) => self.emit(Op::Const(value)),
            Token::Ident(name) => {
                if self.lexer.peek()?.0 == Token::LParen {
                    return self.call(name, position);
                }
                let op = match name {
                    "t" => Op::Var(Var::T),
                    "dt" => Op::Var(Var::Dt),
                    "x" => Op::Var(Var::X),
                    "y" => Op::Var(Var::Y),
                    "pi" => Op::Const(PI),
                    "tau" => Op::Const(TAU),
                    _ => return Err(ExprError::UnknownIdentifier { position }),
                };
                self.emit(op)
            }
            Token::LParen => {
                self.expression()?;
                match self.lexer.next()? {
                    (Token::RParen, _) => Ok(()),
                    _ => Err(ExprError::UnbalancedParens { position }),
                }
            }
            _ => Err(ExprError::UnexpectedToken { position }),
        }
    }

    fn call(&mut self, name: &str, position: usize) -> Result<(), ExprError> {
        let func = Func::lookup(name).ok_or(ExprError::UnknownIdentifier { position })?;
        let (_, open) = self.lexer.next()?;

        let mut found = 0;
        if self.lexer.peek()?.0 != Token::RParen {
            loop {
                self.expression()?;
                found += 1;
                if self.lexer.peek()?.0 != Token::Comma {
                    break;
                }
                self.lexer.next()?;
            }
        }

        if self.lexer.next()?.0 != Token::RParen {
            return Err(ExprError::UnbalancedParens { position: open });
        }
        if found != func.arity() {
            return Err(ExprError::WrongArity {
                position,
                expected: func.arity() as u8,
                found: found.min(u8::MAX as usize) as u8,
            });
        }
        self.emit(Op::Call(func))
    }
}

/// A compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    ops: Vec<Op, MAX_OPS>,
}

impl Program {
    /// Compiles `source` into a program.
    ///
    /// # Errors
    /// Any [`ExprError`]; the program is never partially compiled.
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        if source.trim().is_empty() {
            return Err(ExprError::Empty);
        }

        let mut compiler = Compiler {
            lexer: Lexer::new(source),
            ops: Vec::new(),
            depth: 0,
            nesting: 0,
        };
        compiler.expression()?;

        match compiler.lexer.next()? {
            (Token::End, _) => Ok(Self { ops: compiler.ops }),
            (Token::RParen, position) => Err(ExprError::UnbalancedParens { position }),
            (_, position) => Err(ExprError::UnexpectedToken { position }),
        }
    }

    /// A program that always evaluates to `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            ops: Vec::from_array([Op::Const(value)]),
        }
    }

    /// Number of operations in the program.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Evaluates the program for one pixel.
    pub fn eval(&self, sample: &Sample) -> f32 {
        let mut stack = [0.0f32; MAX_STACK];
        let mut sp = 0;

        for &op in &self.ops {
            match op {
                Op::Const(value) => {
                    stack[sp] = value;
                    sp += 1;
                }
                Op::Var(var) => {
                    stack[sp] = match var {
                        Var::T => sample.t,
                        Var::Dt => sample.dt,
                        Var::X => sample.x,
                        Var::Y => sample.y,
                    };
                    sp += 1;
                }
                Op::Neg => stack[sp - 1] = -stack[sp - 1],
                Op::Call(func) => {
                    let arity = func.arity();
                    sp -= arity;
                    stack[sp] = func.apply(&stack[sp..sp + arity]);
                    sp += 1;
                }
                _ => {
                    sp -= 1;
                    stack[sp - 1] = op.binary(stack[sp - 1], stack[sp]);
                }
            }
        }

        let result = if sp > 0 { stack[sp - 1] } else { 0.0 };
        if result.is_finite() { result } else { 0.0 }
    }
}

/// A primary pattern with one expression per color channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprPattern {
    channels: [Program; 3],
    space: ColorSpace,
}

impl ExprPattern {
    /// Compiles three channel expressions emitting colors in `space`.
    pub fn compile(channels: [&str; 3], space: ColorSpace) -> Result<Self, ExprError> {
        let [c0, c1, c2] = channels;
        Ok(Self {
            channels: [Program::compile(c0)?, Program::compile(c1)?, Program::compile(c2)?],
            space,
        })
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }
}

impl PrimaryPattern for ExprPattern {
    fn evaluate(
        &self,
        sample: &Sample,
        _prev_state: &PatternState,
        _palette: &Palette,
    ) -> Result<PatternOutput, PatternError> {
        let [c0, c1, c2] = &self.channels;
        Ok(PatternOutput {
            color: Color::new(c0.eval(sample), c1.eval(sample), c2.eval(sample)),
            space: self.space,
            state: None,
        })
    }
}

/// A secondary pattern computing brightness from one expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprModulation {
    brightness: Program,
}

impl ExprModulation {
    pub fn compile(brightness: &str) -> Result<Self, ExprError> {
        Ok(Self {
            brightness: Program::compile(brightness)?,
        })
    }
}

impl SecondaryPattern for ExprModulation {
    fn evaluate(
        &self,
        sample: &Sample,
        _prev_state: &PatternState,
        in_color: Color,
        _rng: &mut dyn RngCore,
    ) -> Modulation {
        Modulation::new(in_color, self.brightness.eval(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> f32 {
        Program::compile(source).unwrap().eval(&Sample::new(2.0, 0.5, 0.25, 4.0))
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("-2 ^ 2"), -4.0);
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
        assert_eq!(eval("8 - 4 - 2"), 2.0);
    }

    #[test]
    fn reads_variables() {
        assert_eq!(eval("t"), 2.0);
        assert_eq!(eval("dt"), 0.5);
        assert_eq!(eval("x"), 0.25);
        assert_eq!(eval("y"), 4.0);
    }

    #[test]
    fn rem_is_floor_modulo() {
        assert_eq!(eval("-1 % 4"), 3.0);
        assert_eq!(eval("5 % 4"), 1.0);
    }

    #[test]
    fn non_finite_results_become_zero() {
        assert_eq!(eval("1 / 0"), 0.0);
        assert_eq!(eval("sqrt(-1)"), 0.0);
    }

    #[test]
    fn clamp_tolerates_inverted_bounds() {
        assert_eq!(eval("clamp(5, 2, 1)"), 1.0);
    }
}
