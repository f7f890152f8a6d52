//! Tokenizing LC-3 assembly.
//!
//! This module holds the tokens that characterize LC-3 assembly ([`Token`]).
//! The parser runs the lexer one source line at a time, so a token never spans lines.
//!
//! Commas and whitespace both separate tokens (`R1, R2` and `R1 R2` lex identically).
//! A semicolon outside of a string literal begins a comment.

use logos::{Lexer, Logos};

use crate::num::parse_literal;

/// A unit of information in LC3 source code.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t\f,]+", error = LexErr)]
pub enum Token {
    /// A numeric literal (e.g., `#14`, `#-3`, `x7F`, `b101`).
    ///
    /// Bare numbers (e.g., `14`) are not numeric literals.
    #[regex(r"#-?[0-9]+", lex_literal, priority = 3)]
    #[regex(r"[Xx]-?[0-9A-Fa-f]+", lex_literal, priority = 4)]
    #[regex(r"[Bb]-?[01]+", lex_literal, priority = 4)]
    Literal(i32),

    /// A register value (i.e., `R0`-`R7`)
    #[regex(r"[Rr][0-7]", lex_reg, priority = 5)]
    Reg(u8),

    /// An identifier.
    ///
    /// This can refer to either:
    /// - a label (e.g., `IF`, `WHILE`, `ENDIF`, `IF1`)
    /// - an instruction (e.g. `ADD`, `AND`, `NOT`)
    ///
    /// Instructions are case-insensitive, labels are not.
    #[regex(r"[A-Za-z0-9_]+", |lx| Ident::from_name(lx.slice()), priority = 2)]
    Ident(Ident),

    /// A directive (e.g., `.orig`, `.end`). This holds the name without the dot.
    #[regex(r"\.[A-Za-z0-9_]+", |lx| lx.slice()[1..].to_string(), priority = 3)]
    Directive(String),

    /// A string literal (e.g., `"Hello!"`), with its escapes resolved.
    #[token("\"", lex_str_literal)]
    String(String),

    /// A comment, which starts with a semicolon and spans the remaining part of the line.
    #[regex(r";[^\n]*")]
    Comment,

    /// Any other run of characters.
    ///
    /// These are never valid on their own, but are kept so the parser can
    /// report them in context (e.g., as a bad label or operand).
    #[regex(r#"[^\s,;"]+"#, |lx| lx.slice().to_string(), priority = 1)]
    Unknown(String),
}

macro_rules! ident_enum {
    ($($instr:ident),+) => {
        /// An identifier.
        ///
        /// This can refer to either:
        /// - a label (e.g., `IF`, `WHILE`, `ENDIF`, `IF1`)
        /// - an instruction (e.g. `ADD`, `AND`, `NOT`)
        ///
        /// Instructions are matched case-insensitively.
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub enum Ident {
            $(
                #[allow(missing_docs)]
                $instr
            ),+,
            #[allow(missing_docs)]
            Label(String)
        }

        impl Ident {
            /// Classifies a name as either an instruction or a label.
            pub fn from_name(s: &str) -> Self {
                match &*s.to_uppercase() {
                    $(stringify!($instr) => Self::$instr),*,
                    _ => Self::Label(s.to_string())
                }
            }
        }

        impl std::fmt::Display for Ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$instr => f.write_str(stringify!($instr))),*,
                    Self::Label(id) => f.write_str(id)
                }
            }
        }
    };
}
ident_enum! {
    ADD, AND, NOT, BR, BRP, BRZ, BRZP, BRN, BRNP, BRNZ, BRNZP,
    JMP, JSR, JSRR, LD, LDI, LDR, LEA, ST, STI, STR, TRAP, NOP,
    RET, RTI, GETC, OUT, PUTS, IN, PUTSP, HALT
}
impl Ident {
    /// Whether this identifier is an instruction mnemonic (rather than a label).
    pub fn is_mnemonic(&self) -> bool {
        !matches!(self, Ident::Label(_))
    }
}

/// Any errors raised in attempting to tokenize a line.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum LexErr {
    /// Numeric literal is well-formed, but does not fit in 32 bits.
    LiteralTooLarge,
    /// String literal contains an escape other than `\0`, `\n`, `\r`, `\"`, `\\`.
    UnsupportedEscape(char),
    /// String literal is missing an end quotation mark.
    UnclosedStrLit,
    /// A symbol was used which is not allowed in LC3 assembly files
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::LiteralTooLarge      => f.write_str("numeric literal is too large"),
            LexErr::UnsupportedEscape(c) => write!(f, "unsupported escape character '\\{c}'"),
            LexErr::UnclosedStrLit       => f.write_str("unterminated string literal"),
            LexErr::InvalidSymbol        => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::LiteralTooLarge      => Some("no LC-3 field is wider than 17 bits".into()),
            LexErr::UnsupportedEscape(_) => Some("the supported escapes are \\0, \\n, \\r, \\\", and \\\\".into()),
            LexErr::UnclosedStrLit       => Some("add a quote to the end of the string literal (did you backslash-escape the closing quote?)".into()),
            LexErr::InvalidSymbol        => Some("this char does not occur in any token in LC-3 assembly".into()),
        }
    }
}

fn lex_literal(lx: &Lexer<'_, Token>) -> Result<i32, LexErr> {
    match parse_literal(lx.slice()) {
        Some(Ok(n)) => Ok(n),
        Some(Err(_)) => Err(LexErr::LiteralTooLarge),
        None => Err(LexErr::InvalidSymbol),
    }
}
fn lex_reg(lx: &Lexer<'_, Token>) -> u8 {
    lx.slice().as_bytes()[1] - b'0'
}
fn lex_str_literal(lx: &mut Lexer<'_, Token>) -> Result<String, LexErr> {
    let rem = lx.remainder();
    let mut buf = String::new();
    let mut chars = rem.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                lx.bump(i + 1);
                return Ok(buf);
            },
            '\\' => {
                let Some((_, esc)) = chars.next() else { break };
                match esc {
                    '0'  => buf.push('\0'),
                    'n'  => buf.push('\n'),
                    'r'  => buf.push('\r'),
                    '"'  => buf.push('"'),
                    '\\' => buf.push('\\'),
                    c => {
                        lx.bump(rem.len());
                        return Err(LexErr::UnsupportedEscape(c));
                    }
                }
            },
            '\n' => break,
            c => buf.push(c)
        }
    }

    lx.bump(rem.len());
    Err(LexErr::UnclosedStrLit)
}
