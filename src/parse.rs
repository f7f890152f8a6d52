//! Parsing assembly source code into an AST.
//!
//! Parsing happens in three steps:
//! 1. [`tokenize`]: every source line is lexed into a [`Line`] of tokens.
//!    Blank and comment-only lines are kept (as empty lines), so line numbers stay accurate.
//! 2. [`find_orig`]: the first non-empty line is checked to be the program's `.ORIG` directive.
//! 3. [`parse_stmts`]: every line after `.ORIG` (up to and including `.END`) is parsed
//!    into a [`Stmt`], validating operand counts, register names, and literal ranges.
//!
//! [`parse_ast`] runs all three in sequence.
//!
//! Label references are left unresolved here; the assembler resolves them with its symbol table.

pub mod lex;

use std::ops::Range;

use logos::Logos;

use crate::asm::{AsmErr, AsmErrKind};
use crate::ast::asm::{AsmInstr, Directive, Stmt, StmtKind};
use crate::ast::{CondCode, IOffset, ImmOrReg, Label, Offset, OffsetBacking, PCOffset, Reg, TrapVect8};
use crate::err::ErrSpan;
use lex::{Ident, Token};

/// A token, alongside the text it was lexed from and its column span.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// The source text of the token.
    pub text: String,
    /// The columns this token occupies on its line.
    pub span: Range<usize>
}

/// A single tokenized source line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Line {
    /// The line number (1-indexed).
    pub lineno: usize,
    /// The tokens on this line (comments are dropped).
    pub tokens: Vec<SpannedToken>
}
impl Line {
    /// Whether this line has no tokens (i.e., it was blank or only a comment).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn err(&self, kind: AsmErrKind) -> AsmErr {
        AsmErr::new(kind, ErrSpan::line(self.lineno))
    }
}

/// Tokenizes every line in the source.
///
/// Blank lines and comment-only lines produce empty [`Line`]s.
///
/// ```
/// # use lc3_workbench::parse::tokenize;
/// let lines = tokenize("; header\nADD R1, R2, R3 ; add\n").unwrap();
/// assert_eq!(lines.len(), 2);
/// assert!(lines[0].is_empty());
/// assert_eq!(lines[1].lineno, 2);
/// assert_eq!(lines[1].tokens.len(), 4);
/// ```
pub fn tokenize(src: &str) -> Result<Vec<Line>, AsmErr> {
    src.lines()
        .enumerate()
        .map(|(i, line)| tokenize_line(line, i + 1))
        .collect()
}

fn tokenize_line(line: &str, lineno: usize) -> Result<Line, AsmErr> {
    let mut tokens = vec![];
    for (m_token, span) in Token::lexer(line).spanned() {
        match m_token {
            Ok(Token::Comment) => {},
            Ok(token) => tokens.push(SpannedToken { token, text: line[span.clone()].to_string(), span }),
            Err(e) => return Err(AsmErr::new(AsmErrKind::Lex(e), ErrSpan::new(lineno, span))),
        }
    }

    Ok(Line { lineno, tokens })
}

/// The location of the `.ORIG` directive in a tokenized program.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OrigInfo {
    /// The starting address of the program.
    pub orig: u16,
    /// The index of the first line after the `.ORIG` directive.
    pub begin: usize
}

/// Finds the `.ORIG` directive of a tokenized program.
///
/// The `.ORIG` directive must be on the first non-empty line,
/// must not have a label, and must have exactly one literal operand in `[0, xFFFF]`.
///
/// ```
/// # use lc3_workbench::parse::{find_orig, tokenize};
/// let lines = tokenize("\n; comment\n.orig x3000\nHALT\n.end").unwrap();
/// let info = find_orig(&lines).unwrap();
/// assert_eq!(info.orig, 0x3000);
/// assert_eq!(info.begin, 3);
/// ```
pub fn find_orig(lines: &[Line]) -> Result<OrigInfo, AsmErr> {
    let Some((index, line)) = lines.iter().enumerate().find(|(_, l)| !l.is_empty()) else {
        return Err(AsmErr::new(AsmErrKind::EmptyProgram, ErrSpan::line(1)));
    };

    let is_orig = |t: &SpannedToken| matches!(&t.token, Token::Directive(d) if d.eq_ignore_ascii_case("ORIG"));
    let operands = match &line.tokens[..] {
        [first, rest @ ..] if is_orig(first) => rest,
        [_, second, ..] if is_orig(second) => return Err(line.err(AsmErrKind::LabeledOrig)),
        _ => return Err(line.err(AsmErrKind::MissingOrig)),
    };

    let [operand] = operands else {
        return Err(line.err(AsmErrKind::OrigOperandCount(operands.len())));
    };
    let Token::Literal(n) = operand.token else {
        return Err(line.err(AsmErrKind::InvalidLiteral(operand.text.clone())));
    };
    let orig = u16::try_from(n)
        .map_err(|_| line.err(AsmErrKind::OrigOutOfRange(operand.text.clone())))?;

    Ok(OrigInfo { orig, begin: index + 1 })
}

/// Parses every line from `begin` until the `.END` directive into statements.
///
/// The `.END` statement is included in the output (if it exists).
/// Lines after `.END` are not parsed.
pub fn parse_stmts(lines: &[Line], begin: usize) -> Result<Vec<Stmt>, AsmErr> {
    let mut stmts = vec![];
    for line in lines.get(begin..).unwrap_or_default() {
        let Some(stmt) = parse_line(line)? else { continue };
        let is_end = matches!(stmt.nucleus, Some(StmtKind::Directive(Directive::End)));

        stmts.push(stmt);
        if is_end { break; }
    }

    Ok(stmts)
}

/// Parses source code into its origin and its list of statements.
///
/// ```
/// # use lc3_workbench::parse::parse_ast;
/// let (orig, stmts) = parse_ast(".orig x3000\nLOOP BR LOOP\n.end").unwrap();
/// assert_eq!(orig, 0x3000);
/// assert_eq!(stmts.len(), 2);
/// assert_eq!(stmts[0].label.as_ref().map(|l| &*l.name), Some("LOOP"));
/// ```
pub fn parse_ast(src: &str) -> Result<(u16, Vec<Stmt>), AsmErr> {
    let lines = tokenize(src)?;
    let OrigInfo { orig, begin } = find_orig(&lines)?;
    let stmts = parse_stmts(&lines, begin)?;

    Ok((orig, stmts))
}

/// Whether this token starts a command (an instruction or a directive) rather than a label.
fn is_command(token: &Token) -> bool {
    match token {
        Token::Ident(id) => id.is_mnemonic(),
        Token::Directive(d) => matches!(&*d.to_uppercase(), "FILL" | "BLKW" | "STRINGZ" | "END"),
        _ => false
    }
}

fn parse_line(line: &Line) -> Result<Option<Stmt>, AsmErr> {
    let Some(first) = line.tokens.first() else { return Ok(None) };

    let (label, rest) = match is_command(&first.token) {
        true => (None, &line.tokens[..]),
        false => match first.token {
            Token::Ident(_) | Token::Reg(_) => {
                let label = Label::new(first.text.clone(), first.span.clone());
                (Some(label), &line.tokens[1..])
            },
            _ => return Err(AsmErr::new(
                AsmErrKind::InvalidLabel(first.text.clone()),
                ErrSpan::new(line.lineno, first.span.clone())
            ))
        }
    };

    let nucleus = match rest {
        [] => None,
        [cmd, operands @ ..] => Some(parse_command(cmd, operands).map_err(|kind| line.err(kind))?),
    };

    Ok(Some(Stmt { label, nucleus, line: line.lineno }))
}

fn parse_command(cmd: &SpannedToken, operands: &[SpannedToken]) -> Result<StmtKind, AsmErrKind> {
    match &cmd.token {
        Token::Ident(Ident::Label(_)) => Err(AsmErrKind::UnrecognizedInstr(cmd.text.clone())),
        Token::Ident(id) => parse_instr(id, operands).map(StmtKind::Instr),
        Token::Directive(d) => parse_directive(d, operands).map(StmtKind::Directive),
        _ => Err(AsmErrKind::UnrecognizedInstr(cmd.text.clone())),
    }
}

fn parse_directive(name: &str, operands: &[SpannedToken]) -> Result<Directive, AsmErrKind> {
    let upper = name.to_uppercase();
    let unary = || match operands {
        [op] => Ok(op),
        _ => Err(AsmErrKind::DirectiveOperandCount(upper.clone(), operands.len())),
    };

    match &*upper {
        "FILL" => pc_offset::<i32, 17>(unary()?).map(Directive::Fill),
        "BLKW" => {
            let n = literal(unary()?)?;
            u32::try_from(n)
                .map(Directive::Blkw)
                .map_err(|_| AsmErrKind::NegativeBlkw(n))
        },
        "STRINGZ" => {
            let op = unary()?;
            match &op.token {
                Token::String(s) => Ok(Directive::Stringz(s.clone())),
                _ => Err(AsmErrKind::ExpectedString(op.text.clone())),
            }
        },
        "END" => Ok(Directive::End),
        _ => Err(AsmErrKind::UnrecognizedDirective(name.to_string())),
    }
}

/// Checks that an instruction has exactly `N` operands.
fn expect_ops<'a, const N: usize>(id: &Ident, operands: &'a [SpannedToken]) -> Result<&'a [SpannedToken; N], AsmErrKind> {
    operands.try_into()
        .map_err(|_| AsmErrKind::InstrOperandCount(id.to_string(), N, operands.len()))
}

fn parse_instr(id: &Ident, operands: &[SpannedToken]) -> Result<AsmInstr, AsmErrKind> {
    let br = |cc: CondCode| -> Result<AsmInstr, AsmErrKind> {
        let [off] = expect_ops::<1>(id, operands)?;
        Ok(AsmInstr::BR(cc, pc_offset(off)?))
    };
    let nullary = |instr| expect_ops::<0>(id, operands).map(|_| instr);

    match id {
        Ident::ADD => {
            let [dr, sr1, sr2] = expect_ops::<3>(id, operands)?;
            Ok(AsmInstr::ADD(reg(dr)?, reg(sr1)?, imm_or_reg(sr2)?))
        },
        Ident::AND => {
            let [dr, sr1, sr2] = expect_ops::<3>(id, operands)?;
            Ok(AsmInstr::AND(reg(dr)?, reg(sr1)?, imm_or_reg(sr2)?))
        },
        Ident::NOT => {
            let [dr, sr] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::NOT(reg(dr)?, reg(sr)?))
        },
        Ident::BR | Ident::BRNZP => br(0b111),
        Ident::BRN  => br(0b100),
        Ident::BRZ  => br(0b010),
        Ident::BRP  => br(0b001),
        Ident::BRNZ => br(0b110),
        Ident::BRNP => br(0b101),
        Ident::BRZP => br(0b011),
        Ident::JMP => {
            let [br] = expect_ops::<1>(id, operands)?;
            Ok(AsmInstr::JMP(reg(br)?))
        },
        Ident::JSR => {
            let [off] = expect_ops::<1>(id, operands)?;
            Ok(AsmInstr::JSR(pc_offset(off)?))
        },
        Ident::JSRR => {
            let [br] = expect_ops::<1>(id, operands)?;
            Ok(AsmInstr::JSRR(reg(br)?))
        },
        Ident::LD => {
            let [dr, off] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::LD(reg(dr)?, pc_offset(off)?))
        },
        Ident::LDI => {
            let [dr, off] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::LDI(reg(dr)?, pc_offset(off)?))
        },
        Ident::LEA => {
            let [dr, off] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::LEA(reg(dr)?, pc_offset(off)?))
        },
        Ident::ST => {
            let [sr, off] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::ST(reg(sr)?, pc_offset(off)?))
        },
        Ident::STI => {
            let [sr, off] = expect_ops::<2>(id, operands)?;
            Ok(AsmInstr::STI(reg(sr)?, pc_offset(off)?))
        },
        Ident::LDR => {
            let [dr, br, off] = expect_ops::<3>(id, operands)?;
            Ok(AsmInstr::LDR(reg(dr)?, reg(br)?, base_offset(off)?))
        },
        Ident::STR => {
            let [sr, br, off] = expect_ops::<3>(id, operands)?;
            Ok(AsmInstr::STR(reg(sr)?, reg(br)?, base_offset(off)?))
        },
        Ident::TRAP => {
            let [vect] = expect_ops::<1>(id, operands)?;
            Ok(AsmInstr::TRAP(trap_vect(vect)?))
        },
        Ident::RET   => nullary(AsmInstr::RET),
        Ident::RTI   => nullary(AsmInstr::RTI),
        Ident::NOP   => nullary(AsmInstr::NOP),
        Ident::GETC  => nullary(AsmInstr::GETC),
        Ident::OUT   => nullary(AsmInstr::OUT),
        Ident::PUTS  => nullary(AsmInstr::PUTS),
        Ident::IN    => nullary(AsmInstr::IN),
        Ident::PUTSP => nullary(AsmInstr::PUTSP),
        Ident::HALT  => nullary(AsmInstr::HALT),
        Ident::Label(name) => Err(AsmErrKind::UnrecognizedInstr(name.clone())),
    }
}

fn reg(op: &SpannedToken) -> Result<Reg, AsmErrKind> {
    match op.token {
        Token::Reg(n) => Reg::try_from(n).map_err(|_| AsmErrKind::InvalidReg(op.text.clone())),
        _ => Err(AsmErrKind::InvalidReg(op.text.clone())),
    }
}

fn literal(op: &SpannedToken) -> Result<i32, AsmErrKind> {
    match op.token {
        Token::Literal(n) => Ok(n),
        _ => Err(AsmErrKind::InvalidLiteral(op.text.clone())),
    }
}

/// Range-checks a literal against a signed `N`-bit field.
fn signed_field<const N: u32>(n: i32) -> Option<IOffset<N>> {
    i16::try_from(n).ok()
        .and_then(IOffset::new)
}

fn imm_or_reg(op: &SpannedToken) -> Result<ImmOrReg<5>, AsmErrKind> {
    match op.token {
        Token::Reg(_) => reg(op).map(ImmOrReg::Reg),
        Token::Literal(n) => signed_field(n)
            .map(ImmOrReg::Imm)
            .ok_or(AsmErrKind::ImmOutOfRange { bits: 5, value: n }),
        _ => Err(AsmErrKind::InvalidReg(op.text.clone())),
    }
}

fn base_offset(op: &SpannedToken) -> Result<IOffset<6>, AsmErrKind> {
    let n = literal(op)?;
    signed_field(n).ok_or(AsmErrKind::OffsetOutOfRange { bits: 6, value: i64::from(n) })
}

fn trap_vect(op: &SpannedToken) -> Result<TrapVect8, AsmErrKind> {
    let n = literal(op)?;
    u16::try_from(n).ok()
        .and_then(Offset::new)
        .ok_or(AsmErrKind::TrapOutOfRange(n))
}

/// Parses an operand which is either a numeric literal or a label.
///
/// Any token which is not a literal is treated as a label reference,
/// and is checked against the symbol table during assembly.
fn pc_offset<OFF, const N: u32>(op: &SpannedToken) -> Result<PCOffset<OFF, N>, AsmErrKind>
    where OFF: TryFrom<i32> + OffsetBacking
{
    match op.token {
        Token::Literal(n) => OFF::try_from(n).ok()
            .and_then(Offset::new)
            .map(PCOffset::Offset)
            .ok_or(AsmErrKind::OffsetOutOfRange { bits: N, value: i64::from(n) }),
        _ => Ok(PCOffset::Label(Label::new(op.text.clone(), op.span.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::AsmErrKind;
    use crate::ast::asm::{AsmInstr, Directive, StmtKind};
    use crate::ast::reg_consts::{R0, R1, R2, R6};
    use crate::ast::{ImmOrReg, Offset, PCOffset};

    use super::{find_orig, parse_ast, parse_stmts, tokenize};

    fn parse_one(line: &str) -> Result<Option<StmtKind>, AsmErrKind> {
        let src = format!(".orig x3000\n{line}\n.end");
        parse_ast(&src)
            .map(|(_, mut stmts)| stmts.remove(0).nucleus)
            .map_err(|e| e.kind)
    }
    fn instr(line: &str) -> AsmInstr {
        match parse_one(line) {
            Ok(Some(StmtKind::Instr(i))) => i,
            r => panic!("expected {line:?} to parse as instruction, got {r:?}"),
        }
    }
    fn assert_parse_fail(line: &str, kind: AsmErrKind) {
        assert_eq!(parse_one(line), Err(kind), "line: {line:?}");
    }

    #[test]
    fn test_tokenize_keeps_lines() {
        let lines = tokenize("\n  ; only a comment\r\nHALT\n").unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].is_empty());
        assert!(lines[1].is_empty());
        assert_eq!(lines[2].lineno, 3);
    }

    #[test]
    fn test_tokenize_error_line() {
        let err = tokenize(".orig x3000\n\n.stringz \"oops\n.end").unwrap_err();
        assert_eq!(err.span.line, 3);
        assert_eq!(err.kind.to_string(), "unterminated string literal");
    }

    #[test]
    fn test_find_orig() {
        let orig = |src: &str| find_orig(&tokenize(src).unwrap()).map_err(|e| e.kind);

        assert_eq!(orig(".ORIG x3000").map(|o| o.orig), Ok(0x3000));
        assert_eq!(orig(".orig #0").map(|o| o.orig), Ok(0));
        assert_eq!(orig(".orig xFFFF").map(|o| o.orig), Ok(0xFFFF));

        assert_eq!(orig(""), Err(AsmErrKind::EmptyProgram));
        assert_eq!(orig("; nothing here\n\n"), Err(AsmErrKind::EmptyProgram));
        assert_eq!(orig("ADD R0, R0, R0\n.orig x3000"), Err(AsmErrKind::MissingOrig));
        assert_eq!(orig("START .orig x3000"), Err(AsmErrKind::LabeledOrig));
        assert_eq!(orig(".orig"), Err(AsmErrKind::OrigOperandCount(0)));
        assert_eq!(orig(".orig x3000 x4000"), Err(AsmErrKind::OrigOperandCount(2)));
        assert_eq!(orig(".orig x10000"), Err(AsmErrKind::OrigOutOfRange("x10000".into())));
        assert_eq!(orig(".orig #-1"), Err(AsmErrKind::OrigOutOfRange("#-1".into())));
        assert_eq!(orig(".orig 3000"), Err(AsmErrKind::InvalidLiteral("3000".into())));
    }

    #[test]
    fn test_instrs() {
        assert_eq!(instr("ADD R0, R1, #-16"), AsmInstr::ADD(R0, R1, ImmOrReg::Imm(Offset::new(-16).unwrap())));
        assert_eq!(instr("and r0 r1 r2"), AsmInstr::AND(R0, R1, ImmOrReg::Reg(R2)));
        assert_eq!(instr("NOT R0, R1"), AsmInstr::NOT(R0, R1));
        assert_eq!(instr("LDR R0, R6, #-32"), AsmInstr::LDR(R0, R6, Offset::new(-32).unwrap()));
        assert_eq!(instr("TRAP x25"), AsmInstr::TRAP(Offset::new(0x25).unwrap()));
        assert_eq!(instr("BR #-1"), AsmInstr::BR(0b111, PCOffset::Offset(Offset::new(-1).unwrap())));
        assert_eq!(instr("NOP"), AsmInstr::NOP);
        assert_eq!(instr("halt"), AsmInstr::HALT);

        match instr("BRnz LOOP") {
            AsmInstr::BR(0b110, PCOffset::Label(l)) => assert_eq!(l.name, "LOOP"),
            i => panic!("unexpected {i:?}"),
        }
        // bare numbers are label references
        match instr("LD R2, 5") {
            AsmInstr::LD(R2, PCOffset::Label(l)) => assert_eq!(l.name, "5"),
            i => panic!("unexpected {i:?}"),
        }
    }

    #[test]
    fn test_operand_errors() {
        assert_parse_fail("ADD R0, R0, #20", AsmErrKind::ImmOutOfRange { bits: 5, value: 20 });
        assert_parse_fail("ADD R0, R0, #-17", AsmErrKind::ImmOutOfRange { bits: 5, value: -17 });
        assert_parse_fail("ADD R0, R8, #1", AsmErrKind::InvalidReg("R8".into()));
        assert_parse_fail("ADD R0, R0, FOO", AsmErrKind::InvalidReg("FOO".into()));
        assert_parse_fail("ADD R0, R0", AsmErrKind::InstrOperandCount("ADD".into(), 3, 2));
        assert_parse_fail("RET R7", AsmErrKind::InstrOperandCount("RET".into(), 0, 1));
        assert_parse_fail("LDR R0, R1, LABEL", AsmErrKind::InvalidLiteral("LABEL".into()));
        assert_parse_fail("LDR R0, R1, #32", AsmErrKind::OffsetOutOfRange { bits: 6, value: 32 });
        assert_parse_fail("BR #256", AsmErrKind::OffsetOutOfRange { bits: 9, value: 256 });
        assert_parse_fail("JSR #-1025", AsmErrKind::OffsetOutOfRange { bits: 11, value: -1025 });
        assert_parse_fail("TRAP #256", AsmErrKind::TrapOutOfRange(256));
        assert_parse_fail("TRAP #-1", AsmErrKind::TrapOutOfRange(-1));
    }

    #[test]
    fn test_directives() {
        assert_eq!(parse_one(".blkw #3"), Ok(Some(StmtKind::Directive(Directive::Blkw(3)))));
        assert_eq!(parse_one(".STRINGZ \"hi\\n\""), Ok(Some(StmtKind::Directive(Directive::Stringz("hi\n".into())))));
        assert_eq!(parse_one(".fill x-1"), Ok(Some(StmtKind::Directive(Directive::Fill(PCOffset::Offset(Offset::new(-1).unwrap()))))));
        assert_eq!(parse_one(".fill xFFFF"), Ok(Some(StmtKind::Directive(Directive::Fill(PCOffset::Offset(Offset::new(0xFFFF).unwrap()))))));

        assert_eq!(parse_one(".fill x10000"), Err(AsmErrKind::OffsetOutOfRange { bits: 17, value: 0x10000 }));
        assert_eq!(parse_one(".blkw #-1"), Err(AsmErrKind::NegativeBlkw(-1)));
        assert_eq!(parse_one(".blkw"), Err(AsmErrKind::DirectiveOperandCount("BLKW".into(), 0)));
        assert_eq!(parse_one(".fill #1 #2"), Err(AsmErrKind::DirectiveOperandCount("FILL".into(), 2)));
        assert_eq!(parse_one(".stringz abc"), Err(AsmErrKind::ExpectedString("abc".into())));
        assert_eq!(parse_one("LBL .foo"), Err(AsmErrKind::UnrecognizedDirective("foo".into())));
    }

    #[test]
    fn test_labels() {
        let (_, stmts) = parse_ast(".orig x3000\nLOOP\nR1 ADD R0, R0, #1\nfoo_2 .fill #0\n.end").unwrap();
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[0].label.as_ref().map(|l| &*l.name), Some("LOOP"));
        assert!(stmts[0].nucleus.is_none());
        assert_eq!(stmts[1].label.as_ref().map(|l| &*l.name), Some("R1"));
        assert_eq!(stmts[2].label.as_ref().map(|l| &*l.name), Some("foo_2"));
        assert_eq!(stmts[2].line, 4);

        assert_parse_fail("x3000 HALT", AsmErrKind::InvalidLabel("x3000".into()));
        assert_parse_fail("LOOP: HALT", AsmErrKind::InvalidLabel("LOOP:".into()));
        assert_parse_fail("LOOP ADDD R0, R0, R0", AsmErrKind::UnrecognizedInstr("ADDD".into()));
    }

    #[test]
    fn test_stops_at_end() {
        let lines = tokenize(".orig x3000\nHALT\nDONE .end\nthis is !!! not code\n").unwrap();
        let stmts = parse_stmts(&lines, 1).unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1].nucleus, Some(StmtKind::Directive(Directive::End)));
        assert_eq!(stmts[1].label.as_ref().map(|l| &*l.name), Some("DONE"));

        // no .end: everything is parsed
        let lines = tokenize(".orig x3000\nHALT\nHALT").unwrap();
        assert_eq!(parse_stmts(&lines, 1).unwrap().len(), 2);
    }
}
