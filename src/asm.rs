//! Assembling assembly source code into object files.
//!
//! This module is used to convert assembly source into object files
//! that can be loaded into the simulator.
//!
//! Assembly happens in two passes over the parsed statements:
//! 1. [`SymbolTable::new`] assigns an address to every statement and binds labels to addresses.
//! 2. [`ObjectFile::new`] walks the statements again and emits machine words,
//!    resolving label operands using the completed symbol table.
//!
//! [`assemble`] runs parsing and both passes. The [`encoding`] submodule
//! writes an [`ObjectFile`] out as `.obj` bytes and `.sym` text.
//!
//! Assembly is fail-fast: the first error aborts assembly and is reported as an [`AsmErr`].

pub mod encoding;

use crate::ast::asm::{AsmInstr, Directive, Stmt, StmtKind};
use crate::ast::reg_consts::R7;
use crate::ast::sim::SimInstr;
use crate::ast::{IOffset, ImmOrReg, Offset, PCOffset};
use crate::err::{ErrSpan, LexErr};
use crate::num::to_hex_string;
use crate::parse::parse_ast;
use crate::sim::labels::LabelTable;

/// The number of words in LC-3 memory.
const MEMORY_SIZE: u64 = 0x10000;

/// Assembles assembly source code into an object file.
///
/// # Example
/// ```
/// use lc3_workbench::asm::assemble;
///
/// let src = "
///     .orig x3000
///     ADD R0, R0, #5
///     LABEL HALT
///     .end
/// ";
/// let obj_file = assemble(src).unwrap();
/// assert_eq!(obj_file.orig(), 0x3000);
/// assert_eq!(obj_file.machine_code(), [0x1025, 0xF025]);
/// assert_eq!(obj_file.symbol_table().lookup_label("LABEL"), Some(0x3001));
/// ```
pub fn assemble(src: &str) -> Result<ObjectFile, AsmErr> {
    let (orig, stmts) = parse_ast(src)?;
    let (sym, len) = SymbolTable::new(&stmts, orig)?;
    tracing::debug!(orig = %to_hex_string(orig), len, labels = sym.len(), "completed first assembler pass");

    let obj = ObjectFile::new(orig, stmts, sym)?;
    tracing::debug!(words = obj.len(), "completed second assembler pass");
    Ok(obj)
}

/// The broad category of an assembly error.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ErrCategory {
    /// A malformed token (e.g., an unterminated string).
    Lexical,
    /// A malformed program or line (e.g., missing `.ORIG`, wrong operand count, duplicate label).
    Structural,
    /// A value that does not fit its field or memory.
    Range,
    /// An operand or name that cannot be understood (e.g., unknown label or instruction).
    Semantic,
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with span information included.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AsmErrKind {
    /// A line could not be tokenized.
    Lex(LexErr),
    /// The program has no code.
    EmptyProgram,
    /// The first line of code is not `.ORIG`.
    MissingOrig,
    /// The `.ORIG` directive has a label.
    LabeledOrig,
    /// The `.ORIG` directive does not have exactly one operand.
    OrigOperandCount(usize),
    /// The `.ORIG` operand is not an address.
    OrigOutOfRange(String),
    /// The first token of a line is neither a command nor a valid label name.
    InvalidLabel(String),
    /// An instruction has the wrong number of operands (instruction, expected, found).
    InstrOperandCount(String, usize, usize),
    /// A directive has the wrong number of operands (directive, found).
    DirectiveOperandCount(String, usize),
    /// A label was defined twice.
    DuplicateLabel {
        /// The label.
        label: String,
        /// The address the label already points to.
        addr: u16
    },
    /// Two labels were defined at the same address.
    DuplicateAddress {
        /// The label already at the address.
        label: String,
        /// The address.
        addr: u16
    },
    /// The program has no `.END` directive.
    MissingEnd,
    /// An immediate value does not fit in its field.
    ImmOutOfRange {
        /// Width of the field.
        bits: u32,
        /// The value.
        value: i32
    },
    /// A (PC or base register) offset does not fit in its field.
    OffsetOutOfRange {
        /// Width of the field.
        bits: u32,
        /// The offset.
        value: i64
    },
    /// A trap vector is not a byte.
    TrapOutOfRange(i32),
    /// A `.BLKW` has a negative length.
    NegativeBlkw(i32),
    /// The program extends past the end of memory.
    PastMemoryLimit(u64),
    /// A label operand is not defined.
    UndefinedLabel(String),
    /// The command is not an instruction.
    UnrecognizedInstr(String),
    /// The directive is not known.
    UnrecognizedDirective(String),
    /// An operand is not a register.
    InvalidReg(String),
    /// An operand is not a numeric literal.
    InvalidLiteral(String),
    /// A `.STRINGZ` operand is not a string literal.
    ExpectedString(String),
}
impl AsmErrKind {
    /// The category of this error.
    pub fn category(&self) -> ErrCategory {
        match self {
            Self::Lex(_) => ErrCategory::Lexical,
            | Self::EmptyProgram
            | Self::MissingOrig
            | Self::LabeledOrig
            | Self::OrigOperandCount(_)
            | Self::InvalidLabel(_)
            | Self::InstrOperandCount(..)
            | Self::DirectiveOperandCount(..)
            | Self::DuplicateLabel { .. }
            | Self::DuplicateAddress { .. }
            | Self::MissingEnd => ErrCategory::Structural,
            | Self::OrigOutOfRange(_)
            | Self::ImmOutOfRange { .. }
            | Self::OffsetOutOfRange { .. }
            | Self::TrapOutOfRange(_)
            | Self::NegativeBlkw(_)
            | Self::PastMemoryLimit(_) => ErrCategory::Range,
            | Self::UndefinedLabel(_)
            | Self::UnrecognizedInstr(_)
            | Self::UnrecognizedDirective(_)
            | Self::InvalidReg(_)
            | Self::InvalidLiteral(_)
            | Self::ExpectedString(_) => ErrCategory::Semantic,
        }
    }
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // range of a signed field
        let bounds = |bits: &u32| (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1);

        match self {
            Self::Lex(e) => e.fmt(f),
            Self::EmptyProgram => f.write_str("Looks like your program's empty! You need at least an .ORIG directive and an .END directive."),
            Self::MissingOrig => f.write_str("The first non-empty, non-comment line of your program needs to have an .ORIG directive!"),
            Self::LabeledOrig => f.write_str(".ORIG directive cannot have a label!"),
            Self::OrigOperandCount(n) => write!(f, "The .ORIG directive expects exactly one operand, but it looks like you have {n}!"),
            Self::OrigOutOfRange(op) => write!(f, ".ORIG operand ({op}) is out of range! It should be between 0 and 0xFFFF, inclusive."),
            Self::InvalidLabel(label) => write!(f, "this line looks like a label, but '{label}' is not a valid label name; you either misspelled an instruction or entered an invalid name for a label"),
            Self::InstrOperandCount(instr, expected, found) => {
                let noun = if *expected == 1 { "operand" } else { "operands" };
                write!(f, "expected {instr} instruction to have exactly {expected} {noun}, but found {found}")
            },
            Self::DirectiveOperandCount(dir, found) => write!(f, "expected .{dir} directive to have exactly one operand, but found {found}"),
            Self::DuplicateLabel { label, addr } => write!(f, "label name {label} already exists; it points to {}", to_hex_string(*addr)),
            Self::DuplicateAddress { label, addr } => write!(f, "address {} already has the label {label}", to_hex_string(*addr)),
            Self::MissingEnd => f.write_str("no .END directive found!"),
            Self::ImmOutOfRange { bits, value } => {
                let (min, max) = bounds(bits);
                write!(f, "immediate field is out of range: expected value to fit in {bits} bits (i.e., to be between {min} and {max}, inclusive), but found {value}")
            },
            Self::OffsetOutOfRange { bits, value } => {
                let (min, max) = bounds(bits);
                write!(f, "offset {value} is out of range; it must fit into {bits} bits, so it should be between {min} and {max}, inclusive")
            },
            Self::TrapOutOfRange(n) => write!(f, "trap vector out of range: expected value to be an unsigned byte (i.e., between 0 and 255, inclusive), but found {n}"),
            Self::NegativeBlkw(n) => write!(f, "a .BLKW needs to have a non-negative length, but I found {n}"),
            Self::PastMemoryLimit(addr) => write!(f, "currently at address x{addr:04X}, which is past the memory limit of x{MEMORY_SIZE:04X}"),
            Self::UndefinedLabel(label) => write!(f, "the offset '{label}' is not a valid numeric literal, but I can't find it in the symbol table either; did you misspell a label name?"),
            Self::UnrecognizedInstr(instr) => write!(f, "unrecognized instruction \"{instr}\""),
            Self::UnrecognizedDirective(dir) => write!(f, "unrecognized directive: .{dir}"),
            Self::InvalidReg(op) => write!(f, "Invalid register specification: '{op}'"),
            Self::InvalidLiteral(op) => write!(f, "Invalid numeric literal: '{op}'"),
            Self::ExpectedString(op) => write!(f, "expected a string literal, but found '{op}'"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AsmErr {
    /// The value with a span.
    pub kind: AsmErrKind,
    /// The span in the source associated with this value.
    pub span: ErrSpan
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, span: ErrSpan) -> Self {
        AsmErr { kind, span }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.span.line, self.kind)
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::Lex(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn span(&self) -> Option<crate::err::ErrSpan> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::Lex(e) => crate::err::Error::help(e),
            AsmErrKind::EmptyProgram | AsmErrKind::MissingOrig => Some("programs start with a line like `.ORIG x3000`".into()),
            AsmErrKind::InvalidLabel(_) => Some("label names may only contain letters, digits, and underscores, and cannot be numeric literals".into()),
            AsmErrKind::DuplicateLabel { .. } => Some("labels must be unique within a file, try renaming one of the labels".into()),
            AsmErrKind::DuplicateAddress { .. } => Some("an address can only have one label, try removing one of the labels".into()),
            AsmErrKind::MissingEnd => Some("try adding an .END directive at the end of the program".into()),
            AsmErrKind::OffsetOutOfRange { .. } => Some("if this is a label, try loading its address with a .FILL and LDI".into()),
            AsmErrKind::PastMemoryLimit(_) => Some("user code typically starts at x3000 and is short enough to not reach the end of memory".into()),
            AsmErrKind::UnrecognizedDirective(_) => Some("the supported directives are .ORIG, .FILL, .BLKW, .STRINGZ, and .END".into()),
            AsmErrKind::InvalidReg(_) => Some("registers are R0 through R7".into()),
            AsmErrKind::InvalidLiteral(_) => Some("numeric literals are written like #10 (decimal), x1F (hex), or b101 (binary)".into()),
            _ => None,
        }
    }
}

/// The symbol table created in the first assembler pass,
/// mapping each label to the address of the statement it labels.
///
/// Labels are case-sensitive. Each label points to exactly one address,
/// and each address has at most one label.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable {
    labels: LabelTable
}

impl SymbolTable {
    /// Creates a new symbol table.
    ///
    /// This performs the first assembler pass, calculating the memory address of
    /// labels at each provided statement, starting at `orig`.
    ///
    /// This returns the symbol table and the length of the program in words.
    ///
    /// ## Example
    /// ```
    /// use lc3_workbench::parse::parse_ast;
    /// use lc3_workbench::asm::SymbolTable;
    ///
    /// let src = "
    ///     .orig x3000
    ///     LABEL HALT
    ///     .stringz \"abc\"
    ///     .end
    /// ";
    /// let (orig, stmts) = parse_ast(src).unwrap();
    ///
    /// let (sym, len) = SymbolTable::new(&stmts, orig).unwrap();
    /// assert_eq!(sym.lookup_label("LABEL"), Some(0x3000));
    /// assert_eq!(len, 5);
    /// ```
    pub fn new(stmts: &[Stmt], orig: u16) -> Result<(Self, usize), AsmErr> {
        /// The location counter.
        ///
        /// This is wider than an address so that the memory limit can be checked.
        struct Cursor(u64);
        impl Cursor {
            fn check_bounds(addr: u64) -> Result<(), AsmErrKind> {
                match addr > MEMORY_SIZE {
                    true  => Err(AsmErrKind::PastMemoryLimit(addr)),
                    false => Ok(()),
                }
            }
            /// Gets the current address, checking that a label can be placed here.
            fn label_addr(&self) -> Result<u16, AsmErrKind> {
                // a label must refer to a valid memory location, so the next address must be in bounds
                Self::check_bounds(self.0 + 1)?;
                Ok(self.0 as u16)
            }
            fn advance(&mut self, n: u32) -> Result<(), AsmErrKind> {
                self.0 += u64::from(n);
                Self::check_bounds(self.0)
            }
        }

        let mut cursor = Cursor(u64::from(orig));
        let mut labels = LabelTable::new();
        let mut seen_end = false;

        for stmt in stmts {
            let line_err = |kind| AsmErr::new(kind, ErrSpan::line(stmt.line));

            if let Some(label) = &stmt.label {
                let addr = cursor.label_addr().map_err(line_err)?;
                let span = ErrSpan::new(stmt.line, label.span());

                if let Some(existing) = labels.get_addr(&label.name) {
                    return Err(AsmErr::new(AsmErrKind::DuplicateLabel { label: label.name.clone(), addr: existing }, span));
                }
                if let Some(existing) = labels.get_label(addr) {
                    return Err(AsmErr::new(AsmErrKind::DuplicateAddress { label: existing.to_string(), addr }, span));
                }
                labels.insert(label.name.clone(), addr);
            }

            match &stmt.nucleus {
                Some(StmtKind::Directive(Directive::End)) => {
                    seen_end = true;
                    break;
                },
                Some(nucleus) => cursor.advance(nucleus.word_len()).map_err(line_err)?,
                None => {},
            }
        }

        if !seen_end {
            let last_line = stmts.last().map_or(1, |s| s.line);
            return Err(AsmErr::new(AsmErrKind::MissingEnd, ErrSpan::line(last_line)));
        }

        let len = (cursor.0 - u64::from(orig)) as usize;
        Ok((SymbolTable { labels }, len))
    }

    /// Gets the memory address of a given label (if it exists).
    ///
    /// ## Example
    /// ```
    /// use lc3_workbench::asm::assemble;
    ///
    /// let src = "
    ///     .orig x3000
    ///     LOOP
    ///         ADD R0, R0, #1
    ///         BR LOOP
    ///     LOOP2
    ///         ADD R0, R0, #2
    ///         BR LOOP2
    ///     .end
    /// ";
    /// let obj = assemble(src).unwrap();
    /// let sym = obj.symbol_table();
    /// assert_eq!(sym.lookup_label("LOOP"), Some(0x3000));
    /// assert_eq!(sym.lookup_label("LOOP2"), Some(0x3002));
    /// assert_eq!(sym.lookup_label("loop"), None);
    /// ```
    pub fn lookup_label(&self, label: &str) -> Option<u16> {
        self.labels.get_addr(label)
    }

    /// Gets the label at a given memory address (if it exists).
    ///
    /// ## Example
    /// ```
    /// use lc3_workbench::asm::assemble;
    ///
    /// let src = "
    ///     .orig x3000
    ///     LOOP
    ///         ADD R0, R0, #1
    ///         BR LOOP
    ///     .end
    /// ";
    /// let obj = assemble(src).unwrap();
    /// let sym = obj.symbol_table();
    /// assert_eq!(sym.rev_lookup_label(0x3000), Some("LOOP"));
    /// assert_eq!(sym.rev_lookup_label(0x3001), None);
    /// ```
    pub fn rev_lookup_label(&self, addr: u16) -> Option<&str> {
        self.labels.get_label(addr)
    }

    /// Binds a label to an address, replacing any colliding entries.
    pub fn insert(&mut self, label: impl Into<String>, addr: u16) {
        self.labels.insert(label, addr);
    }

    /// Gets an iterable of the mapping from labels to addresses, sorted by address.
    pub fn label_iter(&self) -> impl Iterator<Item=(&str, u16)> + '_ {
        self.labels.iter()
    }

    /// The number of labels in this table.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether this table has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Replaces a [`PCOffset`] value with an [`Offset`] value by calculating the offset from a given label
/// (if this `PCOffset` represents a label).
///
/// `pc` is the incremented PC (the address after the instruction).
fn replace_pc_offset<const N: u32>(off: PCOffset<i16, N>, pc: u32, sym: &SymbolTable) -> Result<IOffset<N>, AsmErrKind> {
    match off {
        PCOffset::Offset(off) => Ok(off),
        PCOffset::Label(label) => {
            let addr = sym.lookup_label(&label.name)
                .ok_or_else(|| AsmErrKind::UndefinedLabel(label.name.clone()))?;

            let value = i64::from(addr) - i64::from(pc);
            i16::try_from(value).ok()
                .and_then(IOffset::new)
                .ok_or(AsmErrKind::OffsetOutOfRange { bits: N, value })
        },
    }
}

impl AsmInstr {
    /// Converts an ASM instruction into a simulator instruction ([`SimInstr`])
    /// by resolving offsets and erasing aliases.
    ///
    /// Parameters:
    /// - `pc`: PC increment
    /// - `sym`: The symbol table
    pub fn into_sim_instr(self, pc: u32, sym: &SymbolTable) -> Result<SimInstr, AsmErrKind> {
        match self {
            AsmInstr::ADD(dr, sr1, sr2) => Ok(SimInstr::ADD(dr, sr1, sr2)),
            AsmInstr::AND(dr, sr1, sr2) => Ok(SimInstr::AND(dr, sr1, sr2)),
            AsmInstr::BR(cc, off)       => Ok(SimInstr::BR(cc, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::JMP(br)           => Ok(SimInstr::JMP(br)),
            AsmInstr::JSR(off)          => Ok(SimInstr::JSR(ImmOrReg::Imm(replace_pc_offset(off, pc, sym)?))),
            AsmInstr::JSRR(br)          => Ok(SimInstr::JSR(ImmOrReg::Reg(br))),
            AsmInstr::LD(dr, off)       => Ok(SimInstr::LD(dr, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::LDI(dr, off)      => Ok(SimInstr::LDI(dr, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::LDR(dr, br, off)  => Ok(SimInstr::LDR(dr, br, off)),
            AsmInstr::LEA(dr, off)      => Ok(SimInstr::LEA(dr, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::NOT(dr, sr)       => Ok(SimInstr::NOT(dr, sr)),
            AsmInstr::RET               => Ok(SimInstr::JMP(R7)),
            AsmInstr::RTI               => Ok(SimInstr::RTI),
            AsmInstr::ST(sr, off)       => Ok(SimInstr::ST(sr, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::STI(sr, off)      => Ok(SimInstr::STI(sr, replace_pc_offset(off, pc, sym)?)),
            AsmInstr::STR(sr, br, off)  => Ok(SimInstr::STR(sr, br, off)),
            AsmInstr::TRAP(vect)        => Ok(SimInstr::TRAP(vect)),
            AsmInstr::NOP               => Ok(SimInstr::BR(0b000, Offset::new_trunc(0))),
            AsmInstr::GETC              => Ok(SimInstr::TRAP(Offset::new_trunc(0x20))),
            AsmInstr::OUT               => Ok(SimInstr::TRAP(Offset::new_trunc(0x21))),
            AsmInstr::PUTS              => Ok(SimInstr::TRAP(Offset::new_trunc(0x22))),
            AsmInstr::IN                => Ok(SimInstr::TRAP(Offset::new_trunc(0x23))),
            AsmInstr::PUTSP             => Ok(SimInstr::TRAP(Offset::new_trunc(0x24))),
            AsmInstr::HALT              => Ok(SimInstr::TRAP(Offset::new_trunc(0x25))),
        }
    }
}

impl Directive {
    /// Writes the words of this directive.
    ///
    /// `.FILL` label operands resolve to the label's address.
    fn write_words(self, words: &mut Vec<u16>, sym: &SymbolTable) -> Result<(), AsmErrKind> {
        match self {
            Directive::Fill(PCOffset::Offset(off)) => words.push(off.get() as u16),
            Directive::Fill(PCOffset::Label(label)) => {
                let addr = sym.lookup_label(&label.name)
                    .ok_or(AsmErrKind::UndefinedLabel(label.name))?;
                words.push(addr);
            },
            Directive::Blkw(n) => words.extend(std::iter::repeat(0).take(n as usize)),
            Directive::Stringz(s) => {
                words.extend(s.encode_utf16());
                words.push(0);
            },
            Directive::End => {},
        }

        Ok(())
    }
}

/// An object file.
///
/// This is the final product after assembly source code is fully assembled.
/// This can be loaded in the simulator to run the assembled code.
///
/// An object file is one contiguous block of words starting at its origin, plus the symbol table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectFile {
    orig: u16,
    words: Vec<u16>,
    sym: SymbolTable
}
impl ObjectFile {
    /// Creates a new object file from statements and their symbol table.
    ///
    /// This performs the second assembler pass.
    pub fn new(orig: u16, stmts: Vec<Stmt>, sym: SymbolTable) -> Result<Self, AsmErr> {
        let mut words = vec![];

        for stmt in stmts {
            let Some(nucleus) = stmt.nucleus else { continue };
            let line_err = |kind| AsmErr::new(kind, ErrSpan::line(stmt.line));

            match nucleus {
                StmtKind::Directive(Directive::End) => break,
                StmtKind::Directive(directive) => {
                    directive.write_words(&mut words, &sym).map_err(line_err)?;
                },
                StmtKind::Instr(instr) => {
                    let pc = u32::from(orig) + words.len() as u32 + 1;
                    let sim = instr.into_sim_instr(pc, &sym).map_err(line_err)?;
                    words.push(sim.encode());
                },
            }
        }

        Ok(Self { orig, words, sym })
    }

    /// Creates an object file from already assembled words and symbols.
    pub fn from_parts(orig: u16, words: Vec<u16>, sym: SymbolTable) -> Self {
        Self { orig, words, sym }
    }

    /// The starting address of this object file.
    pub fn orig(&self) -> u16 {
        self.orig
    }

    /// The machine code of this object file, starting at [`ObjectFile::orig`].
    pub fn machine_code(&self) -> &[u16] {
        &self.words
    }

    /// The symbol table of this object file.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.sym
    }

    /// The number of words in this object file.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether this object file has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Gets an iterator over all of the memory locations defined in the object file.
    pub fn addr_iter(&self) -> impl Iterator<Item=(u16, u16)> + '_ {
        self.words.iter()
            .enumerate()
            .map(|(i, &w)| (self.orig.wrapping_add(i as u16), w))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::sim::decode;

    use super::{assemble, AsmErr, AsmErrKind, ErrCategory, ObjectFile};

    fn assert_asm_fail<T: std::fmt::Debug>(r: Result<T, AsmErr>, kind: AsmErrKind) {
        assert_eq!(r.unwrap_err().kind, kind);
    }

    #[test]
    fn test_basic_arithmetic() {
        let obj = assemble(".ORIG x3000\nADD R0,R0,#5\nHALT\n.END").unwrap();
        assert_eq!(obj.orig(), 0x3000);
        assert_eq!(obj.machine_code(), [0x1025, 0xF025]);
    }

    #[test]
    fn test_forward_label() {
        let obj = assemble(".ORIG x3000\nBRz SKIP\nADD R0,R0,#1\nSKIP ADD R1,R1,#1\n.END").unwrap();
        assert_eq!(obj.machine_code()[0], 0x0401);
        assert_eq!(obj.symbol_table().lookup_label("SKIP"), Some(0x3002));
    }

    #[test]
    fn test_backward_label() {
        let obj = assemble(".orig x3000\nLOOP ADD R0, R0, #-1\nBRp LOOP\nJSR LOOP\n.end").unwrap();
        assert_eq!(obj.machine_code(), [0x103F, 0x03FE, 0x4FFD]);
    }

    #[test]
    fn test_range_violation() {
        let err = assemble(".ORIG x3000\nADD R0,R0,#20\n.END").unwrap_err();
        assert_eq!(err.kind, AsmErrKind::ImmOutOfRange { bits: 5, value: 20 });
        assert_eq!(err.kind.category(), ErrCategory::Range);
        assert_eq!(err.to_string(), "line 2: immediate field is out of range: expected value to fit in 5 bits (i.e., to be between -16 and 15, inclusive), but found 20");
    }

    #[test]
    fn test_fill_label() {
        // the label's address is written verbatim, even if it is far away
        let obj = assemble(".ORIG x3000\n.FILL TARGET\n.BLKW x1000\nTARGET NOP\n.END").unwrap();
        assert_eq!(obj.machine_code()[0], 0x4001);
        assert_eq!(obj.len(), 0x1002);
        assert_eq!(obj.machine_code()[0x1001], 0x0000);

        let obj = assemble(".orig x3000\n.fill #-1\n.fill xFFFF\n.fill b101\n.end").unwrap();
        assert_eq!(obj.machine_code(), [0xFFFF, 0xFFFF, 0b101]);

        assert_asm_fail(assemble(".orig x3000\n.fill MISSING\n.end"), AsmErrKind::UndefinedLabel("MISSING".into()));
    }

    #[test]
    fn test_stringz_blkw() {
        let obj = assemble(".orig x3000\nA .stringz \"hi\\n\"\nB .blkw #2\nC .stringz \"\"\nD .end").unwrap();
        assert_eq!(obj.machine_code(), [0x68, 0x69, 0x0A, 0, 0, 0, 0]);

        let sym = obj.symbol_table();
        assert_eq!(sym.lookup_label("A"), Some(0x3000));
        assert_eq!(sym.lookup_label("B"), Some(0x3004));
        assert_eq!(sym.lookup_label("C"), Some(0x3006));
        assert_eq!(sym.lookup_label("D"), Some(0x3007));
    }

    #[test]
    fn test_address_agreement() {
        let src = "
            .orig x4000
            START   LEA R0, MSG
                    PUTS
                    LD R1, COUNT
            LOOP    ADD R1, R1, #-1
                    BRp LOOP
                    HALT
            MSG     .stringz \"done\"
            COUNT   .fill #3
            BUF     .blkw #4
            AFTER   .fill x5555
            .end
        ";
        let obj = assemble(src).unwrap();
        let sym = obj.symbol_table();
        let word_at = |label: &str| {
            let addr = sym.lookup_label(label).unwrap();
            obj.machine_code()[usize::from(addr - obj.orig())]
        };

        assert_eq!(word_at("START"), 0xE000 | 5); // LEA R0, #5
        assert_eq!(word_at("LOOP"), 0x127F);
        assert_eq!(word_at("MSG"), u16::from(b'd'));
        assert_eq!(word_at("COUNT"), 3);
        assert_eq!(word_at("BUF"), 0);
        assert_eq!(word_at("AFTER"), 0x5555);

        let labels: Vec<_> = sym.label_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["START", "LOOP", "MSG", "COUNT", "BUF", "AFTER"]);
    }

    #[test]
    fn test_decode_roundtrip() {
        let src = "
            .orig x3000
            TOP AND R0, R0, #0
                ADD R1, R2, R3
                NOT R4, R5
                LDR R6, R6, #-7
                STR R7, R0, #31
                LD R0, TOP
                LDI R1, TOP
                ST R2, TOP
                STI R3, TOP
                LEA R4, TOP
                BRnzp TOP
                JSR TOP
                JSRR R3
                JMP R2
                RET
                RTI
                TRAP x40
                NOP
                GETC
                OUT
                PUTS
                IN
                PUTSP
                HALT
            .end
        ";
        let obj = assemble(src).unwrap();
        for &word in obj.machine_code() {
            let op = decode(word);
            assert!(op.strict_valid, "x{word:04X} should be valid");
            assert_eq!(op.instr.encode(), word);
        }
    }

    #[test]
    fn test_label_errors() {
        let err = assemble(".orig x3000\nA HALT\nA HALT\n.end").unwrap_err();
        assert_eq!(err.kind, AsmErrKind::DuplicateLabel { label: "A".into(), addr: 0x3000 });
        assert_eq!(err.to_string(), "line 3: label name A already exists; it points to x3000");

        assert_asm_fail(
            assemble(".orig x3000\nA\nB HALT\n.end"),
            AsmErrKind::DuplicateAddress { label: "A".into(), addr: 0x3000 }
        );

        // case sensitive
        let obj = assemble(".orig x3000\nloop HALT\nLOOP HALT\n.end").unwrap();
        assert_eq!(obj.symbol_table().lookup_label("loop"), Some(0x3000));
        assert_eq!(obj.symbol_table().lookup_label("LOOP"), Some(0x3001));

        let err = assemble(".orig x3000\nLD R0, NOWHERE\n.end").unwrap_err();
        assert_eq!(err.kind.category(), ErrCategory::Semantic);
        assert_eq!(err.to_string(), "line 2: the offset 'NOWHERE' is not a valid numeric literal, but I can't find it in the symbol table either; did you misspell a label name?");
    }

    #[test]
    fn test_label_offset_range() {
        assert_asm_fail(
            assemble(".orig x3000\nBR FAR\n.blkw #300\nFAR HALT\n.end"),
            AsmErrKind::OffsetOutOfRange { bits: 9, value: 300 }
        );
        assert_asm_fail(
            assemble(".orig x3000\nBACK .blkw #256\nLEA R0, BACK\n.end"),
            AsmErrKind::OffsetOutOfRange { bits: 9, value: -257 }
        );
        // JSR reaches further
        assert!(assemble(".orig x3000\nJSR FAR\n.blkw #300\nFAR RET\n.end").is_ok());
    }

    #[test]
    fn test_memory_limit() {
        assert!(assemble(".orig xFFFF\nHALT\n.end").is_ok());

        let err = assemble(".orig xFFFF\nHALT\nHALT\n.end").unwrap_err();
        assert_eq!(err.kind, AsmErrKind::PastMemoryLimit(0x10001));
        assert_eq!(err.to_string(), "line 3: currently at address x10001, which is past the memory limit of x10000");

        // the label's next address would be past memory
        assert_asm_fail(assemble(".orig xFFFF\nHALT\nL .end"), AsmErrKind::PastMemoryLimit(0x10001));
        assert_asm_fail(assemble(".orig x3000\n.blkw xFFFF\n.end"), AsmErrKind::PastMemoryLimit(0x12FFF));
    }

    #[test]
    fn test_structure_errors() {
        assert_asm_fail(assemble(""), AsmErrKind::EmptyProgram);
        assert_asm_fail(assemble(".orig x3000\nHALT"), AsmErrKind::MissingEnd);
        assert_asm_fail(assemble("HALT\n.end"), AsmErrKind::MissingOrig);

        let err = assemble(".orig x3000\nHALT\nFOO BAR\n.end").unwrap_err();
        assert_eq!(err.kind, AsmErrKind::UnrecognizedInstr("BAR".into()));
        assert_eq!(err.span.line, 3);

        let err = assemble(".orig x3000\n.stringz \"\\q\"\n.end").unwrap_err();
        assert_eq!(err.kind.category(), ErrCategory::Lexical);
    }

    #[test]
    fn test_after_end_ignored() {
        let obj = assemble(".orig x3000\nHALT\n.end\nADD R0, R0, #100\nnot even code").unwrap();
        assert_eq!(obj.machine_code(), [0xF025]);
    }

    #[test]
    fn test_from_parts() {
        let obj = ObjectFile::from_parts(0x3000, vec![1, 2, 3], Default::default());
        let addrs: Vec<_> = obj.addr_iter().collect();
        assert_eq!(addrs, [(0x3000, 1), (0x3001, 2), (0x3002, 3)]);
        assert!(obj.symbol_table().is_empty());
    }
}
