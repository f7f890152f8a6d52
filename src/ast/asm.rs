//! This module holds the AST for statements from assembly source code.
//!
//! For instructions that map to bytecode instructions
//! (i.e., the nodes in this module should be converted to a [`SimInstr`]), see [`sim`].
//!
//! Useful structs in this module include:
//! - [`AsmInstr`]: An enum of all possible assembly source code instructions
//! - [`Directive`]: An enum of all possible assembly source code directives
//! - [`Stmt`]: A single parsed source line (label, instruction/directive)
//!
//! [`SimInstr`]: crate::ast::sim::SimInstr
//! [`sim`]: crate::ast::sim
use std::fmt::Write as _;

use super::{CondCode, IOffset, ImmOrReg, PCOffset, Reg, TrapVect8};

/// An enum representing all of the possible instructions in LC-3 assembly code.
///
/// The variants in this enum represent instructions before assembly passes.
/// Label operands have not been resolved yet.
///
/// For instructions that map to bytecode, see [`SimInstr`].
///
/// [`SimInstr`]: crate::ast::sim::SimInstr
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmInstr {
    /// An ADD instruction.
    ///
    /// # Operation
    ///
    /// Evaluates the two operands, adds them, and stores the result to the destination register (`DR`).
    /// This also sets the condition code for the LC-3 machine.
    ///
    /// # Syntax
    /// - `ADD DR, SR1, SR2`
    /// - `ADD DR, SR1, imm5`
    ADD(Reg, Reg, ImmOrReg<5>),

    /// An AND instruction.
    ///
    /// # Operation
    ///
    /// Evaluates the two operands, bitwise ANDs them, and stores the result to the destination register (`DR`).
    /// This also sets the condition code for the LC-3 machine.
    ///
    /// # Syntax
    /// - `AND DR, SR1, SR2`
    /// - `AND DR, SR1, imm5`
    AND(Reg, Reg, ImmOrReg<5>),

    /// A BR instruction.
    ///
    /// # Operation
    ///
    /// Checks the current condition code and branches to the given `PCOffset9`
    /// if the condition code matches one of the provided condition codes of the instruction.
    ///
    /// # Syntax
    /// - `BR PCOffset9` (equivalent to `BRnzp`),
    /// - `BRn PCOffset9`
    /// - `BRz PCOffset9`
    /// - `BRnz PCOffset9`
    /// - `BRp PCOffset9`
    /// - `BRnp PCOffset9`
    /// - `BRzp PCOffset9`
    /// - `BRnzp PCOffset9`
    BR(CondCode, PCOffset<i16, 9>),

    /// A JMP instruction.
    ///
    /// # Operation
    ///
    /// Unconditionally jumps to the location stored in the given register (`BR`).
    ///
    /// # Syntax
    /// - `JMP BR`
    JMP(Reg),

    /// A JSR instruction.
    ///
    /// # Operation
    ///
    /// Jumps to a given subroutine. This saves the PC into R7.
    ///
    /// # Syntax
    /// - `JSR PCOffset11`
    JSR(PCOffset<i16, 11>),

    /// A JSRR instruction.
    ///
    /// # Operation
    ///
    /// Jumps to a given subroutine (whose address is in the base register). This saves the PC into R7.
    ///
    /// # Syntax
    /// - `JSRR BR`
    JSRR(Reg),

    /// A LD instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`PC + PCOffset9`), accesses the memory at that address,
    /// and stores it to the destination register (`DR`).
    ///
    /// # Syntax
    /// - `LD DR, PCOffset9`
    LD(Reg, PCOffset<i16, 9>),

    /// A LDI instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`mem[PC + PCOffset9]`), accesses the memory at that address,
    /// and stores it to the destination register (`DR`).
    ///
    /// # Syntax
    /// - `LDI DR, PCOffset9`
    LDI(Reg, PCOffset<i16, 9>),

    /// A LDR instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`mem[BR + offset6]`), accesses the memory at that address,
    /// and stores it to the destination register (`DR`).
    ///
    /// # Syntax
    /// - `LDR DR, BR, offset6`
    LDR(Reg, Reg, IOffset<6>),

    /// A LEA instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`PC + PCOffset9`) and stores it to the destination register (`DR`).
    ///
    /// # Syntax
    /// - `LEA DR, PCOffset9`
    LEA(Reg, PCOffset<i16, 9>),

    /// A NOT instruction.
    ///
    /// # Operation
    ///
    /// Bitwise NOTs the value stored in the source register (`SR`),
    /// and stores the result to the destination register (`DR`).
    ///
    /// # Syntax
    /// - `NOT DR, SR`
    NOT(Reg, Reg),

    /// A RET instruction.
    ///
    /// # Operation
    ///
    /// Returns from a subroutine. This is an alias for `JMP R7`.
    ///
    /// # Syntax
    /// - `RET`
    RET,

    /// A RTI instruction.
    ///
    /// # Operation
    ///
    /// Returns from a trap or interrupt, popping the PC and then the PSR off the stack in R6.
    ///
    /// # Syntax
    /// - `RTI`
    RTI,

    /// A ST instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`PC + PCOffset9`), and writes the value from the source register (`SR`)
    /// into the memory at that address,
    ///
    /// # Syntax
    /// - `ST SR, PCOffset9`
    ST(Reg, PCOffset<i16, 9>),

    /// A STI instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`mem[PC + PCOffset9]`), and writes the value from the source register (`SR`)
    /// into the memory at that address,
    ///
    /// # Syntax
    /// - `STI SR, PCOffset9`
    STI(Reg, PCOffset<i16, 9>),

    /// A STR instruction.
    ///
    /// # Operation
    ///
    /// Computes an effective address (`mem[BR + offset6]`), and writes the value from the source register (`SR`)
    /// into the memory at that address,
    ///
    /// # Syntax
    /// - `STR SR, BR, offset6`
    STR(Reg, Reg, IOffset<6>),

    /// A TRAP instruction.
    ///
    /// # Operation
    ///
    /// Executes the trap with the given trap vector `TrapVect8`.
    ///
    /// # Syntax
    /// - `TRAP TrapVect8`
    TRAP(TrapVect8),

    /* ALIASES AND TRAPS */

    /// A NOP instruction.
    ///
    /// # Operation
    ///
    /// Does nothing. This encodes as an all-clear `BR` with a zero offset.
    ///
    /// # Syntax
    /// - `NOP`
    NOP,

    /// A GETC instruction.
    ///
    /// # Operation
    ///
    /// Gets a character from the keyboard, and store it into R0 (with the high 8 bits cleared).
    /// This is an alias for `TRAP x20`.
    ///
    /// # Syntax
    /// - `GETC`
    GETC,

    /// An OUT instruction.
    ///
    /// # Operation
    ///
    /// Writes a character from `R0[7:0]` to the display. This is an alias for `TRAP x21`.
    ///
    /// # Syntax
    /// - `OUT`
    OUT,

    /// A PUTS instruction.
    ///
    /// # Operation
    ///
    /// Prints characters in consecutive memory locations until a x00 character is read.
    /// This starts with the memory location pointed to by the address in `R0`.
    ///
    /// This is an alias for `TRAP x22`.
    ///
    /// # Syntax
    /// - `PUTS`
    PUTS,

    /// An IN instruction.
    ///
    /// # Operation
    ///
    /// Prompts the user for a character, stores the character into `R0` (with the high 8 bits cleared).
    /// Additionally, this prints the obtained character onto the display.
    ///
    /// This is an alias for `TRAP x23`.
    ///
    /// # Syntax
    /// - `IN`
    IN,

    /// A PUTSP instruction.
    ///
    /// # Operation
    ///
    /// Prints characters (two characters per memory location) until a x00 character is read.
    /// This starts with the memory location pointed to by the address in `R0`.
    /// This first prints the character in the low 8 bits, and then the character in the high 8 bits.
    ///
    /// This is an alias for `TRAP x24`.
    ///
    /// # Syntax
    /// - `PUTSP`
    PUTSP,

    /// A HALT instruction.
    ///
    /// # Operation
    ///
    /// Stops execution of the program. This is an alias for `TRAP x25`.
    ///
    /// # Syntax
    /// - `HALT`
    HALT,
}
impl std::fmt::Display for AsmInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ADD(dr, sr1, sr2) => write!(f, "ADD {dr}, {sr1}, {sr2}"),
            Self::AND(dr, sr1, sr2) => write!(f, "AND {dr}, {sr1}, {sr2}"),
            Self::BR(cc, off) => {
                f.write_str("BR")?;
                if cc & 0b100 != 0 { f.write_char('n')?; };
                if cc & 0b010 != 0 { f.write_char('z')?; };
                if cc & 0b001 != 0 { f.write_char('p')?; };
                write!(f, " {off}")
            },
            Self::JMP(br) => write!(f, "JMP {br}"),
            Self::JSR(off) => write!(f, "JSR {off}"),
            Self::JSRR(br) => write!(f, "JSRR {br}"),
            Self::LD(dr, off) => write!(f, "LD {dr}, {off}"),
            Self::LDI(dr, off) => write!(f, "LDI {dr}, {off}"),
            Self::LDR(dr, br, off) => write!(f, "LDR {dr}, {br}, {off}"),
            Self::LEA(dr, off) => write!(f, "LEA {dr}, {off}"),
            Self::NOT(dr, sr) => write!(f, "NOT {dr}, {sr}"),
            Self::RET   => f.write_str("RET"),
            Self::RTI   => f.write_str("RTI"),
            Self::ST(sr, off) => write!(f, "ST {sr}, {off}"),
            Self::STI(sr, off) => write!(f, "STI {sr}, {off}"),
            Self::STR(sr, br, off) => write!(f, "STR {sr}, {br}, {off}"),
            Self::TRAP(vect) => write!(f, "TRAP x{:02X}", vect.get()),
            Self::NOP   => f.write_str("NOP"),
            Self::GETC  => f.write_str("GETC"),
            Self::OUT   => f.write_str("OUT"),
            Self::PUTS  => f.write_str("PUTS"),
            Self::IN    => f.write_str("IN"),
            Self::PUTSP => f.write_str("PUTSP"),
            Self::HALT  => f.write_str("HALT"),
        }
    }
}

/// An enum representing all possible directives in LC-3 assembly code
/// (other than `.ORIG`, which is consumed before statements are parsed).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Directive {
    /// A `.fill` directive.
    ///
    /// # Operation
    ///
    /// Writes the given value (or the address of the given label) to the current location.
    ///
    /// # Syntax
    /// - `.fill imm16`
    /// - `.fill LABEL`
    Fill(PCOffset<i32, 17>),

    /// A `.blkw` directive.
    ///
    /// # Operation
    ///
    /// Writes `n` zero words.
    ///
    /// # Syntax
    /// - `.blkw n`
    Blkw(u32),

    /// A `.stringz` directive.
    ///
    /// # Operation
    ///
    /// Writes a null-terminated string, one character per word.
    ///
    /// # Syntax
    /// - `.stringz "A string literal"`
    Stringz(String),

    /// A `.end` directive.
    ///
    /// # Operation
    ///
    /// Ends the program. Anything after it is ignored.
    ///
    /// # Syntax
    /// - `.end`
    End,
}
impl Directive {
    /// How many words this directive takes up in memory.
    pub fn word_len(&self) -> u32 {
        match self {
            Directive::Fill(_)    => 1,
            Directive::Blkw(n)    => *n,
            Directive::Stringz(s) => s.encode_utf16().count() as u32 + 1,
            Directive::End        => 0,
        }
    }
}
impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fill(val)     => write!(f, ".fill {val}"),
            Self::Blkw(n)       => write!(f, ".blkw #{n}"),
            Self::Stringz(val)  => write!(f, ".stringz {val:?}"),
            Self::End           => f.write_str(".end"),
        }
    }
}

/// Either an instruction or a directive.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum StmtKind {
    #[allow(missing_docs)]
    Instr(AsmInstr),
    #[allow(missing_docs)]
    Directive(Directive)
}
impl StmtKind {
    /// How many words this statement takes up in memory.
    pub fn word_len(&self) -> u32 {
        match self {
            StmtKind::Instr(_)     => 1,
            StmtKind::Directive(d) => d.word_len(),
        }
    }
}
impl std::fmt::Display for StmtKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StmtKind::Instr(i) => i.fmt(f),
            StmtKind::Directive(d) => d.fmt(f),
        }
    }
}

/// A single parsed source line.
///
/// A line may hold a label, a command (instruction or directive), or both.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Stmt {
    /// The label at the start of this line (if present).
    pub label: Option<super::Label>,
    /// The instruction or directive on this line (if present).
    pub nucleus: Option<StmtKind>,
    /// The line number of this statement (1-indexed).
    pub line: usize
}
impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.label, &self.nucleus) {
            (Some(label), Some(nucleus)) => write!(f, "{label} {nucleus}"),
            (Some(label), None) => label.fmt(f),
            (None, Some(nucleus)) => nucleus.fmt(f),
            (None, None) => Ok(()),
        }
    }
}
