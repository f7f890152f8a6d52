//! This module is used for holding simulation instructions ([`SimInstr`]),
//! which are instructions that directly map to bytecode.
//!
//! For instructions that map to assembly code, see [`asm::AsmInstr`].
//!
//! Machine words are turned into instructions with [`decode`],
//! and instructions are turned back into words with [`SimInstr::encode`].
//!
//! [`asm::AsmInstr`]: crate::ast::asm::AsmInstr
use std::fmt::Write as _;

use super::{CondCode, IOffset, ImmOrReg, Offset, Reg, TrapVect8};

const OP_BR: u16   = 0b0000;
const OP_ADD: u16  = 0b0001;
const OP_LD: u16   = 0b0010;
const OP_ST: u16   = 0b0011;
const OP_JSR: u16  = 0b0100;
const OP_AND: u16  = 0b0101;
const OP_LDR: u16  = 0b0110;
const OP_STR: u16  = 0b0111;
const OP_RTI: u16  = 0b1000;
const OP_NOT: u16  = 0b1001;
const OP_LDI: u16  = 0b1010;
const OP_STI: u16  = 0b1011;
const OP_JMP: u16  = 0b1100;
const OP_RESV: u16 = 0b1101;
const OP_LEA: u16  = 0b1110;
const OP_TRAP: u16 = 0b1111;

/// An enum representing all of the possible instructions in LC-3 bytecode.
///
/// The variants in this enum represent instructions after assembly passes.
/// There are no more aliases and labels have been resolved to offsets.
///
/// For instructions that map to typeable assembly code, refer to [`AsmInstr`].
///
/// [`AsmInstr`]: crate::ast::asm::AsmInstr
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SimInstr {
    #[allow(missing_docs)]
    BR(CondCode, IOffset<9>),
    #[allow(missing_docs)]
    ADD(Reg, Reg, ImmOrReg<5>),
    #[allow(missing_docs)]
    LD(Reg, IOffset<9>),
    #[allow(missing_docs)]
    ST(Reg, IOffset<9>),
    /// `JSR` (immediate offset) or `JSRR` (register).
    JSR(ImmOrReg<11>),
    #[allow(missing_docs)]
    AND(Reg, Reg, ImmOrReg<5>),
    #[allow(missing_docs)]
    LDR(Reg, Reg, IOffset<6>),
    #[allow(missing_docs)]
    STR(Reg, Reg, IOffset<6>),
    #[allow(missing_docs)]
    RTI,
    #[allow(missing_docs)]
    NOT(Reg, Reg),
    #[allow(missing_docs)]
    LDI(Reg, IOffset<9>),
    #[allow(missing_docs)]
    STI(Reg, IOffset<9>),
    /// `JMP` (and `RET`, which is `JMP R7`).
    JMP(Reg),
    /// The reserved opcode (`1101`). This executes as a no-op.
    Reserved,
    #[allow(missing_docs)]
    LEA(Reg, IOffset<9>),
    #[allow(missing_docs)]
    TRAP(TrapVect8),
}

impl SimInstr {
    /// Gets the opcode for the given instruction. This is always 4 bits.
    pub fn opcode(&self) -> u8 {
        let op = match self {
            SimInstr::BR(_, _)     => OP_BR,
            SimInstr::ADD(_, _, _) => OP_ADD,
            SimInstr::LD(_, _)     => OP_LD,
            SimInstr::ST(_, _)     => OP_ST,
            SimInstr::JSR(_)       => OP_JSR,
            SimInstr::AND(_, _, _) => OP_AND,
            SimInstr::LDR(_, _, _) => OP_LDR,
            SimInstr::STR(_, _, _) => OP_STR,
            SimInstr::RTI          => OP_RTI,
            SimInstr::NOT(_, _)    => OP_NOT,
            SimInstr::LDI(_, _)    => OP_LDI,
            SimInstr::STI(_, _)    => OP_STI,
            SimInstr::JMP(_)       => OP_JMP,
            SimInstr::Reserved     => OP_RESV,
            SimInstr::LEA(_, _)    => OP_LEA,
            SimInstr::TRAP(_)      => OP_TRAP,
        };
        op as u8
    }

    /// The mnemonic of this instruction.
    ///
    /// This distinguishes `JSR`/`JSRR` and `JMP`/`RET`, but not the branch conditions of `BR`.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            SimInstr::BR(_, _)     => "BR",
            SimInstr::ADD(_, _, _) => "ADD",
            SimInstr::LD(_, _)     => "LD",
            SimInstr::ST(_, _)     => "ST",
            SimInstr::JSR(ImmOrReg::Imm(_)) => "JSR",
            SimInstr::JSR(ImmOrReg::Reg(_)) => "JSRR",
            SimInstr::AND(_, _, _) => "AND",
            SimInstr::LDR(_, _, _) => "LDR",
            SimInstr::STR(_, _, _) => "STR",
            SimInstr::RTI          => "RTI",
            SimInstr::NOT(_, _)    => "NOT",
            SimInstr::LDI(_, _)    => "LDI",
            SimInstr::STI(_, _)    => "STI",
            SimInstr::JMP(br) if br.reg_no() == 7 => "RET",
            SimInstr::JMP(_)       => "JMP",
            SimInstr::Reserved     => "RESERVED",
            SimInstr::LEA(_, _)    => "LEA",
            SimInstr::TRAP(_)      => "TRAP",
        }
    }

    /// The addressing mode of this instruction, with its mode-specific fields.
    pub fn mode(&self) -> AddrMode {
        match *self {
            | SimInstr::BR(_, off)
            | SimInstr::LD(_, off)
            | SimInstr::ST(_, off)
            | SimInstr::LDI(_, off)
            | SimInstr::STI(_, off)
            | SimInstr::LEA(_, off) => AddrMode::PcOffset(off.get()),
            SimInstr::JSR(ImmOrReg::Imm(off)) => AddrMode::PcOffset(off.get()),
            | SimInstr::LDR(_, br, off)
            | SimInstr::STR(_, br, off) => AddrMode::BaseOffset(br, off.get()),
            SimInstr::TRAP(vect) => AddrMode::Trap(vect.get() as u8),
            | SimInstr::ADD(..)
            | SimInstr::AND(..)
            | SimInstr::NOT(..)
            | SimInstr::JSR(ImmOrReg::Reg(_))
            | SimInstr::JMP(_)
            | SimInstr::RTI
            | SimInstr::Reserved => AddrMode::None,
        }
    }

    /// Encodes this instruction as a machine word.
    ///
    /// ```
    /// # use lc3_workbench::ast::sim::SimInstr;
    /// # use lc3_workbench::ast::{ImmOrReg, Offset};
    /// # use lc3_workbench::ast::reg_consts::R0;
    /// let instr = SimInstr::ADD(R0, R0, ImmOrReg::Imm(Offset::new(5).unwrap()));
    /// assert_eq!(instr.encode(), 0x1025);
    /// ```
    pub fn encode(&self) -> u16 {
        let opcode = u16::from(self.opcode()) << 12;
        let reg = |r: Reg, shift: u32| u16::from(r.reg_no()) << shift;
        let field = |n: i16, bits: u32| (n as u16) & ((1 << bits) - 1);

        let operands = match *self {
            SimInstr::BR(cc, off) => u16::from(cc & 0b111) << 9 | field(off.get(), 9),
            | SimInstr::ADD(dr, sr1, sr2)
            | SimInstr::AND(dr, sr1, sr2) => reg(dr, 9) | reg(sr1, 6) | match sr2 {
                ImmOrReg::Imm(imm) => 1 << 5 | field(imm.get(), 5),
                ImmOrReg::Reg(sr2) => reg(sr2, 0),
            },
            | SimInstr::LD(r, off)
            | SimInstr::ST(r, off)
            | SimInstr::LDI(r, off)
            | SimInstr::STI(r, off)
            | SimInstr::LEA(r, off) => reg(r, 9) | field(off.get(), 9),
            SimInstr::JSR(ImmOrReg::Imm(off)) => 1 << 11 | field(off.get(), 11),
            SimInstr::JSR(ImmOrReg::Reg(br)) => reg(br, 6),
            | SimInstr::LDR(r, br, off)
            | SimInstr::STR(r, br, off) => reg(r, 9) | reg(br, 6) | field(off.get(), 6),
            SimInstr::NOT(dr, sr) => reg(dr, 9) | reg(sr, 6) | 0b111111,
            SimInstr::JMP(br) => reg(br, 6),
            SimInstr::TRAP(vect) => vect.get() & 0xFF,
            SimInstr::RTI | SimInstr::Reserved => 0,
        };

        opcode | operands
    }
}
impl std::fmt::Display for SimInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BR(0, off) if off.get() == 0 => f.write_str("NOP"),
            // no assembly spelling has an empty mask and a target
            Self::BR(0, _) => write!(f, ".FILL {}", crate::num::to_hex_string(self.encode())),
            Self::BR(cc, off) => {
                f.write_str("BR")?;
                if cc & 0b100 != 0 { f.write_char('n')?; };
                if cc & 0b010 != 0 { f.write_char('z')?; };
                if cc & 0b001 != 0 { f.write_char('p')?; };
                write!(f, " {off}")
            },
            Self::ADD(dr, sr1, sr2) => write!(f, "ADD {dr}, {sr1}, {sr2}"),
            Self::LD(dr, off) => write!(f, "LD {dr}, {off}"),
            Self::ST(sr, off) => write!(f, "ST {sr}, {off}"),
            Self::JSR(ImmOrReg::Imm(off)) => write!(f, "JSR {off}"),
            Self::JSR(ImmOrReg::Reg(br)) => write!(f, "JSRR {br}"),
            Self::AND(dr, sr1, sr2) => write!(f, "AND {dr}, {sr1}, {sr2}"),
            Self::LDR(dr, br, off) => write!(f, "LDR {dr}, {br}, {off}"),
            Self::STR(sr, br, off) => write!(f, "STR {sr}, {br}, {off}"),
            Self::RTI => f.write_str("RTI"),
            Self::NOT(dr, sr) => write!(f, "NOT {dr}, {sr}"),
            Self::LDI(dr, off) => write!(f, "LDI {dr}, {off}"),
            Self::STI(sr, off) => write!(f, "STI {sr}, {off}"),
            Self::JMP(br) if br.reg_no() == 7 => f.write_str("RET"),
            Self::JMP(br) => write!(f, "JMP {br}"),
            Self::Reserved => f.write_str("RESERVED"),
            Self::LEA(dr, off) => write!(f, "LEA {dr}, {off}"),
            Self::TRAP(vect) => write!(f, "TRAP x{:02X}", vect.get()),
        }
    }
}

/// The addressing mode of an instruction, holding the fields needed to compute its effective address.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AddrMode {
    /// The instruction does not access memory through an offset.
    None,
    /// The effective address is `PC + offset` (with the incremented PC).
    PcOffset(i16),
    /// The effective address is `base register + offset`.
    BaseOffset(Reg, i16),
    /// The effective address is the trap vector itself (an index into the trap vector table).
    Trap(u8),
}

/// The result of decoding a machine word.
///
/// Every word decodes to some instruction. Words that no assembler would produce
/// (the reserved opcode, or nonzero bits where the encoding requires zeros)
/// are marked as not strictly valid, but still carry the fields they would be executed with.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct OpDescriptor {
    /// The raw word.
    pub raw: u16,
    /// The decoded instruction.
    pub instr: SimInstr,
    /// Whether this word is a legal encoding of `instr`.
    pub strict_valid: bool
}
impl OpDescriptor {
    /// The opcode of the instruction (bits 12-15 of the word).
    pub fn opcode(&self) -> u8 {
        self.instr.opcode()
    }
    /// The mnemonic of the instruction.
    pub fn mnemonic(&self) -> &'static str {
        self.instr.mnemonic()
    }
    /// The addressing mode of the instruction.
    pub fn mode(&self) -> AddrMode {
        self.instr.mode()
    }
}
impl std::fmt::Display for OpDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.instr.fmt(f)
    }
}

/// Decodes a machine word.
///
/// ```
/// # use lc3_workbench::ast::sim::{decode, AddrMode};
/// let op = decode(0x0401); // BRz #1
/// assert!(op.strict_valid);
/// assert_eq!(op.mnemonic(), "BR");
/// assert_eq!(op.mode(), AddrMode::PcOffset(1));
/// assert_eq!(op.to_string(), "BRz #1");
///
/// let op = decode(0x1018); // ADD R0, R0, R0 with bits 3 and 4 set
/// assert!(!op.strict_valid);
/// assert_eq!(op.to_string(), "ADD R0, R0, R0");
/// ```
pub fn decode(word: u16) -> OpDescriptor {
    let reg = |shift: u32| Reg(((word >> shift) & 0b111) as u8);
    let zero = |mask: u16| word & mask == 0;

    let (instr, strict_valid) = match word >> 12 {
        OP_BR => (SimInstr::BR(((word >> 9) & 0b111) as u8, Offset::new_trunc(word as i16)), true),
        op @ (OP_ADD | OP_AND) => {
            let (sr2, valid) = match word & 0x0020 != 0 {
                true  => (ImmOrReg::Imm(Offset::new_trunc(word as i16)), true),
                false => (ImmOrReg::Reg(reg(0)), zero(0x0018)),
            };
            let instr = match op {
                OP_ADD => SimInstr::ADD(reg(9), reg(6), sr2),
                _      => SimInstr::AND(reg(9), reg(6), sr2),
            };
            (instr, valid)
        },
        OP_LD  => (SimInstr::LD(reg(9), Offset::new_trunc(word as i16)), true),
        OP_ST  => (SimInstr::ST(reg(9), Offset::new_trunc(word as i16)), true),
        OP_JSR => match word & 0x0800 != 0 {
            true  => (SimInstr::JSR(ImmOrReg::Imm(Offset::new_trunc(word as i16))), true),
            false => (SimInstr::JSR(ImmOrReg::Reg(reg(6))), zero(0x063F)),
        },
        OP_LDR => (SimInstr::LDR(reg(9), reg(6), Offset::new_trunc(word as i16)), true),
        OP_STR => (SimInstr::STR(reg(9), reg(6), Offset::new_trunc(word as i16)), true),
        OP_RTI => (SimInstr::RTI, zero(0x0FFF)),
        OP_NOT => (SimInstr::NOT(reg(9), reg(6)), word & 0x003F == 0x003F),
        OP_LDI => (SimInstr::LDI(reg(9), Offset::new_trunc(word as i16)), true),
        OP_STI => (SimInstr::STI(reg(9), Offset::new_trunc(word as i16)), true),
        OP_JMP => (SimInstr::JMP(reg(6)), zero(0x0E3F)),
        OP_LEA => (SimInstr::LEA(reg(9), Offset::new_trunc(word as i16)), true),
        OP_TRAP => (SimInstr::TRAP(Offset::new_trunc(word)), zero(0x0F00)),
        _ => (SimInstr::Reserved, false),
    };

    OpDescriptor { raw: word, instr, strict_valid }
}

/// Renders a machine word as assembly.
///
/// Words that are not strictly valid instructions are rendered as `.FILL` data,
/// and the OS traps are rendered by their alias.
///
/// ```
/// # use lc3_workbench::ast::sim::disassemble;
/// assert_eq!(disassemble(0x1025), "ADD R0, R0, #5");
/// assert_eq!(disassemble(0xF025), "HALT");
/// assert_eq!(disassemble(0xF0FF), "TRAP xFF");
/// assert_eq!(disassemble(0xD000), ".FILL xD000");
/// ```
pub fn disassemble(word: u16) -> String {
    let op = decode(word);
    if !op.strict_valid {
        return format!(".FILL {}", crate::num::to_hex_string(word));
    }

    match op.instr {
        SimInstr::TRAP(vect) => match vect.get() {
            0x20 => "GETC".to_string(),
            0x21 => "OUT".to_string(),
            0x22 => "PUTS".to_string(),
            0x23 => "IN".to_string(),
            0x24 => "PUTSP".to_string(),
            0x25 => "HALT".to_string(),
            _ => op.to_string(),
        },
        _ => op.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::{R0, R1, R2, R5, R6, R7};
    use crate::ast::{ImmOrReg, Offset};

    use super::{decode, disassemble, AddrMode, SimInstr};

    #[test]
    fn test_encode() {
        assert_eq!(SimInstr::ADD(R0, R0, ImmOrReg::Imm(Offset::new(5).unwrap())).encode(), 0x1025);
        assert_eq!(SimInstr::AND(R1, R2, ImmOrReg::Reg(R5)).encode(), 0x5285);
        assert_eq!(SimInstr::BR(0b010, Offset::new(1).unwrap()).encode(), 0x0401);
        assert_eq!(SimInstr::BR(0b111, Offset::new(-1).unwrap()).encode(), 0x0FFF);
        assert_eq!(SimInstr::NOT(R0, R1).encode(), 0x907F);
        assert_eq!(SimInstr::JMP(R7).encode(), 0xC1C0);
        assert_eq!(SimInstr::JSR(ImmOrReg::Imm(Offset::new(-1024).unwrap())).encode(), 0x4C00);
        assert_eq!(SimInstr::JSR(ImmOrReg::Reg(R6)).encode(), 0x4180);
        assert_eq!(SimInstr::LDR(R0, R6, Offset::new(-32).unwrap()).encode(), 0x61A0);
        assert_eq!(SimInstr::TRAP(Offset::new(0x25).unwrap()).encode(), 0xF025);
        assert_eq!(SimInstr::RTI.encode(), 0x8000);
    }

    #[test]
    fn test_decode_fields() {
        let op = decode(0x1FBF); // ADD R7, R6, #-1
        assert_eq!(op.instr, SimInstr::ADD(R7, R6, ImmOrReg::Imm(Offset::new(-1).unwrap())));
        assert_eq!(op.mode(), AddrMode::None);

        let op = decode(0x6D82); // LDR R6, R6, #2
        assert_eq!(op.mode(), AddrMode::BaseOffset(R6, 2));

        let op = decode(0xF023);
        assert_eq!(op.mode(), AddrMode::Trap(0x23));

        let op = decode(0x2FFF); // LD R7, #-1
        assert_eq!(op.mode(), AddrMode::PcOffset(-1));
        assert_eq!(op.opcode(), 0b0010);
    }

    #[test]
    fn test_strict_validity() {
        assert!(!decode(0x1008).strict_valid); // ADD reg mode, bit 3
        assert!(!decode(0x5010).strict_valid); // AND reg mode, bit 4
        assert!(!decode(0xC1C1).strict_valid); // JMP with low bit
        assert!(!decode(0xC3C0).strict_valid); // JMP with bit 9
        assert!(!decode(0x4200).strict_valid); // JSRR with bit 9
        assert!(!decode(0x9000).strict_valid); // NOT with low bits clear
        assert!(!decode(0x8001).strict_valid); // RTI with operand bits
        assert!(!decode(0xF125).strict_valid); // TRAP with bit 8
        assert!(!decode(0xD000).strict_valid); // reserved
        assert_eq!(decode(0xD123).instr, SimInstr::Reserved);

        assert!(decode(0xC1C0).strict_valid);
        assert!(decode(0x4180).strict_valid);
        assert!(decode(0x0000).strict_valid);
    }

    #[test]
    fn test_valid_roundtrip() {
        // Every legal encoding re-encodes to itself.
        for word in 0..=u16::MAX {
            let op = decode(word);
            if op.strict_valid {
                assert_eq!(op.instr.encode(), word, "{word:04X} decoded to {}", op.instr);
            }
        }
    }

    #[test]
    fn test_disassemble() {
        assert_eq!(disassemble(0x0000), "NOP");
        assert_eq!(disassemble(0x0E02), "BRnzp #2");
        assert_eq!(disassemble(0x0401), "BRz #1");
        assert_eq!(disassemble(0x5020), "AND R0, R0, #0");
        assert_eq!(disassemble(0xC1C0), "RET");
        assert_eq!(disassemble(0xC080), "JMP R2");
        assert_eq!(disassemble(0x4080), "JSRR R2");
        assert_eq!(disassemble(0x4FFF), "JSR #-1");
        assert_eq!(disassemble(0x7141), "STR R0, R5, #1");
        assert_eq!(disassemble(0xF020), "GETC");
        assert_eq!(disassemble(0xF026), "TRAP x26");
        assert_eq!(disassemble(0x1018), ".FILL x1018");
    }

    #[test]
    fn test_empty_mask_branch() {
        // an empty-mask branch never jumps, so it must not read back as BR (BRnzp)
        assert_eq!(disassemble(0x0005), ".FILL x0005");
        assert_eq!(disassemble(0x01FF), ".FILL x01FF");
        assert_eq!(decode(0x0005).instr.to_string(), ".FILL x0005");
        assert!(decode(0x0005).strict_valid);
    }
}
