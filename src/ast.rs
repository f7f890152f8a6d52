//! Operand types shared by assembly statements and machine instructions.
//!
//! The statement types live in the submodules:
//! - [`asm`] holds what the parser produces ([`asm::AsmInstr`], [`asm::Directive`]),
//!   where an operand may still be an unresolved label.
//! - [`sim`] holds what a machine word decodes to ([`sim::SimInstr`]),
//!   where every operand is a concrete register or bit field.
//!
//! The operand types here are shared by both.

pub mod asm;
pub mod sim;

/// One of the eight general purpose registers, `R0` through `R7`.
///
/// Use the constants in [`reg_consts`], or [`Reg::try_from`] to check a register number.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Reg(pub(crate) u8);

/// The general purpose registers.
pub mod reg_consts {
    use super::Reg;

    #[allow(missing_docs)] pub const R0: Reg = Reg(0);
    #[allow(missing_docs)] pub const R1: Reg = Reg(1);
    #[allow(missing_docs)] pub const R2: Reg = Reg(2);
    #[allow(missing_docs)] pub const R3: Reg = Reg(3);
    #[allow(missing_docs)] pub const R4: Reg = Reg(4);
    #[allow(missing_docs)] pub const R5: Reg = Reg(5);
    /// Stack pointer, by convention.
    pub const R6: Reg = Reg(6);
    /// Return address of subroutine calls and traps.
    pub const R7: Reg = Reg(7);
}

impl Reg {
    /// The register's number (0 to 7).
    pub fn reg_no(self) -> u8 {
        self.0
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}
impl From<Reg> for usize {
    fn from(value: Reg) -> Self {
        usize::from(value.0)
    }
}

/// Error for a register number above 7.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RegOutOfRange(pub u8);
impl std::fmt::Display for RegOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "there is no register R{}", self.0)
    }
}
impl std::error::Error for RegOutOfRange {}

impl TryFrom<u8> for Reg {
    type Error = RegOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0..=7 => Ok(Reg(value)),
            n => Err(RegOutOfRange(n))
        }
    }
}

/// The `nzp` mask of a `BR` instruction (3 bits).
///
/// `0b100` tests negative, `0b010` tests zero, `0b001` tests positive.
/// `BR` alone means `0b111`. A mask of `0b000` never branches (this is `NOP`).
pub type CondCode = u8;

/// A signed `N`-bit field, such as `imm5`, `offset6`, or `PCoffset9`.
pub type IOffset<const N: u32> = Offset<i16, N>;

/// The unsigned 8-bit operand of `TRAP`.
pub type TrapVect8 = Offset<u16, 8>;

/// The second source operand of `ADD` and `AND` (or the target of `JSR`/`JSRR`).
///
/// ```text
/// ADD R1, R1, #1   ; Imm
/// ADD R1, R1, R2   ; Reg
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ImmOrReg<const N: u32> {
    #[allow(missing_docs)]
    Imm(IOffset<N>),
    #[allow(missing_docs)]
    Reg(Reg)
}
impl<const N: u32> std::fmt::Display for ImmOrReg<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImmOrReg::Imm(imm) => imm.fmt(f),
            ImmOrReg::Reg(reg) => reg.fmt(f),
        }
    }
}

/// Integer types that can hold the value of an [`Offset`].
///
/// Signed types hold sign-extended fields, unsigned types hold zero-extended fields.
pub trait OffsetBacking: Copy + Eq + Into<i64> {
    /// Whether the field is two's complement.
    const SIGNED: bool;
    /// The width of the type itself.
    const BITS: u32;

    /// Converts back from `i64`, discarding any bits the type cannot hold.
    fn from_i64_wrapping(n: i64) -> Self;
}
macro_rules! offset_backing {
    ($($Int:ty: $signed:literal),*) => {$(
        impl OffsetBacking for $Int {
            const SIGNED: bool = $signed;
            const BITS: u32 = <$Int>::BITS;

            fn from_i64_wrapping(n: i64) -> Self {
                n as $Int
            }
        }
    )*}
}
offset_backing! { u16: false, i16: true, i32: true }

/// An `N`-bit field, held in the integer type `OFF`.
///
/// The value always fits in `N` bits:
/// `[-2^(N-1), 2^(N-1))` for signed backings and `[0, 2^N)` for unsigned ones.
///
/// ```
/// use lc3_workbench::ast::Offset;
///
/// assert!(Offset::<i16, 5>::new(-16).is_some());
/// assert!(Offset::<i16, 5>::new(16).is_none());
/// assert!(Offset::<u16, 5>::new(31).is_some());
///
/// // wrapping keeps the low N bits
/// assert_eq!(Offset::<i16, 5>::new_trunc(16).get(), -16);
/// assert_eq!(Offset::<u16, 5>::new_trunc(32).get(), 0);
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Offset<OFF, const N: u32>(OFF);

impl<OFF: OffsetBacking, const N: u32> Offset<OFF, N> {
    fn range() -> std::ops::Range<i64> {
        debug_assert!(N <= OFF::BITS);
        match OFF::SIGNED {
            true  => -(1 << (N - 1)) .. (1 << (N - 1)),
            false => 0 .. (1 << N),
        }
    }

    /// Creates a field holding `n`, if `n` fits in `N` bits.
    pub fn new(n: OFF) -> Option<Self> {
        let value: i64 = n.into();
        Self::range().contains(&value).then_some(Offset(n))
    }

    /// Creates a field from the low `N` bits of `n`.
    ///
    /// This is how fields are read out of an encoded word.
    pub fn new_trunc(n: OFF) -> Self {
        let n: i64 = n.into();
        let low = n & ((1 << N) - 1);
        let value = match OFF::SIGNED && low >= 1 << (N - 1) {
            true  => low - (1 << N),
            false => low,
        };
        Offset(OFF::from_i64_wrapping(value))
    }

    /// The value of the field.
    pub fn get(&self) -> OFF {
        self.0
    }
}
impl<OFF: std::fmt::Display, const N: u32> std::fmt::Display for Offset<OFF, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An operand that is a literal field or a label to be resolved by the assembler.
///
/// For PC-relative operands (`BR`, `JSR`, `LD`, `LDI`, `LEA`, `ST`, `STI`),
/// a label becomes the distance from the incremented PC to the label.
/// For `.FILL` (backing `i32`, 17 bits), a label becomes the label's address.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum PCOffset<OFF, const N: u32> {
    #[allow(missing_docs)]
    Offset(Offset<OFF, N>),
    #[allow(missing_docs)]
    Label(Label)
}
impl<OFF, const N: u32> std::fmt::Display for PCOffset<OFF, N>
    where Offset<OFF, N>: std::fmt::Display
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PCOffset::Offset(off)  => off.fmt(f),
            PCOffset::Label(label) => label.fmt(f),
        }
    }
}

/// A label reference, with the columns it was written at.
///
/// Label names are case-sensitive.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Label {
    /// The name as written.
    pub name: String,
    cols: std::ops::Range<usize>
}
impl Label {
    /// Creates a label found at the given columns.
    pub fn new(name: String, cols: std::ops::Range<usize>) -> Self {
        Label { name, cols }
    }

    /// The columns the label occupies on its source line.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.cols.clone()
    }
}
impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
