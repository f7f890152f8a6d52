//! Numeric helpers shared by the assembler and the simulator.
//!
//! LC-3 words are stored unsigned (`u16`) and interpreted as two's-complement
//! when a signed value is needed. Everything here works modulo 2<sup>16</sup>.

/// Reduces an integer modulo 2<sup>16</sup> and reinterprets it as a signed 16-bit value.
///
/// ```
/// # use lc3_workbench::num::to_int16;
/// assert_eq!(to_int16(0xFFFF), -1);
/// assert_eq!(to_int16(0x1_0005), 5);
/// assert_eq!(to_int16(-32769), 32767);
/// ```
pub fn to_int16(n: i64) -> i16 {
    n as u16 as i16
}

/// Reduces an integer modulo 2<sup>16</sup>, returning its unsigned representation.
///
/// ```
/// # use lc3_workbench::num::to_uint16;
/// assert_eq!(to_uint16(-1), 0xFFFF);
/// assert_eq!(to_uint16(0x1_2345), 0x2345);
/// ```
pub fn to_uint16(n: i64) -> u16 {
    n as u16
}

/// Sign-extends the low `bits` bits of `n` to a signed 16-bit value.
///
/// Bits above `bits` are ignored.
///
/// ```
/// # use lc3_workbench::num::sign_extend16;
/// assert_eq!(sign_extend16(0b01111, 5), 15);
/// assert_eq!(sign_extend16(0b10000, 5), -16);
/// assert_eq!(sign_extend16(0xFFE1, 5), 1);
/// ```
///
/// # Panics
///
/// Panics if `bits` is not in `1..=16`.
pub fn sign_extend16(n: u16, bits: u32) -> i16 {
    assert!((1..=16).contains(&bits), "cannot sign extend a {bits}-bit field");
    let shift = 16 - bits;
    ((n << shift) as i16) >> shift
}

/// Formats a word as `x` followed by four uppercase hex digits.
///
/// ```
/// # use lc3_workbench::num::to_hex_string;
/// assert_eq!(to_hex_string(0x3000), "x3000");
/// assert_eq!(to_hex_string(0xa), "x000A");
/// ```
pub fn to_hex_string(n: u16) -> String {
    format!("x{n:04X}")
}

/// Parses a numeric literal as it appears in assembly source.
///
/// The accepted forms are:
/// - decimal: `#` followed by an optionally negated decimal number (`#12`, `#-3`)
/// - hex: `x` or `X` followed by an optionally negated hex number (`x3000`, `x-1F`)
/// - binary: `b` or `B` followed by an optionally negated binary number (`b101`, `B-1`)
///
/// Bare numbers (`12`) are not literals.
/// This returns `None` for text that is not a literal and
/// `Some(Err(_))` for literals that do not fit in an `i32`.
///
/// ```
/// # use lc3_workbench::num::parse_literal;
/// assert_eq!(parse_literal("#-12"), Some(Ok(-12)));
/// assert_eq!(parse_literal("xBEEF"), Some(Ok(0xBEEF)));
/// assert_eq!(parse_literal("b-101"), Some(Ok(-5)));
/// assert_eq!(parse_literal("12"), None);
/// assert_eq!(parse_literal("#--1"), None);
/// ```
pub fn parse_literal(text: &str) -> Option<Result<i32, std::num::ParseIntError>> {
    let mut chars = text.chars();
    let radix = match chars.next()? {
        '#' => 10,
        'x' | 'X' => 16,
        'b' | 'B' => 2,
        _ => return None
    };
    let rest = chars.as_str();
    let digits = rest.strip_prefix('-').unwrap_or(rest);
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    // sign and digits are parsed together so i32::MIN is reachable
    Some(i32::from_str_radix(rest, radix))
}

/// One of the three condition codes held in the low bits of the PSR.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ConditionCode {
    /// The last value written was negative.
    N,
    /// The last value written was zero.
    Z,
    /// The last value written was positive.
    P
}
impl ConditionCode {
    /// Gets the condition code that corresponds to the signed value of `word`.
    pub fn from_value(word: u16) -> Self {
        match (word as i16).cmp(&0) {
            std::cmp::Ordering::Less    => ConditionCode::N,
            std::cmp::Ordering::Equal   => ConditionCode::Z,
            std::cmp::Ordering::Greater => ConditionCode::P,
        }
    }

    /// Reads the condition code from a PSR value.
    ///
    /// This is `None` unless exactly one of the N, Z, and P bits is set.
    ///
    /// ```
    /// # use lc3_workbench::num::ConditionCode;
    /// assert_eq!(ConditionCode::from_psr(0x8002), Some(ConditionCode::Z));
    /// assert_eq!(ConditionCode::from_psr(0x0004), Some(ConditionCode::N));
    /// assert_eq!(ConditionCode::from_psr(0x0006), None);
    /// assert_eq!(ConditionCode::from_psr(0x8000), None);
    /// ```
    pub fn from_psr(psr: u16) -> Option<Self> {
        match psr & 0b111 {
            0b100 => Some(ConditionCode::N),
            0b010 => Some(ConditionCode::Z),
            0b001 => Some(ConditionCode::P),
            _ => None
        }
    }

    /// The PSR bit for this condition code (N = `0b100`, Z = `0b010`, P = `0b001`).
    pub fn bits(self) -> u16 {
        match self {
            ConditionCode::N => 0b100,
            ConditionCode::Z => 0b010,
            ConditionCode::P => 0b001,
        }
    }
}
impl std::fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionCode::N => f.write_str("N"),
            ConditionCode::Z => f.write_str("Z"),
            ConditionCode::P => f.write_str("P"),
        }
    }
}

/// Formats the condition code of a PSR value for display.
///
/// This is `"Invalid"` if the PSR does not hold exactly one condition code.
pub fn format_condition_code(psr: u16) -> String {
    match ConditionCode::from_psr(psr) {
        Some(cc) => cc.to_string(),
        None => String::from("Invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int16_roundtrip() {
        for x in [-70000i64, -65536, -32769, -32768, -1, 0, 1, 32767, 32768, 65535, 65536, 99999] {
            assert_eq!(to_int16(i64::from(to_uint16(x))), to_int16(x), "failed for {x}");
        }
    }

    #[test]
    fn test_sign_extend_ranges() {
        for bits in 1..=16u32 {
            let half = 1u32 << (bits - 1);
            let max_pos = (half - 1) as u16;
            let min_neg = half as u16;

            // sign bit clear
            for pat in [0, 1 & max_pos, max_pos] {
                let v = i32::from(sign_extend16(pat, bits));
                assert!((0..half as i32).contains(&v), "{bits}-bit {pat:#b} gave {v}");
            }
            // sign bit set
            assert_eq!(i32::from(sign_extend16(min_neg, bits)), -(half as i32));
            assert_eq!(sign_extend16(min_neg | max_pos, bits), -1);
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_literal("#0"), Some(Ok(0)));
        assert_eq!(parse_literal("#65535"), Some(Ok(65535)));
        assert_eq!(parse_literal("X-10"), Some(Ok(-16)));
        assert_eq!(parse_literal("B0110"), Some(Ok(6)));

        assert_eq!(parse_literal("#"), None);
        assert_eq!(parse_literal("x"), None);
        assert_eq!(parse_literal("x-"), None);
        assert_eq!(parse_literal("#1a"), None);
        assert_eq!(parse_literal("b102"), None);
        assert_eq!(parse_literal("xG"), None);
        assert_eq!(parse_literal("-#1"), None);
        assert_eq!(parse_literal("LABEL"), None);
        assert!(matches!(parse_literal("#99999999999"), Some(Err(_))));

        // the most negative literal of each radix
        assert_eq!(parse_literal("x-80000000"), Some(Ok(i32::MIN)));
        assert_eq!(parse_literal("#-2147483648"), Some(Ok(i32::MIN)));
        assert_eq!(parse_literal("b-10000000000000000000000000000000"), Some(Ok(i32::MIN)));
        assert!(matches!(parse_literal("x-80000001"), Some(Err(_))));
        assert!(matches!(parse_literal("x80000000"), Some(Err(_))));
    }

    #[test]
    fn test_condition_codes() {
        assert_eq!(ConditionCode::from_value(0), ConditionCode::Z);
        assert_eq!(ConditionCode::from_value(0x7FFF), ConditionCode::P);
        assert_eq!(ConditionCode::from_value(0x8000), ConditionCode::N);
        assert_eq!(format_condition_code(0x0001), "P");
        assert_eq!(format_condition_code(0x0007), "Invalid");
    }
}
