//! Formatters which can read and write object files.
//!
//! The [`ObjFileFormat`] trait describes an implementation of reading/writing object files.
//! This module provides two implementations of the trait:
//! - [`ObjectFormat`]: the machine code of an object file, as big-endian words
//! - [`SymbolFormat`]: the symbol table of an object file, as a text table

use super::{ObjectFile, SymbolTable};

/// A trait defining object file formats.
pub trait ObjFileFormat {
    /// Representation of the serialized format.
    ///
    /// For binary formats, `[u8]` should be used.
    /// For text-based formats,`str` should be used.
    type Stream: ToOwned + ?Sized;
    /// The data read back from the stream.
    type Output;

    /// Serializes into the stream format.
    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned;
    /// Deserializes from the stream format, returning `None`
    /// if an error occurred during deserialization.
    fn deserialize(i: &Self::Stream) -> Option<Self::Output>;
}

/// The machine code of an object file.
///
/// This is the origin followed by each word of the object file,
/// all in big-endian order.
///
/// ```
/// use lc3_workbench::asm::assemble;
/// use lc3_workbench::asm::encoding::{ObjFileFormat, ObjectFormat};
///
/// let obj = assemble(".orig x3000\nADD R0, R0, #5\nHALT\n.end").unwrap();
/// let bytes = ObjectFormat::serialize(&obj);
/// assert_eq!(bytes, [0x30, 0x00, 0x10, 0x25, 0xF0, 0x25]);
///
/// let (orig, words) = ObjectFormat::deserialize(&bytes).unwrap();
/// assert_eq!(orig, 0x3000);
/// assert_eq!(words, [0x1025, 0xF025]);
/// ```
pub struct ObjectFormat;

impl ObjFileFormat for ObjectFormat {
    type Stream = [u8];
    type Output = (u16, Vec<u16>);

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        std::iter::once(o.orig())
            .chain(o.machine_code().iter().copied())
            .flat_map(u16::to_be_bytes)
            .collect()
    }

    fn deserialize(bytes: &Self::Stream) -> Option<Self::Output> {
        if bytes.len() % 2 != 0 { return None; }

        let mut words = bytes.chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]));

        let orig = words.next()?;
        Some((orig, words.collect()))
    }
}

/// The symbol table of an object file.
///
/// This is a text table, with every line prefixed with `//`.
/// After a two line header, each line contains a label and its address (in hex),
/// sorted by address.
///
/// ```
/// use lc3_workbench::asm::assemble;
/// use lc3_workbench::asm::encoding::{ObjFileFormat, SymbolFormat};
///
/// let obj = assemble(".orig x3000\nLOOP BR LOOP\nDONE HALT\n.end").unwrap();
/// let text = SymbolFormat::serialize(&obj);
/// assert!(text.ends_with("//\tLOOP              3000\n//\tDONE              3001\n"));
///
/// let sym = SymbolFormat::deserialize(&text).unwrap();
/// assert_eq!(sym.lookup_label("DONE"), Some(0x3001));
/// ```
pub struct SymbolFormat;

const SFMT_HEADER: &str = "//Symbol Name\t\tPage Address\n//----------------\t------------\n";

impl ObjFileFormat for SymbolFormat {
    type Stream = str;
    type Output = SymbolTable;

    fn serialize(o: &ObjectFile) -> <Self::Stream as ToOwned>::Owned {
        let mut buf = String::from(SFMT_HEADER);
        for (label, addr) in o.symbol_table().label_iter() {
            buf.push_str(&format!("//\t{label:<16}  {addr:04X}\n"));
        }
        buf
    }

    fn deserialize(text: &Self::Stream) -> Option<Self::Output> {
        let mut sym = SymbolTable::default();

        for line in text.lines() {
            let entry = line.strip_prefix("//")?;
            // header lines have no tab prefix
            let Some(entry) = entry.strip_prefix('\t') else { continue };

            let (label, addr) = entry.trim_end().rsplit_once(' ')?;
            let label = label.trim_end();
            if label.is_empty() { return None; }

            let addr = u16::from_str_radix(addr, 16).ok()?;
            sym.insert(label, addr);
        }

        Some(sym)
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::assemble;

    use super::{ObjFileFormat, ObjectFormat, SymbolFormat};

    #[test]
    fn test_object_format() {
        let obj = assemble(".orig x4000\n.fill xBEEF\n.stringz \"A\"\n.end").unwrap();
        let bytes = ObjectFormat::serialize(&obj);
        assert_eq!(bytes, [0x40, 0x00, 0xBE, 0xEF, 0x00, 0x41, 0x00, 0x00]);
        assert_eq!(ObjectFormat::deserialize(&bytes), Some((0x4000, vec![0xBEEF, 0x41, 0x00])));

        // origin only
        assert_eq!(ObjectFormat::deserialize(&[0x30, 0x00]), Some((0x3000, vec![])));
        assert_eq!(ObjectFormat::deserialize(&[]), None);
        assert_eq!(ObjectFormat::deserialize(&[0x30, 0x00, 0x01]), None);
    }

    #[test]
    fn test_symbol_format() {
        let obj = assemble(".orig x3000\nZETA HALT\nA_VERY_LONG_LABEL_NAME HALT\nalpha .end").unwrap();
        let text = SymbolFormat::serialize(&obj);

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.starts_with("//")));
        assert_eq!(lines[2], "//\tZETA              3000");
        assert_eq!(lines[3], "//\tA_VERY_LONG_LABEL_NAME  3001");
        assert_eq!(lines[4], "//\talpha             3002");

        let sym = SymbolFormat::deserialize(&text).unwrap();
        assert_eq!(&sym, obj.symbol_table());

        assert!(SymbolFormat::deserialize("not a comment").is_none());
        assert!(SymbolFormat::deserialize("//\tLABEL  XYZW").is_none());
    }
}
