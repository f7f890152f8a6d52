//! The operating system image loaded into the machine at construction.
//!
//! An [`OsImage`] is a block of words and the labels that go with it.
//! The standard image ([`OsImage::standard`]) holds the trap vector table and the
//! trap service routines (`GETC`, `OUT`, `PUTS`, `IN`, `PUTSP`, `HALT`).
//! Tests can substitute a smaller image, or [`OsImage::empty`].

use std::sync::OnceLock;

use crate::asm::{assemble, ObjectFile};
use crate::sim::labels::LabelTable;

/// A block of memory (and its labels) loaded before any user program.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct OsImage {
    orig: u16,
    words: Vec<u16>,
    labels: LabelTable
}

impl OsImage {
    /// Creates an image from its parts.
    pub fn new(orig: u16, words: Vec<u16>, labels: LabelTable) -> Self {
        Self { orig, words, labels }
    }

    /// An image with no words and no labels.
    pub fn empty() -> Self {
        Default::default()
    }

    /// Creates an image from an assembled object file.
    pub fn from_object(obj: &ObjectFile) -> Self {
        let labels = obj.symbol_table()
            .label_iter()
            .collect();

        Self::new(obj.orig(), obj.machine_code().to_vec(), labels)
    }

    /// The standard OS image.
    ///
    /// This is assembled from the bundled OS source the first time it is requested.
    ///
    /// ```
    /// use lc3_workbench::sim::os::OsImage;
    ///
    /// let os = OsImage::standard();
    /// let halt = os.labels().get_addr("TRAP_HALT").unwrap();
    /// assert_eq!(os.words()[0x25], halt);
    /// ```
    pub fn standard() -> &'static OsImage {
        static STANDARD_OS: OnceLock<OsImage> = OnceLock::new();

        STANDARD_OS.get_or_init(|| {
            let src = include_str!("os.asm");
            match assemble(src) {
                Ok(obj) => OsImage::from_object(&obj),
                Err(e) => unreachable!("bundled OS should assemble: {e}"),
            }
        })
    }

    /// The address the image starts at.
    pub fn orig(&self) -> u16 {
        self.orig
    }

    /// The words of the image.
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// The labels of the image.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}
