//! An LC-3 assembler and simulator core.
//!
//! This crate is the engine behind LC-3 teaching tools:
//! it turns assembly source into machine code, and it runs that machine code
//! on an observable simulated machine.
//!
//! # Usage
//!
//! To convert LC-3 source code to an object file, assemble it:
//! ```
//! use lc3_workbench::asm::{assemble, ObjectFile};
//!
//! let code = "
//!     .orig x3000
//!     AND R0, R0, #0
//!     ADD R0, R0, #7
//!     HALT
//!     .end
//! ";
//! let obj_file: ObjectFile = assemble(code).unwrap();
//! assert_eq!(obj_file.orig(), 0x3000);
//! assert_eq!(obj_file.machine_code(), [0x5020, 0x1027, 0xF025]);
//! ```
//!
//! Once an object file has been created, it can be executed with the simulator:
//! ```
//! # use lc3_workbench::asm::assemble;
//! # let obj_file = assemble(".orig x3000\nHALT\n.end").unwrap();
//! use lc3_workbench::sim::Simulator;
//! use lc3_workbench::sim::os::OsImage;
//! use lc3_workbench::sim::debug::{Driver, StopReason};
//!
//! let mut simulator = Simulator::new(Default::default(), OsImage::standard());
//! simulator.load_obj_file(&obj_file);
//!
//! let reason = Driver::new().run(&mut simulator);
//! assert_eq!(reason, StopReason::Halted);
//! ```
//!
//! State changes can be watched by subscribing to the simulator
//! (see [`sim::observer`]), and single instructions can be executed with [`sim::Simulator::step`].
#![warn(missing_docs)]

pub mod num;
pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;
