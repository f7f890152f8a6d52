//! Simulating and execution for LC-3 assembly.
//!
//! This module is focused on executing fully assembled code (i.e., [`ObjectFile`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates assembled code.
//! - [`mem`]: The module handling memory, registers, and the machine state store.
//! - [`labels`]: The module handling the label/address table.
//! - [`observer`]: The module handling change notifications.
//! - [`device`]: The module handling memory-mapped IO.
//! - [`debug`]: The module handling breakpoints and run control.
//! - [`os`]: The module handling the OS image.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load an object file to it:
//!
//! ```
//! use lc3_workbench::asm::assemble;
//! use lc3_workbench::ast::reg_consts::R0;
//! use lc3_workbench::sim::Simulator;
//! use lc3_workbench::sim::os::OsImage;
//!
//! let src = "
//!     .orig x3000
//!     AND R0, R0, #0
//!     ADD R0, R0, #1
//!     ADD R0, R0, #1
//!     HALT
//!     .end
//! ";
//! let obj_file = assemble(src).unwrap();
//!
//! let mut sim = Simulator::new(Default::default(), OsImage::standard());
//! sim.load_obj_file(&obj_file);
//!
//! sim.step();
//! assert_eq!(sim.reg(R0.into()), 0);
//! sim.step();
//! assert_eq!(sim.reg(R0.into()), 1);
//! sim.step();
//! assert_eq!(sim.reg(R0.into()), 2);
//! ```
//!
//! The simulator only ever executes one instruction at a time ([`Simulator::step`]).
//! Running until a halt, a breakpoint, or the end of a subroutine
//! is done by a driver that calls `step` repeatedly (see [`debug::Driver`]).
//!
//! ## Querying State
//!
//! Registers are read and written through [`Simulator::reg`] and [`Simulator::set_reg`],
//! and memory through [`Simulator::read_mem`] and [`Simulator::write_mem`],
//! which trigger the side effects of memory-mapped IO.
//! To access memory without side effects, use the [`Store`] ([`Simulator::store`]).
//!
//! Every change to the machine state is announced to subscribers ([`Simulator::subscribe`]).
//!
//! [`Store`]: mem::Store

pub mod mem;
pub mod labels;
pub mod observer;
pub mod device;
pub mod debug;
pub mod os;

use crossbeam_channel::Receiver;

use crate::asm::ObjectFile;
use crate::ast::reg_consts::{R6, R7};
use crate::ast::sim::{decode, AddrMode, OpDescriptor, SimInstr};
use crate::ast::ImmOrReg;
use crate::num::{to_hex_string, ConditionCode};
pub use crate::ast::sim::disassemble;
use device::{DeviceHandler, ExternalDevice, MCR, READY};
use mem::{RegId, Store, WordCreateStrategy};
use observer::ChangeEvent;
use os::OsImage;

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply after the next [`Simulator::reset`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimFlags {
    /// Creation strategy for memory (outside the OS image) and registers.
    ///
    /// By default, everything starts as zero.
    pub machine_init: WordCreateStrategy,

    /// The address the PC starts at.
    ///
    /// By default, this is x3000.
    pub pc_init: u16,

    /// Whether the machine starts in user mode (PSR bit 15 set).
    ///
    /// By default, this is true.
    pub user_mode: bool
}
impl Default for SimFlags {
    fn default() -> Self {
        Self {
            machine_init: Default::default(),
            pc_init: 0x3000,
            user_mode: true
        }
    }
}

/// Executes assembled code.
///
/// The simulator owns the machine state ([`Store`]) and the memory-mapped devices.
/// It is fully synchronous: [`Simulator::step`] executes exactly one instruction and returns.
#[derive(Debug)]
pub struct Simulator {
    store: Store,
    devices: DeviceHandler,
    call_depth: u64,
    instructions_run: u64,

    /// The flags the machine is (re)initialized with.
    pub flags: SimFlags,
    os: OsImage
}

impl Simulator {
    /// Creates a new simulator with the provided flags and OS image.
    pub fn new(flags: SimFlags, os: &OsImage) -> Self {
        let mut sim = Self {
            store: Store::new(flags.machine_init),
            devices: DeviceHandler::new(),
            call_depth: 0,
            instructions_run: 0,
            flags,
            os: os.clone()
        };
        sim.power_on();
        sim
    }

    /// Resets the simulator.
    ///
    /// This resets the state of the machine to the state it was in at construction,
    /// keeping the OS image, flags, and subscribers.
    pub fn reset(&mut self) {
        self.store.reset(self.flags.machine_init);
        self.call_depth = 0;
        self.instructions_run = 0;
        self.power_on();
    }

    fn power_on(&mut self) {
        self.store.load_block(self.os.orig(), self.os.words());
        for (label, addr) in self.os.labels().iter() {
            self.store.set_label(label, addr);
        }

        self.store.set_reg(RegId::Pc, self.flags.pc_init);
        self.store.set_reg(RegId::Psr, PSR::new(self.flags.user_mode).get());
        self.store.set_mem(MCR, READY);
        self.devices.io_reset(&mut self.store);

        tracing::debug!(os_words = self.os.words().len(), pc = %to_hex_string(self.flags.pc_init), "machine powered on");
    }

    /// Loads an object file into memory and installs its labels.
    pub fn load_obj_file(&mut self, obj: &ObjectFile) {
        self.store.load_block(obj.orig(), obj.machine_code());
        for (label, addr) in obj.symbol_table().label_iter() {
            self.store.set_label(label, addr);
        }

        tracing::debug!(orig = %to_hex_string(obj.orig()), len = obj.len(), "loaded object file");
    }

    /// Registers a new subscriber to the machine's changes.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        self.store.subscribe()
    }

    /// The machine state.
    pub fn store(&self) -> &Store {
        &self.store
    }
    /// The machine state, mutably.
    ///
    /// Accesses through the store do not trigger device side effects.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The memory-mapped devices.
    pub fn devices(&self) -> &DeviceHandler {
        &self.devices
    }

    /// Reads a register.
    pub fn reg(&self, reg: RegId) -> u16 {
        self.store.reg(reg)
    }
    /// Writes a register.
    pub fn set_reg(&mut self, reg: RegId, value: u16) {
        self.store.set_reg(reg, value);
    }
    /// The program counter.
    pub fn pc(&self) -> u16 {
        self.store.pc()
    }
    /// The processor status register.
    pub fn psr(&self) -> PSR {
        PSR(self.store.psr())
    }

    /// Reads memory, applying the side effects of reading device registers.
    pub fn read_mem(&mut self, addr: u16) -> u16 {
        match self.devices.io_read(&mut self.store, addr) {
            Some(data) => data,
            None => self.store.mem(addr),
        }
    }

    /// Writes memory, applying the side effects of writing device registers.
    pub fn write_mem(&mut self, addr: u16, data: u16) {
        self.store.set_mem(addr, data);
        self.devices.io_write(&mut self.store, addr, data);
    }

    /// Adds a character to the keyboard's input queue.
    pub fn queue_input(&mut self, ch: u8) {
        self.store.queue_input(ch);
    }

    /// Every character the display has output since the last reset.
    pub fn output(&self) -> &[u8] {
        self.devices.display().output()
    }

    /// Moves data between the device registers and the outside world.
    ///
    /// [`Simulator::step`] calls this before and after each instruction.
    pub fn io_update(&mut self) {
        self.devices.io_update(&mut self.store);
    }

    /// Whether the machine's clock is running (MCR bit 15).
    pub fn is_running(&self) -> bool {
        self.store.mem(MCR) & READY != 0
    }

    /// Starts or stops the machine's clock.
    pub fn set_running(&mut self, running: bool) {
        let mcr = self.store.mem(MCR);
        let mcr = match running {
            true  => mcr | READY,
            false => mcr & !READY,
        };
        self.store.set_mem(MCR, mcr);
    }

    /// The number of subroutine calls (`JSR`, `JSRR`, `TRAP`) that have not yet returned (`RET`).
    pub fn call_depth(&self) -> u64 {
        self.call_depth
    }

    /// The number of instructions executed since the last reset.
    pub fn instructions_run(&self) -> u64 {
        self.instructions_run
    }

    fn set_cc(&mut self, result: u16) {
        let psr = self.psr().with_cc_of(result);
        self.store.set_reg(RegId::Psr, psr.get());
    }

    fn set_gpr_cc(&mut self, dr: crate::ast::Reg, result: u16) {
        self.store.set_reg(dr.into(), result);
        self.set_cc(result);
    }

    fn set_pc(&mut self, addr: u16) {
        self.store.set_reg(RegId::Pc, addr);
    }

    fn call_subroutine(&mut self, addr: u16) {
        let ret = self.pc();
        self.store.set_reg(R7.into(), ret);
        self.set_pc(addr);
        self.call_depth += 1;
    }

    /// Computes the effective address of an instruction (using the incremented PC).
    fn eval_address(&self, mode: AddrMode) -> u16 {
        match mode {
            AddrMode::None => 0,
            AddrMode::PcOffset(off) => self.pc().wrapping_add_signed(off),
            AddrMode::BaseOffset(br, off) => self.reg(br.into()).wrapping_add_signed(off),
            AddrMode::Trap(vect) => u16::from(vect),
        }
    }

    /// Executes one instruction.
    ///
    /// This fetches the word at the PC, decodes it, and executes it.
    /// Words that are not strictly valid are still executed with their decoded fields.
    ///
    /// This returns the decoded instruction.
    pub fn step(&mut self) -> OpDescriptor {
        self.io_update();

        // fetch
        let pc = self.pc();
        let word = self.store.mem(pc);
        self.store.set_reg(RegId::Ir, word);
        self.set_pc(pc.wrapping_add(1));

        // decode
        let op = decode(word);
        if !op.strict_valid {
            tracing::warn!(pc = %to_hex_string(pc), word = %to_hex_string(word), "executing invalid instruction {op}");
        }

        // evaluate address
        let addr = self.eval_address(op.mode());

        // fetch operand, execute, store result
        match op.instr {
            SimInstr::BR(cc, _) => {
                // a PSR without exactly one of N, Z, P never matches
                let taken = ConditionCode::from_psr(self.psr().get())
                    .is_some_and(|psr_cc| u16::from(cc) & psr_cc.bits() != 0);
                if taken {
                    self.set_pc(addr);
                }
            },
            SimInstr::ADD(dr, sr1, sr2) => {
                let val1 = self.reg(sr1.into());
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg(r2.into()),
                };
                self.set_gpr_cc(dr, val1.wrapping_add(val2));
            },
            SimInstr::AND(dr, sr1, sr2) => {
                let val1 = self.reg(sr1.into());
                let val2 = match sr2 {
                    ImmOrReg::Imm(i2) => i2.get() as u16,
                    ImmOrReg::Reg(r2) => self.reg(r2.into()),
                };
                self.set_gpr_cc(dr, val1 & val2);
            },
            SimInstr::NOT(dr, sr) => {
                let val = self.reg(sr.into());
                self.set_gpr_cc(dr, !val);
            },
            SimInstr::LD(dr, _) | SimInstr::LDR(dr, _, _) => {
                let val = self.read_mem(addr);
                self.set_gpr_cc(dr, val);
            },
            SimInstr::LDI(dr, _) => {
                let ea = self.read_mem(addr);
                let val = self.read_mem(ea);
                self.set_gpr_cc(dr, val);
            },
            SimInstr::LEA(dr, _) => self.set_gpr_cc(dr, addr),
            SimInstr::ST(sr, _) | SimInstr::STR(sr, _, _) => {
                let val = self.reg(sr.into());
                self.write_mem(addr, val);
            },
            SimInstr::STI(sr, _) => {
                let ea = self.read_mem(addr);
                let val = self.reg(sr.into());
                self.write_mem(ea, val);
            },
            SimInstr::JSR(op) => {
                // JSRR R7 jumps to the old R7
                let target = match op {
                    ImmOrReg::Imm(_)  => addr,
                    ImmOrReg::Reg(br) => self.reg(br.into()),
                };
                self.call_subroutine(target);
            },
            SimInstr::JMP(br) => {
                let target = self.reg(br.into());
                self.set_pc(target);

                // RET
                if br == R7 {
                    self.call_depth = self.call_depth.saturating_sub(1);
                }
            },
            SimInstr::TRAP(_) => {
                let routine = self.read_mem(addr);
                self.call_subroutine(routine);
            },
            SimInstr::RTI => {
                let sp = self.reg(R6.into());
                let pc = self.read_mem(sp);
                let psr = self.read_mem(sp.wrapping_add(1));
                self.store.set_reg(R6.into(), sp.wrapping_add(2));
                self.set_pc(pc);
                self.store.set_reg(RegId::Psr, psr);
            },
            SimInstr::Reserved => {},
        }

        self.instructions_run += 1;
        tracing::trace!(pc = %to_hex_string(pc), word = %to_hex_string(word), "{op}");

        self.io_update();
        op
    }
}

/// A wrapper over the processor status register.
///
/// Bit 15 holds the privilege mode (set for user mode)
/// and bits 0-2 hold the condition codes (N, Z, P).
#[allow(clippy::upper_case_acronyms)]
#[derive(PartialEq, Eq, Clone, Copy)]
#[repr(transparent)]
pub struct PSR(pub u16);

impl PSR {
    /// Creates a PSR with the Z condition code set.
    pub fn new(user_mode: bool) -> Self {
        PSR(u16::from(user_mode) << 15 | 0b010)
    }

    /// The raw value.
    pub fn get(&self) -> u16 {
        self.0
    }
    /// Whether the machine is in user mode.
    pub fn user_mode(&self) -> bool {
        self.0 & 0x8000 != 0
    }
    /// The condition code bits (N, Z, P from high to low).
    pub fn cc(&self) -> u8 {
        (self.0 & 0b111) as u8
    }
    /// Whether N is set.
    pub fn is_n(&self) -> bool {
        self.cc() & 0b100 != 0
    }
    /// Whether Z is set.
    pub fn is_z(&self) -> bool {
        self.cc() & 0b010 != 0
    }
    /// Whether P is set.
    pub fn is_p(&self) -> bool {
        self.cc() & 0b001 != 0
    }

    /// This PSR with its condition code set from the sign of a result.
    pub fn with_cc_of(self, result: u16) -> Self {
        let cc = match (result as i16).cmp(&0) {
            std::cmp::Ordering::Less    => 0b100,
            std::cmp::Ordering::Equal   => 0b010,
            std::cmp::Ordering::Greater => 0b001,
        };
        PSR(self.0 & !0b111 | cc)
    }
}
impl std::fmt::Debug for PSR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PSR")
            .field("user_mode", &self.user_mode())
            .field("cc", &crate::num::format_condition_code(self.0))
            .finish()
    }
}
