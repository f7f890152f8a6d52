//! Memory and register handling for the LC-3 simulator.
//!
//! This module consists of:
//! - [`Mem`]: The memory.
//! - [`RegFile`]: The general purpose register file.
//! - [`RegId`]: A name for any register (general purpose or special).
//! - [`Store`]: The full machine state, which emits a [`ChangeEvent`] on every mutation.
//!
//! [`ChangeEvent`]: super::observer::ChangeEvent

use std::collections::VecDeque;

use crossbeam_channel::Receiver;
use rand::rngs::StdRng;
use rand::Rng;

use crate::ast::Reg;

use super::labels::LabelTable;
use super::observer::{ChangeEvent, ChangeObserver};

/// Something that produces the initial values of memory and registers.
pub trait WordFiller {
    /// Produces the next word.
    fn generate(&mut self) -> u16;
}
impl WordFiller for () {
    fn generate(&mut self) -> u16 {
        rand::random()
    }
}
impl WordFiller for u16 {
    fn generate(&mut self) -> u16 {
        *self
    }
}
impl WordFiller for StdRng {
    fn generate(&mut self) -> u16 {
        self.gen()
    }
}

/// Strategy used to initialize memory and registers before any program is loaded.
///
/// Memory that is not covered by the OS image starts with these values.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WordCreateStrategy {
    /// Every word starts with a known value.
    Known {
        /// The value to fill with.
        value: u16
    },
    /// Words are random, generated from a fixed seed.
    Seeded {
        /// The seed.
        seed: u64
    },
    /// Words are random.
    Unseeded,
}
impl Default for WordCreateStrategy {
    fn default() -> Self {
        WordCreateStrategy::Known { value: 0 }
    }
}

impl WordCreateStrategy {
    pub(super) fn generator(&self) -> impl WordFiller {
        use rand::SeedableRng;

        match self {
            WordCreateStrategy::Known { value } => WCGenerator::Known(*value),
            WordCreateStrategy::Seeded { seed } => WCGenerator::Seeded(Box::new(StdRng::seed_from_u64(*seed))),
            WordCreateStrategy::Unseeded => WCGenerator::Unseeded,
        }
    }
}

enum WCGenerator {
    Known(u16),
    Seeded(Box<StdRng>),
    Unseeded,
}
impl WordFiller for WCGenerator {
    fn generate(&mut self) -> u16 {
        match self {
            WCGenerator::Known(k)  => k.generate(),
            WCGenerator::Seeded(r) => r.generate(),
            WCGenerator::Unseeded  => ().generate(),
        }
    }
}

const N: usize = 1 << 16;

/// The memory of the machine (65536 words).
#[derive(Debug, Clone)]
pub struct Mem {
    data: Box<[u16; N]>
}
impl Mem {
    /// Creates memory, filling every word with the filler.
    pub fn new(filler: &mut impl WordFiller) -> Self {
        Self {
            data: std::iter::repeat_with(|| filler.generate())
                .take(N)
                .collect::<Box<_>>()
                .try_into()
                .unwrap_or_else(|_| unreachable!("iterator should have had {N} elements"))
        }
    }

    /// Reads a word.
    pub fn get(&self, addr: u16) -> u16 {
        // Mem could implement Index<u16>, but it doesn't as a lint against bypassing the store.
        self.data[usize::from(addr)]
    }

    /// Writes a word.
    pub fn set(&mut self, addr: u16, value: u16) {
        self.data[usize::from(addr)] = value;
    }

    /// All of memory, as a slice.
    pub fn as_slice(&self) -> &[u16] {
        &*self.data
    }
}

/// The general purpose registers (R0-R7).
#[derive(Debug, Clone)]
pub struct RegFile([u16; 8]);
impl RegFile {
    /// Creates a register file, filling every register with the filler.
    pub fn new(filler: &mut impl WordFiller) -> Self {
        Self(std::array::from_fn(|_| filler.generate()))
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = u16;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}

/// A register of the machine.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum RegId {
    /// One of R0-R7.
    General(Reg),
    /// The program counter.
    Pc,
    /// The instruction register.
    Ir,
    /// The processor status register.
    Psr,
}
impl From<Reg> for RegId {
    fn from(value: Reg) -> Self {
        RegId::General(value)
    }
}
impl std::fmt::Display for RegId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegId::General(r) => r.fmt(f),
            RegId::Pc  => f.write_str("PC"),
            RegId::Ir  => f.write_str("IR"),
            RegId::Psr => f.write_str("PSR"),
        }
    }
}

/// The full state of the machine: memory, registers, labels, and pending input.
///
/// All writes go through the store's setters,
/// and each setter sends a [`ChangeEvent`] to every subscriber before returning.
///
/// Reads and writes here are raw: they never trigger device side effects.
/// Device-aware access is done through [`Simulator::read_mem`] and [`Simulator::write_mem`].
///
/// [`Simulator::read_mem`]: super::Simulator::read_mem
/// [`Simulator::write_mem`]: super::Simulator::write_mem
#[derive(Debug)]
pub struct Store {
    mem: Mem,
    regs: RegFile,
    pc: u16,
    ir: u16,
    psr: u16,
    labels: LabelTable,
    input: VecDeque<u8>,
    observer: ChangeObserver
}

impl Store {
    /// Creates a new store.
    ///
    /// Memory and general purpose registers are filled according to the strategy.
    /// The PC starts at x3000, and the PSR starts with only the Z condition code set.
    pub fn new(strategy: WordCreateStrategy) -> Self {
        let mut filler = strategy.generator();

        Self {
            mem: Mem::new(&mut filler),
            regs: RegFile::new(&mut filler),
            pc: 0x3000,
            ir: 0,
            psr: 0x0002,
            labels: LabelTable::new(),
            input: VecDeque::new(),
            observer: ChangeObserver::new()
        }
    }

    /// Returns all state to a fresh store's, keeping subscribers.
    ///
    /// The wipe goes through the setters, so every label removed and every
    /// memory cell or register whose value changes is announced.
    /// Pending input is dropped.
    pub fn reset(&mut self, strategy: WordCreateStrategy) {
        let fresh = Store::new(strategy);

        let addrs: Vec<_> = self.labels.iter().map(|(_, addr)| addr).collect();
        for addr in addrs {
            self.unset_label_by_address(addr);
        }

        for addr in 0..=u16::MAX {
            let value = fresh.mem(addr);
            if self.mem(addr) != value {
                self.set_mem(addr, value);
            }
        }

        let regs = (0..8).map(|n| RegId::General(Reg(n)))
            .chain([RegId::Pc, RegId::Ir, RegId::Psr]);
        for reg in regs {
            let value = fresh.reg(reg);
            if self.reg(reg) != value {
                self.set_reg(reg, value);
            }
        }

        self.input.clear();
    }

    /// Registers a new subscriber to this store's changes.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        self.observer.subscribe()
    }

    /// Reads a memory location.
    pub fn mem(&self, addr: u16) -> u16 {
        self.mem.get(addr)
    }
    /// Writes a memory location.
    pub fn set_mem(&mut self, addr: u16, value: u16) {
        self.mem.set(addr, value);
        self.observer.emit(ChangeEvent::MemoryChanged { addr, value });
    }
    /// Writes a block of words starting at `start` (wrapping around the end of memory).
    ///
    /// This sends one event per word.
    pub fn load_block(&mut self, start: u16, words: &[u16]) {
        for (i, &value) in words.iter().enumerate() {
            self.set_mem(start.wrapping_add(i as u16), value);
        }
    }
    /// All of memory.
    pub fn mem_slice(&self) -> &[u16] {
        self.mem.as_slice()
    }

    /// Reads a register.
    pub fn reg(&self, reg: RegId) -> u16 {
        match reg {
            RegId::General(r) => self.regs[r],
            RegId::Pc  => self.pc,
            RegId::Ir  => self.ir,
            RegId::Psr => self.psr,
        }
    }
    /// Writes a register.
    pub fn set_reg(&mut self, reg: RegId, value: u16) {
        match reg {
            RegId::General(r) => self.regs[r] = value,
            RegId::Pc  => self.pc = value,
            RegId::Ir  => self.ir = value,
            RegId::Psr => self.psr = value,
        }
        self.observer.emit(ChangeEvent::RegisterChanged { reg, value });
    }
    /// The program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }
    /// The processor status register.
    pub fn psr(&self) -> u16 {
        self.psr
    }

    /// The label table.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
    /// Binds a label to an address.
    ///
    /// If the address already has a label or the label is bound elsewhere,
    /// those entries are removed first (each sending a [`ChangeEvent::LabelUnset`]).
    pub fn set_label(&mut self, label: impl Into<String>, addr: u16) {
        let label = label.into();
        for (old_addr, old_label) in self.labels.insert(label.clone(), addr) {
            self.observer.emit(ChangeEvent::LabelUnset { addr: old_addr, label: old_label });
        }
        self.observer.emit(ChangeEvent::LabelSet { addr, label });
    }
    /// Removes the label at an address (if there is one), returning it.
    pub fn unset_label_by_address(&mut self, addr: u16) -> Option<String> {
        let label = self.labels.remove_by_addr(addr)?;
        self.observer.emit(ChangeEvent::LabelUnset { addr, label: label.clone() });
        Some(label)
    }
    /// Removes a label by name (if it exists), returning its address.
    pub fn unset_label_by_name(&mut self, label: &str) -> Option<u16> {
        let addr = self.labels.remove_by_name(label)?;
        self.observer.emit(ChangeEvent::LabelUnset { addr, label: label.to_string() });
        Some(addr)
    }

    /// Adds a character to the end of the input queue.
    pub fn queue_input(&mut self, ch: u8) {
        self.input.push_back(ch);
        self.observer.emit(ChangeEvent::InputQueued { ch });
    }
    /// Takes the next character from the input queue.
    pub fn pop_input(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
    /// The characters waiting in the input queue.
    pub fn pending_input(&self) -> &VecDeque<u8> {
        &self.input
    }

    /// Announces that a character was output.
    pub fn emit_output(&mut self, ch: u8) {
        self.observer.emit(ChangeEvent::OutputProduced { ch });
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::reg_consts::{R0, R3, R7};
    use crate::sim::observer::ChangeEvent;

    use super::{RegId, Store, WordCreateStrategy};

    #[test]
    fn test_create_strategy() {
        let store = Store::new(WordCreateStrategy::Known { value: 0xABCD });
        assert!(store.mem_slice().iter().all(|&w| w == 0xABCD));
        assert_eq!(store.reg(R7.into()), 0xABCD);

        let a = Store::new(WordCreateStrategy::Seeded { seed: 12 });
        let b = Store::new(WordCreateStrategy::Seeded { seed: 12 });
        assert_eq!(a.mem_slice(), b.mem_slice());
        assert_eq!(a.reg(R0.into()), b.reg(R0.into()));

        let store = Store::new(Default::default());
        assert!(store.mem_slice().iter().all(|&w| w == 0));
        assert_eq!(store.pc(), 0x3000);
        assert_eq!(store.psr(), 0x0002);
    }

    #[test]
    fn test_one_event_per_write() {
        let mut store = Store::new(Default::default());
        let events = store.subscribe();

        store.set_reg(RegId::General(R0), 5);
        store.set_reg(RegId::Pc, 0x3001);
        store.queue_input(b'a');
        store.load_block(0xFFFF, &[1, 2]);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, [
            ChangeEvent::RegisterChanged { reg: RegId::General(R0), value: 5 },
            ChangeEvent::RegisterChanged { reg: RegId::Pc, value: 0x3001 },
            ChangeEvent::InputQueued { ch: b'a' },
            ChangeEvent::MemoryChanged { addr: 0xFFFF, value: 1 },
            ChangeEvent::MemoryChanged { addr: 0x0000, value: 2 },
        ]);
        assert_eq!(store.mem(0x0000), 2);
        assert_eq!(store.pop_input(), Some(b'a'));
        assert_eq!(store.pop_input(), None);
    }

    #[test]
    fn test_label_events() {
        let mut store = Store::new(Default::default());
        let events = store.subscribe();

        store.set_label("A", 0x3000);
        store.set_label("B", 0x3001);
        store.set_label("A", 0x3001);
        assert_eq!(store.unset_label_by_name("A"), Some(0x3001));
        assert_eq!(store.unset_label_by_address(0x3001), None);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, [
            ChangeEvent::LabelSet { addr: 0x3000, label: "A".into() },
            ChangeEvent::LabelSet { addr: 0x3001, label: "B".into() },
            ChangeEvent::LabelUnset { addr: 0x3001, label: "B".into() },
            ChangeEvent::LabelUnset { addr: 0x3000, label: "A".into() },
            ChangeEvent::LabelSet { addr: 0x3001, label: "A".into() },
            ChangeEvent::LabelUnset { addr: 0x3001, label: "A".into() },
        ]);
        assert!(store.labels().is_empty());
    }

    #[test]
    fn test_reset_reports_wipe() {
        let mut store = Store::new(Default::default());
        store.set_mem(0x3000, 0x1234);
        store.set_reg(R3.into(), 0x4444);
        store.set_reg(RegId::Pc, 0x4000);
        store.set_label("LOOP", 0x3000);
        store.queue_input(b'q');

        let events = store.subscribe();
        store.reset(Default::default());

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, [
            ChangeEvent::LabelUnset { addr: 0x3000, label: "LOOP".into() },
            ChangeEvent::MemoryChanged { addr: 0x3000, value: 0 },
            ChangeEvent::RegisterChanged { reg: R3.into(), value: 0 },
            ChangeEvent::RegisterChanged { reg: RegId::Pc, value: 0x3000 },
        ]);
        assert_eq!(store.mem(0x3000), 0);
        assert!(store.labels().is_empty());
        assert!(store.pending_input().is_empty());

        // still subscribed
        store.set_mem(0x3000, 2);
        assert_eq!(events.try_recv(), Ok(ChangeEvent::MemoryChanged { addr: 0x3000, value: 2 }));
    }
}
