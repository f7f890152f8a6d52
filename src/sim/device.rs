//! Handlers for the memory-mapped devices of the Simulator.
//!
//! Device registers live in ordinary memory (in the [`Store`]),
//! so every change to them is observable as a memory change.
//! Devices only add side effects to accesses of their ports
//! and move data between the registers and the outside world during an I/O update.
//!
//! The core types here are:
//! - [`ExternalDevice`]: A device which can be connected to the Simulator.
//! - [`DeviceHandler`]: The handler for the Simulator's IO ports.
//!
//! This module also provides the two standard devices:
//! - [`Keyboard`]: Keyboard device that reads off of the store's input queue.
//! - [`Display`]: Display device that consumes characters written to DDR.

mod keyboard;
mod display;

use super::mem::Store;
pub use keyboard::Keyboard;
pub use display::Display;

/// Keyboard status register.
pub const KBSR: u16 = 0xFE00;
/// Keyboard data register.
pub const KBDR: u16 = 0xFE02;
/// Display status register.
pub const DSR:  u16 = 0xFE04;
/// Display data register.
pub const DDR:  u16 = 0xFE06;
/// Machine control register.
pub const MCR:  u16 = 0xFFFE;

/// The ready bit of KBSR and DSR (and the clock enable bit of the MCR).
pub const READY: u16 = 0x8000;

/// A device which can be connected to the Simulator.
///
/// The device's registers are kept in the store's memory.
/// Each hook receives the store so that it can update those registers
/// (and send the corresponding change events).
pub trait ExternalDevice {
    /// Applies the side effects of reading from a port.
    ///
    /// If this device owns the port, this returns the value read.
    /// Otherwise, this returns `None` and the read is a plain memory read.
    fn io_read(&mut self, store: &mut Store, addr: u16) -> Option<u16>;

    /// Applies the side effects of writing to a port.
    ///
    /// The data has already been written to memory.
    /// This returns whether this device owns the port.
    fn io_write(&mut self, store: &mut Store, addr: u16, data: u16) -> bool;

    /// Moves data between the device registers and the outside world.
    ///
    /// This is called before and after every instruction.
    fn io_update(&mut self, store: &mut Store);

    /// Resets the device registers to their power-on state.
    fn io_reset(&mut self, store: &mut Store);
}

/// The handler for the Simulator's IO ports.
///
/// This forwards each access to the device that owns the port.
#[derive(Debug, Default)]
pub struct DeviceHandler {
    keyboard: Keyboard,
    display: Display
}
impl DeviceHandler {
    /// Creates a handler with the standard keyboard and display.
    pub fn new() -> Self {
        Default::default()
    }

    /// The keyboard.
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// The display.
    pub fn display(&self) -> &Display {
        &self.display
    }
}
impl ExternalDevice for DeviceHandler {
    fn io_read(&mut self, store: &mut Store, addr: u16) -> Option<u16> {
        match addr {
            KBSR | KBDR => self.keyboard.io_read(store, addr),
            DSR | DDR => self.display.io_read(store, addr),
            _ => None
        }
    }

    fn io_write(&mut self, store: &mut Store, addr: u16, data: u16) -> bool {
        match addr {
            KBSR | KBDR => self.keyboard.io_write(store, addr, data),
            DSR | DDR => self.display.io_write(store, addr, data),
            _ => false
        }
    }

    fn io_update(&mut self, store: &mut Store) {
        self.keyboard.io_update(store);
        self.display.io_update(store);
    }

    fn io_reset(&mut self, store: &mut Store) {
        self.keyboard.io_reset(store);
        self.display.io_reset(store);
    }
}

fn is_ready(store: &Store, status: u16) -> bool {
    store.mem(status) & READY != 0
}
fn set_ready(store: &mut Store, status: u16, ready: bool) {
    let old = store.mem(status);
    let new = match ready {
        true  => old | READY,
        false => old & !READY,
    };
    store.set_mem(status, new);
}
