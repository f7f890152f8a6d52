use super::{is_ready, set_ready, ExternalDevice, DDR, DSR};
use crate::sim::mem::Store;

/// Display device that consumes characters written to DDR.
///
/// Writing DDR clears the DSR ready bit. The next I/O update then takes the low byte of DDR,
/// announces it with an `OutputProduced` event, appends it to the transcript,
/// and sets DSR ready again. Output is never backpressured.
#[derive(Debug, Default, Clone)]
pub struct Display {
    output: Vec<u8>
}
impl Display {
    /// Every character output since the last reset.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl ExternalDevice for Display {
    fn io_read(&mut self, store: &mut Store, addr: u16) -> Option<u16> {
        match addr {
            DSR | DDR => Some(store.mem(addr)),
            _ => None
        }
    }

    fn io_write(&mut self, store: &mut Store, addr: u16, _data: u16) -> bool {
        match addr {
            DDR => {
                set_ready(store, DSR, false);
                true
            },
            DSR => true,
            _ => false
        }
    }

    fn io_update(&mut self, store: &mut Store) {
        if is_ready(store, DSR) { return; }

        let ch = store.mem(DDR) as u8;
        store.emit_output(ch);
        self.output.push(ch);
        set_ready(store, DSR, true);
    }

    fn io_reset(&mut self, store: &mut Store) {
        store.set_mem(DSR, super::READY);
        store.set_mem(DDR, 0);
        self.output.clear();
    }
}
