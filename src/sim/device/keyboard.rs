use super::{is_ready, set_ready, ExternalDevice, KBDR, KBSR};
use crate::sim::mem::Store;

/// Keyboard device that reads off of the store's input queue.
///
/// When KBSR is not ready and input is pending, an I/O update moves the next
/// character into KBDR and marks KBSR ready. Reading KBDR clears the ready bit.
///
/// If the queue is empty, KBSR simply stays not ready.
#[derive(Debug, Default, Clone)]
pub struct Keyboard {
    delivered: u64
}
impl Keyboard {
    /// The number of characters delivered to KBDR since the last reset.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl ExternalDevice for Keyboard {
    fn io_read(&mut self, store: &mut Store, addr: u16) -> Option<u16> {
        match addr {
            KBSR => Some(store.mem(KBSR)),
            KBDR => {
                let data = store.mem(KBDR);
                set_ready(store, KBSR, false);
                Some(data)
            },
            _ => None
        }
    }

    fn io_write(&mut self, _store: &mut Store, addr: u16, _data: u16) -> bool {
        matches!(addr, KBSR | KBDR)
    }

    fn io_update(&mut self, store: &mut Store) {
        if is_ready(store, KBSR) { return; }

        if let Some(ch) = store.pop_input() {
            store.set_mem(KBDR, u16::from(ch));
            set_ready(store, KBSR, true);
            self.delivered += 1;
        }
    }

    fn io_reset(&mut self, store: &mut Store) {
        while store.pop_input().is_some() {}
        store.set_mem(KBSR, 0);
        store.set_mem(KBDR, 0);
        self.delivered = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::sim::device::{ExternalDevice, KBDR, KBSR};
    use crate::sim::mem::Store;

    use super::Keyboard;

    #[test]
    fn test_delivery() {
        let mut store = Store::new(Default::default());
        let mut kb = Keyboard::default();
        kb.io_reset(&mut store);

        // nothing queued
        kb.io_update(&mut store);
        assert_eq!(store.mem(KBSR), 0);

        store.queue_input(b'a');
        store.queue_input(b'b');
        kb.io_update(&mut store);
        assert_eq!(store.mem(KBSR), 0x8000);
        assert_eq!(store.mem(KBDR), u16::from(b'a'));

        // not consumed yet, so b waits
        kb.io_update(&mut store);
        assert_eq!(store.mem(KBDR), u16::from(b'a'));

        assert_eq!(kb.io_read(&mut store, KBDR), Some(u16::from(b'a')));
        assert_eq!(store.mem(KBSR), 0);

        kb.io_update(&mut store);
        assert_eq!(kb.io_read(&mut store, KBSR), Some(0x8000));
        assert_eq!(store.mem(KBDR), u16::from(b'b'));
        assert_eq!(kb.delivered(), 2);
    }
}
