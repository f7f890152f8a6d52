//! Change notifications for the machine state.
//!
//! Every mutation of a [`Store`] produces a [`ChangeEvent`],
//! which is sent to every subscriber registered through [`ChangeObserver::subscribe`].
//! An event carries enough data to update a view of the machine without re-reading the store.
//!
//! ```
//! use lc3_workbench::sim::mem::Store;
//! use lc3_workbench::sim::observer::ChangeEvent;
//!
//! let mut store = Store::new(Default::default());
//! let events = store.subscribe();
//!
//! store.set_mem(0x3000, 0x1234);
//! assert_eq!(events.try_recv(), Ok(ChangeEvent::MemoryChanged { addr: 0x3000, value: 0x1234 }));
//! ```
//!
//! [`Store`]: super::mem::Store

use crossbeam_channel::{Receiver, Sender};

use super::mem::RegId;

/// A change to the machine state.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ChangeEvent {
    /// A memory location was written.
    MemoryChanged {
        /// The address written.
        addr: u16,
        /// The new value.
        value: u16
    },
    /// A register was written.
    RegisterChanged {
        /// The register written.
        reg: RegId,
        /// The new value.
        value: u16
    },
    /// A label was bound to an address.
    LabelSet {
        /// The address.
        addr: u16,
        /// The label.
        label: String
    },
    /// A label was removed.
    LabelUnset {
        /// The address the label pointed to.
        addr: u16,
        /// The label.
        label: String
    },
    /// A character was added to the input queue.
    InputQueued {
        /// The character.
        ch: u8
    },
    /// The display consumed a character.
    OutputProduced {
        /// The character.
        ch: u8
    },
}

/// The set of subscribers to a store's changes.
#[derive(Debug, Default)]
pub struct ChangeObserver {
    subscribers: Vec<Sender<ChangeEvent>>
}
impl ChangeObserver {
    /// Creates an observer with no subscribers.
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a new subscriber, returning the channel its events arrive on.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Sends an event to every subscriber.
    ///
    /// Subscribers whose receiver was dropped are removed.
    pub fn emit(&mut self, event: ChangeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// The number of live subscribers (as of the last emission).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeEvent, ChangeObserver};

    #[test]
    fn test_multiple_subscribers() {
        let mut observer = ChangeObserver::new();
        let a = observer.subscribe();
        let b = observer.subscribe();

        observer.emit(ChangeEvent::InputQueued { ch: b'x' });
        assert_eq!(a.try_recv(), Ok(ChangeEvent::InputQueued { ch: b'x' }));
        assert_eq!(b.try_recv(), Ok(ChangeEvent::InputQueued { ch: b'x' }));
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_prune_dropped() {
        let mut observer = ChangeObserver::new();
        let a = observer.subscribe();
        let b = observer.subscribe();
        drop(b);

        assert_eq!(observer.subscriber_count(), 2);
        observer.emit(ChangeEvent::OutputProduced { ch: b'!' });
        assert_eq!(observer.subscriber_count(), 1);
        assert_eq!(a.try_recv(), Ok(ChangeEvent::OutputProduced { ch: b'!' }));
    }
}
