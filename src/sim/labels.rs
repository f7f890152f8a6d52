//! A bidirectional mapping between label names and addresses.
//!
//! A [`LabelTable`] holds at most one label per address, and each label names exactly one address.
//! Inserting an entry that collides with either mapping evicts the colliding entries first.

use std::collections::{BTreeMap, HashMap};

/// A bidirectional label/address table.
///
/// ```
/// # use lc3_workbench::sim::labels::LabelTable;
/// let mut table = LabelTable::new();
/// table.insert("LOOP", 0x3000);
/// table.insert("END", 0x3005);
///
/// // moving LOOP to END's address evicts both old entries
/// let evicted = table.insert("LOOP", 0x3005);
/// assert_eq!(evicted, [(0x3005, "END".to_string()), (0x3000, "LOOP".to_string())]);
/// assert_eq!(table.get_addr("LOOP"), Some(0x3005));
/// assert_eq!(table.get_label(0x3000), None);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct LabelTable {
    by_name: HashMap<String, u16>,
    by_addr: BTreeMap<u16, String>,
}

impl LabelTable {
    /// Creates an empty label table.
    pub fn new() -> Self {
        Default::default()
    }

    /// Gets the address of a label (labels are case-sensitive).
    pub fn get_addr(&self, label: &str) -> Option<u16> {
        self.by_name.get(label).copied()
    }

    /// Gets the label at an address.
    pub fn get_label(&self, addr: u16) -> Option<&str> {
        self.by_addr.get(&addr).map(String::as_str)
    }

    /// Binds a label to an address.
    ///
    /// Any entry already at `addr` and any existing binding of `label` are removed first.
    /// The removed entries are returned as `(address, label)` pairs,
    /// the entry at `addr` first.
    pub fn insert(&mut self, label: impl Into<String>, addr: u16) -> Vec<(u16, String)> {
        let label = label.into();
        let mut evicted = vec![];

        if let Some(old) = self.remove_by_addr(addr) {
            evicted.push((addr, old));
        }
        if let Some(old_addr) = self.remove_by_name(&label) {
            evicted.push((old_addr, label.clone()));
        }

        self.by_name.insert(label.clone(), addr);
        self.by_addr.insert(addr, label);
        evicted
    }

    /// Removes the label at the given address, returning it.
    pub fn remove_by_addr(&mut self, addr: u16) -> Option<String> {
        let label = self.by_addr.remove(&addr)?;
        self.by_name.remove(&label);
        Some(label)
    }

    /// Removes the label with the given name, returning its address.
    pub fn remove_by_name(&mut self, label: &str) -> Option<u16> {
        let addr = self.by_name.remove(label)?;
        self.by_addr.remove(&addr);
        Some(addr)
    }

    /// Iterates over all `(label, address)` pairs, sorted by address.
    pub fn iter(&self) -> impl Iterator<Item=(&str, u16)> + '_ {
        self.by_addr.iter().map(|(&addr, label)| (&**label, addr))
    }

    /// The number of labels in the table.
    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    /// Whether the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }

    /// Removes every label.
    pub fn clear(&mut self) {
        self.by_name.clear();
        self.by_addr.clear();
    }
}

impl<S: Into<String>> FromIterator<(S, u16)> for LabelTable {
    fn from_iter<T: IntoIterator<Item = (S, u16)>>(iter: T) -> Self {
        let mut table = LabelTable::new();
        for (label, addr) in iter {
            table.insert(label, addr);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::LabelTable;

    #[test]
    fn test_bidirectional() {
        let mut table = LabelTable::new();
        assert!(table.insert("A", 0x3000).is_empty());
        assert!(table.insert("B", 0x3001).is_empty());
        assert_eq!(table.get_addr("A"), Some(0x3000));
        assert_eq!(table.get_label(0x3001), Some("B"));
        assert_eq!(table.get_addr("a"), None);

        // new label at A's address
        assert_eq!(table.insert("C", 0x3000), [(0x3000, "A".to_string())]);
        assert_eq!(table.get_addr("A"), None);
        assert_eq!(table.get_label(0x3000), Some("C"));

        // rebinding same label at same address evicts itself
        assert_eq!(table.insert("C", 0x3000), [(0x3000, "C".to_string())]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut table: LabelTable = [("X", 1), ("Y", 2), ("Z", 3)].into_iter().collect();
        assert_eq!(table.remove_by_addr(2), Some("Y".to_string()));
        assert_eq!(table.remove_by_addr(2), None);
        assert_eq!(table.remove_by_name("Z"), Some(3));
        assert_eq!(table.remove_by_name("Z"), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), [("X", 1)]);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_iter_sorted() {
        let table: LabelTable = [("HIGH", 0xFFFF), ("LOW", 0x0000), ("MID", 0x3000)].into_iter().collect();
        let labels: Vec<_> = table.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["LOW", "MID", "HIGH"]);
    }
}
