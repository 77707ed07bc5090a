//! Super- and sub-descriptor types.

use super::{AdaType, FieldFlag, FieldKind, FieldOption};

/// One byte range of a parent field projected into a super-descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperEntry {
    /// Short name of the parent field.
    pub parent: String,
    /// First byte, 1-based.
    pub from: u32,
    /// Last byte, inclusive.
    pub to: u32,
}

impl SuperEntry {
    /// Create an entry.
    pub fn new(parent: impl Into<String>, from: u32, to: u32) -> Self {
        Self {
            parent: parent.into(),
            from,
            to,
        }
    }

    /// Bytes contributed.
    pub fn len(&self) -> u32 {
        (self.to + 1).saturating_sub(self.from)
    }

    /// Whether the entry contributes no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AdaType {
    /// Super-descriptor over the given parent ranges.
    pub fn super_descriptor(short_name: impl Into<String>, entries: Vec<SuperEntry>) -> Self {
        let mut t = AdaType::new(FieldKind::SuperDesc, short_name);
        t.options.insert(FieldOption::Descriptor);
        t.flags.insert(FieldFlag::ToBeRemoved);
        t.super_entries = entries;
        t.recompute_super_length();
        t
    }

    /// Append a parent range; the length follows.
    pub fn add_super_entry(&mut self, entry: SuperEntry) {
        self.super_entries.push(entry);
        self.recompute_super_length();
    }

    fn recompute_super_length(&mut self) {
        self.length = self.super_entries.iter().map(SuperEntry::len).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_sum_of_ranges() {
        let mut s = AdaType::super_descriptor(
            "S1",
            vec![SuperEntry::new("AA", 1, 4), SuperEntry::new("AD", 2, 3)],
        );
        assert_eq!(s.length(), 6);
        assert!(s.is_read_only());
        assert!(s.is_descriptor());
        assert!(s.has_flag(FieldFlag::ToBeRemoved));

        s.add_super_entry(SuperEntry::new("AC", 1, 1));
        assert_eq!(s.length(), 7);
        assert_eq!(s.super_entries().len(), 3);
    }
}
