//! Composite types: groups, periodic groups and multiple-value fields.

use std::sync::Arc;

use super::{AdaType, FieldFlag, FieldKind, FieldOption};

/// Which occurrences of a PE or MU field a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// Not repeated.
    Single,
    /// All occurrences, preceded by a 4-byte count (`1-N`).
    All,
    /// One occurrence, 1-based.
    Index(u32),
    /// Occurrences `from..=to`, 1-based.
    Range(u32, u32),
}

impl Occurrence {
    /// Format buffer suffix after the short name.
    pub fn format_suffix(&self) -> String {
        match self {
            Self::Single => String::new(),
            Self::All => "1-N".to_string(),
            Self::Index(i) => i.to_string(),
            Self::Range(from, to) => format!("{}-{}", from, to),
        }
    }
}

impl AdaType {
    /// Plain group of fields.
    pub fn group(short_name: impl Into<String>, children: Vec<AdaType>) -> Self {
        let mut group = AdaType::new(FieldKind::Group, short_name);
        group.children = children.into_iter().map(Arc::new).collect();
        group
    }

    /// Periodic group; all children are marked as PE members.
    pub fn periodic(short_name: impl Into<String>, children: Vec<AdaType>) -> Self {
        let mut group = AdaType::new(FieldKind::PeriodGroup, short_name);
        group.options.insert(FieldOption::Periodic);
        group.children = children.into_iter().map(Arc::new).collect();
        group.occurrence = Occurrence::All;
        for child in &mut group.children {
            Arc::make_mut(child).add_flag_recursive(FieldFlag::Periodic);
        }
        group
    }

    /// Multiple-value field holding occurrences of `element`.
    ///
    /// The element keeps the short name of the field and is flagged as
    /// the MU ghost; the container reports the element's length and
    /// format.
    pub fn multiple(element: AdaType) -> Self {
        let mut multiple = AdaType::new(FieldKind::Multiple, element.short_name.clone());
        multiple.name = element.name.clone();
        multiple.length = element.length;
        multiple.options = element.options;
        multiple.options.insert(FieldOption::Multiple);
        multiple.occurrence = Occurrence::All;
        let mut element = element;
        element.flags.insert(FieldFlag::MuGhost);
        multiple.children = vec![Arc::new(element)];
        multiple
    }

    /// Choose which occurrences a request addresses.
    pub fn with_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.occurrence = occurrence;
        if matches!(occurrence, Occurrence::Index(_)) {
            self.flags.insert(FieldFlag::SingleIndex);
        }
        self
    }

    /// Copy of a group or periodic group holding only `children`.
    pub(crate) fn with_children_subset(&self, children: Vec<Arc<AdaType>>) -> AdaType {
        let mut group = self.clone();
        group.children = children;
        group
    }

    /// The element type of a multiple-value field.
    pub fn element(&self) -> Option<&Arc<AdaType>> {
        if self.kind == FieldKind::Multiple {
            self.children.first()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group() {
        let g = AdaType::group(
            "AB",
            vec![
                AdaType::new(FieldKind::Alpha, "AE").with_length(0),
                AdaType::new(FieldKind::Alpha, "AD").with_length(6),
            ],
        );
        assert_eq!(g.kind(), FieldKind::Group);
        assert_eq!(g.children().len(), 2);
        assert_eq!(g.occurrence(), Occurrence::Single);
        assert_eq!(g.children()[1].short_name(), "AD");
    }

    #[test]
    fn test_periodic_marks_members() {
        let pe = AdaType::periodic(
            "PE",
            vec![
                AdaType::new(FieldKind::UInt2, "P1"),
                AdaType::group("PG", vec![AdaType::new(FieldKind::Alpha, "P2")]),
            ],
        );
        assert!(pe.has_option(FieldOption::Periodic));
        assert_eq!(pe.occurrence(), Occurrence::All);
        let mut members = 0;
        pe.walk(&mut |t| {
            if t.has_flag(FieldFlag::Periodic) {
                members += 1;
            }
        });
        assert_eq!(members, 3);
    }

    #[test]
    fn test_multiple() {
        let mu = AdaType::multiple(
            AdaType::new(FieldKind::Alpha, "MA")
                .with_length(10)
                .with_option(FieldOption::Descriptor),
        );
        assert_eq!(mu.kind(), FieldKind::Multiple);
        assert_eq!(mu.short_name(), "MA");
        assert_eq!(mu.length(), 10);
        assert!(mu.has_option(FieldOption::Multiple));
        assert!(mu.is_descriptor());
        assert!(mu.element().unwrap().has_flag(FieldFlag::MuGhost));
    }

    #[test]
    fn test_occurrence_suffix() {
        assert_eq!(Occurrence::All.format_suffix(), "1-N");
        assert_eq!(Occurrence::Index(3).format_suffix(), "3");
        assert_eq!(Occurrence::Range(2, 5).format_suffix(), "2-5");
        let t = AdaType::multiple(AdaType::new(FieldKind::UInt4, "MI"))
            .with_occurrence(Occurrence::Index(2));
        assert!(t.has_flag(FieldFlag::SingleIndex));
    }
}
