//! The field type descriptor.

use std::sync::Arc;

use adabas_encoding::Charset;

use super::{
    FieldFlag, FieldKind, FieldOption, FlagSet, Occurrence, OptionSet, PartialRange, SuperEntry,
};

/// Static metadata of one field.
///
/// Built with the `with_*` methods and then frozen behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AdaType {
    pub(super) kind: FieldKind,
    pub(super) short_name: String,
    pub(super) name: String,
    pub(super) length: u32,
    pub(super) fractional: u32,
    pub(super) options: OptionSet,
    pub(super) flags: FlagSet,
    pub(super) charset: Option<Charset>,
    pub(super) partial: Option<PartialRange>,
    pub(super) children: Vec<Arc<AdaType>>,
    pub(super) occurrence: Occurrence,
    pub(super) super_entries: Vec<SuperEntry>,
}

impl AdaType {
    /// Create a scalar type with the kind's default length.
    ///
    /// The long name defaults to the short name.
    pub fn new(kind: FieldKind, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        let mut options = OptionSet::default();
        match kind {
            FieldKind::LaAlpha | FieldKind::LaUnicode => options.insert(FieldOption::LongAlpha),
            FieldKind::LbAlpha | FieldKind::LbUnicode => options.insert(FieldOption::LargeObject),
            _ => {}
        }
        let mut flags = FlagSet::default();
        if kind == FieldKind::SuperDesc || kind.is_pseudo() {
            flags.insert(FieldFlag::ReadOnly);
        }
        Self {
            kind,
            name: short_name.clone(),
            short_name,
            length: kind.default_length(),
            fractional: 0,
            options,
            flags,
            charset: None,
            partial: None,
            children: Vec::new(),
            occurrence: Occurrence::Single,
            super_entries: Vec::new(),
        }
    }

    /// Set the declared length; 0 means variable.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Set the long name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of fractional digits.
    pub fn with_fractional(mut self, fractional: u32) -> Self {
        self.fractional = fractional;
        self
    }

    /// Add a field option.
    pub fn with_option(mut self, option: FieldOption) -> Self {
        self.options.insert(option);
        self
    }

    /// Add an internal flag.
    pub fn with_flag(mut self, flag: FieldFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Attach a charset for alpha conversion, overriding the platform's.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Restrict reads and writes to a byte range.
    pub fn with_partial(mut self, range: PartialRange) -> Self {
        self.partial = Some(range);
        self.flags.insert(FieldFlag::Part);
        self
    }

    /// Semantic kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Two-character short name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Long name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared length, 0 when variable.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Fractional digit count.
    pub fn fractional(&self) -> u32 {
        self.fractional
    }

    /// Format character.
    pub fn format_char(&self) -> char {
        self.kind.format_char()
    }

    /// Option set.
    pub fn options(&self) -> OptionSet {
        self.options
    }

    /// Flag set.
    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    /// Whether `option` is set.
    pub fn has_option(&self, option: FieldOption) -> bool {
        self.options.contains(option)
    }

    /// Whether `flag` is set.
    pub fn has_flag(&self, flag: FieldFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the field is a descriptor (DE or UQ).
    pub fn is_descriptor(&self) -> bool {
        self.has_option(FieldOption::Descriptor)
            || self.has_option(FieldOption::Unique)
            || self.kind == FieldKind::SuperDesc
    }

    /// Whether the field has no fixed length.
    pub fn is_variable(&self) -> bool {
        self.length == 0
    }

    /// Whether writes are refused.
    pub fn is_read_only(&self) -> bool {
        self.has_flag(FieldFlag::ReadOnly)
    }

    /// Whether this is a large object field.
    pub fn is_lob(&self) -> bool {
        matches!(self.kind, FieldKind::LbAlpha | FieldKind::LbUnicode) && self.length == 0
    }

    /// Charset attached to the type.
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    /// Partial range, if any.
    pub fn partial(&self) -> Option<PartialRange> {
        self.partial
    }

    /// Child types of a structure.
    pub fn children(&self) -> &[Arc<AdaType>] {
        &self.children
    }

    /// Occurrence rule of a structure.
    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }

    /// Sub-ranges of a super-descriptor.
    pub fn super_entries(&self) -> &[SuperEntry] {
        &self.super_entries
    }

    /// Visit this type and every nested child, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a AdaType)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Set a flag on this type and all nested children.
    pub(super) fn add_flag_recursive(&mut self, flag: FieldFlag) {
        self.flags.insert(flag);
        for child in &mut self.children {
            Arc::make_mut(child).add_flag_recursive(flag);
        }
    }
}

impl std::fmt::Display for AdaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.short_name, self.name)?;
        if !self.kind.is_structure() {
            write!(f, ",{},{}", self.length, self.format_char())?;
        }
        let codes = self.options.codes();
        if !codes.is_empty() {
            write!(f, ",{}", codes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = AdaType::new(FieldKind::Packed, "AC");
        assert_eq!(t.length(), 1);
        assert_eq!(t.format_char(), 'P');
        assert_eq!(t.name(), "AC");
        assert!(!t.is_descriptor());

        assert_eq!(AdaType::new(FieldKind::ByteArray, "BA").length(), 126);
        assert_eq!(AdaType::new(FieldKind::Int8, "I8").length(), 8);
        assert_eq!(AdaType::new(FieldKind::Double, "DD").length(), 8);
    }

    #[test]
    fn test_builder() {
        let t = AdaType::new(FieldKind::Alpha, "SA")
            .with_length(8)
            .with_name("Surname")
            .with_option(FieldOption::Unique)
            .with_option(FieldOption::Descriptor);
        assert!(t.is_descriptor());
        assert!(!t.is_variable());
        assert_eq!(t.to_string(), "SA=Surname,8,A,UQ,DE");
    }

    #[test]
    fn test_lob() {
        let t = AdaType::new(FieldKind::LbAlpha, "RA");
        assert!(t.is_variable());
        assert!(t.is_lob());
        assert!(t.has_option(FieldOption::LargeObject));
        assert!(!AdaType::new(FieldKind::LaAlpha, "LA").is_lob());
    }

    #[test]
    fn test_pseudo_read_only() {
        assert!(AdaType::new(FieldKind::Phonetic, "PH").is_read_only());
        assert!(!AdaType::new(FieldKind::Alpha, "AA").is_read_only());
    }

    #[test]
    fn test_partial_sets_flag() {
        let t = AdaType::new(FieldKind::LbAlpha, "RA").with_partial(PartialRange::new(1, 10));
        assert!(t.has_flag(FieldFlag::Part));
        assert_eq!(t.partial().unwrap().len(), 10);
    }
}
