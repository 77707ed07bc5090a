//! Search tree and buffer emission.

use std::fmt;

use super::{Comparator, Logic};
use crate::buffer::BufferHelper;
use crate::dump;
use crate::platform::ByteOrder;
use crate::value::{push_separator, AdaValue, BufferOption, ValueCodec};
use crate::Result;

// ── SearchValue ────────────────────────────────────────────────────

/// One predicate: a field, a comparator and the operand value.
#[derive(Debug, Clone)]
pub struct SearchValue {
    field: String,
    comparator: Comparator,
    value: AdaValue,
}

impl SearchValue {
    pub(crate) fn new(field: impl Into<String>, comparator: Comparator, value: AdaValue) -> Self {
        Self {
            field: field.into(),
            comparator,
            value,
        }
    }

    /// Field name as written in the query.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Comparator of the predicate.
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Operand value.
    pub fn value(&self) -> &AdaValue {
        &self.value
    }

    fn is_descriptor(&self) -> bool {
        self.value.ada_type().is_descriptor()
    }

    fn doubled(&self, mainframe: bool) -> bool {
        mainframe && self.comparator == Comparator::Eq
    }

    fn write_search(&self, out: &mut String, mainframe: bool) {
        self.value.search_token(out);
        if self.doubled(mainframe) {
            out.push_str(",S");
            self.value.search_token(out);
        } else if self.comparator != Comparator::None {
            out.push(',');
            out.push_str(self.comparator.token());
        }
    }

    fn write_value(&self, helper: &mut BufferHelper, mainframe: bool) -> Result<()> {
        let mut opt = BufferOption::new(true, 0);
        opt.mainframe = mainframe;
        self.value.store_buffer(helper, &mut opt)?;
        if self.doubled(mainframe) {
            self.value.store_buffer(helper, &mut opt)?;
        }
        Ok(())
    }
}

impl fmt::Display for SearchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}({})",
            self.field,
            self.comparator,
            self.value.string(),
            self.value.ada_type().length()
        )
    }
}

// ── SearchNode ─────────────────────────────────────────────────────

/// Node of a search tree.
#[derive(Debug, Clone)]
pub enum SearchNode {
    /// Children combined by a logic operator.
    Branch {
        /// How the children combine.
        logic: Logic,
        /// Children in emission order.
        children: Vec<SearchNode>,
    },
    /// A single predicate.
    Leaf(SearchValue),
}

impl SearchNode {
    pub(crate) fn branch(logic: Logic, children: Vec<SearchNode>) -> Self {
        SearchNode::Branch { logic, children }
    }

    /// Visit every predicate depth-first, left to right.
    pub fn leaves(&self) -> Vec<&SearchValue> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SearchValue>) {
        match self {
            SearchNode::Leaf(v) => out.push(v),
            SearchNode::Branch { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn contains_logic(&self, wanted: Logic) -> bool {
        match self {
            SearchNode::Leaf(_) => false,
            SearchNode::Branch { logic, children } => {
                *logic == wanted || children.iter().any(|c| c.contains_logic(wanted))
            }
        }
    }

    /// Separator written before this node when it follows a sibling.
    fn joiner(&self, parent: Logic) -> &'static str {
        match self {
            SearchNode::Branch {
                logic: Logic::Not, ..
            } => Logic::Not.separator(),
            _ => parent.separator(),
        }
    }

    fn write_search(&self, out: &mut String, mainframe: bool) {
        match self {
            SearchNode::Leaf(v) => v.write_search(out, mainframe),
            SearchNode::Branch { logic, children } => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        push_separator(out);
                        out.push_str(child.joiner(*logic));
                    }
                    child.write_search(out, mainframe);
                }
            }
        }
    }

    fn write_values(&self, helper: &mut BufferHelper, mainframe: bool) -> Result<()> {
        for leaf in self.leaves() {
            leaf.write_value(helper, mainframe)?;
        }
        Ok(())
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            SearchNode::Leaf(v) => writeln!(f, "{}{}", indent, v),
            SearchNode::Branch { logic, children } => {
                writeln!(f, "{}{}", indent, logic)?;
                for child in children {
                    child.write_tree(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

// ── SearchTree ─────────────────────────────────────────────────────

/// Compiled search expression.
#[derive(Debug, Clone)]
pub struct SearchTree {
    root: SearchNode,
    mainframe: bool,
    byte_order: ByteOrder,
    need_search: bool,
}

impl SearchTree {
    pub(crate) fn new(root: SearchNode, mainframe: bool, byte_order: ByteOrder) -> Self {
        let need_search = decide_need_search(&root, mainframe);
        Self {
            root,
            mainframe,
            byte_order,
            need_search,
        }
    }

    /// Root node.
    pub fn root(&self) -> &SearchNode {
        &self.root
    }

    /// Whether the server must evaluate the search rather than walk a
    /// single descriptor.
    pub fn need_search(&self) -> bool {
        self.need_search
    }

    /// Search buffer, terminated with `.`.
    pub fn search_buffer(&self) -> String {
        let mut out = String::new();
        self.root.write_search(&mut out, self.mainframe);
        out.push('.');
        tracing::debug!(search_buffer = %out, "search buffer");
        out
    }

    /// Value buffer: every operand in search buffer order.
    pub fn value_buffer(&self) -> Result<Vec<u8>> {
        let mut helper = BufferHelper::new(self.byte_order);
        self.root.write_values(&mut helper, self.mainframe)?;
        dump::log_dump("value buffer", helper.as_bytes());
        Ok(helper.into_bytes())
    }

    /// Descriptor short names referenced by the search, without repeats.
    pub fn order_by(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for leaf in self.root.leaves().into_iter().filter(|l| l.is_descriptor()) {
            let name = leaf.value.short_name();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Names of every referenced field, without repeats.
    pub fn search_fields(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for leaf in self.root.leaves() {
            let name = leaf.value.ada_type().name();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl fmt::Display for SearchTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_tree(f, 0)
    }
}

fn decide_need_search(root: &SearchNode, mainframe: bool) -> bool {
    let leaves = root.leaves();
    let mut descriptors: Vec<&str> = Vec::new();
    let mut other = false;
    let mut not_equal = false;
    for leaf in &leaves {
        if leaf.is_descriptor() {
            let name = leaf.value.short_name();
            if !descriptors.contains(&name) {
                descriptors.push(name);
            }
        } else {
            other = true;
        }
        not_equal |= leaf.comparator == Comparator::Ne;
    }
    let single_descriptor = descriptors.len() == 1 && !other;
    let mainframe_range = mainframe && root.contains_logic(Logic::Range);
    let need = !single_descriptor || not_equal || mainframe_range;
    tracing::debug!(
        descriptors = descriptors.len(),
        other,
        not_equal,
        mainframe_range,
        need,
        "need search"
    );
    need
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::platform::Platform;
    use crate::types::{AdaType, FieldKind, FieldOption};
    use crate::value::Scalar;

    fn leaf(name: &str, descriptor: bool, comparator: Comparator, v: u64) -> SearchNode {
        let mut t = AdaType::new(FieldKind::UInt2, name);
        if descriptor {
            t = t.with_option(FieldOption::Descriptor);
        }
        let mut value = Arc::new(t).new_value(&Platform::default());
        value.set_value(Scalar::from(v)).unwrap();
        SearchNode::Leaf(SearchValue::new(name, comparator, value))
    }

    #[test]
    fn test_emission_joins_children() {
        let root = SearchNode::branch(
            Logic::And,
            vec![
                leaf("AA", true, Comparator::Eq, 1),
                SearchNode::branch(
                    Logic::Range,
                    vec![
                        leaf("AB", false, Comparator::Ge, 2),
                        leaf("AB", false, Comparator::Le, 3),
                    ],
                ),
            ],
        );
        let tree = SearchTree::new(root, false, ByteOrder::Big);
        assert_eq!(tree.search_buffer(), "AA,2,B,EQ,D,AB,2,B,GE,S,AB,2,B,LE.");
        assert_eq!(tree.value_buffer().unwrap(), vec![0, 1, 0, 2, 0, 3]);
        assert!(tree.need_search());
        assert_eq!(tree.order_by(), vec!["AA".to_string()]);
        assert_eq!(tree.search_fields(), vec!["AA".to_string(), "AB".to_string()]);
    }

    #[test]
    fn test_mainframe_duplicates_eq() {
        let tree = SearchTree::new(leaf("AA", true, Comparator::Eq, 5), true, ByteOrder::Little);
        assert_eq!(tree.search_buffer(), "AA,2,B,S,AA,2,B.");
        assert_eq!(tree.value_buffer().unwrap(), vec![5, 0, 5, 0]);
        assert!(!tree.need_search());
    }

    #[test]
    fn test_not_child_uses_n() {
        let root = SearchNode::branch(
            Logic::Range,
            vec![
                leaf("AA", true, Comparator::None, 1),
                leaf("AA", true, Comparator::None, 9),
                SearchNode::branch(Logic::Not, vec![leaf("AA", true, Comparator::None, 9)]),
            ],
        );
        let tree = SearchTree::new(root, true, ByteOrder::Big);
        assert_eq!(tree.search_buffer(), "AA,2,B,S,AA,2,B,N,AA,2,B.");
        assert!(tree.need_search());
        assert!(tree.to_string().starts_with("RANGE\n  AA  1(2)\n"));
    }

    #[test]
    fn test_not_equal_forces_search() {
        let tree = SearchTree::new(leaf("AA", true, Comparator::Ne, 1), false, ByteOrder::Big);
        assert!(tree.need_search());
        let tree = SearchTree::new(leaf("AB", false, Comparator::Eq, 1), false, ByteOrder::Big);
        assert!(tree.need_search());
        assert!(tree.order_by().is_empty());
    }
}
