//! Query preprocessing and tree construction.

use super::literal;
use super::tree::{SearchNode, SearchTree, SearchValue};
use super::{Comparator, Logic};
use crate::definition::Definition;
use crate::platform::{ByteOrder, Platform};
use crate::{AdabasError, Result};

const OPERATOR_CHARS: &[char] = &['=', '!', '<', '>'];

/// A query with its quoted literals lifted into a constant table.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    platform: Platform,
    search: String,
    constants: Vec<String>,
    byte_order: ByteOrder,
    need_search: bool,
}

impl SearchInfo {
    /// Preprocess `query` for `platform`.
    ///
    /// Each `'...'` literal becomes `#{N}`; `\'` inside a literal does not
    /// end it. Whitespace outside literals is collapsed.
    ///
    /// # Errors
    /// Fails with code 171 for an unterminated literal.
    pub fn new(platform: Platform, query: &str) -> Result<Self> {
        let (search, constants) = extract_constants(query)?;
        let search = search.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::debug!(search = %search, constants = constants.len(), "search preprocessed");
        Ok(Self {
            platform,
            search,
            constants,
            byte_order: ByteOrder::native(),
            need_search: false,
        })
    }

    /// Byte order of numeric operands in the value buffer.
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Query text with placeholders.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Raw literal text, indexed by placeholder number minus one.
    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Result of the last [`SearchInfo::generate_tree`].
    pub fn need_search(&self) -> bool {
        self.need_search
    }

    /// Parse the query against `definition`.
    ///
    /// # Errors
    /// - 42 when a field is unknown
    /// - 170 when a comparator is missing or malformed
    /// - 171 when a literal cannot be parsed
    /// - any error the field raises on assignment
    pub fn generate_tree(&mut self, definition: &Definition) -> Result<SearchTree> {
        let root = self.build(definition, &self.search)?;
        let tree = SearchTree::new(root, self.platform.is_mainframe(), self.byte_order);
        self.need_search = tree.need_search();
        tracing::debug!(tree = %tree, need_search = self.need_search, "search tree generated");
        Ok(tree)
    }

    fn build(&self, definition: &Definition, text: &str) -> Result<SearchNode> {
        let parts = split_keyword(text, "AND");
        if parts.len() > 1 {
            let children = parts
                .iter()
                .map(|p| self.build(definition, p))
                .collect::<Result<Vec<_>>>()?;
            return Ok(SearchNode::branch(Logic::And, children));
        }
        let parts = split_keyword(text, "OR");
        if parts.len() > 1 {
            let children = parts
                .iter()
                .map(|p| self.build(definition, p))
                .collect::<Result<Vec<_>>>()?;
            let node = SearchNode::branch(Logic::Or, children);
            let logic = if single_field(&node) { Logic::Mor } else { Logic::Or };
            return Ok(match node {
                SearchNode::Branch { children, .. } => SearchNode::branch(logic, children),
                leaf => leaf,
            });
        }
        self.predicate(definition, text.trim())
    }

    fn predicate(&self, definition: &Definition, text: &str) -> Result<SearchNode> {
        let bad = || AdabasError::InvalidComparator {
            expression: text.to_string(),
        };
        let start = text.find(OPERATOR_CHARS).ok_or_else(bad)?;
        let len = text[start..]
            .chars()
            .take_while(|c| OPERATOR_CHARS.contains(c))
            .count();
        let field = text[..start].trim();
        let value = text[start + len..].trim();
        if field.is_empty() || value.is_empty() {
            return Err(bad());
        }
        let comparator = Comparator::parse(&text[start..start + len], text)?;

        if is_range(value) {
            if comparator != Comparator::Eq {
                return Err(bad());
            }
            return self.range(definition, field, value);
        }
        self.leaf(definition, field, comparator, value)
    }

    fn leaf(
        &self,
        definition: &Definition,
        field: &str,
        comparator: Comparator,
        operand: &str,
    ) -> Result<SearchNode> {
        let ada_type = definition.search_type(field)?;
        // Multiple-value fields compare against a single element.
        let ada_type = ada_type.element().cloned().unwrap_or(ada_type);
        let mut value = ada_type.new_value(&self.platform);
        let scalar = literal::operand(operand, &self.constants, self.byte_order)?;
        value.assign_search_operand(scalar)?;
        Ok(SearchNode::Leaf(SearchValue::new(field, comparator, value)))
    }

    fn range(&self, definition: &Definition, field: &str, value: &str) -> Result<SearchNode> {
        let open_low = value.starts_with('(');
        let open_high = value.ends_with(')');
        let inner = &value[1..value.len() - 1];
        let (low, high) = inner.split_once(':').ok_or_else(|| AdabasError::InvalidLiteral {
            literal: value.to_string(),
            reason: "range without ':'".to_string(),
        })?;

        let mut children = Vec::with_capacity(3);
        if self.platform.is_mainframe() {
            children.push(self.leaf(definition, field, Comparator::None, low)?);
            children.push(self.leaf(definition, field, Comparator::None, high)?);
            let excluded = match (open_low, open_high) {
                (true, true) => Some(SearchNode::branch(
                    Logic::And,
                    vec![
                        self.leaf(definition, field, Comparator::None, low)?,
                        self.leaf(definition, field, Comparator::Ne, high)?,
                    ],
                )),
                (true, false) => Some(self.leaf(definition, field, Comparator::None, low)?),
                (false, true) => Some(self.leaf(definition, field, Comparator::None, high)?),
                (false, false) => None,
            };
            if let Some(node) = excluded {
                children.push(SearchNode::branch(Logic::Not, vec![node]));
            }
        } else {
            let lower = if open_low { Comparator::Gt } else { Comparator::Ge };
            let upper = if open_high { Comparator::Lt } else { Comparator::Le };
            children.push(self.leaf(definition, field, lower, low)?);
            children.push(self.leaf(definition, field, upper, high)?);
        }
        Ok(SearchNode::branch(Logic::Range, children))
    }
}

/// Lift quoted literals out of `query`.
fn extract_constants(query: &str) -> Result<(String, Vec<String>)> {
    let bytes = query.as_bytes();
    let mut search = String::with_capacity(query.len());
    let mut constants = Vec::new();
    let mut pos = 0;
    while let Some(offset) = query[pos..].find('\'') {
        let open = pos + offset;
        search.push_str(&query[pos..open]);
        let mut scan = open + 1;
        let close = loop {
            let found = query[scan..]
                .find('\'')
                .map(|o| scan + o)
                .ok_or_else(|| AdabasError::InvalidLiteral {
                    literal: query[open..].to_string(),
                    reason: "unterminated string".to_string(),
                })?;
            if found > open + 1 && bytes[found - 1] == b'\\' {
                scan = found + 1;
                continue;
            }
            break found;
        };
        constants.push(query[open + 1..close].to_string());
        search.push_str(&format!("#{{{}}}", constants.len()));
        pos = close + 1;
    }
    search.push_str(&query[pos..]);
    Ok((search, constants))
}

/// Split on a whitespace-delimited keyword, ignoring case.
fn split_keyword<'a>(text: &'a str, keyword: &str) -> Vec<&'a str> {
    let upper = text.to_ascii_uppercase();
    let pattern = format!(" {} ", keyword);
    let mut parts = Vec::new();
    let mut start = 0;
    for (at, _) in upper.match_indices(&pattern) {
        if at < start {
            continue;
        }
        parts.push(text[start..at].trim());
        start = at + pattern.len();
    }
    parts.push(text[start..].trim());
    parts
}

fn is_range(value: &str) -> bool {
    (value.starts_with('[') || value.starts_with('('))
        && (value.ends_with(']') || value.ends_with(')'))
        && value.len() > 2
        && value.contains(':')
}

/// Whether every predicate below `node` names the same field.
fn single_field(node: &SearchNode) -> bool {
    let leaves = node.leaves();
    match leaves.first() {
        Some(first) => leaves
            .iter()
            .all(|l| l.value().short_name() == first.value().short_name()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_constants() {
        let info = SearchInfo::new(Platform::default(), "AA='X' AND AB='O\\'Neil'").unwrap();
        assert_eq!(info.search(), "AA=#{1} AND AB=#{2}");
        assert_eq!(info.constants(), &["X".to_string(), "O\\'Neil".to_string()]);
    }

    #[test]
    fn test_constant_hides_keywords() {
        let info = SearchInfo::new(Platform::default(), "AA='A AND B'").unwrap();
        assert_eq!(info.search(), "AA=#{1}");
        assert_eq!(info.constants()[0], "A AND B");
        let info = SearchInfo::new(Platform::default(), "AA=''").unwrap();
        assert_eq!(info.constants()[0], "");
    }

    #[test]
    fn test_unterminated_literal() {
        let err = SearchInfo::new(Platform::default(), "AA='ABC").unwrap_err();
        assert_eq!(err.code(), 171);
    }

    #[test]
    fn test_whitespace_collapsed() {
        let info = SearchInfo::new(Platform::default(), "  AA=1\tand   BC=2 ").unwrap();
        assert_eq!(info.search(), "AA=1 and BC=2");
    }

    #[test]
    fn test_split_keyword() {
        assert_eq!(split_keyword("A=1 and B=2 AND C=3", "AND"), vec!["A=1", "B=2", "C=3"]);
        assert_eq!(split_keyword("A=1 Or B=2", "OR"), vec!["A=1", "B=2"]);
        assert_eq!(split_keyword("ORDER=1", "OR"), vec!["ORDER=1"]);
    }

    #[test]
    fn test_is_range() {
        assert!(is_range("[1:2]"));
        assert!(is_range("(1:2)"));
        assert!(!is_range("[12]"));
        assert!(!is_range("12"));
    }
}
