//! Group, periodic group and multiple-value field values.

use std::sync::Arc;

use super::{push_separator, AdaValue, BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::types::{AdaType, FieldKind, Occurrence};
use crate::Result;

/// Composite value.
///
/// A group holds exactly one element: its member values. Periodic groups
/// and multiple-value fields hold one element per occurrence.
#[derive(Debug, Clone)]
pub struct StructureValue {
    pub(crate) meta: ValueMeta,
    elements: Vec<Vec<AdaValue>>,
}

impl StructureValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        let mut value = Self {
            meta,
            elements: Vec::new(),
        };
        if value.kind() == FieldKind::Group {
            let element = value.new_element(0);
            value.elements.push(element);
        }
        value
    }

    fn kind(&self) -> FieldKind {
        self.meta.ada_type.kind()
    }

    fn is_repeated(&self) -> bool {
        matches!(self.kind(), FieldKind::PeriodGroup | FieldKind::Multiple)
    }

    /// Fresh member values for occurrence `index` (1-based; 0 for groups).
    fn new_element(&self, index: u32) -> Vec<AdaValue> {
        let (pe_index, mu_index) = match self.kind() {
            FieldKind::PeriodGroup => (index, 0),
            FieldKind::Multiple => (self.meta.pe_index, index),
            _ => (self.meta.pe_index, 0),
        };
        self.meta
            .ada_type
            .children()
            .iter()
            .map(|child| {
                let mut v = child.new_value(&self.meta.platform);
                v.set_indexes(pe_index, mu_index);
                v
            })
            .collect()
    }

    pub(crate) fn propagate_pe_index(&mut self, pe_index: u32) {
        if self.kind() == FieldKind::PeriodGroup {
            return;
        }
        for element in &mut self.elements {
            for v in element.iter_mut() {
                let mu_index = v.mu_index();
                v.set_indexes(pe_index, mu_index);
            }
        }
    }

    /// All elements.
    pub fn elements(&self) -> &[Vec<AdaValue>] {
        &self.elements
    }

    /// Number of elements (occurrences for PE and MU).
    pub fn nr_elements(&self) -> usize {
        self.elements.len()
    }

    /// Member values of a group, or of the first occurrence.
    pub fn values(&self) -> &[AdaValue] {
        self.elements.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Values of occurrence `index` (1-based), creating occurrences as
    /// needed. Groups ignore the index.
    pub fn occurrence_mut(&mut self, index: u32) -> &mut [AdaValue] {
        if !self.is_repeated() {
            return self.elements[0].as_mut_slice();
        }
        let index = index.max(1);
        while self.elements.len() < index as usize {
            let next = self.elements.len() as u32 + 1;
            let element = self.new_element(next);
            self.elements.push(element);
        }
        self.elements[index as usize - 1].as_mut_slice()
    }

    /// Append an occurrence to a multiple-value field.
    ///
    /// Nothing is added when the element rejects the value.
    pub fn push_value(&mut self, value: Scalar) -> Result<()> {
        let mut element = self.new_element(self.elements.len() as u32 + 1);
        if let Some(first) = element.first_mut() {
            first.set_value(value)?;
        }
        self.elements.push(element);
        Ok(())
    }

    /// First value called `name` in any element.
    pub fn find(&self, name: &str) -> Option<&AdaValue> {
        self.elements
            .iter()
            .flat_map(|e| e.iter())
            .find_map(|v| v.find(name))
    }

    /// Mutable variant of [`StructureValue::find`].
    pub fn find_mut(&mut self, name: &str) -> Option<&mut AdaValue> {
        self.elements
            .iter_mut()
            .flat_map(|e| e.iter_mut())
            .find_map(|v| v.find_mut(name))
    }

    fn members(&self) -> impl Iterator<Item = &AdaValue> {
        self.elements.iter().flat_map(|e| e.iter())
    }

    fn format_read(&self, out: &mut String, opt: &BufferOption) -> u32 {
        let name = self.meta.short_name();
        let element = self.meta.ada_type.element();
        push_separator(out);
        match (self.meta.ada_type.occurrence(), element) {
            (Occurrence::Index(i), Some(element)) => {
                out.push_str(&format!(
                    "{}{},{},{}",
                    name,
                    i,
                    element.length(),
                    element.format_char()
                ));
                element.length()
            }
            (Occurrence::Index(i), None) => {
                out.push_str(&format!("{}{}", name, i));
                opt.multiple_size
            }
            (occurrence, Some(element)) => {
                out.push_str(&format!(
                    "{}C,4,{}{},{},{}",
                    name,
                    name,
                    occurrence.format_suffix(),
                    element.length(),
                    element.format_char()
                ));
                opt.multiple_size
            }
            (occurrence, None) => {
                out.push_str(&format!("{}C,4,{}{}", name, name, occurrence.format_suffix()));
                opt.multiple_size
            }
        }
    }
}

impl ValueCodec for StructureValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        Err(self.meta.type_mismatch(&value))
    }

    fn bytes(&self) -> Vec<u8> {
        Vec::new()
    }

    fn string(&self) -> String {
        let parts: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.iter().map(|v| v.string()).collect::<Vec<_>>().join(","))
            .collect();
        if self.is_repeated() {
            format!("[{}]", parts.join(";"))
        } else {
            parts.join("")
        }
    }

    fn int64(&self) -> Result<i64> {
        Err(self.meta.not_numeric("i64"))
    }

    fn uint64(&self) -> Result<u64> {
        Err(self.meta.not_numeric("u64"))
    }

    fn float64(&self) -> Result<f64> {
        Err(self.meta.not_numeric("f64"))
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        if !self.is_repeated() {
            return self
                .members()
                .filter(|v| !opt.store_call || !v.ada_type().is_read_only())
                .map(|v| v.format_buffer(out, opt))
                .sum();
        }
        if opt.is_second_call() {
            return 0;
        }
        if opt.store_call {
            return self
                .members()
                .filter(|v| !v.ada_type().is_read_only())
                .map(|v| v.format_buffer(out, opt))
                .sum();
        }
        self.format_read(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if self.is_repeated() && opt.is_second_call() {
            return Ok(());
        }
        for v in self.members().filter(|v| !v.ada_type().is_read_only()) {
            v.store_buffer(helper, opt)?;
        }
        Ok(())
    }

    fn parse_buffer(
        &mut self,
        helper: &mut BufferHelper,
        opt: &mut BufferOption,
    ) -> Result<TraverseResult> {
        if !self.is_repeated() {
            for element in &mut self.elements {
                for v in element.iter_mut() {
                    v.parse_buffer(helper, opt)?;
                }
            }
            return Ok(TraverseResult::Continue);
        }
        if opt.is_second_call() {
            return Ok(TraverseResult::SkipTree);
        }

        let (first, count) = match self.meta.ada_type.occurrence() {
            Occurrence::Index(i) => (i, 1),
            Occurrence::Range(from, _) => (from, helper.receive_u32()?),
            _ => (1, helper.receive_u32()?),
        };
        tracing::debug!(field = %self.meta.short_name(), count, "parse occurrences");
        // Every occurrence takes at least one byte.
        let mut elements = Vec::with_capacity((count as usize).min(helper.remaining()));
        for k in 0..count {
            let mut element = self.new_element(first + k);
            for v in element.iter_mut() {
                v.parse_buffer(helper, opt)?;
            }
            elements.push(element);
        }
        self.elements = elements;
        Ok(TraverseResult::Continue)
    }
}
