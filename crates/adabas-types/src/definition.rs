//! Field definition: an ordered list of field types and their values.
//!
//! A [`Definition`] drives whole-record requests. Its format buffer lists
//! every field, its record buffer concatenates their wire bytes, and it
//! resolves short names for the search compiler.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::buffer::BufferHelper;
use crate::dump;
use crate::platform::Platform;
use crate::types::{AdaType, FieldFlag, FieldKind};
use crate::value::{AdaValue, BufferOption, Scalar, SecondCall, ValueCodec};
use crate::{AdabasError, Result};

// ── Definition ─────────────────────────────────────────────────────

/// Ordered field types plus one value per top-level field.
#[derive(Debug, Clone)]
pub struct Definition {
    platform: Platform,
    types: Vec<Arc<AdaType>>,
    /// Short and long name of every field, nested ones included.
    index: HashMap<String, Arc<AdaType>>,
    values: Vec<AdaValue>,
}

impl Definition {
    /// Build a definition, rejecting duplicate short names.
    pub fn new(platform: Platform, types: Vec<AdaType>) -> Result<Self> {
        let types: Vec<Arc<AdaType>> = types.into_iter().map(Arc::new).collect();
        let mut index = HashMap::new();
        for t in &types {
            register(&mut index, t)?;
        }
        let mut definition = Self {
            platform,
            types,
            index,
            values: Vec::new(),
        };
        definition.create_values();
        tracing::debug!(fields = definition.types.len(), "definition created");
        Ok(definition)
    }

    /// Platform used for values.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Top-level field types in record order.
    pub fn types(&self) -> &[Arc<AdaType>] {
        &self.types
    }

    /// Look up a field type by short or long name, at any depth.
    ///
    /// # Errors
    /// Fails with code 42 when no such field exists.
    pub fn search_type(&self, name: &str) -> Result<Arc<AdaType>> {
        self.index
            .get(name.trim())
            .cloned()
            .ok_or_else(|| AdabasError::FieldNotFound {
                name: name.trim().to_string(),
            })
    }

    /// Replace all values with fresh ones.
    pub fn create_values(&mut self) {
        self.values = self
            .types
            .iter()
            .map(|t| t.new_value(&self.platform))
            .collect();
    }

    /// Top-level values in record order.
    pub fn values(&self) -> &[AdaValue] {
        &self.values
    }

    /// Value called `name`, searching nested structures.
    pub fn value(&self, name: &str) -> Option<&AdaValue> {
        self.values.iter().find_map(|v| v.find(name))
    }

    /// Mutable variant of [`Definition::value`].
    pub fn value_mut(&mut self, name: &str) -> Option<&mut AdaValue> {
        self.values.iter_mut().find_map(|v| v.find_mut(name))
    }

    /// Assign a scalar to the field called `name`.
    pub fn set_value(&mut self, name: &str, value: impl Into<Scalar>) -> Result<()> {
        let target = self
            .value_mut(name)
            .ok_or_else(|| AdabasError::FieldNotFound {
                name: name.to_string(),
            })?;
        target.set_value(value.into())
    }

    fn takes_part(value: &AdaValue, opt: &BufferOption) -> bool {
        let t = value.ada_type();
        if opt.store_call {
            !t.is_read_only() && !t.has_flag(FieldFlag::ToBeRemoved)
        } else {
            !t.kind().is_pseudo()
        }
    }

    /// Format buffer for the current request, terminated with `.`, plus
    /// the record buffer length it describes.
    pub fn format_buffer(&self, opt: &BufferOption) -> (String, u32) {
        let mut out = String::new();
        let mut length = 0u32;
        for v in self.values.iter().filter(|v| Self::takes_part(v, opt)) {
            length = length.saturating_add(v.format_buffer(&mut out, opt));
        }
        out.push('.');
        tracing::debug!(format = %out, length, second_call = opt.second_call, "format buffer");
        (out, length)
    }

    /// Record buffer for a store request.
    ///
    /// `opt.need_second_call` is reset first and reports whether a LOB
    /// field has chunks left.
    pub fn store_buffer(&self, opt: &mut BufferOption) -> Result<Vec<u8>> {
        opt.need_second_call = SecondCall::None;
        let mut helper = BufferHelper::new(self.platform.byte_order());
        for v in &self.values {
            if Self::takes_part(v, opt) {
                v.store_buffer(&mut helper, opt)?;
            }
        }
        dump::log_dump("record buffer", helper.as_bytes());
        Ok(helper.into_bytes())
    }

    /// Populate the values from a record buffer.
    ///
    /// On error the values are partially populated and must be discarded.
    pub fn parse_buffer(&mut self, record: &[u8], opt: &mut BufferOption) -> Result<()> {
        opt.need_second_call = SecondCall::None;
        let mut helper = BufferHelper::from_bytes(record, self.platform.byte_order());
        for v in self.values.iter_mut() {
            if v.ada_type().kind().is_pseudo() {
                continue;
            }
            v.parse_buffer(&mut helper, opt)?;
        }
        if helper.remaining() > 0 {
            tracing::warn!(remaining = helper.remaining(), "record buffer not fully consumed");
        }
        tracing::debug!(
            parsed = helper.offset(),
            need_second_call = ?opt.need_second_call,
            "record parsed"
        );
        Ok(())
    }

    /// Keep only the named fields, by short or long name.
    ///
    /// A named group or MU field keeps all of its members. A group holding
    /// some named members is kept with just those members. Everything else
    /// is dropped, super-descriptors included unless they are named. `*`
    /// keeps every field. The index and the values are rebuilt; previous
    /// values are lost.
    ///
    /// # Errors
    /// Fails with code 42 for an unknown name; the definition is unchanged.
    pub fn restrict_to_fields(&mut self, names: &[&str]) -> Result<()> {
        if names.iter().any(|n| n.trim() == "*") {
            self.create_values();
            return Ok(());
        }
        let wanted = names
            .iter()
            .map(|n| self.search_type(n).map(|t| t.short_name().to_string()))
            .collect::<Result<HashSet<String>>>()?;

        let types: Vec<Arc<AdaType>> = self
            .types
            .iter()
            .filter_map(|t| restrict(t, &wanted))
            .collect();
        let mut index = HashMap::new();
        for t in &types {
            register(&mut index, t)?;
        }
        tracing::debug!(
            before = self.types.len(),
            after = types.len(),
            fields = ?names,
            "definition restricted"
        );
        self.types = types;
        self.index = index;
        self.create_values();
        Ok(())
    }

    /// Rebuild every top-level super-descriptor from its parent values.
    pub fn derive_super_descriptors(&mut self) -> Result<()> {
        for i in 0..self.values.len() {
            let derived = match &self.values[i] {
                AdaValue::SuperDesc(s) => s.compose(|name| self.value(name))?,
                _ => continue,
            };
            if let AdaValue::SuperDesc(s) = &mut self.values[i] {
                s.assign_derived(derived);
            }
        }
        Ok(())
    }
}

fn restrict(t: &Arc<AdaType>, wanted: &HashSet<String>) -> Option<Arc<AdaType>> {
    if wanted.contains(t.short_name()) {
        return Some(Arc::clone(t));
    }
    if !matches!(t.kind(), FieldKind::Group | FieldKind::PeriodGroup) {
        return None;
    }
    let children: Vec<Arc<AdaType>> = t
        .children()
        .iter()
        .filter_map(|c| restrict(c, wanted))
        .collect();
    if children.is_empty() {
        None
    } else {
        Some(Arc::new(t.with_children_subset(children)))
    }
}

fn register(index: &mut HashMap<String, Arc<AdaType>>, t: &Arc<AdaType>) -> Result<()> {
    // The element of an MU field shares the field's short name.
    if !t.has_flag(FieldFlag::MuGhost) {
        if index.contains_key(t.short_name()) {
            return Err(AdabasError::DuplicateField {
                name: t.short_name().to_string(),
            });
        }
        index.insert(t.short_name().to_string(), Arc::clone(t));
        if t.name() != t.short_name() {
            index
                .entry(t.name().to_string())
                .or_insert_with(|| Arc::clone(t));
        }
    }
    if t.kind() != FieldKind::SuperDesc {
        for child in t.children() {
            register(index, child)?;
        }
    }
    Ok(())
}
