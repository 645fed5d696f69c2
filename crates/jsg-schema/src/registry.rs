//! Per-run bookkeeping of every type that received a definition.
//!
//! Use sites do not embed definitions directly. They receive a placeholder
//! object carrying the registry index of the definition (and whether the use
//! is nullable); the assembler replaces placeholders once all reference
//! counts are known.

use indexmap::IndexMap;
use jsg_core::TypeDescriptor;
use serde_json::{Map, Value};

use crate::custom::ProviderId;

const PLACEHOLDER_REF: &str = "$jsg:ref";
const PLACEHOLDER_NULLABLE: &str = "$jsg:nullable";

/// Identity of a definition: a type plus the custom definition provider that
/// was bypassed to produce it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionKey {
    ty: TypeDescriptor,
    ignored_provider: Option<ProviderId>,
}

impl DefinitionKey {
    #[must_use]
    pub const fn new(ty: TypeDescriptor, ignored_provider: Option<ProviderId>) -> Self {
        Self {
            ty,
            ignored_provider,
        }
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[must_use]
    pub const fn ignored_provider(&self) -> Option<ProviderId> {
        self.ignored_provider
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionState {
    InProgress,
    Complete,
}

#[derive(Debug, Clone)]
pub(crate) struct DefinitionEntry {
    pub(crate) state: DefinitionState,
    pub(crate) schema: Map<String, Value>,
    pub(crate) always_ref: bool,
    pub(crate) references: usize,
    pub(crate) nullable_references: usize,
}

/// Definitions in first-encounter order.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    entries: IndexMap<DefinitionKey, DefinitionEntry>,
}

impl DefinitionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn index_of(&self, key: &DefinitionKey) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    #[must_use]
    pub fn contains(&self, key: &DefinitionKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DefinitionKey> {
        self.entries.keys()
    }

    /// Register `key` before its definition is built, so that recursive uses
    /// find it and become references.
    pub(crate) fn insert_in_progress(&mut self, key: DefinitionKey) -> usize {
        let (index, _) = self.entries.insert_full(
            key,
            DefinitionEntry {
                state: DefinitionState::InProgress,
                schema: Map::new(),
                always_ref: false,
                references: 0,
                nullable_references: 0,
            },
        );
        index
    }

    pub(crate) fn complete(&mut self, index: usize, schema: Map<String, Value>) {
        if let Some((_, entry)) = self.entries.get_index_mut(index) {
            entry.schema = schema;
            entry.state = DefinitionState::Complete;
        }
    }

    pub(crate) fn mark_always_ref(&mut self, index: usize) {
        if let Some((_, entry)) = self.entries.get_index_mut(index) {
            entry.always_ref = true;
        }
    }

    /// Count a use of the definition and return the placeholder for it.
    pub(crate) fn record_reference(&mut self, index: usize, nullable: bool) -> Map<String, Value> {
        if let Some((_, entry)) = self.entries.get_index_mut(index) {
            if nullable {
                entry.nullable_references += 1;
            } else {
                entry.references += 1;
            }
        }
        placeholder(index, nullable)
    }

    pub(crate) fn entry(&self, index: usize) -> Option<(&DefinitionKey, &DefinitionEntry)> {
        self.entries.get_index(index)
    }
}

fn placeholder(index: usize, nullable: bool) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert(PLACEHOLDER_REF.to_string(), Value::from(index));
    if nullable {
        node.insert(PLACEHOLDER_NULLABLE.to_string(), Value::Bool(true));
    }
    node
}

/// Strip the placeholder markers from `node`, returning the referenced index
/// and whether the use is nullable.
pub(crate) fn take_placeholder(node: &mut Map<String, Value>) -> Option<(usize, bool)> {
    let index = node.get(PLACEHOLDER_REF)?.as_u64()?;
    node.shift_remove(PLACEHOLDER_REF);
    let nullable = node
        .shift_remove(PLACEHOLDER_NULLABLE)
        .is_some_and(|flag| flag == Value::Bool(true));
    usize::try_from(index).ok().map(|index| (index, nullable))
}

/// Whether `node` carries a placeholder marker.
pub(crate) fn is_placeholder(node: &Map<String, Value>) -> bool {
    node.contains_key(PLACEHOLDER_REF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_counted_per_kind() {
        let mut registry = DefinitionRegistry::new();
        let key = DefinitionKey::new(TypeDescriptor::simple("test.Foo"), None);
        let index = registry.insert_in_progress(key.clone());
        assert_eq!(registry.index_of(&key), Some(index));

        let mut plain = registry.record_reference(index, false);
        registry.record_reference(index, false);
        let mut nullable = registry.record_reference(index, true);

        let (_, entry) = registry.entry(index).unwrap();
        assert_eq!(entry.references, 2);
        assert_eq!(entry.nullable_references, 1);
        assert_eq!(entry.state, DefinitionState::InProgress);

        assert!(is_placeholder(&plain));
        assert_eq!(take_placeholder(&mut plain), Some((index, false)));
        assert!(plain.is_empty());
        assert_eq!(take_placeholder(&mut nullable), Some((index, true)));
    }

    #[test]
    fn standard_variant_is_a_distinct_key() {
        let ty = TypeDescriptor::simple("test.Foo");
        let mut registry = DefinitionRegistry::new();
        registry.insert_in_progress(DefinitionKey::new(ty.clone(), None));
        registry.insert_in_progress(DefinitionKey::new(ty, Some(ProviderId(0))));
        assert_eq!(registry.len(), 2);
    }
}
