//! Naming and placement of definitions once a traversal is complete.
//!
//! Every registered definition is either produced (stored under a name in
//! the definitions container and referenced through `$ref`) or inlined at
//! each use site. The decision depends on reference counts and options; the
//! [`DefinitionAssembler`] makes it once and then rewrites placeholders.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use jsg_core::GeneratorOption;
use serde_json::{Map, Value};

use crate::attributes;
use crate::context::SchemaGenerationContext;
use crate::error::GeneratorError;
use crate::keyword::SchemaKeyword;
use crate::registry::{self, DefinitionEntry, DefinitionKey};

const MAIN_REFERENCE: &str = "#";

#[derive(Debug, Clone)]
enum PlainUse {
    Ref(String),
    Inline,
}

#[derive(Debug, Clone)]
enum NullableUse {
    Ref(String),
    Inline(Map<String, Value>),
}

pub(crate) struct DefinitionAssembler<'a> {
    context: &'a SchemaGenerationContext,
    main_index: Option<usize>,
    plain: Vec<PlainUse>,
    nullable: Vec<Option<NullableUse>>,
    definitions: Map<String, Value>,
    inlined: HashMap<usize, Map<String, Value>>,
    in_progress: Vec<usize>,
}

impl<'a> DefinitionAssembler<'a> {
    /// Decide for every registered definition whether it is produced, name
    /// the produced ones and lay them out under `#/<definitions_path>/`.
    ///
    /// # Errors
    ///
    /// Fails when the naming strategy leaves duplicate names behind or
    /// alters a group of keys it was asked to disambiguate.
    pub(crate) fn new(
        context: &'a SchemaGenerationContext,
        main_key: Option<&DefinitionKey>,
        definitions_path: &str,
    ) -> Result<Self, GeneratorError> {
        let registry = context.registry();
        let mut assembler = Self {
            context,
            main_index: main_key.and_then(|key| registry.index_of(key)),
            plain: vec![PlainUse::Inline; registry.len()],
            nullable: vec![None; registry.len()],
            definitions: Map::new(),
            inlined: HashMap::new(),
            in_progress: Vec::new(),
        };
        let names = assembler.reference_names()?;
        assembler.place_definitions(names, &format!("{MAIN_REFERENCE}/{definitions_path}/"));
        tracing::debug!(
            definitions = assembler.definitions.len(),
            registered = registry.len(),
            "assembled definitions"
        );
        Ok(assembler)
    }

    fn is_enabled(&self, option: GeneratorOption) -> bool {
        self.context.config().is_enabled(option)
    }

    fn entry(&self, index: usize) -> Option<(&'a DefinitionKey, &'a DefinitionEntry)> {
        self.context.registry().entry(index)
    }

    /// Whether the definition at `index` gets its own entry. With
    /// `direct_only`, nullable uses alone never justify one.
    fn should_produce(&self, index: usize, direct_only: bool) -> bool {
        let Some((_, entry)) = self.entry(index) else {
            return false;
        };
        if entry.always_ref {
            return true;
        }
        if self.is_enabled(GeneratorOption::InlineAllSchemas) {
            return false;
        }
        if self.is_enabled(GeneratorOption::DefinitionsForAllObjects) || self.main_index == Some(index) {
            return true;
        }
        if direct_only && entry.references == 0 {
            return false;
        }
        entry.references + entry.nullable_references > 1
    }

    fn should_create_nullable(&self, entry: &DefinitionEntry) -> bool {
        if entry.always_ref {
            return true;
        }
        if self.is_enabled(GeneratorOption::InlineAllSchemas) {
            return false;
        }
        self.is_enabled(GeneratorOption::DefinitionsForAllObjects) || entry.nullable_references > 1
    }

    // -----------------------------------------------------------------------
    // Naming
    // -----------------------------------------------------------------------

    /// Registry indices grouped by base name (sorted), each with its final
    /// name or an empty string if it is not produced.
    fn reference_names(&self) -> Result<Vec<(usize, String)>, GeneratorError> {
        let strategy = self.context.config().naming_strategy();
        let registry = self.context.registry();
        let definition_for_main = self.is_enabled(GeneratorOption::DefinitionForMainSchema);

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, key) in registry.keys().enumerate() {
            groups
                .entry(strategy.definition_name_for_key(key, self.context))
                .or_default()
                .push(index);
        }

        let mut names = Vec::with_capacity(registry.len());
        for (base_name, members) in groups {
            let produced: Vec<usize> = members
                .iter()
                .copied()
                .filter(|index| self.should_produce(*index, false))
                .collect();
            let mut group_names: IndexMap<DefinitionKey, String> = produced
                .iter()
                .filter_map(|index| self.entry(*index))
                .map(|(key, _)| (key.clone(), base_name.clone()))
                .collect();

            let main_pair = produced.len() == 2
                && !definition_for_main
                && self.main_index.is_some_and(|main| produced.contains(&main));
            if produced.len() > 1 && !main_pair {
                strategy.adjust_duplicate_names(&mut group_names, self.context);
                if group_names.len() != produced.len() {
                    return Err(GeneratorError::NamingStrategyAlteredGroup {
                        name: base_name,
                        expected: produced.len(),
                        found: group_names.len(),
                    });
                }
            }

            for index in members {
                let name = self
                    .entry(index)
                    .and_then(|(key, _)| group_names.get(key))
                    .cloned()
                    .unwrap_or_default();
                names.push((index, name));
            }
        }

        let duplicates = self.duplicate_names(&names, definition_for_main);
        if !duplicates.is_empty() {
            return Err(GeneratorError::DuplicateDefinitionNames { names: duplicates });
        }
        Ok(names)
    }

    /// Names shared by more than one produced definition. A main schema
    /// that stays at the root never collides.
    fn duplicate_names(&self, names: &[(usize, String)], definition_for_main: bool) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (index, name) in names {
            if name.is_empty() || (!definition_for_main && self.main_index == Some(*index)) {
                continue;
            }
            *counts.entry(name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    fn place_definitions(&mut self, names: Vec<(usize, String)>, prefix: &str) {
        let strategy = self.context.config().naming_strategy();
        let definition_for_main = self.is_enabled(GeneratorOption::DefinitionForMainSchema);
        let ref_keyword = self.context.keyword(SchemaKeyword::Ref);

        for (index, name) in names {
            let Some((key, entry)) = self.entry(index) else {
                continue;
            };
            let reference = if self.should_produce(index, true) {
                if self.main_index == Some(index) && !definition_for_main {
                    Some(MAIN_REFERENCE.to_string())
                } else {
                    self.definitions
                        .insert(name.clone(), Value::Object(entry.schema.clone()));
                    Some(format!("{prefix}{name}"))
                }
            } else {
                None
            };
            if let Some(reference) = &reference {
                self.plain[index] = PlainUse::Ref(reference.clone());
            }

            if entry.nullable_references == 0 {
                continue;
            }
            let mut nullable = match reference {
                Some(reference) => {
                    let mut node = Map::new();
                    node.insert(ref_keyword.to_string(), Value::String(reference));
                    node
                }
                None => entry.schema.clone(),
            };
            self.context.make_nullable(&mut nullable);
            let nullable_use = if self.should_create_nullable(entry) {
                let nullable_name = strategy.adjust_nullable_name(key, &name, self.context);
                self.definitions
                    .insert(nullable_name.clone(), Value::Object(nullable));
                NullableUse::Ref(format!("{prefix}{nullable_name}"))
            } else {
                NullableUse::Inline(nullable)
            };
            self.nullable[index] = Some(nullable_use);
        }
    }

    // -----------------------------------------------------------------------
    // Placeholder substitution
    // -----------------------------------------------------------------------

    /// Produced definitions by name, with all their placeholders resolved.
    ///
    /// # Errors
    ///
    /// Fails if an inlined definition ends up containing itself.
    pub(crate) fn take_definitions(&mut self) -> Result<Map<String, Value>, GeneratorError> {
        let mut definitions = std::mem::take(&mut self.definitions);
        for definition in definitions.values_mut() {
            self.resolve_value(definition)?;
        }
        Ok(definitions)
    }

    /// The resolved definition stored for `key`, as used for a main schema
    /// that is not itself a named definition.
    ///
    /// # Errors
    ///
    /// Fails if an inlined definition ends up containing itself.
    pub(crate) fn resolved_definition(
        &mut self,
        key: &DefinitionKey,
    ) -> Result<Map<String, Value>, GeneratorError> {
        match self.context.registry().index_of(key) {
            Some(index) => self.inline_definition(index),
            None => Ok(Map::new()),
        }
    }

    /// Replace every placeholder in `node` (and below) with a `$ref` or the
    /// inlined definition.
    ///
    /// # Errors
    ///
    /// Fails if an inlined definition ends up containing itself.
    pub(crate) fn resolve(&mut self, node: &mut Map<String, Value>) -> Result<(), GeneratorError> {
        let placeholder = registry::take_placeholder(node);
        for value in node.values_mut() {
            self.resolve_value(value)?;
        }
        match placeholder {
            None => Ok(()),
            Some((index, true)) => self.apply_nullable(index, node),
            Some((index, false)) => self.apply_plain(index, node),
        }
    }

    fn resolve_value(&mut self, value: &mut Value) -> Result<(), GeneratorError> {
        match value {
            Value::Object(node) => self.resolve(node),
            Value::Array(items) => items.iter_mut().try_for_each(|item| self.resolve_value(item)),
            _ => Ok(()),
        }
    }

    fn apply_plain(&mut self, index: usize, node: &mut Map<String, Value>) -> Result<(), GeneratorError> {
        match self.plain.get(index).cloned() {
            Some(PlainUse::Ref(reference)) => {
                self.insert_reference(node, reference);
                Ok(())
            }
            _ => {
                let definition = self.inline_definition(index)?;
                attributes::merge_missing(node, definition);
                Ok(())
            }
        }
    }

    fn apply_nullable(&mut self, index: usize, node: &mut Map<String, Value>) -> Result<(), GeneratorError> {
        match self.nullable.get(index).cloned().flatten() {
            Some(NullableUse::Ref(reference)) => {
                self.insert_reference(node, reference);
                Ok(())
            }
            Some(NullableUse::Inline(mut definition)) => {
                self.enter(index)?;
                let resolved = self.resolve(&mut definition);
                self.in_progress.pop();
                resolved?;
                attributes::merge_missing(node, definition);
                Ok(())
            }
            None => self.apply_plain(index, node),
        }
    }

    fn enter(&mut self, index: usize) -> Result<(), GeneratorError> {
        if self.in_progress.contains(&index) {
            let type_description = self
                .entry(index)
                .map(|(key, _)| key.ty().simple_description())
                .unwrap_or_default();
            return Err(GeneratorError::CircularInlining { type_description });
        }
        self.in_progress.push(index);
        Ok(())
    }

    fn inline_definition(&mut self, index: usize) -> Result<Map<String, Value>, GeneratorError> {
        if let Some(done) = self.inlined.get(&index) {
            return Ok(done.clone());
        }
        let Some((_, entry)) = self.entry(index) else {
            return Ok(Map::new());
        };
        self.enter(index)?;
        let mut definition = entry.schema.clone();
        let resolved = self.resolve(&mut definition);
        self.in_progress.pop();
        resolved?;
        self.inlined.insert(index, definition.clone());
        Ok(definition)
    }

    /// Put `$ref` first. Dialects that ignore siblings of `$ref` get the
    /// reference wrapped into `allOf` instead, keeping the siblings effective.
    fn insert_reference(&self, node: &mut Map<String, Value>, reference: String) {
        let mut reference_node = Map::new();
        reference_node.insert(
            self.context.keyword(SchemaKeyword::Ref).to_string(),
            Value::String(reference),
        );
        if node.is_empty() {
            *node = reference_node;
            return;
        }
        if self.context.config().version().ref_ignores_siblings() {
            let all_of = self.context.keyword(SchemaKeyword::AllOf);
            if let Some(Value::Array(parts)) = node.get_mut(all_of) {
                parts.insert(0, Value::Object(reference_node));
            } else {
                node.insert(all_of.to_string(), Value::Array(vec![Value::Object(reference_node)]));
            }
            return;
        }
        let siblings = std::mem::take(node);
        *node = reference_node;
        node.extend(siblings);
    }
}
