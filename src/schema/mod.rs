//! # Schema
//!
//! A schema is an immutable bundle of named `Column`, `ColumnSet` and `ColumnGroup`
//! descriptors plus four configuration flags. Schemas are declared through
//! [`SchemaBuilder`]; the build step binds descriptor names, merges the descriptors
//! of every parent schema, and rejects cross-parent type conflicts. The resulting
//! descriptor maps are computed once and never change, so a built schema can be
//! shared freely between threads.
//!
//! ## Example
//!
//! ```rust,no_run
//! use typedframes::{Column, ColumnSet, ColumnType, Schema};
//!
//! let sensors = Schema::builder("Sensors")
//!     .column("timestamp", Column::new(ColumnType::Str))
//!     .column_set("temps", ColumnSet::names(["temp_1", "temp_2"]).with_type(ColumnType::Float))
//!     .build()?;
//!
//! let observed = vec!["timestamp", "temp_1", "temp_2", "temp_3"];
//! let (types, consumed) = sensors.compute_column_map(&observed, None)?;
//! assert_eq!(consumed["temps"], vec!["temp_1", "temp_2"]);
//! # Ok::<(), typedframes::TypedFramesError>(())
//! ```

pub(crate) mod collector;
mod matcher;
mod validator;

use crate::column::{Alias, Column};
use crate::column_group::ColumnGroup;
use crate::column_set::{ColumnSet, Members};
use crate::error::{Result, TypedFramesError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use matcher::{ConsumedMap, TypeMap};

/// Schema-level flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Require every declared column to be present.
    pub enforce_columns: bool,
    /// Advisory; enforcing column types is up to the caller.
    pub enforce_types: bool,
    /// Tolerate observed columns no descriptor covers.
    pub allow_extra_columns: bool,
    /// Let one observed column satisfy several column sets instead of failing.
    pub greedy_column_sets: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            enforce_columns: true,
            enforce_types: true,
            allow_extra_columns: true,
            greedy_column_sets: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    config: SchemaConfig,
    columns: IndexMap<String, Arc<Column>>,
    column_sets: IndexMap<String, Arc<ColumnSet>>,
    column_groups: IndexMap<String, Arc<ColumnGroup>>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Attribute name → column, including inherited columns.
    pub fn columns(&self) -> &IndexMap<String, Arc<Column>> {
        &self.columns
    }

    /// Attribute name → column set, including inherited sets, in declaration order.
    pub fn column_sets(&self) -> &IndexMap<String, Arc<ColumnSet>> {
        &self.column_sets
    }

    pub fn column_groups(&self) -> &IndexMap<String, Arc<ColumnGroup>> {
        &self.column_groups
    }

    pub fn column(&self, name: &str) -> Option<&Arc<Column>> {
        self.columns.get(name)
    }

    pub fn column_set(&self, name: &str) -> Option<&Arc<ColumnSet>> {
        self.column_sets.get(name)
    }

    pub fn column_group(&self, name: &str) -> Option<&Arc<ColumnGroup>> {
        self.column_groups.get(name)
    }

    /// Effective names of every column plus the literal members of non-regex sets.
    pub fn all_column_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.columns.len());
        for column in self.columns.values() {
            names.push(column.effective_name()?.to_string());
        }
        for set in self.column_sets.values() {
            if let Some(literal) = set.literal_names() {
                names.extend(literal.iter().cloned());
            }
        }
        Ok(names)
    }

    /// Attribute name owning this exact column instance.
    pub fn column_owner(&self, column: &Column) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, c)| std::ptr::eq(Arc::as_ptr(c), column))
            .map(|(name, _)| name.as_str())
    }

    /// Attribute name owning this exact column set instance.
    pub fn column_set_owner(&self, set: &ColumnSet) -> Option<&str> {
        self.column_sets
            .iter()
            .find(|(_, s)| std::ptr::eq(Arc::as_ptr(s), set))
            .map(|(name, _)| name.as_str())
    }

    /// Supplies deferred aliases and set members, returning the resolved schema.
    ///
    /// Groups are re-resolved so they point at the replacement descriptors.
    pub fn resolve_deferred(&self, bindings: &DeferredBindings) -> Result<Schema> {
        let mut columns = self.columns.clone();
        for (attr, alias) in &bindings.aliases {
            let column = columns.get_mut(attr).ok_or_else(|| {
                TypedFramesError::Definition(format!("{} has no column '{}'", self.name, attr))
            })?;
            if !column.is_deferred() {
                return Err(TypedFramesError::Definition(format!(
                    "Column '{}' does not have a deferred alias",
                    attr
                )));
            }
            let mut resolved = (**column).clone();
            resolved.alias = Some(Alias::Named(alias.clone()));
            *column = Arc::new(resolved);
        }

        let mut column_sets = self.column_sets.clone();
        for (attr, members) in &bindings.members {
            let set = column_sets.get_mut(attr).ok_or_else(|| {
                TypedFramesError::Definition(format!("{} has no column set '{}'", self.name, attr))
            })?;
            if !set.is_deferred() {
                return Err(TypedFramesError::Definition(format!(
                    "ColumnSet '{}' does not have deferred members",
                    attr
                )));
            }
            let mut resolved = (**set).clone();
            resolved.members = Members::Names(members.clone());
            resolved.compile()?;
            *set = Arc::new(resolved);
        }

        let column_groups = collector::rebind_groups(&self.column_groups, &columns, &column_sets)?;
        debug!(
            schema = %self.name,
            aliases = bindings.aliases.len(),
            members = bindings.members.len(),
            "Resolved deferred descriptors"
        );
        Ok(Schema {
            name: self.name.clone(),
            config: self.config,
            columns,
            column_sets,
            column_groups,
        })
    }
}

/// Runtime values for deferred aliases and set members, keyed by attribute name.
#[derive(Debug, Clone, Default)]
pub struct DeferredBindings {
    aliases: HashMap<String, String>,
    members: HashMap<String, Vec<String>>,
}

impl DeferredBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(column.into(), alias.into());
        self
    }

    pub fn members<I, S>(mut self, set: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members
            .insert(set.into(), members.into_iter().map(Into::into).collect());
        self
    }
}

/// Declares a schema. Nothing is checked until [`SchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    config: SchemaConfig,
    parents: Vec<Schema>,
    columns: Vec<(String, Column)>,
    column_sets: Vec<(String, ColumnSet)>,
    column_groups: Vec<(String, ColumnGroup)>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: SchemaConfig::default(),
            parents: Vec::new(),
            columns: Vec::new(),
            column_sets: Vec::new(),
            column_groups: Vec::new(),
        }
    }

    /// Inherit every descriptor of `parent`. Earlier parents win on name collisions.
    pub fn extends(mut self, parent: &Schema) -> Self {
        self.parents.push(parent.clone());
        self
    }

    pub fn column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.push((name.into(), column));
        self
    }

    pub fn column_set(mut self, name: impl Into<String>, set: ColumnSet) -> Self {
        self.column_sets.push((name.into(), set));
        self
    }

    pub fn group(mut self, name: impl Into<String>, group: ColumnGroup) -> Self {
        self.column_groups.push((name.into(), group));
        self
    }

    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enforce_columns(mut self, enforce: bool) -> Self {
        self.config.enforce_columns = enforce;
        self
    }

    pub fn enforce_types(mut self, enforce: bool) -> Self {
        self.config.enforce_types = enforce;
        self
    }

    pub fn allow_extra_columns(mut self, allow: bool) -> Self {
        self.config.allow_extra_columns = allow;
        self
    }

    pub fn greedy_column_sets(mut self, greedy: bool) -> Self {
        self.config.greedy_column_sets = greedy;
        self
    }

    /// Binds descriptor names, merges parents and resolves groups.
    ///
    /// Fails with `SchemaConflict` when two parents declare the same column with
    /// different types; the schema's own declarations may override either.
    pub fn build(self) -> Result<Schema> {
        collector::check_unique_attributes(&self.name, &self.columns, &self.column_sets, &self.column_groups)?;
        collector::check_parent_conflicts(&self.parents)?;

        let mut collected = collector::Collected::from_parents(&self.parents);

        for (attr, mut column) in self.columns {
            column.bind_name(&attr);
            collected.columns.insert(attr, Arc::new(column));
        }
        for (attr, mut set) in self.column_sets {
            set.bind_name(&attr)?;
            collected.column_sets.insert(attr, Arc::new(set));
        }
        for (attr, group) in self.column_groups {
            let bound = collector::bind_group(
                &attr,
                group,
                &collected.columns,
                &collected.column_sets,
                &collected.column_groups,
            )?;
            collected.column_groups.insert(attr, Arc::new(bound));
        }

        debug!(
            schema = %self.name,
            parents = self.parents.len(),
            columns = collected.columns.len(),
            column_sets = collected.column_sets.len(),
            column_groups = collected.column_groups.len(),
            "Built schema"
        );

        Ok(Schema {
            name: self.name,
            config: self.config,
            columns: collected.columns,
            column_sets: collected.column_sets,
            column_groups: collected.column_groups,
        })
    }
}
