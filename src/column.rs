//! Column descriptor - one named, typed field of a schema.

use crate::column_type::ColumnType;
use crate::error::{Result, TypedFramesError};
use polars::prelude::{col, Expr};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Override name for a column in the actual table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alias {
    /// The table column carries this name instead of the attribute name.
    Named(String),
    /// The alias is supplied at runtime, before the column is first read.
    Deferred,
}

/// A single column declared on a schema.
///
/// The attribute `name` is empty until the column is added to a schema; the
/// schema builder binds it once and the column is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub declared_type: ColumnType,
    pub alias: Option<Alias>,
    pub nullable: bool,
    pub description: String,
    #[serde(default)]
    name: String,
}

impl Default for Column {
    fn default() -> Self {
        Self::new(ColumnType::Any)
    }
}

impl Column {
    pub fn new(declared_type: impl Into<ColumnType>) -> Self {
        Self {
            declared_type: declared_type.into(),
            alias: None,
            nullable: false,
            description: String::new(),
            name: String::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(Alias::Named(alias.into()));
        self
    }

    /// Marks the alias as supplied later (see `Schema::resolve_deferred`).
    pub fn with_deferred_alias(mut self) -> Self {
        self.alias = Some(Alias::Deferred);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attribute name the column was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.alias, Some(Alias::Deferred))
    }

    /// Name of the column in the actual table: the alias when set, else the attribute name.
    pub fn effective_name(&self) -> Result<&str> {
        match &self.alias {
            Some(Alias::Named(alias)) => Ok(alias),
            Some(Alias::Deferred) => Err(TypedFramesError::AliasNotYetDefined(self.name.clone())),
            None => Ok(&self.name),
        }
    }

    /// Alias when concrete, otherwise the attribute name. Never fails.
    pub fn label(&self) -> &str {
        match &self.alias {
            Some(Alias::Named(alias)) => alias,
            _ => &self.name,
        }
    }

    /// Polars expression selecting this column.
    pub fn col(&self) -> Result<Expr> {
        Ok(col(self.effective_name()?))
    }

    pub(crate) fn bind_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Fresh copy with the same definition and no bound name.
    pub(crate) fn unbound_copy(&self) -> Self {
        Self {
            name: String::new(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
