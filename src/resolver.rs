//! Maps a lookup key (attribute name or descriptor) to concrete table column names.
//!
//! Name lookups try columns first, then column sets, then column groups. Keys
//! that match nothing come back as `NotFound`, with a "did you mean" suggestion
//! when a declared attribute is within a small edit distance.

use crate::column::Column;
use crate::column_group::ColumnGroup;
use crate::column_set::ColumnSet;
use crate::error::{Result, TypedFramesError};
use crate::schema::{ConsumedMap, Schema};
use strsim::levenshtein;
use tracing::debug;

/// Largest edit distance for which a suggestion is offered.
const MAX_SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Clone, Copy)]
pub enum SelectionKey<'a> {
    Name(&'a str),
    Column(&'a Column),
    Set(&'a ColumnSet),
    Group(&'a ColumnGroup),
}

impl<'a> From<&'a str> for SelectionKey<'a> {
    fn from(name: &'a str) -> Self {
        SelectionKey::Name(name)
    }
}

impl<'a> From<&'a String> for SelectionKey<'a> {
    fn from(name: &'a String) -> Self {
        SelectionKey::Name(name.as_str())
    }
}

impl<'a> From<&'a Column> for SelectionKey<'a> {
    fn from(column: &'a Column) -> Self {
        SelectionKey::Column(column)
    }
}

impl<'a> From<&'a ColumnSet> for SelectionKey<'a> {
    fn from(set: &'a ColumnSet) -> Self {
        SelectionKey::Set(set)
    }
}

impl<'a> From<&'a ColumnGroup> for SelectionKey<'a> {
    fn from(group: &'a ColumnGroup) -> Self {
        SelectionKey::Group(group)
    }
}

/// Outcome of resolving a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSelection {
    /// A single column, by its name in the table.
    Column(String),
    /// The observed columns a set consumed. Empty when it consumed none.
    ColumnSet(Vec<String>),
    /// The flattened columns of a group.
    Group(Vec<String>),
    NotFound { suggestion: Option<String> },
}

impl ResolvedSelection {
    /// Table column names covered by this selection.
    pub fn column_names(&self) -> &[String] {
        match self {
            ResolvedSelection::Column(name) => std::slice::from_ref(name),
            ResolvedSelection::ColumnSet(names) | ResolvedSelection::Group(names) => names,
            ResolvedSelection::NotFound { .. } => &[],
        }
    }
}

/// Resolves `key` against `schema`, using `consumed` for column set contents.
pub fn resolve<'a>(
    schema: &Schema,
    consumed: &ConsumedMap,
    key: impl Into<SelectionKey<'a>>,
) -> Result<ResolvedSelection> {
    match key.into() {
        SelectionKey::Column(column) => resolve_column(column),
        SelectionKey::Set(set) => resolve_set(set, consumed),
        SelectionKey::Group(group) => Ok(ResolvedSelection::Group(group.column_names(consumed)?)),
        SelectionKey::Name(name) => {
            if let Some(column) = schema.column(name) {
                return resolve_column(column);
            }
            if let Some(set) = schema.column_set(name) {
                return resolve_set(set, consumed);
            }
            if let Some(group) = schema.column_group(name) {
                return Ok(ResolvedSelection::Group(group.column_names(consumed)?));
            }
            let suggestion = suggest(schema, name);
            debug!(schema = %schema.name(), key = name, ?suggestion, "Unresolved selection key");
            Ok(ResolvedSelection::NotFound { suggestion })
        }
    }
}

fn resolve_column(column: &Column) -> Result<ResolvedSelection> {
    Ok(ResolvedSelection::Column(column.effective_name()?.to_string()))
}

fn resolve_set(set: &ColumnSet, consumed: &ConsumedMap) -> Result<ResolvedSelection> {
    if set.is_deferred() {
        return Err(TypedFramesError::SetMembersNotYetDefined(set.name().to_string()));
    }
    Ok(ResolvedSelection::ColumnSet(
        consumed.get(set.name()).cloned().unwrap_or_default(),
    ))
}

/// Closest declared attribute name, if any is close enough.
fn suggest(schema: &Schema, name: &str) -> Option<String> {
    schema
        .columns()
        .keys()
        .chain(schema.column_sets().keys())
        .chain(schema.column_groups().keys())
        .map(|attr| (levenshtein(name, attr), attr))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, attr)| attr.clone())
}
