//! Resolves observed table column names against a schema.

use super::Schema;
use crate::column::Column;
use crate::column_set::ColumnSet;
use crate::column_type::ColumnType;
use crate::error::{Result, TypedFramesError};
use std::collections::HashMap;
use tracing::debug;

/// Observed column name → declared type.
pub type TypeMap = HashMap<String, ColumnType>;

/// Column set attribute name → observed columns it consumed, in observed order.
pub type ConsumedMap = HashMap<String, Vec<String>>;

/// Descriptor holding an observed column's slot.
#[derive(Clone, Copy)]
enum Claim<'a> {
    Column(&'a Column),
    Set(&'a ColumnSet),
}

impl<'a> Claim<'a> {
    fn name(&self) -> &'a str {
        match self {
            Claim::Column(c) => c.name(),
            Claim::Set(s) => s.name(),
        }
    }

    fn declared_type(&self) -> &'a ColumnType {
        match self {
            Claim::Column(c) => &c.declared_type,
            Claim::Set(s) => &s.declared_type,
        }
    }
}

impl Schema {
    /// Effective column name → column.
    fn key_column_map(&self) -> Result<HashMap<&str, &Column>> {
        let mut map = HashMap::with_capacity(self.columns.len());
        for column in self.columns.values() {
            map.insert(column.effective_name()?, &**column);
        }
        Ok(map)
    }

    /// Maps observed column names to declared types and records which observed
    /// names each column set consumed.
    ///
    /// Explicit columns claim their names first. Column sets are then tried in
    /// declaration order; a set matching an already-claimed name is a
    /// `ColumnGroup` error unless matching is greedy (`greedy` overrides the
    /// schema's `greedy_column_sets`). Under greedy matching every matching set
    /// records the name, while the name keeps its first claimant's type.
    /// Observed names no descriptor claims are left out of the type map.
    pub fn compute_column_map<S: AsRef<str>>(
        &self,
        observed: &[S],
        greedy: Option<bool>,
    ) -> Result<(TypeMap, ConsumedMap)> {
        let greedy = greedy.unwrap_or(self.config.greedy_column_sets);
        let observed: Vec<&str> = observed.iter().map(|name| name.as_ref()).collect();
        let key_columns = self.key_column_map()?;
        let mut consumed = ConsumedMap::new();

        if self.column_sets.is_empty() {
            let types = observed
                .iter()
                .filter_map(|name| {
                    key_columns
                        .get(name)
                        .map(|c| (name.to_string(), c.declared_type.clone()))
                })
                .collect();
            return Ok((types, consumed));
        }

        let mut claims: Vec<Option<Claim<'_>>> = observed
            .iter()
            .map(|name| key_columns.get(name).map(|c| Claim::Column(*c)))
            .collect();

        for (slot, name) in observed.iter().enumerate() {
            for set in self.column_sets.values() {
                if !set.matches(name)? {
                    continue;
                }
                match claims[slot] {
                    Some(first) if !greedy => {
                        return Err(TypedFramesError::ColumnGroup {
                            column: name.to_string(),
                            first: first.name().to_string(),
                            second: set.name().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => claims[slot] = Some(Claim::Set(set)),
                }
                consumed
                    .entry(set.name().to_string())
                    .or_default()
                    .push(name.to_string());
            }
        }

        let types: TypeMap = observed
            .iter()
            .zip(claims.iter())
            .filter_map(|(name, claim)| {
                claim
                    .as_ref()
                    .map(|c| (name.to_string(), c.declared_type().clone()))
            })
            .collect();

        debug!(
            schema = %self.name,
            observed = observed.len(),
            claimed = types.len(),
            greedy,
            "Computed column map"
        );
        Ok((types, consumed))
    }
}
