//! Gathers descriptors from parent schemas and detects cross-parent conflicts.

use super::Schema;
use crate::column::Column;
use crate::column_group::{ColumnGroup, GroupMember, GroupRef};
use crate::column_set::ColumnSet;
use crate::column_type::ColumnType;
use crate::error::{Result, TypedFramesError};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub(crate) struct Collected {
    pub columns: IndexMap<String, Arc<Column>>,
    pub column_sets: IndexMap<String, Arc<ColumnSet>>,
    pub column_groups: IndexMap<String, Arc<ColumnGroup>>,
}

impl Collected {
    /// Merges parent descriptors. The first parent declaring an attribute fixes
    /// both its position and its value.
    pub fn from_parents(parents: &[Schema]) -> Self {
        let mut collected = Collected {
            columns: IndexMap::new(),
            column_sets: IndexMap::new(),
            column_groups: IndexMap::new(),
        };
        for parent in parents {
            for (attr, column) in parent.columns() {
                collected.columns.entry(attr.clone()).or_insert_with(|| column.clone());
            }
            for (attr, set) in parent.column_sets() {
                collected.column_sets.entry(attr.clone()).or_insert_with(|| set.clone());
            }
            for (attr, group) in parent.column_groups() {
                collected.column_groups.entry(attr.clone()).or_insert_with(|| group.clone());
            }
        }
        collected
    }
}

pub(crate) fn type_conflict(
    column: &str,
    first_type: &ColumnType,
    first_schema: &str,
    second_type: &ColumnType,
    second_schema: &str,
) -> TypedFramesError {
    TypedFramesError::SchemaConflict {
        column: column.to_string(),
        first_type: first_type.to_string(),
        first_schema: first_schema.to_string(),
        second_type: second_type.to_string(),
        second_schema: second_schema.to_string(),
    }
}

/// Walks parents in order and fails on the first column name seen with two types.
pub(crate) fn check_parent_conflicts(parents: &[Schema]) -> Result<()> {
    let mut seen: HashMap<&str, (&ColumnType, &str)> = HashMap::new();
    for parent in parents {
        for column in parent.columns().values() {
            match seen.get(column.label()) {
                Some((first_type, first_schema)) => {
                    if **first_type != column.declared_type {
                        return Err(type_conflict(
                            column.label(),
                            first_type,
                            first_schema,
                            &column.declared_type,
                            parent.name(),
                        ));
                    }
                }
                None => {
                    seen.insert(column.label(), (&column.declared_type, parent.name()));
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn check_unique_attributes(
    schema: &str,
    columns: &[(String, Column)],
    column_sets: &[(String, ColumnSet)],
    column_groups: &[(String, ColumnGroup)],
) -> Result<()> {
    let mut seen = HashSet::new();
    let attrs = columns
        .iter()
        .map(|(a, _)| a)
        .chain(column_sets.iter().map(|(a, _)| a))
        .chain(column_groups.iter().map(|(a, _)| a));
    for attr in attrs {
        if attr.is_empty() {
            return Err(TypedFramesError::Definition(format!(
                "{} declares a descriptor with an empty name",
                schema
            )));
        }
        if !seen.insert(attr) {
            return Err(TypedFramesError::Definition(format!(
                "{} declares '{}' more than once",
                schema, attr
            )));
        }
    }
    Ok(())
}

/// Resolves a group's references against the descriptors declared so far.
pub(crate) fn bind_group(
    attr: &str,
    mut group: ColumnGroup,
    columns: &IndexMap<String, Arc<Column>>,
    column_sets: &IndexMap<String, Arc<ColumnSet>>,
    column_groups: &IndexMap<String, Arc<ColumnGroup>>,
) -> Result<ColumnGroup> {
    if group.refs().is_empty() {
        let members = group.members().to_vec();
        group.bind(attr, members);
        return Ok(group);
    }

    let unknown = |kind: &str, target: &str| {
        TypedFramesError::Definition(format!(
            "ColumnGroup '{}' references unknown {} '{}'",
            attr, kind, target
        ))
    };

    let mut members = Vec::with_capacity(group.refs().len());
    for reference in group.refs() {
        let member = match reference {
            GroupRef::Column(name) => columns
                .get(name)
                .map(|c| GroupMember::Column(c.clone()))
                .ok_or_else(|| unknown("column", name.as_str()))?,
            GroupRef::Set(name) => column_sets
                .get(name)
                .map(|s| GroupMember::Set(s.clone()))
                .ok_or_else(|| unknown("column set", name.as_str()))?,
            GroupRef::Group(name) => column_groups
                .get(name)
                .map(|g| GroupMember::Group(g.clone()))
                .ok_or_else(|| unknown("column group", name.as_str()))?,
        };
        members.push(member);
    }
    group.bind(attr, members);
    Ok(group)
}

/// Re-resolves every group, in order, against replacement column and set maps.
pub(crate) fn rebind_groups(
    groups: &IndexMap<String, Arc<ColumnGroup>>,
    columns: &IndexMap<String, Arc<Column>>,
    column_sets: &IndexMap<String, Arc<ColumnSet>>,
) -> Result<IndexMap<String, Arc<ColumnGroup>>> {
    let mut rebound = IndexMap::with_capacity(groups.len());
    for (attr, group) in groups {
        let bound = bind_group(attr, (**group).clone(), columns, column_sets, &rebound)?;
        rebound.insert(attr.clone(), Arc::new(bound));
    }
    Ok(rebound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: &str, columns: &[(&str, ColumnType)]) -> Schema {
        columns
            .iter()
            .fold(Schema::builder(name), |b, (attr, ty)| b.column(*attr, Column::new(ty.clone())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_multi_parent_conflict_is_eager() {
        let users = schema("Users", &[("user_id", ColumnType::Int), ("email", ColumnType::Str)]);
        let orders = schema("Orders", &[("order_id", ColumnType::Int), ("user_id", ColumnType::Str)]);

        let err = Schema::builder("UserOrders")
            .extends(&users)
            .extends(&orders)
            .build()
            .unwrap_err();
        match err {
            TypedFramesError::SchemaConflict {
                column,
                first_type,
                first_schema,
                second_type,
                second_schema,
            } => {
                assert_eq!(column, "user_id");
                assert_eq!(first_type, "int");
                assert_eq!(first_schema, "Users");
                assert_eq!(second_type, "str");
                assert_eq!(second_schema, "Orders");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_identical_types_across_parents_are_allowed() {
        let users = schema("Users", &[("user_id", ColumnType::Int), ("email", ColumnType::Str)]);
        let orders = schema("Orders", &[("order_id", ColumnType::Int), ("user_id", ColumnType::Int)]);

        let combined = Schema::builder("UserOrders")
            .extends(&users)
            .extends(&orders)
            .build()
            .unwrap();
        let attrs: Vec<&str> = combined.columns().keys().map(|k| k.as_str()).collect();
        assert_eq!(attrs, vec!["user_id", "email", "order_id"]);
        // First parent's instance is kept.
        assert!(Arc::ptr_eq(
            combined.column("user_id").unwrap(),
            users.column("user_id").unwrap()
        ));
    }

    #[test]
    fn test_child_may_override_parent_type() {
        let base = schema("Base", &[("amount", ColumnType::Int)]);
        let child = Schema::builder("Child")
            .extends(&base)
            .column("amount", Column::new(ColumnType::Float))
            .build()
            .unwrap();
        assert_eq!(child.column("amount").unwrap().declared_type, ColumnType::Float);
        assert_eq!(base.column("amount").unwrap().declared_type, ColumnType::Int);
    }

    #[test]
    fn test_child_groups_can_reference_inherited_descriptors() {
        let base = Schema::builder("Base")
            .column("ts", Column::new(ColumnType::Datetime))
            .column_set("temps", ColumnSet::names(["temp_1"]))
            .build()
            .unwrap();
        let child = Schema::builder("Child")
            .extends(&base)
            .group("readings", ColumnGroup::new([GroupRef::column("ts"), GroupRef::set("temps")]))
            .build()
            .unwrap();
        assert_eq!(child.column_group("readings").unwrap().members().len(), 2);
    }
}
