//! Schema algebra - build new schemas from existing ones.
//!
//! Every operation returns a fresh schema whose descriptors are copies of the
//! sources', so the results never share descriptor instances with their inputs.
//! Results use the default `SchemaConfig` and do not carry column groups.

use crate::column::Column;
use crate::column_set::ColumnSet;
use crate::error::{Result, TypedFramesError};
use crate::schema::collector::type_conflict;
use crate::schema::Schema;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A column or column set passed to `select`/`drop`, matched by identity.
#[derive(Debug, Clone, Copy)]
pub enum Descriptor<'a> {
    Column(&'a Column),
    Set(&'a ColumnSet),
}

impl<'a> Descriptor<'a> {
    fn label(&self) -> String {
        match self {
            Descriptor::Column(c) => format!("Column '{}'", c.label()),
            Descriptor::Set(s) => format!("ColumnSet '{}'", s.name()),
        }
    }
}

impl<'a> From<&'a Column> for Descriptor<'a> {
    fn from(column: &'a Column) -> Self {
        Descriptor::Column(column)
    }
}

impl<'a> From<&'a Arc<Column>> for Descriptor<'a> {
    fn from(column: &'a Arc<Column>) -> Self {
        Descriptor::Column(&**column)
    }
}

impl<'a> From<&'a ColumnSet> for Descriptor<'a> {
    fn from(set: &'a ColumnSet) -> Self {
        Descriptor::Set(set)
    }
}

impl<'a> From<&'a Arc<ColumnSet>> for Descriptor<'a> {
    fn from(set: &'a Arc<ColumnSet>) -> Self {
        Descriptor::Set(&**set)
    }
}

/// Union of two schemas. Default name is `<A>_<B>`.
///
/// A column (or column set) declared by both sources must have the same type in
/// each, otherwise this fails with `SchemaConflict` naming both schemas. On an
/// agreeing overlap the first schema's definition is kept.
pub fn combine(a: &Schema, b: &Schema, name: Option<&str>) -> Result<Schema> {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_{}", a.name(), b.name()));

    kind_collision(a, b)?;
    kind_collision(b, a)?;

    let mut columns: IndexMap<&str, &Column> = IndexMap::new();
    for (attr, column) in a.columns() {
        columns.insert(attr, &**column);
    }
    for (attr, column) in b.columns() {
        match columns.get(attr.as_str()) {
            Some(existing) if existing.declared_type != column.declared_type => {
                return Err(type_conflict(
                    attr,
                    &existing.declared_type,
                    a.name(),
                    &column.declared_type,
                    b.name(),
                ));
            }
            Some(_) => {}
            None => {
                columns.insert(attr, &**column);
            }
        }
    }

    let mut column_sets: IndexMap<&str, &ColumnSet> = IndexMap::new();
    for (attr, set) in a.column_sets() {
        column_sets.insert(attr, &**set);
    }
    for (attr, set) in b.column_sets() {
        match column_sets.get(attr.as_str()) {
            Some(existing) if existing.declared_type != set.declared_type => {
                return Err(type_conflict(
                    attr,
                    &existing.declared_type,
                    a.name(),
                    &set.declared_type,
                    b.name(),
                ));
            }
            Some(_) => {}
            None => {
                column_sets.insert(attr, &**set);
            }
        }
    }

    debug!(left = %a.name(), right = %b.name(), combined = %name, "Combining schemas");
    assemble(name, columns, column_sets)
}

/// Fails when `columns_from` declares a column under a name `sets_from` uses for a column set.
fn kind_collision(columns_from: &Schema, sets_from: &Schema) -> Result<()> {
    match columns_from
        .columns()
        .keys()
        .find(|attr| sets_from.column_set(attr).is_some())
    {
        Some(attr) => Err(TypedFramesError::Definition(format!(
            "'{}' is a column in {} but a column set in {}",
            attr,
            columns_from.name(),
            sets_from.name()
        ))),
        None => Ok(()),
    }
}

/// Schema holding only the given descriptors of `schema`. Default name is `<S>_Select`.
pub fn select<'a, I, D>(schema: &Schema, descriptors: I, name: Option<&str>) -> Result<Schema>
where
    I: IntoIterator<Item = D>,
    D: Into<Descriptor<'a>>,
{
    let (columns, sets) = owned_attributes(schema, descriptors)?;
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_Select", schema.name()));
    debug!(source = %schema.name(), selected = columns.len() + sets.len(), "Selecting from schema");
    assemble(
        name,
        schema
            .columns()
            .iter()
            .filter(|(attr, _)| columns.contains(attr.as_str()))
            .map(|(attr, c)| (attr.as_str(), &**c))
            .collect(),
        schema
            .column_sets()
            .iter()
            .filter(|(attr, _)| sets.contains(attr.as_str()))
            .map(|(attr, s)| (attr.as_str(), &**s))
            .collect(),
    )
}

/// Schema holding every descriptor of `schema` except the given ones.
/// Default name is `<S>_Drop`.
pub fn drop<'a, I, D>(schema: &Schema, descriptors: I, name: Option<&str>) -> Result<Schema>
where
    I: IntoIterator<Item = D>,
    D: Into<Descriptor<'a>>,
{
    let (columns, sets) = owned_attributes(schema, descriptors)?;
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_Drop", schema.name()));
    debug!(source = %schema.name(), dropped = columns.len() + sets.len(), "Dropping from schema");
    assemble(
        name,
        schema
            .columns()
            .iter()
            .filter(|(attr, _)| !columns.contains(attr.as_str()))
            .map(|(attr, c)| (attr.as_str(), &**c))
            .collect(),
        schema
            .column_sets()
            .iter()
            .filter(|(attr, _)| !sets.contains(attr.as_str()))
            .map(|(attr, s)| (attr.as_str(), &**s))
            .collect(),
    )
}

/// Attribute names of the given descriptors, which must be owned by `schema`.
fn owned_attributes<'s, 'a, I, D>(schema: &'s Schema, descriptors: I) -> Result<(HashSet<&'s str>, HashSet<&'s str>)>
where
    I: IntoIterator<Item = D>,
    D: Into<Descriptor<'a>>,
{
    let mut columns = HashSet::new();
    let mut sets = HashSet::new();
    for descriptor in descriptors {
        let descriptor = descriptor.into();
        let owner = match descriptor {
            Descriptor::Column(c) => schema.column_owner(c).map(|attr| columns.insert(attr)),
            Descriptor::Set(s) => schema.column_set_owner(s).map(|attr| sets.insert(attr)),
        };
        if owner.is_none() {
            return Err(TypedFramesError::Ownership {
                schema: schema.name().to_string(),
                descriptor: descriptor.label(),
            });
        }
    }
    Ok((columns, sets))
}

fn assemble(
    name: String,
    columns: IndexMap<&str, &Column>,
    column_sets: IndexMap<&str, &ColumnSet>,
) -> Result<Schema> {
    let builder = columns
        .into_iter()
        .fold(Schema::builder(name), |b, (attr, c)| b.column(attr, c.unbound_copy()));
    column_sets
        .into_iter()
        .fold(builder, |b, (attr, s)| b.column_set(attr, s.unbound_copy()))
        .build()
}

impl Schema {
    /// See [`combine`].
    pub fn combine(&self, other: &Schema, name: Option<&str>) -> Result<Schema> {
        combine(self, other, name)
    }

    /// See [`select`].
    pub fn select<'a, I, D>(&self, descriptors: I, name: Option<&str>) -> Result<Schema>
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor<'a>>,
    {
        select(self, descriptors, name)
    }

    /// See [`drop`].
    pub fn drop<'a, I, D>(&self, descriptors: I, name: Option<&str>) -> Result<Schema>
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor<'a>>,
    {
        drop(self, descriptors, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_type::ColumnType;

    fn users() -> Schema {
        Schema::builder("Users")
            .column("user_id", Column::new(ColumnType::Int))
            .column("email", Column::new(ColumnType::Str))
            .column("name", Column::new(ColumnType::Str))
            .build()
            .unwrap()
    }

    fn orders(user_id: ColumnType) -> Schema {
        Schema::builder("Orders")
            .column("order_id", Column::new(ColumnType::Int))
            .column("user_id", Column::new(user_id))
            .column("total", Column::new(ColumnType::Float))
            .build()
            .unwrap()
    }

    fn sensors() -> Schema {
        Schema::builder("MultiSensorData")
            .column("timestamp", Column::new(ColumnType::Str))
            .column_set("temps", ColumnSet::names(["temp_1", "temp_2"]).with_type(ColumnType::Float))
            .column_set("pressures", ColumnSet::names(["pres_1", "pres_2"]).with_type(ColumnType::Float))
            .build()
            .unwrap()
    }

    fn keys(schema: &Schema) -> Vec<&str> {
        schema.columns().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_combine_unions_columns() {
        let combined = combine(&users(), &orders(ColumnType::Int), None).unwrap();
        assert_eq!(combined.name(), "Users_Orders");
        assert_eq!(keys(&combined), vec!["user_id", "email", "name", "order_id", "total"]);
        assert_eq!(combined.column("user_id").unwrap().declared_type, ColumnType::Int);
        assert_eq!(combined.column("total").unwrap().name(), "total");
    }

    #[test]
    fn test_combine_custom_name() {
        let combined = users().combine(&orders(ColumnType::Int), Some("UserOrders")).unwrap();
        assert_eq!(combined.name(), "UserOrders");
    }

    #[test]
    fn test_combine_conflict_names_both_sources() {
        let err = combine(&users(), &orders(ColumnType::Str), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("user_id"));
        assert!(message.contains("int (Users)"));
        assert!(message.contains("str (Orders)"));
    }

    #[test]
    fn test_combine_copies_descriptors() {
        let users = users();
        let combined = combine(&users, &orders(ColumnType::Int), None).unwrap();
        let original = users.column("email").unwrap();
        let copy = combined.column("email").unwrap();
        assert!(!Arc::ptr_eq(original, copy));
        assert_eq!(**original, **copy);
    }

    #[test]
    fn test_combine_checks_column_set_types() {
        let a = Schema::builder("A")
            .column_set("temps", ColumnSet::names(["temp_1"]).with_type(ColumnType::Float))
            .build()
            .unwrap();
        let same = Schema::builder("B")
            .column_set("temps", ColumnSet::names(["temp_9"]).with_type(ColumnType::Float))
            .build()
            .unwrap();
        let combined = combine(&a, &same, None).unwrap();
        assert_eq!(combined.column_sets().len(), 1);
        assert_eq!(
            combined.column_set("temps").unwrap().literal_names().unwrap(),
            &["temp_1".to_string()]
        );

        let clashing = Schema::builder("C")
            .column_set("temps", ColumnSet::names(["temp_1"]).with_type(ColumnType::Int))
            .build()
            .unwrap();
        assert!(matches!(
            combine(&a, &clashing, None),
            Err(TypedFramesError::SchemaConflict { .. })
        ));
    }

    #[test]
    fn test_combine_rejects_column_and_set_with_same_name() {
        let a = Schema::builder("A")
            .column("x", Column::new(ColumnType::Int))
            .build()
            .unwrap();
        let b = Schema::builder("B")
            .column_set("x", ColumnSet::names(["x_1"]))
            .build()
            .unwrap();

        let err = combine(&a, &b, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema definition error: 'x' is a column in A but a column set in B"
        );
        let err = combine(&b, &a, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema definition error: 'x' is a column in A but a column set in B"
        );
    }

    #[test]
    fn test_select_columns() {
        let users = users();
        let selected = users
            .select([users.column("user_id").unwrap(), users.column("email").unwrap()], None)
            .unwrap();
        assert_eq!(selected.name(), "Users_Select");
        assert_eq!(keys(&selected), vec!["user_id", "email"]);
        assert_eq!(selected.column("user_id").unwrap().declared_type, ColumnType::Int);
    }

    #[test]
    fn test_select_mixed_descriptors() {
        let sensors = sensors();
        let selected = select(
            &sensors,
            [
                Descriptor::from(sensors.column("timestamp").unwrap()),
                Descriptor::from(sensors.column_set("temps").unwrap()),
            ],
            Some("Temps"),
        )
        .unwrap();
        assert_eq!(selected.name(), "Temps");
        assert!(selected.column("timestamp").is_some());
        assert!(selected.column_set("temps").is_some());
        assert!(selected.column_set("pressures").is_none());
    }

    #[test]
    fn test_select_rejects_foreign_descriptors() {
        let users = users();
        let orders = orders(ColumnType::Int);
        let err = users
            .select([orders.column("order_id").unwrap()], None)
            .unwrap_err();
        assert!(err.to_string().contains("does not belong to Users"));

        // Same attribute name is not enough; ownership is by identity.
        let err = users
            .select([orders.column("user_id").unwrap()], None)
            .unwrap_err();
        assert!(matches!(err, TypedFramesError::Ownership { .. }));

        let sensors = sensors();
        let other = Schema::builder("SensorData")
            .column_set("temps", ColumnSet::names(["temp_1", "temp_2"]))
            .build()
            .unwrap();
        let err = sensors
            .select([other.column_set("temps").unwrap()], None)
            .unwrap_err();
        assert!(err.to_string().contains("does not belong to MultiSensorData"));
    }

    #[test]
    fn test_drop_columns_and_sets() {
        let users = users();
        let dropped = users.drop([users.column("name").unwrap()], None).unwrap();
        assert_eq!(dropped.name(), "Users_Drop");
        assert_eq!(keys(&dropped), vec!["user_id", "email"]);

        let sensors = sensors();
        let dropped = sensors
            .drop([sensors.column_set("temps").unwrap()], Some("PressuresOnly"))
            .unwrap();
        assert!(dropped.column_set("temps").is_none());
        assert!(dropped.column_set("pressures").is_some());
        assert!(dropped.column("timestamp").is_some());
    }

    #[test]
    fn test_drop_rejects_foreign_descriptors() {
        let orders = orders(ColumnType::Int);
        let err = users().drop([orders.column("order_id").unwrap()], None).unwrap_err();
        assert!(err.to_string().contains("does not belong to Users"));
    }

    #[test]
    fn test_inherited_descriptors_are_owned_by_child() {
        let users = users();
        let child = Schema::builder("Customers")
            .extends(&users)
            .column("tier", Column::new(ColumnType::Str))
            .build()
            .unwrap();
        let selected = child.select([users.column("email").unwrap()], None).unwrap();
        assert_eq!(keys(&selected), vec!["email"]);
    }
}
