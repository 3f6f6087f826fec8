//! ColumnGroup descriptor - named, possibly nested grouping of columns and column sets.

use crate::column::Column;
use crate::column_set::ColumnSet;
use crate::error::Result;
use crate::schema::ConsumedMap;
use polars::prelude::{col, Expr};
use std::sync::Arc;

/// Reference to a sibling descriptor by attribute name, resolved when the schema is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Column(String),
    Set(String),
    Group(String),
}

impl GroupRef {
    pub fn column(name: impl Into<String>) -> Self {
        GroupRef::Column(name.into())
    }

    pub fn set(name: impl Into<String>) -> Self {
        GroupRef::Set(name.into())
    }

    pub fn group(name: impl Into<String>) -> Self {
        GroupRef::Group(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            GroupRef::Column(n) | GroupRef::Set(n) | GroupRef::Group(n) => n,
        }
    }
}

/// Resolved member of a group.
#[derive(Debug, Clone)]
pub enum GroupMember {
    Column(Arc<Column>),
    Set(Arc<ColumnSet>),
    Group(Arc<ColumnGroup>),
}

#[derive(Debug, Clone)]
pub struct ColumnGroup {
    refs: Vec<GroupRef>,
    members: Vec<GroupMember>,
    pub description: String,
    name: String,
}

impl ColumnGroup {
    /// Group over sibling descriptors of the same schema.
    pub fn new<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = GroupRef>,
    {
        Self {
            refs: refs.into_iter().collect(),
            members: Vec::new(),
            description: String::new(),
            name: String::new(),
        }
    }

    /// Group over already-resolved descriptors. Such a group is never re-bound by
    /// `Schema::resolve_deferred`, so schemas only take groups built with [`ColumnGroup::new`].
    #[cfg(test)]
    pub(crate) fn from_members(members: Vec<GroupMember>) -> Self {
        Self {
            refs: Vec::new(),
            members,
            description: String::new(),
            name: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub(crate) fn refs(&self) -> &[GroupRef] {
        &self.refs
    }

    pub(crate) fn bind(&mut self, name: &str, members: Vec<GroupMember>) {
        self.name = name.to_string();
        self.members = members;
    }

    /// Flattens the group into table column names.
    ///
    /// Column sets contribute their consumed columns when `consumed` has an entry
    /// for them, else their literal members; regex sets without an entry contribute
    /// nothing.
    pub fn column_names(&self, consumed: &ConsumedMap) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for member in &self.members {
            match member {
                GroupMember::Column(column) => names.push(column.effective_name()?.to_string()),
                GroupMember::Set(set) => {
                    if let Some(matched) = consumed.get(set.name()) {
                        names.extend(matched.iter().cloned());
                    } else if let Some(literal) = set.literal_names() {
                        names.extend(literal.iter().cloned());
                    }
                }
                GroupMember::Group(group) => names.extend(group.column_names(consumed)?),
            }
        }
        Ok(names)
    }

    pub fn cols(&self, consumed: &ConsumedMap) -> Result<Vec<Expr>> {
        Ok(self.column_names(consumed)?.iter().map(|c| col(c)).collect())
    }
}
