//! ColumnSet descriptor - a named set of columns given by literal names or regex patterns.

use crate::column_type::ColumnType;
use crate::error::{Result, TypedFramesError};
use polars::prelude::{col, Expr};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Member specification of a column set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Members {
    /// Literal column names, or regex patterns when the set is a regex set.
    Names(Vec<String>),
    /// Supplied at runtime, before the set is first read.
    Deferred,
}

/// A group of columns sharing one type, matched by name list or pattern.
///
/// Example: `ColumnSet::pattern(r"temp_\d+").with_type(ColumnType::Float)` matches
/// `temp_1`, `temp_22`, ... Patterns are anchored at the start of the column name
/// only, so `temp_\d+` also matches `temp_1_raw`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSet {
    pub members: Members,
    pub declared_type: ColumnType,
    pub is_regex: bool,
    pub description: String,
    #[serde(default)]
    name: String,
    #[serde(skip)]
    patterns: Vec<Regex>,
}

impl ColumnSet {
    /// Set of literal column names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_members(Members::Names(names.into_iter().map(Into::into).collect()), false)
    }

    /// Set matching a single regex pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::with_members(Members::Names(vec![pattern.into()]), true)
    }

    /// Set matching any of several regex patterns.
    pub fn patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_members(Members::Names(patterns.into_iter().map(Into::into).collect()), true)
    }

    /// Set whose members are supplied later (see `Schema::resolve_deferred`).
    pub fn deferred() -> Self {
        Self::with_members(Members::Deferred, false)
    }

    fn with_members(members: Members, is_regex: bool) -> Self {
        Self {
            members,
            declared_type: ColumnType::Any,
            is_regex,
            description: String::new(),
            name: String::new(),
            patterns: Vec::new(),
        }
    }

    pub fn with_type(mut self, declared_type: impl Into<ColumnType>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    /// Treat members as regex patterns. Mainly useful together with `deferred()`.
    pub fn with_regex(mut self, is_regex: bool) -> Self {
        self.is_regex = is_regex;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attribute name the set was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.members, Members::Deferred)
    }

    /// Member list (names or patterns).
    pub fn member_names(&self) -> Result<&[String]> {
        match &self.members {
            Members::Names(names) => Ok(names),
            Members::Deferred => Err(TypedFramesError::SetMembersNotYetDefined(self.name.clone())),
        }
    }

    /// Literal member names; `None` for regex sets and deferred sets.
    pub fn literal_names(&self) -> Option<&[String]> {
        match &self.members {
            Members::Names(names) if !self.is_regex => Some(names),
            _ => None,
        }
    }

    /// Whether an observed column name belongs to this set.
    pub fn matches(&self, column: &str) -> Result<bool> {
        let members = self.member_names()?;
        if self.is_regex {
            Ok(self.patterns.iter().any(|p| p.is_match(column)))
        } else {
            Ok(members.iter().any(|m| m == column))
        }
    }

    /// Polars expressions for the matched columns, or for the literal members when
    /// no matched list is given.
    pub fn cols(&self, matched: Option<&[String]>) -> Result<Vec<Expr>> {
        if let Some(matched) = matched {
            return Ok(matched.iter().map(|c| col(c)).collect());
        }
        let members = self.member_names()?;
        if self.is_regex {
            return Err(TypedFramesError::Definition(format!(
                "ColumnSet '{}' is a regex set; column expressions need the matched column names",
                self.name
            )));
        }
        Ok(members.iter().map(|c| col(c)).collect())
    }

    pub(crate) fn bind_name(&mut self, name: &str) -> Result<()> {
        self.name = name.to_string();
        self.compile()
    }

    /// Compiles regex members, anchored at the start of the name.
    pub(crate) fn compile(&mut self) -> Result<()> {
        self.patterns.clear();
        if !self.is_regex {
            return Ok(());
        }
        if let Members::Names(patterns) = &self.members {
            for pattern in patterns {
                let anchored = format!("^(?:{})", pattern);
                let regex = Regex::new(&anchored).map_err(|source| TypedFramesError::InvalidPattern {
                    set: self.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
                self.patterns.push(regex);
            }
        }
        Ok(())
    }

    /// Fresh copy with the same definition and no bound name.
    pub(crate) fn unbound_copy(&self) -> Self {
        Self {
            name: String::new(),
            ..self.clone()
        }
    }
}
