//! # SchemaFrame
//!
//! A polars `DataFrame` paired with the schema it was read against. The column
//! map is computed once, when the frame is created, and travels with every frame
//! derived through `filter`, `slice`, `head` or `map_frame`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use polars::prelude::*;
//! use std::sync::Arc;
//! use typedframes::{Column, ColumnSet, ColumnType, Schema, SchemaFrame};
//!
//! let schema = Arc::new(
//!     Schema::builder("Sensors")
//!         .column("timestamp", Column::new(ColumnType::Str))
//!         .column_set("temps", ColumnSet::pattern(r"temp_\d+").with_type(ColumnType::Float))
//!         .build()?,
//! );
//! let df = df![
//!     "timestamp" => &["t0", "t1"],
//!     "temp_1" => &[20.5, 21.0],
//!     "temp_2" => &[19.0, 19.5],
//! ]?;
//!
//! let frame = SchemaFrame::from_schema(df, schema)?;
//! let temps = frame.get("temps")?;
//! assert_eq!(temps.width(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{Result, TypedFramesError};
use crate::resolver::{resolve, ResolvedSelection, SelectionKey};
use crate::schema::{ConsumedMap, Schema};
use polars::prelude::{BooleanChunked, DataFrame, PolarsResult, Series};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SchemaFrame {
    df: DataFrame,
    schema: Arc<Schema>,
    consumed: ConsumedMap,
}

impl SchemaFrame {
    /// Wraps `df`, matching its column names against `schema`.
    pub fn from_schema(df: DataFrame, schema: Arc<Schema>) -> Result<Self> {
        let names = df.get_column_names();
        let (_, consumed) = schema.compute_column_map(&names, None)?;
        debug!(
            schema = %schema.name(),
            rows = df.height(),
            columns = df.width(),
            "Attached schema to frame"
        );
        Ok(Self { df, schema, consumed })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Column set attribute name → columns the set consumed.
    pub fn consumed(&self) -> &ConsumedMap {
        &self.consumed
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Drops the schema metadata.
    pub fn into_inner(self) -> DataFrame {
        self.df
    }

    /// Table column names a key stands for.
    pub fn resolve<'a>(&self, key: impl Into<SelectionKey<'a>>) -> Result<Vec<String>> {
        let key = key.into();
        match resolve(&self.schema, &self.consumed, key)? {
            ResolvedSelection::NotFound { suggestion } => {
                let name = match key {
                    SelectionKey::Name(name) => name,
                    _ => "",
                };
                Err(TypedFramesError::unknown_column(
                    name,
                    self.schema.name(),
                    suggestion.as_deref(),
                ))
            }
            resolved => Ok(resolved.column_names().to_vec()),
        }
    }

    /// Sub-frame holding the columns a key resolves to, in resolution order.
    pub fn get<'a>(&self, key: impl Into<SelectionKey<'a>>) -> Result<DataFrame> {
        let names = self.resolve(key)?;
        Ok(self.df.select(names)?)
    }

    /// A single column. Keys resolving to anything other than one column fail.
    pub fn column<'a>(&self, key: impl Into<SelectionKey<'a>>) -> Result<Series> {
        let names = self.resolve(key)?;
        match names.as_slice() {
            [name] => Ok(self.df.column(name)?.clone()),
            _ => Err(TypedFramesError::Definition(format!(
                "expected a single column, got {} ({})",
                names.len(),
                names.join(", ")
            ))),
        }
    }

    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self> {
        Ok(self.derive(self.df.filter(mask)?))
    }

    pub fn slice(&self, offset: i64, length: usize) -> Self {
        self.derive(self.df.slice(offset, length))
    }

    pub fn head(&self, length: Option<usize>) -> Self {
        self.derive(self.df.head(length))
    }

    /// Applies any frame transformation (joins, merges, ...) and keeps the
    /// schema and consumed map on the result.
    pub fn map_frame<F>(&self, f: F) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> PolarsResult<DataFrame>,
    {
        Ok(self.derive(f(&self.df)?))
    }

    /// Runs the schema's column validator over this frame's column names.
    pub fn validate(&self) -> Vec<String> {
        self.schema.validate_columns(&self.df.get_column_names())
    }

    fn derive(&self, df: DataFrame) -> Self {
        Self {
            df,
            schema: Arc::clone(&self.schema),
            consumed: self.consumed.clone(),
        }
    }
}
