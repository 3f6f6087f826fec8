use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypedFramesError {
    #[error("Column '{column}' has conflicting types: {first_type} ({first_schema}) vs {second_type} ({second_schema})")]
    SchemaConflict {
        column: String,
        first_type: String,
        first_schema: String,
        second_type: String,
        second_schema: String,
    },

    #[error("Column '{column}' matched by both '{first}' and '{second}'.")]
    ColumnGroup {
        column: String,
        first: String,
        second: String,
    },

    #[error("Column '{0}' has alias=DefinedLater but was accessed before alias was set.")]
    AliasNotYetDefined(String),

    #[error("ColumnSet '{0}' has members=DefinedLater but was accessed before members were set.")]
    SetMembersNotYetDefined(String),

    #[error("{descriptor} does not belong to {schema}")]
    Ownership { schema: String, descriptor: String },

    #[error("ColumnSet '{set}' has an invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        set: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Column '{key}' does not exist in {schema}{hint}")]
    UnknownColumn {
        key: String,
        schema: String,
        hint: String,
    },

    #[error("Schema definition error: {0}")]
    Definition(String),

    #[error("Checker error: {0}")]
    Checker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for TypedFramesError {
    fn from(err: polars::error::PolarsError) -> Self {
        TypedFramesError::Polars(err.to_string())
    }
}

impl TypedFramesError {
    pub(crate) fn unknown_column(key: &str, schema: &str, suggestion: Option<&str>) -> Self {
        TypedFramesError::UnknownColumn {
            key: key.to_string(),
            schema: schema.to_string(),
            hint: suggestion
                .map(|s| format!(" (did you mean '{}'?)", s))
                .unwrap_or_default(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TypedFramesError>;
