pub mod algebra;
pub mod checker;
pub mod column;
pub mod column_group;
pub mod column_set;
pub mod column_type;
pub mod error;
pub mod frame;
pub mod resolver;
pub mod schema;

// Descriptors
pub use column::{Alias, Column};
pub use column_group::{ColumnGroup, GroupMember, GroupRef};
pub use column_set::{ColumnSet, Members};
pub use column_type::ColumnType;

// Schemas
pub use schema::{ConsumedMap, DeferredBindings, Schema, SchemaBuilder, SchemaConfig, TypeMap};
pub use algebra::{combine, Descriptor};

// Access
pub use frame::SchemaFrame;
pub use resolver::{resolve, ResolvedSelection, SelectionKey};

pub use error::{Result, TypedFramesError};
