//! Dialect-aware SQL statement generation for entity CRUD.
//!
//! Given an [`EntityDescriptor`] and a [`Dialect`], the generator produces a
//! fixed set of parameterized statements per entity (insert, updates, finds,
//! counts, deletes, paged find), resolving database-specific syntax at
//! runtime: identifier quoting, column type names and pagination shape.
//! Statements are generated once per entity and cached in a
//! [`StatementRegistry`], where hand-authored statements under reserved
//! names take precedence.
//!
//! ```
//! use crudgen::{
//!     Dialect, EntityDescriptor, Params, PropertyDescriptor, SqlType,
//!     StatementGenerator, StatementName, ValueKind,
//! };
//!
//! let user = EntityDescriptor::builder("User", "ds_user")
//!     .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
//!     .property(PropertyDescriptor::new("userName", SqlType::VarChar, ValueKind::String))
//!     .build();
//!
//! let set = StatementGenerator::new(Dialect::h2()).generate(&user);
//! let insert = set.get(StatementName::Insert).unwrap();
//! assert_eq!(
//!     insert.render(&Params::new()),
//!     "insert into ds_user(id,user_name) values(#{id},#{userName})"
//! );
//! ```
//!
//! Query execution, result mapping and entity-metadata discovery are the
//! calling application's concern; this crate only produces statement text.

pub mod condition;
pub mod dialect;
pub mod entity;
pub mod errors;
pub mod example;
pub mod fragment;
pub mod id;
pub mod paging;
pub mod query;
pub mod statements;

pub use condition::{ConditionKind, IgnoreCase};
pub use dialect::{Dialect, LimitHandler, SqlType, TypeNames};
pub use entity::{
    EmbeddedAssociation, EntityDescriptor, EntityId, PropertyDescriptor, ValueKind,
};
pub use errors::{GenerationError, OptimisticLockError, check_affected_rows};
pub use example::{ExampleFilter, ExampleMatcher, NullHandler, StringMatcher, build_example};
pub use fragment::{Direction, Fragment, Params, SortOrder};
pub use id::{IdGenerator, UuidGenerator, assign_generated_id};
pub use paging::{PageRequest, Slice, Total, calculate_total};
pub use query::{PagedQuery, create_count_query};
pub use statements::{
    Statement, StatementGenerator, StatementName, StatementRegistry, StatementSet,
    static_order_by,
};
