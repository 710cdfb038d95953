pub mod predicate;
pub mod query_service;

pub use predicate::{Condition, FieldPredicate};
pub use query_service::{FilterQuery, Page, QueryService, Record};
