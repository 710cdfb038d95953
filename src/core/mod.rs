pub mod error;
pub mod models;
pub mod operators;
pub mod params;
pub mod types;

pub use error::FilterBoxError;
pub use models::*;
pub use params::{ParameterTree, ParamValue, RowParams};
pub use types::*;
