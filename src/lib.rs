#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

pub mod action;
pub mod component;
pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod widget;

// Re-export commonly used types
pub use action::{Action, ActionKind};
pub use component::Component;
pub use config::{Config, FilterSettings};
pub use self::core::{FieldType, FilterBoxError, FilterableField, ModelConfig, Operator, ParameterTree, RowId};
pub use services::{Page, QueryService};
pub use widget::FilterBox;
