pub mod filter_box;
pub mod picker;
pub mod render;
pub mod row;

pub use filter_box::FilterBox;
pub use picker::{DateTimePicker, PickerCommit};
pub use row::FilterRow;
