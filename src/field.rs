//! Box-distributed field storage.

mod field_box;
mod multi_field;

pub use field_box::FieldBox;
pub use multi_field::MultiField;
