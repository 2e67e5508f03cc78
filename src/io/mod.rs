//! Text-format mesh export.

mod obj;

pub use obj::{export_obj, export_obj_to_string};
