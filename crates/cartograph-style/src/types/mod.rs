//! Property value model.

mod color;
mod properties;
mod value;

pub use color::Rgba;
pub use properties::Properties;
pub use value::{Argument, FunctionCall, Value};
