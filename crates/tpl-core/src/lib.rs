pub mod error;
pub mod options;
pub mod value;

pub use error::{TemplateError, TemplateErrorKind};
pub use options::*;
pub use value::*;
