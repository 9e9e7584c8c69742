mod bounding_box;
pub mod error;
mod loader;
mod options;
mod parser;
mod point;
mod sink;

pub mod prelude {
    pub use crate::bounding_box::*;
    pub use crate::error::PlyError;
    pub use crate::loader::*;
    pub use crate::options::*;
    pub use crate::parser::*;
    pub use crate::point::*;
    pub use crate::sink::*;
}
