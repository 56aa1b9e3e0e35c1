pub mod parser;
pub mod query;

pub use parser::*;
pub use query::*;
