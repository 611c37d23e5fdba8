mod query;
mod types;

pub use query::{parse_query, search};
pub use types::*;
