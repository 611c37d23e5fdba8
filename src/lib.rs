pub mod config;
pub mod search;

pub use search::{parse, translate, Condition, FilterPredicate, ParseError, QueryParser};
