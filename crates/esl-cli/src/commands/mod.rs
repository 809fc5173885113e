pub mod common;
pub mod query;
pub mod tx;
