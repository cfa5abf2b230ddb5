pub mod executor;
pub mod parser;
